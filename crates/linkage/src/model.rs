use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::classify::{FieldAdapter, RecordAccessor};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of one dataset. Field values stay in source order; meaning comes
/// from the dataset's shared accessor.
#[derive(Debug, Clone)]
pub struct Record {
    fields: Vec<String>,
    accessor: Arc<dyn RecordAccessor>,
}

impl Record {
    pub fn new(fields: Vec<String>, accessor: Arc<dyn RecordAccessor>) -> Self {
        Self { fields, accessor }
    }

    /// Standalone record with its own positional adapter. Handy for callers
    /// that build records in code rather than from a source file.
    pub fn from_parts(tag: &str, id: &str, name: &str, local_type: Option<&str>) -> Self {
        let mut fields = vec![id.to_string(), name.to_string()];
        if let Some(t) = local_type {
            fields.push(t.to_string());
        }
        let adapter = FieldAdapter::positional(tag, tag, local_type.is_some());
        Self::new(fields, Arc::new(adapter))
    }

    pub fn id(&self) -> &str {
        self.accessor.id(&self.fields)
    }

    pub fn name(&self) -> &str {
        self.accessor.name(&self.fields)
    }

    pub fn local_type(&self) -> Option<&str> {
        self.accessor.local_type(&self.fields)
    }

    pub fn dataset_tag(&self) -> &str {
        self.accessor.dataset_tag()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.accessor.field(&self.fields, name)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Record", 4)?;
        s.serialize_field("dataset", self.dataset_tag())?;
        s.serialize_field("id", self.id())?;
        s.serialize_field("name", self.name())?;
        s.serialize_field("type", &self.local_type())?;
        s.end()
    }
}

/// All records loaded from one source, sharing one accessor.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub tag: String,
    pub records: Vec<Record>,
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

/// Records from any dataset whose names share a canonical key.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorityCluster<'a> {
    pub canonical_key: String,
    pub members: Vec<&'a Record>,
}

impl<'a> AuthorityCluster<'a> {
    /// Members contributed by one dataset, in input order.
    pub fn members_of<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = &'a Record> + 's {
        self.members.iter().copied().filter(move |r| r.dataset_tag() == tag)
    }

    /// Distinct dataset tags present, in first-seen order.
    pub fn dataset_tags(&self) -> Vec<&'a str> {
        let mut tags: Vec<&str> = Vec::new();
        for m in self.members.iter().copied() {
            if !tags.contains(&m.dataset_tag()) {
                tags.push(m.dataset_tag());
            }
        }
        tags
    }
}

/// Clusters keyed and iterated by canonical key.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ClusterMap<'a> {
    clusters: BTreeMap<String, AuthorityCluster<'a>>,
}

/// Key of the cluster holding records with a blank display name: the
/// "unmatched/other" row that presentation moves to the end.
pub const TRAILING_KEY: &str = "";

impl<'a> ClusterMap<'a> {
    pub fn from_map(clusters: BTreeMap<String, AuthorityCluster<'a>>) -> Self {
        Self { clusters }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AuthorityCluster<'a>> {
        self.clusters.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.clusters.keys().map(String::as_str)
    }

    /// Clusters in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = &AuthorityCluster<'a>> {
        self.clusters.values()
    }

    /// Key order, except that the cluster at `trailing` (if any) comes last.
    pub fn presentation_order(&self, trailing: &str) -> Vec<&AuthorityCluster<'a>> {
        let mut ordered: Vec<_> = self
            .clusters
            .iter()
            .filter(|(k, _)| k.as_str() != trailing)
            .map(|(_, c)| c)
            .collect();
        if let Some(last) = self.clusters.get(trailing) {
            ordered.push(last);
        }
        ordered
    }
}

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A (dataset, local type) pair inferred with two different categories.
/// The later inference wins; the pair is kept for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasConflict {
    pub dataset: String,
    pub local_type: String,
    pub previous: String,
    pub chosen: String,
}

/// dataset tag → local type → canonical category.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeAliasTable {
    entries: BTreeMap<String, BTreeMap<String, String>>,
    conflicts: Vec<AliasConflict>,
}

impl TypeAliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an alias, returning the category it replaced.
    pub fn insert(&mut self, dataset: &str, local_type: &str, category: &str) -> Option<String> {
        self.entries
            .entry(dataset.to_string())
            .or_default()
            .insert(local_type.to_string(), category.to_string())
    }

    pub fn record_conflict(&mut self, conflict: AliasConflict) {
        self.conflicts.push(conflict);
    }

    pub fn get(&self, dataset: &str, local_type: &str) -> Option<&str> {
        self.entries
            .get(dataset)
            .and_then(|types| types.get(local_type))
            .map(String::as_str)
    }

    /// All aliases of one dataset, sorted by local type.
    pub fn dataset(&self, dataset: &str) -> Option<&BTreeMap<String, String>> {
        self.entries.get(dataset)
    }

    pub fn conflicts(&self) -> &[AliasConflict] {
        &self.conflicts
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (dataset, local type) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkageSummary {
    /// Records per dataset tag, after load-time filtering.
    pub records: BTreeMap<String, usize>,
    pub clusters: usize,
    pub single_member_clusters: usize,
    /// Fire and police bodies kept out of clustering.
    pub emergency_services_excluded: usize,
    pub aliases: usize,
    pub alias_conflicts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub reference: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkageResult<'a> {
    pub meta: RunMeta,
    pub summary: LinkageSummary,
    pub clusters: ClusterMap<'a>,
    pub aliases: TypeAliasTable,
}
