//! Grouping records into authority clusters by canonical key.

use std::collections::BTreeMap;

use crate::model::{AuthorityCluster, ClusterMap, Dataset, Record};
use crate::normalize::normalize;

/// Words that mark a fire or police body rather than a local authority.
pub const EMERGENCY_SERVICE_WORDS: &[&str] = &["fire", "police"];

/// Whether a canonical key names an emergency-service body. Matches whole
/// space-separated words only, so "firebrace" is not excluded.
pub fn is_emergency_service(key: &str) -> bool {
    key.split(' ')
        .any(|word| EMERGENCY_SERVICE_WORDS.contains(&word))
}

/// Outcome of a clustering pass.
#[derive(Debug, Clone, Default)]
pub struct ClusterOutput<'a> {
    pub clusters: ClusterMap<'a>,
    /// Records dropped because their key names a fire or police body.
    pub excluded: Vec<&'a Record>,
}

impl ClusterOutput<'_> {
    /// Records seen by the pass, clustered or excluded.
    pub fn record_count(&self) -> usize {
        self.clusters.iter().map(|c| c.members.len()).sum::<usize>() + self.excluded.len()
    }

    /// True when the pass saw no records at all.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.excluded.is_empty()
    }
}

/// Group records by canonical key.
///
/// Emergency-service records are dropped before grouping; a key whose only
/// records were dropped produces no cluster. Within a cluster, members keep
/// their input order.
pub fn build_clusters<'a, I>(records: I) -> ClusterOutput<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<String, Vec<&'a Record>> = BTreeMap::new();
    let mut excluded = Vec::new();

    for record in records {
        let key = normalize(record.name());
        if is_emergency_service(&key) {
            log::debug!(
                "excluding {} record '{}' ({key}) from clustering",
                record.dataset_tag(),
                record.id()
            );
            excluded.push(record);
            continue;
        }
        groups.entry(key).or_default().push(record);
    }

    let clusters = groups
        .into_iter()
        .map(|(key, members)| {
            let cluster = AuthorityCluster {
                canonical_key: key.clone(),
                members,
            };
            (key, cluster)
        })
        .collect();

    ClusterOutput {
        clusters: ClusterMap::from_map(clusters),
        excluded,
    }
}

/// Cluster every record of the given datasets, in dataset order.
pub fn cluster_datasets<'a>(datasets: &[&'a Dataset]) -> ClusterOutput<'a> {
    build_clusters(datasets.iter().flat_map(|d| d.records.iter()))
}
