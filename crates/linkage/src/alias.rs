//! Inferring each dataset's type vocabulary from the reference dataset.
//!
//! A cluster that holds a typed reference record next to typed records from
//! other datasets says "in this cluster, their label X means our category
//! Y". Collecting those observations over every cluster yields the alias
//! table. Manual overrides are applied afterwards and never feed inference.

use std::collections::BTreeMap;

use crate::cluster::ClusterOutput;
use crate::config::{default_overrides, AliasOverride};
use crate::model::{AliasConflict, ClusterMap, TypeAliasTable};

/// dataset tag → local type, for the typed members of one cluster. When a
/// dataset contributes several typed records the last one wins.
type CoOccurrence<'a> = BTreeMap<&'a str, &'a str>;

/// Resolve aliases against `reference_tag`, then apply the default overrides.
pub fn resolve_types(output: &ClusterOutput<'_>, reference_tag: &str) -> TypeAliasTable {
    resolve_types_with(output, reference_tag, &default_overrides())
}

/// Resolve aliases against `reference_tag`, then apply `overrides`.
///
/// A pass that saw no records yields an empty table; otherwise every override
/// is present in the result whatever inference produced, even when every
/// record was excluded from clustering.
pub fn resolve_types_with(
    output: &ClusterOutput<'_>,
    reference_tag: &str,
    overrides: &[AliasOverride],
) -> TypeAliasTable {
    let mut table = infer_aliases(&output.clusters, reference_tag);
    if output.is_empty() {
        return table;
    }
    for o in overrides {
        if let Some(prev) = table.insert(&o.dataset, &o.local_type, &o.category) {
            if prev != o.category {
                log::debug!(
                    "override {}/{:?}: {prev:?} -> {:?}",
                    o.dataset,
                    o.local_type,
                    o.category
                );
            }
        }
    }
    table
}

/// Inference only, no overrides.
pub fn infer_aliases(clusters: &ClusterMap<'_>, reference_tag: &str) -> TypeAliasTable {
    let observations = distinct_co_occurrences(clusters);

    // Group by the reference category, keeping first-seen group order.
    let mut groups: Vec<(&str, Vec<&CoOccurrence<'_>>)> = Vec::new();
    for obs in &observations {
        let Some(&category) = obs.get(reference_tag) else {
            log::debug!("skipping co-occurrence without a {reference_tag} type: {obs:?}");
            continue;
        };
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, members)) => members.push(obs),
            None => groups.push((category, vec![obs])),
        }
    }

    let mut table = TypeAliasTable::new();
    for (category, members) in groups {
        for obs in members {
            for (&dataset, &local_type) in obs.iter() {
                let Some(prev) = table.insert(dataset, local_type, category) else {
                    continue;
                };
                if prev != category {
                    log::warn!(
                        "ambiguous type alias {dataset}/{local_type:?}: {prev:?} replaced by {category:?}"
                    );
                    table.record_conflict(AliasConflict {
                        dataset: dataset.to_string(),
                        local_type: local_type.to_string(),
                        previous: prev,
                        chosen: category.to_string(),
                    });
                }
            }
        }
    }
    table
}

/// Per-cluster typed memberships that span more than one dataset, with
/// duplicates removed (first occurrence kept).
fn distinct_co_occurrences<'a>(clusters: &ClusterMap<'a>) -> Vec<CoOccurrence<'a>> {
    let mut seen: Vec<CoOccurrence<'a>> = Vec::new();
    for cluster in clusters.iter() {
        let mut obs = CoOccurrence::new();
        for member in cluster.members.iter().copied() {
            if let Some(local_type) = member.local_type() {
                obs.insert(member.dataset_tag(), local_type);
            }
        }
        if obs.len() > 1 && !seen.contains(&obs) {
            seen.push(obs);
        }
    }
    seen
}
