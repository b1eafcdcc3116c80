use crate::alias::resolve_types_with;
use crate::cluster::cluster_datasets;
use crate::config::LinkageConfig;
use crate::model::{Dataset, LinkageResult, LinkageSummary, RunMeta};

/// Cluster the loaded datasets and resolve their type aliases.
///
/// Datasets configured with `cluster = false` (and any dataset the config
/// does not know) are left out of clustering.
pub fn link<'a>(config: &LinkageConfig, datasets: &'a [Dataset]) -> LinkageResult<'a> {
    let clustered: Vec<&Dataset> = datasets
        .iter()
        .filter(|d| match config.dataset(&d.name) {
            Some(c) => c.cluster,
            None => {
                log::warn!("dataset '{}' is not in the config; not clustered", d.name);
                false
            }
        })
        .collect();

    let reference = config.reference_tag();
    if !clustered.iter().any(|d| d.tag == reference) {
        log::warn!("reference dataset '{}' was not loaded; no aliases can be inferred", config.reference);
    }

    let output = cluster_datasets(&clustered);
    let aliases = resolve_types_with(&output, &reference, &config.overrides);

    let summary = LinkageSummary {
        records: datasets
            .iter()
            .map(|d| (d.tag.clone(), d.records.len()))
            .collect(),
        clusters: output.clusters.len(),
        single_member_clusters: output
            .clusters
            .iter()
            .filter(|c| c.members.len() == 1)
            .count(),
        emergency_services_excluded: output.excluded.len(),
        aliases: aliases.len(),
        alias_conflicts: aliases.conflicts().len(),
    };

    log::info!(
        "{} clusters from {} datasets ({} fire/police records excluded), {} type aliases",
        summary.clusters,
        clustered.len(),
        summary.emergency_services_excluded,
        summary.aliases
    );

    LinkageResult {
        meta: RunMeta {
            config_name: config.name.clone(),
            reference,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        clusters: output.clusters,
        aliases,
    }
}
