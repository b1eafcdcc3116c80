use std::path::PathBuf;

use authmap_linkage::config::LinkageConfig;
use authmap_linkage::engine::link;
use authmap_linkage::export::cross_reference_string;
use authmap_linkage::load::load_all;
use authmap_linkage::model::{Dataset, TRAILING_KEY};
use authmap_linkage::normalize::normalize;
use authmap_linkage::report::render_html;
use authmap_linkage::LinkageError;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_config() -> LinkageConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("authmap.toml")).unwrap();
    LinkageConfig::from_toml(&toml).unwrap()
}

fn fixture_datasets(config: &LinkageConfig) -> Vec<Dataset> {
    load_all(config, &fixtures_dir()).unwrap()
}

// -------------------------------------------------------------------------
// Loading
// -------------------------------------------------------------------------

#[test]
fn loads_every_dataset_in_config_order() {
    let config = fixture_config();
    let datasets = fixture_datasets(&config);

    let tags: Vec<_> = datasets.iter().map(|d| d.tag.as_str()).collect();
    assert_eq!(
        tags,
        vec!["localauthority", "localdirectgov", "legislation", "opendatacommunities", "osopennames"]
    );

    // Blank SNAC / ONS code rows are dropped on load.
    assert_eq!(datasets[1].records.len(), 9);
    assert_eq!(datasets[3].records.len(), 5);
}

#[test]
fn missing_descriptor_field_stops_the_load() {
    let toml = std::fs::read_to_string(fixtures_dir().join("authmap.toml"))
        .unwrap()
        .replace("id = \"ons-code\"", "id = \"ons_code_2011\"");
    let config = LinkageConfig::from_toml(&toml).unwrap();
    let err = load_all(&config, &fixtures_dir()).unwrap_err();
    match err {
        LinkageError::MissingDescriptorField { dataset, field } => {
            assert_eq!(dataset, "opendatacommunities");
            assert_eq!(field, "ons_code_2011");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// -------------------------------------------------------------------------
// Clustering
// -------------------------------------------------------------------------

#[test]
fn clusters_span_datasets() {
    let config = fixture_config();
    let datasets = fixture_datasets(&config);
    let result = link(&config, &datasets);

    let keys: Vec<_> = result.clusters.keys().collect();
    assert_eq!(
        keys,
        vec![
            "",
            "aberdeen city",
            "adur",
            "barnsley",
            "bath and north east somerset",
            "city of london",
            "kent",
            "rhondda cynon taf",
            "wokingham",
        ]
    );

    let adur = result.clusters.get("adur").unwrap();
    assert_eq!(
        adur.dataset_tags(),
        vec!["localauthority", "localdirectgov", "legislation", "opendatacommunities"]
    );

    let aberdeen = result.clusters.get("aberdeen city").unwrap();
    let ids: Vec<_> = aberdeen.members.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["ABD", "00QA", "S12000033"]);

    // Only the reference dataset and opendatacommunities know the City.
    assert_eq!(result.clusters.get("city of london").unwrap().members.len(), 2);
}

#[test]
fn every_member_normalizes_to_its_cluster_key() {
    let config = fixture_config();
    let datasets = fixture_datasets(&config);
    let result = link(&config, &datasets);

    for cluster in result.clusters.iter() {
        for member in &cluster.members {
            assert_eq!(normalize(member.name()), cluster.canonical_key);
        }
    }
}

#[test]
fn emergency_services_and_gazetteer_stay_out() {
    let config = fixture_config();
    let datasets = fixture_datasets(&config);
    let result = link(&config, &datasets);

    assert_eq!(result.summary.emergency_services_excluded, 1);
    for cluster in result.clusters.iter() {
        for member in &cluster.members {
            assert_ne!(member.dataset_tag(), "osopennames");
            assert!(!member.name().contains("Police"));
        }
    }
}

// -------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------

#[test]
fn aliases_inferred_from_reference() {
    let config = fixture_config();
    let datasets = fixture_datasets(&config);
    let result = link(&config, &datasets);
    let aliases = &result.aliases;

    assert_eq!(aliases.get("localdirectgov", "District"), Some("district"));
    assert_eq!(aliases.get("localdirectgov", "Metropolitan"), Some("metropolitan-district"));
    assert_eq!(aliases.get("localdirectgov", "County"), Some("two-tier-county"));
    assert_eq!(aliases.get("legislation", "County"), Some("two-tier-county"));
    assert_eq!(aliases.get("legislation", "Metropolitan District"), Some("metropolitan-district"));
    assert_eq!(aliases.get("localdirectgov", "Unknown"), None);
    assert_eq!(aliases.dataset("opendatacommunities"), None);
    assert_eq!(aliases.len(), 12);
}

#[test]
fn conflicts_resolve_last_write_and_overrides_win() {
    let config = fixture_config();
    let datasets = fixture_datasets(&config);
    let result = link(&config, &datasets);
    let aliases = &result.aliases;

    // Aberdeen (council-area) is seen before Bath (unitary-authority).
    assert_eq!(aliases.get("localdirectgov", "Unitary"), Some("unitary-authority"));
    // Wokingham would map it to unitary-authority; the override restores it.
    assert_eq!(aliases.get("legislation", "Local Government District"), Some("district"));
    assert_eq!(aliases.get("localauthority", "district"), Some("district"));

    let conflicted: Vec<_> = aliases
        .conflicts()
        .iter()
        .map(|c| (c.dataset.as_str(), c.local_type.as_str()))
        .collect();
    assert_eq!(
        conflicted,
        vec![("localdirectgov", "Unitary"), ("legislation", "Local Government District")]
    );
    assert_eq!(result.summary.alias_conflicts, 2);
}

// -------------------------------------------------------------------------
// Outputs
// -------------------------------------------------------------------------

#[test]
fn cross_reference_export() {
    let config = fixture_config();
    let datasets = fixture_datasets(&config);
    let result = link(&config, &datasets);
    let tsv = cross_reference_string(&config, &result).unwrap();
    let lines: Vec<_> = tsv.lines().collect();

    assert_eq!(
        lines[0],
        "local-authority\tlocal-authority-name\tlocal-directgov\tlocal-directgov-name\t\
         legislation\tlegislation-name\topendatacommunities\topendatacommunities-name"
    );
    // Trailing blank-name cluster is not exported.
    assert_eq!(lines.len(), 1 + result.clusters.len() - 1);
    assert_eq!(
        lines[1],
        "ABD\tAberdeen City\t00QA\tAberdeen City Council\t\t\tS12000033\tAberdeen Cuty Council"
    );
    assert_eq!(
        lines[2],
        "ADU\tAdur\t45UB\tAdur District Council\tadur\tAdur\tE07000223\tAdur"
    );
}

#[test]
fn html_report_layout() {
    let config = fixture_config();
    let datasets = fixture_datasets(&config);
    let result = link(&config, &datasets);
    let html = render_html(&config, &result);

    assert!(html.starts_with("<!DOCTYPE html>\n<html>"));
    assert!(html.contains("<th style=\"background: lightgrey;\">localdirectgov</th>"));
    assert!(!html.contains("osopennames"));

    // Vocabulary row lists each dataset's labels with their category class.
    assert!(html.contains("<li class=\"two-tier-county\">County</li>"));

    // Values: id | name | type, coloured by resolved category.
    assert!(html.contains(
        "<li class=\"metropolitan-district\">00CC | Barnsley Metropolitan Borough Council | Metropolitan</li>"
    ));
    // Untyped datasets render as unknown.
    assert!(html.contains("<li class=\"unknown\">E09000001 | City of London</li>"));
    // Legislation values link out.
    assert!(html.contains(
        "<a href=\"http://www.legislation.gov.uk/ukpga/1972/70\" rel=\"external\">kent | Kent | County</a>"
    ));

    // Blank-name row is last.
    let wokingham = html.find("<td><b>wokingham</b></td>").unwrap();
    let trailing = html.find("<td><b></b></td>").unwrap();
    assert!(trailing > wokingham);
    assert!(result.clusters.get(TRAILING_KEY).is_some());
}

#[test]
fn empty_sources_produce_empty_outputs() {
    let config = fixture_config();
    let result = link(&config, &[]);
    assert!(result.clusters.is_empty());
    assert!(result.aliases.is_empty());

    let tsv = cross_reference_string(&config, &result).unwrap();
    assert_eq!(tsv.lines().count(), 1);
}
