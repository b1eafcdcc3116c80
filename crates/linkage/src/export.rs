//! Flat tab-separated cross-reference: one row per authority, an id column
//! and a name column per reported dataset.

use std::io::Write;

use crate::config::LinkageConfig;
use crate::error::LinkageError;
use crate::model::{AuthorityCluster, LinkageResult, TRAILING_KEY};

/// Joins multiple values from one dataset within a cell.
pub const MULTI_VALUE_SEPARATOR: &str = ";";

/// Write the cross-reference table. The trailing "unmatched/other" cluster
/// is not exported.
///
/// Values are written unquoted, so an id or name holding a tab or line break
/// is rejected with [`LinkageError::Source`].
pub fn write_cross_reference<W: Write>(
    config: &LinkageConfig,
    result: &LinkageResult<'_>,
    writer: W,
) -> Result<(), LinkageError> {
    let io_err = |e: csv::Error| LinkageError::Io(e.to_string());

    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let columns: Vec<(&str, String)> = config.reported().map(|d| (d.name.as_str(), d.tag())).collect();

    let header: Vec<String> = columns
        .iter()
        .flat_map(|(name, _)| [name.to_string(), format!("{name}-name")])
        .collect();
    out.write_record(&header).map_err(io_err)?;

    let mut rows = 0usize;
    for cluster in result.clusters.iter() {
        if cluster.canonical_key == TRAILING_KEY {
            continue;
        }
        let mut row = Vec::with_capacity(header.len());
        for (name, tag) in &columns {
            let (ids, names) = id_and_name_cells(cluster, name, tag)?;
            row.push(ids);
            row.push(names);
        }
        out.write_record(&row).map_err(io_err)?;
        rows += 1;
    }

    out.flush()?;
    log::debug!("cross-reference: {rows} rows, {} columns", header.len());
    Ok(())
}

/// Render the cross-reference into a string.
pub fn cross_reference_string(
    config: &LinkageConfig,
    result: &LinkageResult<'_>,
) -> Result<String, LinkageError> {
    let mut buf = Vec::new();
    write_cross_reference(config, result, &mut buf)?;
    String::from_utf8(buf).map_err(|e| LinkageError::Io(e.to_string()))
}

/// `(ids, names)` for one dataset's members; a name equal to its id is
/// written as an empty entry.
fn id_and_name_cells(
    cluster: &AuthorityCluster<'_>,
    dataset: &str,
    tag: &str,
) -> Result<(String, String), LinkageError> {
    let mut ids = Vec::new();
    let mut names = Vec::new();
    for r in cluster.members_of(tag) {
        if [r.id(), r.name()].iter().any(|v| v.contains(['\t', '\n', '\r'])) {
            return Err(LinkageError::Source {
                dataset: dataset.to_string(),
                message: format!(
                    "record '{}' has a tab or line break in its id or name",
                    r.id().escape_debug()
                ),
            });
        }
        ids.push(r.id());
        names.push(if r.id() == r.name() { "" } else { r.name() });
    }
    Ok((ids.join(MULTI_VALUE_SEPARATOR), names.join(MULTI_VALUE_SEPARATOR)))
}
