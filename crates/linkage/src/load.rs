//! Delimited source text → [`Dataset`].

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::classify::{FieldAdapter, RecordAccessor};
use crate::config::{DatasetConfig, LinkageConfig};
use crate::error::LinkageError;
use crate::model::{Dataset, Record};

/// Read a source file as text. Bytes that are not valid UTF-8 are decoded as
/// Windows-1252, which is what spreadsheet exports of these files use.
pub fn read_source(path: &Path) -> Result<String, LinkageError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| LinkageError::Io(format!("cannot open {}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| LinkageError::Io(format!("cannot read {}: {e}", path.display())))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("{}: not UTF-8, decoded as Windows-1252", path.display());
            Ok(decoded.into_owned())
        }
    }
}

/// Parse one dataset's source text, resolving its descriptor once against
/// the header row and dropping rows that fail `require`.
pub fn load_dataset(config: &DatasetConfig, text: &str) -> Result<Dataset, LinkageError> {
    let source_err = |e: csv::Error| LinkageError::Source {
        dataset: config.name.clone(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte()?)
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(source_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let adapter = FieldAdapter::resolve(config, &headers)?;
    log::debug!(
        "{}: resolved descriptor against {} column(s)",
        adapter.dataset(),
        adapter.headers().len()
    );
    let required: Vec<usize> = config
        .require
        .iter()
        .filter_map(|f| adapter.index_of(f))
        .collect();
    let accessor: Arc<dyn RecordAccessor> = Arc::new(adapter);

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        let row = row.map_err(source_err)?;
        let fields: Vec<String> = row.iter().map(str::to_string).collect();

        let blank = required
            .iter()
            .any(|&i| fields.get(i).map_or(true, |v| v.trim().is_empty()));
        if blank {
            dropped += 1;
            continue;
        }
        records.push(Record::new(fields, Arc::clone(&accessor)));
    }

    if dropped > 0 {
        log::info!(
            "{}: dropped {dropped} row(s) with blank {}",
            config.name,
            config.require.join("/")
        );
    }
    if let Some(first) = records.first() {
        log::debug!(
            "{} [{}] {} records, first: {} | {} (type {:?})",
            config.name,
            accessor.dataset_tag(),
            records.len(),
            first.id(),
            first.name(),
            first.local_type()
        );
    }

    Ok(Dataset {
        name: config.name.clone(),
        tag: config.tag(),
        records,
    })
}

/// Load every configured dataset, resolving `file` paths against `base_dir`.
/// Stops at the first failure; no dataset is returned partially loaded.
pub fn load_all(config: &LinkageConfig, base_dir: &Path) -> Result<Vec<Dataset>, LinkageError> {
    config
        .datasets
        .iter()
        .map(|ds| {
            let path = base_dir.join(&ds.file);
            let text = read_source(&path)?;
            load_dataset(ds, &text)
        })
        .collect()
}
