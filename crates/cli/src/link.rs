//! `authmap run | validate | normalize`.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use authmap_linkage::config::LinkageConfig;
use authmap_linkage::export::write_cross_reference;
use authmap_linkage::load::load_all;
use authmap_linkage::normalize::normalize;
use authmap_linkage::report::render_html;
use authmap_linkage::{link, LinkageError};

use crate::exit_codes::{EXIT_ALIAS_CONFLICT, EXIT_INVALID_CONFIG, EXIT_LOAD, EXIT_WRITE};
use crate::CliError;

pub struct RunOptions {
    pub config: PathBuf,
    pub html: Option<PathBuf>,
    pub tsv: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub fail_on_conflict: bool,
}

fn read_config(path: &Path) -> Result<LinkageConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_INVALID_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    LinkageConfig::from_toml(&config_str).map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))
}

/// Directory that dataset and output paths in the config are relative to.
fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

fn load_err(e: LinkageError) -> CliError {
    let hint = match &e {
        LinkageError::MissingDescriptorField { .. } => {
            Some("field names are compared in snake case; check the dataset's [datasets.fields]")
        }
        _ => None,
    };
    let err = CliError::new(EXIT_LOAD, e.to_string());
    match hint {
        Some(h) => err.with_hint(h),
        None => err,
    }
}

fn write_err(path: &Path, e: impl std::fmt::Display) -> CliError {
    CliError::new(EXIT_WRITE, format!("cannot write {}: {e}", path.display()))
}

fn create_file(path: &Path) -> Result<BufWriter<File>, CliError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| write_err(path, e))?;
    }
    File::create(path).map(BufWriter::new).map_err(|e| write_err(path, e))
}

pub fn cmd_run(opts: RunOptions) -> Result<(), CliError> {
    let config = read_config(&opts.config)?;
    let base = base_dir(&opts.config);

    log::info!("loading {} dataset(s) relative to {}", config.datasets.len(), base.display());
    let datasets = load_all(&config, base).map_err(load_err)?;
    let result = link(&config, &datasets);

    // Flags are relative to the working directory, config entries to the config.
    let html_path = opts.html.or_else(|| config.output.html.as_ref().map(|p| base.join(p)));
    let tsv_path = opts.tsv.or_else(|| config.output.tsv.as_ref().map(|p| base.join(p)));
    log::debug!(
        "outputs: html={:?} tsv={:?} json={:?}",
        html_path,
        tsv_path,
        opts.output
    );

    if let Some(ref path) = html_path {
        let html = render_html(&config, &result);
        let mut out = create_file(path)?;
        out.write_all(html.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| write_err(path, e))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = tsv_path {
        let out = create_file(path)?;
        write_cross_reference(&config, &result, out).map_err(|e| write_err(path, e))?;
        eprintln!("wrote {}", path.display());
    }

    if opts.json || opts.output.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::new(EXIT_WRITE, format!("JSON serialization error: {e}")))?;
        if let Some(ref path) = opts.output {
            let mut out = create_file(path)?;
            out.write_all(json_str.as_bytes())
                .and_then(|_| out.flush())
                .map_err(|e| write_err(path, e))?;
            eprintln!("wrote {}", path.display());
        }
        if opts.json {
            println!("{json_str}");
        }
    }

    let s = &result.summary;
    eprintln!(
        "{} clusters ({} single-dataset), {} fire/police records excluded, {} type aliases, {} conflicts",
        s.clusters, s.single_member_clusters, s.emergency_services_excluded, s.aliases, s.alias_conflicts,
    );

    if opts.fail_on_conflict && s.alias_conflicts > 0 {
        let listed: Vec<String> = result
            .aliases
            .conflicts()
            .iter()
            .map(|c| format!("{}/{:?}: {:?} -> {:?}", c.dataset, c.local_type, c.previous, c.chosen))
            .collect();
        return Err(CliError::new(
            EXIT_ALIAS_CONFLICT,
            format!("{} type alias conflict(s): {}", listed.len(), listed.join("; ")),
        )
        .with_hint("add an [[overrides]] entry for each pair once reviewed"));
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let datasets = load_all(&config, base_dir(&config_path)).map_err(load_err)?;
    let records: usize = datasets.iter().map(|d| d.records.len()).sum();
    eprintln!(
        "valid: '{}' with {} dataset(s), {} record(s), reference '{}'",
        config.name,
        datasets.len(),
        records,
        config.reference,
    );
    Ok(())
}

pub fn cmd_normalize(names: Vec<String>) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut emit = |name: &str| -> Result<(), CliError> {
        writeln!(out, "{}\t{}", normalize(name), name).map_err(|e| CliError::new(EXIT_WRITE, e.to_string()))
    };

    if !names.is_empty() {
        for name in &names {
            emit(name)?;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| CliError::args(format!("cannot read stdin: {e}")))?;
        emit(&line)?;
    }
    Ok(())
}
