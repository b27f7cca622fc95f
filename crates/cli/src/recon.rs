//! `catalink run` / `catalink validate`: config-driven catalog merge.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use catalink_recon::{load_csv_records, Category, LinkConfig, LinkInput, LinkResult, ReconError};

use crate::CliError;

fn recon_err(err: ReconError) -> CliError {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) | ReconError::UnknownSource(_) => {
            CliError::config(err.to_string())
        }
        ReconError::MissingColumn { ref source, .. } => {
            let hint = format!("map the column under [sources.{source}.columns]");
            CliError::runtime(err.to_string()).with_hint(hint)
        }
        ReconError::Io(_) => CliError::runtime(err.to_string()),
    }
}

fn read_config(config_path: &Path) -> Result<LinkConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::runtime(format!("cannot read config {}: {e}", config_path.display()))
    })?;
    LinkConfig::from_toml(&config_str).map_err(recon_err)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let categories: Vec<&str> = config.categories.iter().map(Category::as_str).collect();
    eprintln!(
        "{}: ok ({} sources, primary {}, categories {})",
        config_path.display(),
        config.sources.len(),
        config.primary,
        categories.join(", "),
    );
    Ok(())
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    only: Vec<Category>,
) -> Result<(), CliError> {
    let mut config = read_config(&config_path)?;

    if !only.is_empty() {
        if let Some(missing) = only.iter().find(|c| !config.categories.contains(*c)) {
            let configured: Vec<&str> = config.categories.iter().map(Category::as_str).collect();
            return Err(CliError::usage(format!("category '{missing}' is not in the config"))
                .with_hint(format!("configured categories: {}", configured.join(", "))));
        }
        config.categories.retain(|c| only.contains(c));
    }

    // Files resolve relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let input = load_input(&config, base_dir)?;

    let result = catalink_recon::run(&config, &input).map_err(recon_err)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    let output_path = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = output_path {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&result);
    Ok(())
}

/// Read `<dir>/<category>.csv` for every source and configured category.
/// A missing file is an empty listing, not an error.
fn load_input(config: &LinkConfig, base_dir: &Path) -> Result<LinkInput, CliError> {
    let mut records = HashMap::new();
    for source_id in config.source_order() {
        let Some(source) = config.sources.get(source_id) else {
            continue;
        };
        let mut rows = Vec::new();
        for &category in &config.categories {
            let csv_path = base_dir.join(source.file_for(category));
            if !csv_path.exists() {
                log::warn!("{source_id}/{category}: {} not found, treated as empty", csv_path.display());
                continue;
            }
            let csv_data = std::fs::read_to_string(&csv_path).map_err(|e| {
                CliError::runtime(format!("cannot read {}: {e}", csv_path.display()))
            })?;
            let loaded = load_csv_records(source_id, category, &csv_data, source).map_err(recon_err)?;
            log::info!("{source_id}/{category}: loaded {} records", loaded.len());
            rows.extend(loaded);
        }
        records.insert(source_id.to_string(), rows);
    }
    Ok(LinkInput { records })
}

fn print_summary(result: &LinkResult) {
    for c in &result.categories {
        let sources: Vec<String> = c
            .summary
            .sources
            .iter()
            .map(|(id, s)| {
                format!("{id} {}+{} of {} ({} unmatched)", s.exact_name, s.attributes, s.records, s.unmatched)
            })
            .collect();
        if sources.is_empty() {
            eprintln!("{}: {} products", c.category, c.products.len());
        } else {
            eprintln!("{}: {} products; {}", c.category, c.products.len(), sources.join(", "));
        }
    }

    let s = &result.summary;
    eprintln!(
        "{}: {} products in {} categories, {} matched, {} unmatched, {} discarded attribute values",
        result.meta.config_name, s.products, s.categories, s.matched, s.unmatched, s.rejected_attributes,
    );
}
