//! CSV → `RawProductRecord` for one source and category.

use std::collections::HashSet;

use crate::config::SourceConfig;
use crate::error::{Degradation, ReconError};
use crate::literal::{parse_literal, to_prices, to_spec_map, to_string_list, Literal};
use crate::model::{Category, RawProductRecord, UNKNOWN_BRAND};

/// Load one `<category>.csv` of `source`.
///
/// `name` and `url` columns are required. Excluded rows and rows repeating
/// an earlier URL are skipped. Cells that fail to decode leave the field
/// empty.
pub fn load_csv_records(
    source: &str,
    category: Category,
    csv_data: &str,
    source_config: &SourceConfig,
) -> Result<Vec<RawProductRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let col = &source_config.columns;
    let find = |name: &str| headers.iter().position(|h| h == name);
    let require = |name: &str| -> Result<usize, ReconError> {
        find(name).ok_or_else(|| ReconError::MissingColumn {
            source: source.into(),
            category: category.to_string(),
            column: name.into(),
        })
    };

    let name_idx = require(&col.name)?;
    let url_idx = require(&col.url)?;
    let brand_idx = find(&col.brand);
    let specs_idx = find(&col.specifications);
    let prices_idx = find(&col.prices);
    let features_idx = find(&col.features);
    let needs_idx = find(&col.needs);
    let images_idx = find(&col.image_links);

    let mut seen_urls = HashSet::new();
    let mut records = Vec::new();

    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| ReconError::Io(e.to_string()))?;
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(str::trim).filter(|s| !s.is_empty());

        let name = cell(Some(name_idx)).unwrap_or("");
        let url = cell(Some(url_idx)).unwrap_or("");

        if source_config.excludes(category, name) {
            log::debug!("{source}/{category}: excluded '{name}'");
            continue;
        }
        if !url.is_empty() && !seen_urls.insert(url.to_string()) {
            log::warn!("{source}/{category}: row {} repeats url {url}, dropped", line + 2);
            continue;
        }

        let mut record = RawProductRecord::new(name, url, category);
        record.brand = cell(brand_idx).unwrap_or(UNKNOWN_BRAND).to_string();

        if let Some(lit) = decode(source, "specifications", cell(specs_idx)) {
            record.specifications = to_spec_map(&lit).unwrap_or_else(|| {
                shape_mismatch(source, "specifications", "a dict");
                Default::default()
            });
        }
        if let Some(lit) = decode(source, "prices", cell(prices_idx)) {
            record.prices = to_prices(&lit).unwrap_or_else(|| {
                shape_mismatch(source, "prices", "a list");
                Vec::new()
            });
        }
        record.features = decode(source, "features", cell(features_idx)).and_then(|l| to_string_list(&l));
        record.needs = decode(source, "needs", cell(needs_idx)).and_then(|l| to_string_list(&l));
        record.image_links =
            decode(source, "image_links", cell(images_idx)).and_then(|l| to_string_list(&l));

        records.push(record);
    }

    log::debug!("{source}/{category}: loaded {} records", records.len());
    Ok(records)
}

fn decode(source: &str, field: &str, text: Option<&str>) -> Option<Literal> {
    let text = text?;
    match parse_literal(text) {
        Ok(lit) => Some(lit),
        Err(detail) => {
            log::debug!(
                "{source}: {}",
                Degradation::ParseFailure { field: field.to_string(), detail }
            );
            None
        }
    }
}

fn shape_mismatch(source: &str, field: &str, expected: &str) {
    log::debug!(
        "{source}: {}",
        Degradation::ParseFailure { field: field.to_string(), detail: format!("expected {expected}") }
    );
}
