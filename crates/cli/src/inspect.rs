//! `catalink inspect`: one title through the enrichment pipeline.

use catalink_recon::model::{SpecMap, SpecValue};
use catalink_recon::{enrich_record, Category, RawProductRecord};
use serde_json::json;

use crate::CliError;

fn parse_spec(pair: &str) -> Result<(String, SpecValue), CliError> {
    match pair.split_once('=') {
        Some((label, value)) if !label.trim().is_empty() => {
            Ok((label.trim().to_string(), SpecValue::from(value.trim())))
        }
        _ => Err(CliError::usage(format!("invalid --spec '{pair}'"))
            .with_hint("use LABEL=VALUE, e.g. --spec \"Dung lượng RAM=8 GB\"")),
    }
}

pub fn cmd_inspect(
    title: String,
    category: Category,
    brand: Option<String>,
    specs: Vec<String>,
) -> Result<(), CliError> {
    let specifications = specs.iter().map(|p| parse_spec(p)).collect::<Result<SpecMap, _>>()?;

    let mut raw = RawProductRecord::new(&title, "", category);
    if let Some(brand) = brand {
        raw.brand = brand;
    }
    raw.specifications = specifications;

    let (enriched, rejected) = enrich_record(&raw);

    let out = json!({
        "title": title,
        "category": category,
        "comparable_name": enriched.record.name,
        "display_name": enriched.record.display_name,
        "brand": enriched.record.brand,
        "profile": enriched.profile,
        "rejected_attributes": rejected,
    });
    let text = serde_json::to_string_pretty(&out)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_pairs_split_on_first_equals() {
        let (label, value) = parse_spec("Chip = A=17 Pro").unwrap();
        assert_eq!(label, "Chip");
        assert_eq!(value, SpecValue::from("A=17 Pro"));
    }

    #[test]
    fn spec_without_label_is_usage_error() {
        let err = parse_spec("=8 GB").unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
        assert!(err.hint.is_some());
        assert!(parse_spec("RAM").is_err());
    }
}
