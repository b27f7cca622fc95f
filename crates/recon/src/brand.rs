//! Brand canonicalization: a first-hit-wins cascade over the raw brand
//! field, the manufacturer spec, the category allow-list, token rules and
//! key phrases.

use crate::error::Degradation;
use crate::model::{SpecMap, SpecValue, UNKNOWN_BRAND};
use crate::rules::{CategoryRules, MANUFACTURER_LABEL, NO_BRAND_SENTINELS, PHRASE_ALIAS};

/// Lower-case and trim the collector's brand, keeping it only if it is on
/// the category allow-list.
pub fn screen_raw_brand(raw: &str, rules: &CategoryRules) -> String {
    let brand = raw.trim().to_lowercase();
    if rules.brands.contains(&brand.as_str()) {
        brand
    } else {
        UNKNOWN_BRAND.to_string()
    }
}

/// Resolve the canonical brand for one record. `name` is the comparable
/// name.
pub fn resolve_brand(raw_brand: &str, name: &str, specs: &SpecMap, rules: &CategoryRules) -> String {
    let screened = screen_raw_brand(raw_brand, rules);
    if screened != UNKNOWN_BRAND {
        return screened;
    }

    if let Some(brand) = manufacturer_from_specs(specs) {
        return brand;
    }

    let name = name.to_lowercase();
    if let Some(brand) = rules.brands.iter().find(|b| name.contains(**b)) {
        return (*brand).to_string();
    }

    let tokens: Vec<&str> = name.split_whitespace().collect();
    if let Some(brand) = brand_from_rules(&tokens, rules) {
        return brand;
    }

    if !tokens.is_empty() {
        if let Some(brand) = brand_after_phrase(&name, rules) {
            return brand;
        }
    }

    match tokens.first() {
        Some(first) => {
            log::debug!(
                "{}",
                Degradation::LookupMiss { table: "brand", key: name.clone() }
            );
            (*first).to_string()
        }
        None => UNKNOWN_BRAND.to_string(),
    }
}

/// The manufacturer named in the specifications, unless empty or a "no brand" sentinel.
fn manufacturer_from_specs(specs: &SpecMap) -> Option<String> {
    let value = specs
        .iter()
        .find(|(label, _)| label.trim().to_lowercase() == MANUFACTURER_LABEL)
        .map(|(_, value)| value)?;

    let SpecValue::Scalar(text) = value else {
        log::debug!(
            "{}",
            Degradation::ParseFailure {
                field: MANUFACTURER_LABEL.into(),
                detail: "expected a single value".into(),
            }
        );
        return None;
    };

    let brand = text.trim().to_lowercase();
    if brand.is_empty() || NO_BRAND_SENTINELS.contains(&brand.as_str()) {
        None
    } else {
        Some(brand)
    }
}

/// First token through its rule (literal or contextual); otherwise the
/// first token anywhere with a literal rule.
fn brand_from_rules(tokens: &[&str], rules: &CategoryRules) -> Option<String> {
    let first = tokens.first()?;
    if let Some(rule) = rules.brand_rule(first) {
        return Some(rule.apply(tokens));
    }
    tokens
        .iter()
        .find_map(|token| rules.brand_rule(token).and_then(|rule| rule.literal()))
        .map(str::to_string)
}

/// The token after the first configured phrase that occurs in the name.
fn brand_after_phrase(name: &str, rules: &CategoryRules) -> Option<String> {
    rules.key_phrases.iter().find_map(|phrase| {
        let (_, rest) = name.split_once(phrase)?;
        let next = rest.split_whitespace().next()?;
        if next == PHRASE_ALIAS.0 {
            Some(PHRASE_ALIAS.1.to_string())
        } else {
            Some(next.to_string())
        }
    })
}
