use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::{SpecMap, SpecValue};

static BREAK_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br[^>]*>?").expect("break tag pattern compiles"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace compiles"));

/// NFKC, trim, newlines to ", ", one pass of double-space folding.
pub fn clean_text(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    normalized.trim().replace('\n', ", ").replace("  ", " ")
}

fn clean_value(value: &SpecValue) -> SpecValue {
    match value {
        SpecValue::Scalar(s) => SpecValue::Scalar(clean_text(s)),
        SpecValue::Multi(items) => SpecValue::Multi(items.iter().map(|s| clean_text(s)).collect()),
    }
}

/// Clean every label and value. Labels that collide after cleaning keep
/// the first label's position and the last value.
pub fn clean_specs(specs: &SpecMap) -> SpecMap {
    let mut cleaned = SpecMap::with_capacity(specs.len());
    for (label, value) in specs {
        cleaned.insert(clean_text(label), clean_value(value));
    }
    cleaned
}

pub fn clean_feature(item: &str) -> String {
    let without_breaks = BREAK_TAG_RE.replace_all(item, " ");
    let normalized: String = without_breaks.nfkc().collect();
    WHITESPACE_RE.replace_all(&normalized, " ").trim().to_string()
}

pub fn clean_features(features: &[String]) -> Vec<String> {
    features.iter().map(|f| clean_feature(f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_nfkc_normalized() {
        // Decomposed "ệ" (e + U+0323 + U+0302) composes under NFKC.
        let decomposed = "Hi\u{0065}\u{0323}\u{0302}u na\u{0306}ng";
        assert_eq!(clean_text(decomposed), "Hiệu năng");
        // Full-width digits fold to ASCII.
        assert_eq!(clean_text("８ GB"), "8 GB");
    }

    #[test]
    fn text_newlines_and_double_spaces() {
        assert_eq!(clean_text("  Wi-Fi 6\nBluetooth 5.3  "), "Wi-Fi 6, Bluetooth 5.3");
        assert_eq!(clean_text("a  b"), "a b");
    }

    #[test]
    fn colliding_labels_keep_first_position_last_value() {
        let mut specs = SpecMap::new();
        specs.insert("RAM ".into(), "8 GB".into());
        specs.insert("Chip".into(), "A17".into());
        specs.insert("RAM".into(), "12 GB".into());
        let cleaned = clean_specs(&specs);
        let labels: Vec<&str> = cleaned.keys().map(|k| k.as_str()).collect();
        assert_eq!(labels, vec!["RAM", "Chip"]);
        assert_eq!(cleaned["RAM"], SpecValue::from("12 GB"));
    }

    #[test]
    fn multi_values_are_cleaned_itemwise() {
        let mut specs = SpecMap::new();
        specs.insert("Cổng".into(), SpecValue::Multi(vec![" USB-C ".into(), "HDMI\n2.1".into()]));
        let cleaned = clean_specs(&specs);
        assert_eq!(
            cleaned["Cổng"],
            SpecValue::Multi(vec!["USB-C".into(), "HDMI, 2.1".into()])
        );
    }

    #[test]
    fn features_drop_break_tags() {
        assert_eq!(
            clean_feature("Màn hình 6.1 inch<br/>Chip A16 <BR>  Bionic"),
            "Màn hình 6.1 inch Chip A16 Bionic"
        );
    }
}
