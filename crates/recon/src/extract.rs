//! Attribute profile extraction: model token, RAM, storage size and type.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Degradation;
use crate::model::{AttributeProfile, SpecMap, StorageType};
use crate::normalize::strip_category_words;
use crate::rules::{series_for, CategoryRules, ExtractionFamily};

static GB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*gb").expect("gb pattern compiles"));
static TB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*tb").expect("tb pattern compiles"));
static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(gb|tb)").expect("size pattern compiles"));

static HARDWARE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(gb|tb)$").expect("hardware token compiles"));
static YEAR_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^20[1-9][0-9]$").expect("year token compiles"));
static MODEL_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9\-/]{1,20}$").expect("model token compiles"));

static SIZE_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\s?(gb|tb)\b").expect("size word compiles"));
static STORAGE_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(ram|rom|ssd|hdd|bộ nhớ trong|dung lượng lưu trữ|lưu trữ)\b")
        .expect("storage words compile")
});
static NON_MODEL_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s+]").expect("model char filter compiles"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace compiles"));

/// Connectivity/OS words that never belong to a phone model.
const PHONE_NOISE: [&str; 9] = [
    "5g", "4g", "wifi", "lte", "dual sim", "nano", "android", "ios", "windows",
];

const PHONE_MODEL_TOKENS: usize = 5;
const FALLBACK_MODEL_TOKENS: usize = 4;

/// Extraction output plus how many sizes were discarded as invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub profile: AttributeProfile,
    pub rejected: usize,
}

/// Build the attribute profile for one record. `name` is the comparable
/// name and `brand` the canonical brand.
pub fn extract_profile(name: &str, brand: &str, specs: &SpecMap, rules: &CategoryRules) -> Extraction {
    let parse: fn(&str) -> Option<u64> = match rules.family {
        ExtractionFamily::Phone => parse_gb,
        ExtractionFamily::Laptop => parse_size,
    };

    let ram_hit = find_labeled(specs, rules.ram_labels, parse);
    let storage_hit = find_labeled(specs, rules.storage_labels, parse);

    let (ram, storage) = fill_from_name(name, ram_hit.value, storage_hit.value, rules.family)
        .unwrap_or((ram_hit.value, storage_hit.value));

    let mut rejected = 0;
    let ram_gb = validate(rules, ram, "ram", |v| rules.is_valid_ram(v), &mut rejected);
    let storage_gb = validate(rules, storage, "storage", |v| rules.is_valid_storage(v), &mut rejected);

    let stripped = strip_category_words(name);
    let model = match rules.family {
        ExtractionFamily::Phone => phone_model(&stripped, brand),
        ExtractionFamily::Laptop => series_model(&stripped, brand),
    };

    let storage_type = if rules.detects_storage_type {
        storage_hit.storage_type
    } else {
        None
    };

    Extraction {
        profile: AttributeProfile { model, ram_gb, storage_gb, storage_type },
        rejected,
    }
}

/// `<n> gb`, first occurrence.
pub fn parse_gb(text: &str) -> Option<u64> {
    let lowered = text.to_lowercase();
    GB_RE.captures(&lowered).and_then(|c| c[1].parse().ok())
}

/// `<n> tb` (×1024) if present anywhere, else `<n> gb`.
pub fn parse_size(text: &str) -> Option<u64> {
    let lowered = text.to_lowercase();
    if let Some(tb) = TB_RE.captures(&lowered).and_then(|c| c[1].parse::<u64>().ok()) {
        return tb.checked_mul(1024);
    }
    GB_RE.captures(&lowered).and_then(|c| c[1].parse().ok())
}

pub fn detect_storage_type(text: &str) -> Option<StorageType> {
    let lowered = text.to_lowercase();
    if lowered.contains("ssd") {
        Some(StorageType::Ssd)
    } else if lowered.contains("hdd") {
        Some(StorageType::Hdd)
    } else {
        None
    }
}

#[derive(Debug, Default)]
struct LabeledHit {
    value: Option<u64>,
    storage_type: Option<StorageType>,
}

/// For each label candidate in priority order, parse the first spec whose
/// label contains it. Stops at the first successful parse. The storage
/// type follows the last value examined.
fn find_labeled(specs: &SpecMap, labels: &[&str], parse: fn(&str) -> Option<u64>) -> LabeledHit {
    let mut hit = LabeledHit::default();
    for candidate in labels {
        let Some((label, value)) = specs
            .iter()
            .find(|(label, _)| label.to_lowercase().contains(candidate))
        else {
            continue;
        };
        let text = value.text();
        hit.storage_type = detect_storage_type(&text);
        match parse(&text) {
            Some(v) => {
                hit.value = Some(v);
                return hit;
            }
            None => log::debug!(
                "{}",
                Degradation::ParseFailure { field: label.clone(), detail: text.into_owned() }
            ),
        }
    }
    hit
}

/// Fill unset RAM/storage from `<n> gb|tb` tokens in the name.
///
/// Two tokens are assigned positionally to whichever is unset (the phone
/// family needs exactly two, the laptop family uses the first two of any
/// more). A single token fills RAM, or storage when RAM is known, but
/// never duplicates the other value.
fn fill_from_name(
    name: &str,
    ram: Option<u64>,
    storage: Option<u64>,
    family: ExtractionFamily,
) -> Option<(Option<u64>, Option<u64>)> {
    if ram.is_some() && storage.is_some() {
        return None;
    }

    let lowered = name.to_lowercase();
    let sizes: Vec<u64> = SIZE_RE
        .captures_iter(&lowered)
        .filter_map(|c| {
            let n: u64 = c[1].parse().ok()?;
            if &c[2] == "tb" {
                n.checked_mul(1024)
            } else {
                Some(n)
            }
        })
        .collect();

    let positional = match family {
        ExtractionFamily::Phone => sizes.len() == 2,
        ExtractionFamily::Laptop => sizes.len() >= 2,
    };

    if positional {
        return Some((ram.or(Some(sizes[0])), storage.or(Some(sizes[1]))));
    }

    if let [only] = sizes.as_slice() {
        let only = *only;
        if ram.is_none() {
            if storage != Some(only) {
                return Some((Some(only), storage));
            }
        } else if storage.is_none() && ram != Some(only) {
            return Some((ram, Some(only)));
        }
    }

    None
}

fn validate(
    rules: &CategoryRules,
    value: Option<u64>,
    attribute: &'static str,
    is_valid: impl Fn(u64) -> bool,
    rejected: &mut usize,
) -> Option<u32> {
    let value = value?;
    if is_valid(value) {
        u32::try_from(value).ok()
    } else {
        log::debug!("{}: {}", rules.category, Degradation::ValidationRejection { attribute, value });
        *rejected += 1;
        None
    }
}

/// Phone model: drop brand, size tokens, storage words and connectivity
/// noise, then keep the first five tokens.
fn phone_model(name: &str, brand: &str) -> String {
    let mut name = name.to_lowercase();
    let brand = brand.trim().to_lowercase();

    if !brand.is_empty() {
        name = strip_brand_word(&name, &brand);
    }

    name = SIZE_WORD_RE.replace_all(&name, "").into_owned();
    name = STORAGE_WORD_RE.replace_all(&name, "").into_owned();
    for word in PHONE_NOISE {
        name = name.replace(word, "");
    }
    name = NON_MODEL_CHAR_RE.replace_all(&name, "").into_owned();
    let name = WHITESPACE_RE.replace_all(name.trim(), " ");

    name.split(' ')
        .filter(|t| !t.is_empty())
        .take(PHONE_MODEL_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove `brand` as a whole word. One compiled pattern per brand, kept for
/// the life of the process.
fn strip_brand_word(name: &str, brand: &str) -> String {
    static BRAND_RES: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(Default::default);

    let mut cache = BRAND_RES.lock().unwrap_or_else(PoisonError::into_inner);
    if !cache.contains_key(brand) {
        match Regex::new(&format!(r"\b{}\b", regex::escape(brand))) {
            Ok(re) => {
                cache.insert(brand.to_string(), re);
            }
            Err(_) => return name.to_string(),
        }
    }
    cache
        .get(brand)
        .map(|re| re.replace_all(name, "").into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Series-aware model: start at the first token carrying one of the
/// brand's series keywords and extend through model-like tokens, skipping
/// years and stopping at hardware tokens. Without a series keyword, the
/// first four tokens minus years.
fn series_model(name: &str, brand: &str) -> String {
    let brand = brand.trim().to_lowercase();
    let mut name = name.to_lowercase().replace("laptop", "");
    if !brand.is_empty() {
        name = name.replace(&brand, "");
    }
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let series = series_for(&brand);

    let start = tokens
        .iter()
        .position(|token| series.iter().any(|s| token.contains(s)));

    if let Some(start) = start {
        let mut model = vec![tokens[start]];
        for token in &tokens[start + 1..] {
            if HARDWARE_TOKEN_RE.is_match(token)
                || token.contains("cpu")
                || token.contains("gpu")
                || token.contains("ram")
            {
                break;
            }
            if YEAR_TOKEN_RE.is_match(token) {
                continue;
            }
            if MODEL_TOKEN_RE.is_match(token) {
                model.push(*token);
            } else {
                break;
            }
        }
        return model.join(" ");
    }

    tokens
        .iter()
        .take(FALLBACK_MODEL_TOKENS)
        .filter(|token| !YEAR_TOKEN_RE.is_match(token))
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, SpecValue};
    use crate::rules::rules_for;

    fn specs(pairs: &[(&str, &str)]) -> SpecMap {
        pairs.iter().map(|(k, v)| (k.to_string(), SpecValue::from(*v))).collect()
    }

    fn profile(name: &str, brand: &str, specs: &SpecMap, cat: Category) -> AttributeProfile {
        extract_profile(name, brand, specs, rules_for(cat)).profile
    }

    #[test]
    fn phone_sizes_from_labeled_specs() {
        let s = specs(&[("Dung lượng RAM", "8 GB"), ("Bộ nhớ trong", "256 GB")]);
        let p = profile("samsung galaxy s23", "samsung", &s, Category::Phone);
        assert_eq!(p.ram_gb, Some(8));
        assert_eq!(p.storage_gb, Some(256));
        assert_eq!(p.storage_type, None);
    }

    #[test]
    fn out_of_set_ram_is_discarded() {
        let s = specs(&[("RAM", "999 GB")]);
        let out = extract_profile("samsung galaxy a15", "samsung", &s, rules_for(Category::Phone));
        assert_eq!(out.profile.ram_gb, None);
        assert_eq!(out.rejected, 1);
    }

    #[test]
    fn label_priority_stops_at_first_hit() {
        // "ram" is tried before "dung lượng ram"; the later label is never read.
        let s = specs(&[("RAM", "6 GB"), ("Dung lượng RAM", "8 GB")]);
        let p = profile("oppo a79", "oppo", &s, Category::Phone);
        assert_eq!(p.ram_gb, Some(6));
    }

    #[test]
    fn unparseable_label_moves_to_next_candidate() {
        let s = specs(&[("RAM", "Đang cập nhật"), ("Bộ nhớ RAM", "16 GB")]);
        let p = profile("asus vivobook 15", "asus", &s, Category::Laptop);
        // "ram" hits "RAM" first and fails; "dung lượng ram" misses;
        // "bộ nhớ ram" lands on the second label.
        assert_eq!(p.ram_gb, Some(16));
    }

    #[test]
    fn phone_sizes_from_name_positionally() {
        let p = profile("xiaomi redmi note 13 8gb 256gb", "xiaomi", &SpecMap::new(), Category::Phone);
        assert_eq!(p.ram_gb, Some(8));
        assert_eq!(p.storage_gb, Some(256));
    }

    #[test]
    fn phone_three_sizes_in_name_are_ignored() {
        let p = profile("oppo a18 4gb 4gb 128gb", "oppo", &SpecMap::new(), Category::Phone);
        assert_eq!(p.ram_gb, None);
        assert_eq!(p.storage_gb, None);
    }

    #[test]
    fn single_name_size_never_duplicates_known_value() {
        let s = specs(&[("Ổ cứng", "512 GB SSD")]);
        let p = profile("laptop acer aspire 7 512gb", "acer", &s, Category::Laptop);
        assert_eq!(p.storage_gb, Some(512));
        assert_eq!(p.ram_gb, None);
    }

    #[test]
    fn single_name_size_fills_storage_when_ram_known() {
        let s = specs(&[("RAM", "8 GB")]);
        let p = profile("laptop hp pavilion 15 512gb", "hp", &s, Category::Laptop);
        assert_eq!(p.ram_gb, Some(8));
        assert_eq!(p.storage_gb, Some(512));
    }

    #[test]
    fn laptop_terabytes_and_storage_type() {
        let s = specs(&[("RAM", "16 GB"), ("Ổ cứng", "1 TB SSD M.2 NVMe")]);
        let p = profile("laptop lenovo legion 5 16irx9", "lenovo", &s, Category::Laptop);
        assert_eq!(p.ram_gb, Some(16));
        assert_eq!(p.storage_gb, Some(1024));
        assert_eq!(p.storage_type, Some(StorageType::Ssd));
        assert_eq!(p.model, "legion 5 16irx9");
    }

    #[test]
    fn laptop_multi_value_storage() {
        let mut s = SpecMap::new();
        s.insert("Ổ cứng".into(), SpecValue::Multi(vec!["HDD".into(), "1 TB".into()]));
        let p = profile("pc asus s500", "asus", &s, Category::Pc);
        assert_eq!(p.storage_gb, Some(1024));
        assert_eq!(p.storage_type, Some(StorageType::Hdd));
    }

    #[test]
    fn tablet_has_no_storage_type() {
        let s = specs(&[("Bộ nhớ trong", "256 GB SSD")]);
        let p = profile("ipad air m2 256gb", "apple", &s, Category::Tablet);
        assert_eq!(p.storage_gb, Some(256));
        assert_eq!(p.storage_type, None);
    }

    #[test]
    fn series_model_stops_at_hardware() {
        let p = profile(
            "laptop dell inspiron 15 3520 i5 1235u 16gb 512gb",
            "dell",
            &SpecMap::new(),
            Category::Laptop,
        );
        assert_eq!(p.model, "inspiron 15 3520 i5 1235u");
        assert_eq!(p.ram_gb, Some(16));
        assert_eq!(p.storage_gb, Some(512));
    }

    #[test]
    fn series_model_skips_years() {
        let p = profile("laptop asus vivobook 15 2023 x1504va", "asus", &SpecMap::new(), Category::Laptop);
        assert_eq!(p.model, "vivobook 15 x1504va");
    }

    #[test]
    fn series_model_stops_at_non_model_token() {
        let p = profile("laptop hp victus omen 16 xám-bạc", "hp", &SpecMap::new(), Category::Laptop);
        assert_eq!(p.model, "omen 16");
    }

    #[test]
    fn model_fallback_takes_four_tokens_minus_years() {
        let p = profile("laptop masstel e140 celeron 2021 4gb", "masstel", &SpecMap::new(), Category::Laptop);
        assert_eq!(p.model, "e140 celeron 4gb");
    }

    #[test]
    fn phone_model_drops_brand_sizes_and_noise() {
        let p = profile(
            "điện thoại samsung galaxy s24 ultra 5g 12gb 256gb",
            "samsung",
            &SpecMap::new(),
            Category::Phone,
        );
        assert_eq!(p.model, "galaxy s24 ultra");
    }

    #[test]
    fn brand_word_is_stripped_on_word_boundaries() {
        assert_eq!(strip_brand_word("samsung galaxy samsung-s24", "samsung"), " galaxy -s24");
        assert_eq!(strip_brand_word("samsungpay galaxy", "samsung"), "samsungpay galaxy");
        // Second call goes through the cached pattern.
        assert_eq!(strip_brand_word("xiaomi 14t", "xiaomi"), " 14t");
        assert_eq!(strip_brand_word("xiaomi 14t", "xiaomi"), " 14t");
        assert_eq!(strip_brand_word("e-dra eg27", "e-dra"), " eg27");
    }

    #[test]
    fn phone_model_keeps_five_tokens() {
        let p = profile("nokia 105 4g pro dual sim đen xanh đỏ", "nokia", &SpecMap::new(), Category::Phone);
        assert_eq!(p.model, "105 pro đen xanh đỏ");
    }

    #[test]
    fn size_parsers() {
        assert_eq!(parse_gb("8 GB LPDDR5"), Some(8));
        assert_eq!(parse_gb("1 TB"), None);
        assert_eq!(parse_size("512 GB + 2 TB"), Some(2048));
        assert_eq!(parse_size("không rõ"), None);
        assert_eq!(detect_storage_type("SSD NVMe"), Some(StorageType::Ssd));
        assert_eq!(detect_storage_type("eMMC"), None);
    }
}
