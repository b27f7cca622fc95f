use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Phone,
    Laptop,
    Tablet,
    Monitor,
    Pc,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Phone,
        Category::Laptop,
        Category::Tablet,
        Category::Monitor,
        Category::Pc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Laptop => "laptop",
            Self::Tablet => "tablet",
            Self::Monitor => "monitor",
            Self::Pc => "pc",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phone" => Ok(Self::Phone),
            "laptop" => Ok(Self::Laptop),
            "tablet" => Ok(Self::Tablet),
            "monitor" => Ok(Self::Monitor),
            "pc" => Ok(Self::Pc),
            other => Err(format!(
                "unknown category \"{other}\" (expected phone, laptop, tablet, monitor or pc)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Specification values
// ---------------------------------------------------------------------------

/// A specification value: one text, or an ordered list of texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Scalar(String),
    Multi(Vec<String>),
}

impl SpecValue {
    /// The value as one string; list items are joined with a space.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Scalar(s) => Cow::Borrowed(s),
            Self::Multi(items) => Cow::Owned(items.join(" ")),
        }
    }

    /// Items in order. A scalar is a single item.
    pub fn items(&self) -> &[String] {
        match self {
            Self::Scalar(s) => std::slice::from_ref(s),
            Self::Multi(items) => items,
        }
    }
}

impl From<&str> for SpecValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

/// Label → value, in source order.
pub type SpecMap = IndexMap<String, SpecValue>;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub color: String,
    pub price: u64,
}

pub const UNKNOWN_BRAND: &str = "unknown";

fn unknown_brand() -> String {
    UNKNOWN_BRAND.to_string()
}

/// One listing as captured by a single source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProductRecord {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub url: String,
    #[serde(default = "unknown_brand")]
    pub brand: String,
    #[serde(default)]
    pub specifications: SpecMap,
    #[serde(default)]
    pub prices: Vec<PriceEntry>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub needs: Option<Vec<String>>,
    #[serde(default)]
    pub image_links: Option<Vec<String>>,
    pub category: Category,
}

impl RawProductRecord {
    /// A bare record with only name, url and category set.
    pub fn new(name: &str, url: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            url: url.to_string(),
            brand: unknown_brand(),
            specifications: SpecMap::new(),
            prices: Vec::new(),
            features: None,
            needs: None,
            image_links: None,
            category,
        }
    }
}

/// Pre-loaded records grouped by source id. Record order is significant.
pub struct LinkInput {
    pub records: HashMap<String, Vec<RawProductRecord>>,
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "HDD")]
    Hdd,
}

/// Structured key used by the attribute-fallback match pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeProfile {
    pub model: String,
    pub ram_gb: Option<u32>,
    pub storage_gb: Option<u32>,
    pub storage_type: Option<StorageType>,
}

/// A record after name normalization, cleaning, brand resolution and
/// extraction. `record.name` holds the comparable name, `record.brand`
/// the canonical brand.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: RawProductRecord,
    pub profile: AttributeProfile,
}

impl EnrichedRecord {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn brand(&self) -> &str {
        &self.record.brand
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPass {
    ExactName,
    Attributes,
}

impl std::fmt::Display for MatchPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactName => write!(f, "exact_name"),
            Self::Attributes => write!(f, "attributes"),
        }
    }
}

/// Index of the selected secondary record and the pass that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateMatch {
    pub index: usize,
    pub pass: MatchPass,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One canonical record per primary-source record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedProduct {
    pub name: String,
    pub display_name: String,
    pub category: Category,
    pub brand: String,
    pub urls: IndexMap<String, String>,
    pub prices: IndexMap<String, Vec<PriceEntry>>,
    pub specifications: SpecMap,
    pub needs: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub image_links: Option<Vec<String>>,
}

/// A secondary record no primary record claimed. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedRecord {
    pub source: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceMatchStats {
    pub records: usize,
    pub exact_name: usize,
    pub attributes: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub primary_records: usize,
    pub merged: usize,
    pub sources: IndexMap<String, SourceMatchStats>,
    pub rejected_attributes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResult {
    pub category: Category,
    pub products: Vec<MergedProduct>,
    pub summary: CategorySummary,
    pub unmatched: Vec<UnmatchedRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkSummary {
    pub categories: usize,
    pub products: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub rejected_attributes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkMeta {
    pub config_name: String,
    pub primary: String,
    pub secondaries: Vec<String>,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkResult {
    pub meta: LinkMeta,
    pub summary: LinkSummary,
    pub categories: Vec<CategoryResult>,
}
