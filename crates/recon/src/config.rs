use std::collections::HashSet;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ReconError;
use crate::model::Category;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LinkConfig {
    pub name: String,
    /// Source whose records define the output set.
    pub primary: String,
    /// Secondary sources, in merge order.
    #[serde(default)]
    pub secondaries: Vec<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    pub sources: IndexMap<String, SourceConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_categories() -> Vec<Category> {
    Category::ALL.to_vec()
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Directory holding `<category>.csv`, relative to the config file.
    pub dir: String,
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub exclude: Vec<ExcludeRule>,
}

impl SourceConfig {
    pub fn file_for(&self, category: Category) -> PathBuf {
        PathBuf::from(&self.dir).join(format!("{category}.csv"))
    }

    /// True if a row with this raw name is excluded for `category`.
    pub fn excludes(&self, category: Category, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.exclude
            .iter()
            .filter(|rule| rule.category == category)
            .any(|rule| name.starts_with(&rule.name_prefix.trim().to_lowercase()))
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// CSV header for each record field. Every field defaults to its own name.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub name: String,
    pub url: String,
    pub brand: String,
    pub specifications: String,
    pub prices: String,
    pub features: String,
    pub needs: String,
    pub image_links: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            name: "name".into(),
            url: "url".into(),
            brand: "brand".into(),
            specifications: "specifications".into(),
            prices: "prices".into(),
            features: "features".into(),
            needs: "needs".into(),
            image_links: "image_links".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Exclude + Output
// ---------------------------------------------------------------------------

/// Drops rows of one category whose name starts with a prefix
/// (case-insensitive).
#[derive(Debug, Clone, Deserialize)]
pub struct ExcludeRule {
    pub category: Category,
    pub name_prefix: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl LinkConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: LinkConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.sources.contains_key(&self.primary) {
            return Err(ReconError::UnknownSource(format!(
                "primary source '{}' is not configured",
                self.primary
            )));
        }

        let mut seen = HashSet::new();
        for secondary in &self.secondaries {
            if !self.sources.contains_key(secondary) {
                return Err(ReconError::UnknownSource(format!(
                    "secondary source '{secondary}' is not configured"
                )));
            }
            if *secondary == self.primary {
                return Err(ReconError::ConfigValidation(format!(
                    "source '{secondary}' is both primary and secondary"
                )));
            }
            if !seen.insert(secondary.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "secondary source '{secondary}' listed twice"
                )));
            }
        }

        if self.categories.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one category is required".into(),
            ));
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(*category) {
                return Err(ReconError::ConfigValidation(format!(
                    "category '{category}' listed twice"
                )));
            }
        }

        for (source_id, source) in &self.sources {
            if source.exclude.iter().any(|rule| rule.name_prefix.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "source '{source_id}': exclude name_prefix must not be empty"
                )));
            }
        }

        Ok(())
    }

    /// Primary first, then secondaries in merge order.
    pub fn source_order(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.secondaries.iter().map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
