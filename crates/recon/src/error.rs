use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad source reference, duplicate category, etc.).
    ConfigValidation(String),
    /// A referenced source does not exist or has no data.
    UnknownSource(String),
    /// Missing required column in input data.
    MissingColumn { source: String, category: String, column: String },
    /// IO error (file read, CSV framing, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownSource(source) => write!(f, "unknown source: {source}"),
            Self::MissingColumn { source, category, column } => {
                write!(f, "source '{source}', category '{category}': missing column '{column}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

/// A recoverable condition inside the engine.
///
/// None of these ever surface as `Err`: the affected field degrades to
/// absent/"unknown" and the condition is logged and counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// A field could not be decoded into the expected shape.
    ParseFailure { field: String, detail: String },
    /// An extracted size fell outside the category's valid set.
    ValidationRejection { attribute: &'static str, value: u64 },
    /// A table or list had no entry for the key; the cascade fell through.
    LookupMiss { table: &'static str, key: String },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseFailure { field, detail } => {
                write!(f, "cannot parse {field}: {detail}")
            }
            Self::ValidationRejection { attribute, value } => {
                write!(f, "{attribute} {value}GB not in valid set, discarded")
            }
            Self::LookupMiss { table, key } => write!(f, "no {table} entry for '{key}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_message_names_everything() {
        let err = ReconError::MissingColumn {
            source: "tgdd".into(),
            category: "phone".into(),
            column: "url".into(),
        };
        assert_eq!(err.to_string(), "source 'tgdd', category 'phone': missing column 'url'");
    }

    #[test]
    fn rejection_message() {
        let d = Degradation::ValidationRejection { attribute: "ram", value: 999 };
        assert_eq!(d.to_string(), "ram 999GB not in valid set, discarded");
    }
}
