//! `catalink-recon`: Cross-retailer product reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded listings per source, returns one
//! merged product per primary-source listing plus match diagnostics. The
//! only IO-facing piece is `load`, which decodes CSV text handed to it.

pub mod brand;
pub mod clean;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod literal;
pub mod load;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod rules;

pub use config::LinkConfig;
pub use engine::{enrich_record, reconcile_category, run};
pub use error::ReconError;
pub use load::load_csv_records;
pub use model::{Category, LinkInput, LinkResult, MergedProduct, RawProductRecord};
