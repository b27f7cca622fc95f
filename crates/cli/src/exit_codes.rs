//! CLI Exit Code Registry
//!
//! Single source of truth for `catalink` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success (unmatched secondary records are not a failure)   |
//! | 2    | Usage error (bad arguments, clap parse failure)           |
//! | 60   | Invalid config (TOML syntax, unknown source, bad values)  |
//! | 61   | Runtime error (unreadable CSV, missing column, write fail)|
//!
//! New codes go in the 60-69 block; update the table above.

/// Success.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error: bad arguments, unknown category.
pub const EXIT_USAGE: u8 = 2;

/// Config failed to parse or validate.
pub const EXIT_CONFIG: u8 = 60;

/// Input or output failed while running.
pub const EXIT_RUNTIME: u8 = 61;
