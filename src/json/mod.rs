//! Purpose: JSON decoding boundary shared by the CLI and library callers.
//! Exports: `try_parse_json`, `parse_json5`, `parse_json5_as`, `ParseFailure`, `ParseFailureCategory`.
//! Role: Single seam for the permissive parser so callsites avoid ad hoc decode logic.
//! Invariants: `try_parse_json` never surfaces an error; absent, null, and malformed input all map to `None`.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

mod parse;

pub use parse::{
    ParseFailure, ParseFailureCategory, parse_json5, parse_json5_as, try_parse_json,
};
