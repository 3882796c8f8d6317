//! Crate-level tests for gogrep-syntax.

mod unit;
