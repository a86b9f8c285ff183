//! Build log output
//!
//! Buildpacks run non-interactively, so output is plain lines with
//! `console` styling (colors drop out automatically when not a TTY).

mod output;

pub use output::{hint, step_error, step_info, step_ok, step_warn, title};
