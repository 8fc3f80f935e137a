//! CLI library components for the CCI tagger.

pub mod logging;
