//! Filesystem rule loader for remote rule caches.
//!
//! Walks a directory tree for JSON and YAML rule files. A file holds either
//! a bare list of rules or an object with a `rules` list. Per-file outcomes
//! are reported so one broken file never hides the rest.

mod core;
mod error;


pub use self::core::{parse_rules, LoadReport, RuleFileFormat, RuleLoader};
pub use self::error::{LoadError, LoadResult, LoadStatus, Result};
