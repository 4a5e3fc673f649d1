//! Reroute - rewrite and filter file paths with an ordered list of rules.
//!
//! This library provides:
//! - A line-oriented rule grammar and its parser
//! - Normal (trailing-segment), exact and regex rules
//! - A transformer evaluating rules in order, first match wins
//! - TOML configuration pointing at rule text
//!
//! # Example
//!
//! ```
//! use reroute_cli::rules::{RulePath, Transformer};
//!
//! let transformer = Transformer::new(
//!     "tmp -->\n\"(.*)\\.pdf\" -re-> \"pdfs/{g1}.pdf\"",
//! )
//! .unwrap();
//!
//! let result = transformer.transform(&RulePath::from("sheet.pdf")).unwrap();
//! assert_eq!(result, Some(RulePath::from("pdfs/sheet.pdf")));
//!
//! // Paths that no rule keeps are dropped.
//! assert_eq!(transformer.transform(&RulePath::from("a/tmp")).unwrap(), None);
//! ```

pub mod config;
pub mod error;
pub mod rules;

pub use error::{RerouteError, Result, RuleParseError};
pub use rules::{RulePath, Transformer};
