//! Path rewriting rules.
//!
//! This module handles:
//! - Lexing and parsing arrow rule lines (`left -NAME-> right`)
//! - Matching paths by trailing segments, exactly, or by regex
//! - Evaluating an ordered rule list against a path

pub mod cursor;
pub mod matcher;
pub mod parser;
pub mod path;
pub mod template;
pub mod transformer;

pub use cursor::Cursor;
pub use matcher::{ExactRule, NormalRule, ReRule, RegexTarget, Rule, RuleOutcome, RuleTarget};
pub use parser::{
	ArrowKind, Token, parse_arrow, parse_rule, parse_string, parse_string_literal,
	parse_until_space_or_eol,
};
pub use path::RulePath;
pub use transformer::Transformer;
