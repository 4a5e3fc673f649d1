use crate::error::Result;
use crate::rules::parser::QUOTATION_MARKS;
use crate::rules::path::RulePath;
use crate::rules::template::{bind_captures, render_template};
use regex::Regex;
use std::fmt;

/// Right side of a normal or exact rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTarget {
	/// `!` or a missing right side.
	Drop,
	Replace(RulePath),
}

/// Right side of a regex rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexTarget {
	Drop,
	/// Template referencing `gN`, `iN` and `fN` capture bindings.
	Template(String),
}

/// What a single rule decided about a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
	/// The rule does not apply; try the next one.
	NoMatch,
	/// The rule matched and the path is filtered out.
	Drop,
	/// The rule matched and produced a new path.
	Replace(RulePath),
}

impl RuleOutcome {
	fn from_target(target: &RuleTarget, replacement: impl FnOnce(&RulePath) -> RulePath) -> Self {
		match target {
			RuleTarget::Drop => RuleOutcome::Drop,
			RuleTarget::Replace(right) => RuleOutcome::Replace(replacement(right)),
		}
	}
}

/// Matches the trailing segments of a path and re-roots them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalRule {
	left: RulePath,
	right: RuleTarget,
}

impl NormalRule {
	pub fn new(left: RulePath, right: RuleTarget) -> Self {
		NormalRule { left, right }
	}

	pub fn left(&self) -> &RulePath {
		&self.left
	}

	pub fn target(&self) -> &RuleTarget {
		&self.right
	}

	/// If `path` ends with the left side, return the leading segments that
	/// were not part of the match.
	fn match_suffix(&self, path: &RulePath) -> Option<RulePath> {
		if self.left.len() > path.len() || !path.ends_with(&self.left) {
			return None;
		}

		let rest = &path.segments()[..path.len() - self.left.len()];
		Some(RulePath::from_segments(rest.iter().cloned()))
	}

	pub fn apply(&self, path: &RulePath) -> RuleOutcome {
		match self.match_suffix(path) {
			Some(rest) => RuleOutcome::from_target(&self.right, |right| right.join(&rest)),
			None => RuleOutcome::NoMatch,
		}
	}
}

/// Matches a whole path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactRule {
	left: RulePath,
	right: RuleTarget,
}

impl ExactRule {
	pub fn new(left: RulePath, right: RuleTarget) -> Self {
		ExactRule { left, right }
	}

	pub fn left(&self) -> &RulePath {
		&self.left
	}

	pub fn target(&self) -> &RuleTarget {
		&self.right
	}

	pub fn apply(&self, path: &RulePath) -> RuleOutcome {
		if *path == self.left {
			RuleOutcome::from_target(&self.right, RulePath::clone)
		} else {
			RuleOutcome::NoMatch
		}
	}
}

/// Matches the rendered path against a regular expression.
#[derive(Debug, Clone)]
pub struct ReRule {
	pattern: String,
	regex: Regex,
	right: RegexTarget,
}

impl ReRule {
	/// Compile `pattern` so that it only matches the whole rendered path.
	pub fn new(pattern: &str, right: RegexTarget) -> std::result::Result<Self, regex::Error> {
		let regex = Regex::new(&format!(r"\A(?:{pattern})\z"))?;
		Ok(ReRule {
			pattern: pattern.to_string(),
			regex,
			right,
		})
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn target(&self) -> &RegexTarget {
		&self.right
	}

	/// Fails only when the template references an unbound variable or is
	/// malformed.
	pub fn apply(&self, path: &RulePath) -> Result<RuleOutcome> {
		let rendered = path.to_string();
		let Some(captures) = self.regex.captures(&rendered) else {
			return Ok(RuleOutcome::NoMatch);
		};

		match &self.right {
			RegexTarget::Drop => Ok(RuleOutcome::Drop),
			RegexTarget::Template(template) => {
				let bindings = bind_captures(&captures);
				let result = render_template(template, &bindings)?;
				Ok(RuleOutcome::Replace(RulePath::from(result.as_str())))
			}
		}
	}
}

impl PartialEq for ReRule {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern && self.right == other.right
	}
}

impl Eq for ReRule {}

/// One parsed rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
	Normal(NormalRule),
	Exact(ExactRule),
	Re(ReRule),
}

impl Rule {
	pub fn apply(&self, path: &RulePath) -> Result<RuleOutcome> {
		match self {
			Rule::Normal(rule) => Ok(rule.apply(path)),
			Rule::Exact(rule) => Ok(rule.apply(path)),
			Rule::Re(rule) => rule.apply(path),
		}
	}
}

/// Write `token` so that the rule parser reads it back unchanged.
///
/// Whitespace and control characters force quoting; control characters are
/// written as escapes so the rule stays on one line.
fn write_token(f: &mut fmt::Formatter<'_>, token: &str) -> fmt::Result {
	let needs_quotes = token.is_empty()
		|| token == "!"
		|| token.starts_with(QUOTATION_MARKS)
		|| token.chars().any(|c| c.is_whitespace() || c.is_control());

	if !needs_quotes {
		return f.write_str(token);
	}

	f.write_str("\"")?;
	for c in token.chars() {
		match c {
			'\\' => f.write_str("\\\\")?,
			'"' => f.write_str("\\\"")?,
			'\n' => f.write_str("\\n")?,
			'\t' => f.write_str("\\t")?,
			'\r' => f.write_str("\\r")?,
			c if c.is_control() || (c.is_whitespace() && c != ' ') => match u32::from(c) {
				code @ 0..=0xff => write!(f, "\\x{code:02x}")?,
				code @ 0x100..=0xffff => write!(f, "\\u{code:04x}")?,
				code => write!(f, "\\U{code:08x}")?,
			},
			_ => write!(f, "{c}")?,
		}
	}
	f.write_str("\"")
}

fn write_path_target(f: &mut fmt::Formatter<'_>, target: &RuleTarget) -> fmt::Result {
	match target {
		RuleTarget::Drop => f.write_str("!"),
		RuleTarget::Replace(path) => write_token(f, &path.to_string()),
	}
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Rule::Normal(rule) => {
				write_token(f, &rule.left.to_string())?;
				f.write_str(" --> ")?;
				write_path_target(f, &rule.right)
			}
			Rule::Exact(rule) => {
				write_token(f, &rule.left.to_string())?;
				f.write_str(" -exact-> ")?;
				write_path_target(f, &rule.right)
			}
			Rule::Re(rule) => {
				write_token(f, &rule.pattern)?;
				f.write_str(" -re-> ")?;
				match &rule.right {
					RegexTarget::Drop => f.write_str("!"),
					RegexTarget::Template(template) => write_token(f, template),
				}
			}
		}
	}
}
