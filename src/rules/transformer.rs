use crate::error::{Result, RuleParseError};
use crate::rules::cursor::Cursor;
use crate::rules::matcher::{Rule, RuleOutcome};
use crate::rules::parser::parse_rule;
use crate::rules::path::RulePath;
use std::str::FromStr;

/// An ordered list of rules evaluated against paths. First match wins.
///
/// A path that no rule matches is dropped, the same as an explicit `!`.
/// Keeping paths unchanged by default needs an identity rule such as
/// `"" --> ""` at the end of the rule file.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
	rules: Vec<Rule>,
}

impl Transformer {
	/// Parse a whole rule file. Blank lines are skipped; line numbers in
	/// errors are 0-based indices into `text`.
	pub fn new(text: &str) -> std::result::Result<Self, RuleParseError> {
		let mut rules = Vec::new();

		for (line_nr, line) in text.split('\n').enumerate() {
			let line = line.trim();
			if line.is_empty() {
				continue;
			}
			rules.push(parse_rule(&mut Cursor::new(line, line_nr))?);
		}

		log::debug!("Parsed {} transform rules", rules.len());
		Ok(Transformer { rules })
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Rewrite `path`. `Ok(None)` means the path is dropped.
	///
	/// Errors only come from regex rule templates that reference an unbound
	/// variable or are malformed.
	pub fn transform(&self, path: &RulePath) -> Result<Option<RulePath>> {
		for (i, rule) in self.rules.iter().enumerate() {
			log::trace!("Trying rule {} ({}) on {}", i + 1, rule, path);
			match rule.apply(path)? {
				RuleOutcome::Replace(result) => {
					log::debug!("Rule {} rewrote {} to {}", i + 1, path, result);
					return Ok(Some(result));
				}
				RuleOutcome::Drop => {
					log::debug!("Rule {} dropped {}", i + 1, path);
					return Ok(None);
				}
				RuleOutcome::NoMatch => continue,
			}
		}

		log::debug!("No rule matched {}, dropping it", path);
		Ok(None)
	}
}

impl FromStr for Transformer {
	type Err = RuleParseError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Transformer::new(s)
	}
}
