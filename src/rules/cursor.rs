use crate::error::RuleParseError;

/// A position-tracking view over one rule line.
///
/// Columns are counted in characters, not bytes.
#[derive(Debug)]
pub struct Cursor<'a> {
	line: &'a str,
	chars: Vec<char>,
	line_nr: usize,
	index: usize,
}

impl<'a> Cursor<'a> {
	pub fn new(line: &'a str, line_nr: usize) -> Self {
		Cursor {
			line,
			chars: line.chars().collect(),
			line_nr,
			index: 0,
		}
	}

	/// The character under the cursor, or `None` at end of line.
	pub fn peek(&self) -> Option<char> {
		self.chars.get(self.index).copied()
	}

	pub fn advance(&mut self) {
		if self.index < self.chars.len() {
			self.index += 1;
		}
	}

	/// Consume `literal` character by character.
	pub fn expect(&mut self, literal: &str) -> Result<(), RuleParseError> {
		for expected in literal.chars() {
			if self.peek() == Some(expected) {
				self.advance();
			} else {
				return Err(self.error(format!("Expected '{expected}'")));
			}
		}
		Ok(())
	}

	pub fn index(&self) -> usize {
		self.index
	}

	pub fn set_index(&mut self, index: usize) {
		self.index = index.min(self.chars.len());
	}

	pub fn line(&self) -> &'a str {
		self.line
	}

	pub fn line_nr(&self) -> usize {
		self.line_nr
	}

	/// A parse error positioned at the current index.
	pub fn error(&self, reason: impl Into<String>) -> RuleParseError {
		RuleParseError {
			line: self.line.to_string(),
			line_nr: self.line_nr,
			column: self.index,
			reason: reason.into(),
		}
	}
}
