use crate::error::RuleParseError;
use crate::rules::cursor::Cursor;
use crate::rules::matcher::{ExactRule, NormalRule, ReRule, RegexTarget, Rule, RuleTarget};
use crate::rules::path::RulePath;

/// Characters that open and close a quoted string.
pub const QUOTATION_MARKS: [char; 2] = ['"', '\''];

/// A parsed string token: text, or the bare `!` drop marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	Text(String),
	Drop,
}

impl Token {
	fn into_path_target(self) -> RuleTarget {
		match self {
			Token::Text(text) => RuleTarget::Replace(RulePath::from(text.as_str())),
			Token::Drop => RuleTarget::Drop,
		}
	}

	fn into_regex_target(self) -> RegexTarget {
		match self {
			Token::Text(text) => RegexTarget::Template(text),
			Token::Drop => RegexTarget::Drop,
		}
	}
}

/// The rule kind selected by an arrow's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKind {
	/// `-->`
	Normal,
	/// `-exact->`
	Exact,
	/// `-re->`
	Re,
}

/// Parse a quoted string literal starting at the opening quotation mark.
///
/// A backslash escapes the following character while scanning. The whole
/// body is decoded with [`decode_string_literal`] once the closing quotation
/// mark is found.
pub fn parse_string_literal(cursor: &mut Cursor) -> Result<String, RuleParseError> {
	let start = cursor.index();

	let quotation_mark = match cursor.peek() {
		Some(c) if QUOTATION_MARKS.contains(&c) => c,
		// Unreachable as long as only parse_string calls this.
		_ => return Err(cursor.error("Invalid quotation mark")),
	};
	cursor.advance();

	let mut body = String::new();
	let mut escaped = false;
	while let Some(c) = cursor.peek() {
		cursor.advance();
		if escaped {
			escaped = false;
			body.push(c);
		} else if c == quotation_mark {
			return decode_string_literal(&body).map_err(|reason| {
				cursor.set_index(start);
				cursor.error(reason)
			});
		} else {
			escaped = c == '\\';
			body.push(c);
		}
	}

	Err(cursor.error("Expected end of string literal"))
}

/// Decode the escape sequences in the body of a string literal.
///
/// Unknown escapes such as `\.` or `\d` are kept verbatim so regex patterns
/// survive quoting.
pub fn decode_string_literal(body: &str) -> Result<String, String> {
	let mut result = String::with_capacity(body.len());
	let mut chars = body.chars().peekable();

	while let Some(c) = chars.next() {
		if c != '\\' {
			result.push(c);
			continue;
		}

		let Some(escape) = chars.next() else {
			result.push('\\');
			break;
		};

		match escape {
			'\\' | '\'' | '"' => result.push(escape),
			'n' => result.push('\n'),
			't' => result.push('\t'),
			'r' => result.push('\r'),
			'a' => result.push('\x07'),
			'b' => result.push('\x08'),
			'f' => result.push('\x0c'),
			'v' => result.push('\x0b'),
			'0'..='7' => {
				let mut value = escape.to_digit(8).unwrap_or(0);
				for _ in 0..2 {
					match chars.peek().and_then(|d| d.to_digit(8)) {
						Some(digit) => {
							value = value * 8 + digit;
							chars.next();
						}
						None => break,
					}
				}
				result.push(char::from_u32(value).ok_or("Invalid escape sequence")?);
			}
			'x' => result.push(decode_hex_escape(&mut chars, 2)?),
			'u' => result.push(decode_hex_escape(&mut chars, 4)?),
			'U' => result.push(decode_hex_escape(&mut chars, 8)?),
			other => {
				result.push('\\');
				result.push(other);
			}
		}
	}

	Ok(result)
}

fn decode_hex_escape(
	chars: &mut std::iter::Peekable<std::str::Chars>,
	digits: usize,
) -> Result<char, String> {
	let mut value: u32 = 0;
	for _ in 0..digits {
		let digit = chars
			.next()
			.and_then(|d| d.to_digit(16))
			.ok_or("Invalid escape sequence")?;
		value = value * 16 + digit;
	}
	char::from_u32(value).ok_or_else(|| "Invalid escape sequence".to_string())
}

/// Consume characters up to the next space or the end of the line.
pub fn parse_until_space_or_eol(cursor: &mut Cursor) -> String {
	let mut result = String::new();
	while let Some(c) = cursor.peek() {
		if c == ' ' {
			break;
		}
		result.push(c);
		cursor.advance();
	}
	result
}

/// Parse a quoted or bare string. A bare `!` is the drop marker.
pub fn parse_string(cursor: &mut Cursor) -> Result<Token, RuleParseError> {
	match cursor.peek() {
		Some(c) if QUOTATION_MARKS.contains(&c) => Ok(Token::Text(parse_string_literal(cursor)?)),
		_ => {
			let string = parse_until_space_or_eol(cursor);
			if string == "!" {
				Ok(Token::Drop)
			} else {
				Ok(Token::Text(string))
			}
		}
	}
}

/// Parse an arrow of the form `-NAME->`.
pub fn parse_arrow(cursor: &mut Cursor) -> Result<ArrowKind, RuleParseError> {
	let arrow_index = cursor.index();
	cursor.expect("-")?;

	let mut name = String::new();
	loop {
		match cursor.peek() {
			Some('-') => break,
			Some(c) => {
				name.push(c);
				cursor.advance();
			}
			None => return Err(cursor.error("Expected rest of arrow")),
		}
	}

	cursor.expect("->")?;

	match name.as_str() {
		"" => Ok(ArrowKind::Normal),
		"exact" => Ok(ArrowKind::Exact),
		"re" => Ok(ArrowKind::Re),
		_ => {
			cursor.set_index(arrow_index + 1);
			Err(cursor.error("Invalid arrow name"))
		}
	}
}

/// Parse one trimmed, non-blank rule line.
pub fn parse_rule(cursor: &mut Cursor) -> Result<Rule, RuleParseError> {
	let left_index = cursor.index();
	let left = match parse_string(cursor)? {
		Token::Text(text) => text,
		Token::Drop => {
			cursor.set_index(left_index);
			return Err(cursor.error("Left side can't be '!'"));
		}
	};

	cursor.expect(" ")?;
	let arrow = parse_arrow(cursor)?;

	// A missing right side drops on match.
	let right = if cursor.peek().is_some() {
		cursor.expect(" ")?;
		parse_string(cursor)?
	} else {
		Token::Drop
	};

	if cursor.peek().is_some() {
		return Err(cursor.error("Expected end of line"));
	}

	let rule = match arrow {
		ArrowKind::Normal => Rule::Normal(NormalRule::new(
			RulePath::from(left.as_str()),
			right.into_path_target(),
		)),
		ArrowKind::Exact => Rule::Exact(ExactRule::new(
			RulePath::from(left.as_str()),
			right.into_path_target(),
		)),
		ArrowKind::Re => {
			let rule = ReRule::new(&left, right.into_regex_target()).map_err(|source| {
				cursor.set_index(left_index);
				cursor.error(format!("Invalid regular expression: {source}"))
			})?;
			Rule::Re(rule)
		}
	};

	Ok(rule)
}
