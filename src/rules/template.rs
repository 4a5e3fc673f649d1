//! Placeholder substitution for regex rule templates.
//!
//! A template is plain text with `{name}` or `{name:spec}` placeholders.
//! Names are looked up in a fixed set of capture bindings; nothing is
//! evaluated. `{{` and `}}` produce literal braces.

use crate::error::{RerouteError, Result};
use regex::Captures;
use std::collections::HashMap;

/// A value bound to a template variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Str(String),
	Int(i64),
	Float(f64),
}

pub type Bindings = HashMap<String, Value>;

/// Bind `gN`, `iN` and `fN` for every capture group that participated in
/// the match. `iN` and `fN` are only bound when the text converts.
pub fn bind_captures(captures: &Captures) -> Bindings {
	let mut bindings = Bindings::new();

	for (i, group) in captures.iter().enumerate() {
		let Some(group) = group else {
			continue;
		};
		let text = group.as_str();

		bindings.insert(format!("g{i}"), Value::Str(text.to_string()));
		if let Some(int) = parse_int(text) {
			bindings.insert(format!("i{i}"), Value::Int(int));
		}
		if let Some(float) = parse_float(text) {
			bindings.insert(format!("f{i}"), Value::Float(float));
		}
	}

	bindings
}

fn parse_int(text: &str) -> Option<i64> {
	let text = text.trim();
	if text.starts_with('_') || text.ends_with('_') || text.contains("__") {
		return None;
	}
	text.replace('_', "").parse().ok()
}

fn parse_float(text: &str) -> Option<f64> {
	let text = text.trim();
	if text.starts_with('_') || text.ends_with('_') || text.contains("__") {
		return None;
	}
	text.replace('_', "").parse().ok()
}

/// Substitute every placeholder in `template` from `bindings`.
pub fn render_template(template: &str, bindings: &Bindings) -> Result<String> {
	let invalid = |reason: &str| RerouteError::InvalidTemplate {
		template: template.to_string(),
		reason: reason.to_string(),
	};

	let mut result = String::with_capacity(template.len());
	let mut chars = template.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			'{' if chars.peek() == Some(&'{') => {
				chars.next();
				result.push('{');
			}
			'}' if chars.peek() == Some(&'}') => {
				chars.next();
				result.push('}');
			}
			'}' => return Err(invalid("single '}' is not allowed")),
			'{' => {
				let mut field = String::new();
				loop {
					match chars.next() {
						Some('}') => break,
						Some('{') => return Err(invalid("nested '{' in placeholder")),
						Some(c) => field.push(c),
						None => return Err(invalid("expected '}' before end of template")),
					}
				}

				let (name, spec) = match field.split_once(':') {
					Some((name, spec)) => (name, Some(spec)),
					None => (field.as_str(), None),
				};

				if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
					return Err(invalid(&format!("invalid placeholder name {name:?}")));
				}

				let value = bindings
					.get(name)
					.ok_or_else(|| RerouteError::UnboundVariable {
						name: name.to_string(),
						template: template.to_string(),
					})?;

				let spec = match spec {
					Some(spec) => FormatSpec::parse(spec).map_err(|reason| invalid(&reason))?,
					None => FormatSpec::default(),
				};

				result.push_str(&spec.apply(value).map_err(|reason| invalid(&reason))?);
			}
			_ => result.push(c),
		}
	}

	Ok(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
	Left,
	Right,
	Center,
}

impl Align {
	fn from_char(c: char) -> Option<Self> {
		match c {
			'<' => Some(Align::Left),
			'>' => Some(Align::Right),
			'^' => Some(Align::Center),
			_ => None,
		}
	}
}

/// `[[fill]align][sign][0][width][.precision][type]`
#[derive(Debug, Clone, PartialEq, Eq)]
struct FormatSpec {
	fill: char,
	align: Option<Align>,
	plus_sign: bool,
	zero_pad: bool,
	width: usize,
	precision: Option<usize>,
	kind: Option<char>,
}

impl Default for FormatSpec {
	fn default() -> Self {
		FormatSpec {
			fill: ' ',
			align: None,
			plus_sign: false,
			zero_pad: false,
			width: 0,
			precision: None,
			kind: None,
		}
	}
}

impl FormatSpec {
	fn parse(spec: &str) -> std::result::Result<Self, String> {
		let chars: Vec<char> = spec.chars().collect();
		let mut parsed = FormatSpec::default();
		let mut i = 0;

		if let Some(align) = chars.get(1).copied().and_then(Align::from_char) {
			parsed.fill = chars[0];
			parsed.align = Some(align);
			i = 2;
		} else if let Some(align) = chars.first().copied().and_then(Align::from_char) {
			parsed.align = Some(align);
			i = 1;
		}

		match chars.get(i) {
			Some('+') => {
				parsed.plus_sign = true;
				i += 1;
			}
			Some('-') => i += 1,
			_ => {}
		}

		if chars.get(i) == Some(&'0') {
			parsed.zero_pad = true;
			i += 1;
		}

		let width_start = i;
		while chars.get(i).is_some_and(char::is_ascii_digit) {
			i += 1;
		}
		if i > width_start {
			parsed.width = read_number(&chars[width_start..i])?;
		}

		if chars.get(i) == Some(&'.') {
			i += 1;
			let precision_start = i;
			while chars.get(i).is_some_and(char::is_ascii_digit) {
				i += 1;
			}
			if i == precision_start {
				return Err("format specifier missing precision".to_string());
			}
			parsed.precision = Some(read_number(&chars[precision_start..i])?);
		}

		if let Some(&kind) = chars.get(i) {
			if !matches!(kind, 's' | 'd' | 'f') {
				return Err(format!("unknown format code '{kind}'"));
			}
			parsed.kind = Some(kind);
			i += 1;
		}

		if i != chars.len() {
			return Err(format!("invalid format specifier {spec:?}"));
		}

		Ok(parsed)
	}

	fn apply(&self, value: &Value) -> std::result::Result<String, String> {
		let (sign, body, numeric) = match (value, self.kind) {
			(Value::Str(s), None | Some('s')) => {
				if self.plus_sign {
					return Err("sign not allowed in string format specifier".to_string());
				}
				let body = match self.precision {
					Some(precision) => s.chars().take(precision).collect(),
					None => s.clone(),
				};
				(String::new(), body, false)
			}
			(Value::Int(n), None | Some('d')) => {
				if self.precision.is_some() {
					return Err("precision not allowed in integer format specifier".to_string());
				}
				(self.sign(*n < 0), n.unsigned_abs().to_string(), true)
			}
			(Value::Int(n), Some('f')) => {
				let precision = self.precision.unwrap_or(6);
				let n = *n as f64;
				(self.sign(n < 0.0), format!("{:.*}", precision, n.abs()), true)
			}
			(Value::Float(x), Some('f')) => {
				let precision = self.precision.unwrap_or(6);
				(self.sign(x.is_sign_negative() && !x.is_nan()), format!("{:.*}", precision, x.abs()), true)
			}
			(Value::Float(x), None) => {
				let body = match self.precision {
					Some(precision) => format!("{:.*}", precision, x.abs()),
					None => float_repr(x.abs()),
				};
				(self.sign(x.is_sign_negative() && !x.is_nan()), body, true)
			}
			(_, Some(kind)) => {
				return Err(format!("unknown format code '{kind}' for this value"));
			}
		};

		let len = sign.chars().count() + body.chars().count();
		let padding = self.width.saturating_sub(len);

		if numeric && self.zero_pad && self.align.is_none() {
			return Ok(format!("{sign}{}{body}", "0".repeat(padding)));
		}

		let fill = if self.zero_pad && self.align.is_none() {
			'0'
		} else {
			self.fill
		};
		let align = self
			.align
			.unwrap_or(if numeric { Align::Right } else { Align::Left });
		let pad = |n: usize| fill.to_string().repeat(n);

		Ok(match align {
			Align::Left => format!("{sign}{body}{}", pad(padding)),
			Align::Right => format!("{}{sign}{body}", pad(padding)),
			Align::Center => {
				let before = padding / 2;
				format!("{}{sign}{body}{}", pad(before), pad(padding - before))
			}
		})
	}

	fn sign(&self, negative: bool) -> String {
		if negative {
			"-".to_string()
		} else if self.plus_sign {
			"+".to_string()
		} else {
			String::new()
		}
	}
}

/// Upper bound for format widths and precisions.
pub const MAX_FORMAT_WIDTH: usize = 4096;

fn read_number(digits: &[char]) -> std::result::Result<usize, String> {
	let too_large = || format!("format width or precision exceeds {MAX_FORMAT_WIDTH}");
	let number: usize = digits
		.iter()
		.collect::<String>()
		.parse()
		.map_err(|_| too_large())?;

	if number > MAX_FORMAT_WIDTH {
		return Err(too_large());
	}
	Ok(number)
}

/// Shortest float rendering, keeping a `.0` on integral values and
/// switching to exponent form outside `[1e-4, 1e16)`.
fn float_repr(x: f64) -> String {
	if x.is_nan() {
		"nan".to_string()
	} else if x.is_infinite() {
		"inf".to_string()
	} else if x != 0.0 && !(1e-4..1e16).contains(&x.abs()) {
		exponent_repr(x)
	} else if x.fract() == 0.0 {
		format!("{x:.1}")
	} else {
		x.to_string()
	}
}

/// `1e+20`, `1.5e-05`: signed exponent with at least two digits.
fn exponent_repr(x: f64) -> String {
	let shortest = format!("{x:e}");
	let Some((mantissa, exponent)) = shortest.split_once('e') else {
		return shortest;
	};
	let exponent: i32 = exponent.parse().unwrap_or(0);
	let sign = if exponent < 0 { '-' } else { '+' };
	format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

#[cfg(test)]
mod tests {
	use super::*;
	use regex::Regex;

	fn bindings_for(pattern: &str, text: &str) -> Bindings {
		let regex = Regex::new(&format!(r"\A(?:{pattern})\z")).unwrap();
		bind_captures(&regex.captures(text).unwrap())
	}

	fn render(template: &str, bindings: &Bindings) -> String {
		render_template(template, bindings).unwrap()
	}

	#[test]
	fn test_bind_captures_conversions() {
		let bindings = bindings_for(r"(\d+)-(\w+)", "42-foo");
		assert_eq!(bindings["g0"], Value::Str("42-foo".to_string()));
		assert_eq!(bindings["g1"], Value::Str("42".to_string()));
		assert_eq!(bindings["i1"], Value::Int(42));
		assert_eq!(bindings["f1"], Value::Float(42.0));
		assert_eq!(bindings["g2"], Value::Str("foo".to_string()));
		assert!(!bindings.contains_key("i2"));
		assert!(!bindings.contains_key("f2"));
	}

	#[test]
	fn test_bind_captures_skips_unmatched_groups() {
		let bindings = bindings_for(r"a(b)?", "a");
		assert!(bindings.contains_key("g0"));
		assert!(!bindings.contains_key("g1"));
	}

	#[test]
	fn test_bind_float_only() {
		let bindings = bindings_for(r"(.*)", "1.5");
		assert!(!bindings.contains_key("i1"));
		assert_eq!(bindings["f1"], Value::Float(1.5));
	}

	#[test]
	fn test_parse_int_underscores() {
		assert_eq!(parse_int("1_000"), Some(1000));
		assert_eq!(parse_int("_1"), None);
		assert_eq!(parse_int("-7"), Some(-7));
	}

	#[test]
	fn test_render_plain_substitution() {
		let bindings = bindings_for(r"(\d+)-(\w+)", "42-foo");
		assert_eq!(render("{g2}_{i1}", &bindings), "foo_42");
		assert_eq!(render("{f1}", &bindings), "42.0");
		assert_eq!(render("no placeholders", &bindings), "no placeholders");
	}

	#[test]
	fn test_render_escaped_braces() {
		let bindings = bindings_for(r"(\w+)", "x");
		assert_eq!(render("{{{g1}}}", &bindings), "{x}");
	}

	#[test]
	fn test_render_format_specs() {
		let bindings = bindings_for(r"(\d+)-(\w+)-([\d.]+)", "7-ab-2.5");
		assert_eq!(render("{i1:02}", &bindings), "07");
		assert_eq!(render("{i1:+d}", &bindings), "+7");
		assert_eq!(render("{i1:>4}", &bindings), "   7");
		assert_eq!(render("{g2:*^6}", &bindings), "**ab**");
		assert_eq!(render("{g2:<4}|", &bindings), "ab  |");
		assert_eq!(render("{g2:.1}", &bindings), "a");
		assert_eq!(render("{f3:.2f}", &bindings), "2.50");
		assert_eq!(render("{f3:06.1f}", &bindings), "0002.5");
		assert_eq!(render("{i1:.1f}", &bindings), "7.0");
	}

	#[test]
	fn test_render_negative_zero_padding() {
		let mut bindings = Bindings::new();
		bindings.insert("i1".to_string(), Value::Int(-5));
		assert_eq!(render("{i1:04}", &bindings), "-005");
	}

	#[test]
	fn test_render_unbound_variable() {
		let bindings = bindings_for(r"(\d+)-(\w+)", "42-foo");
		let err = render_template("{f2}", &bindings).unwrap_err();
		match err {
			RerouteError::UnboundVariable { name, template } => {
				assert_eq!(name, "f2");
				assert_eq!(template, "{f2}");
			}
			other => panic!("Expected UnboundVariable, got {other:?}"),
		}

		assert!(matches!(
			render_template("{g9}", &bindings),
			Err(RerouteError::UnboundVariable { .. })
		));
	}

	#[test]
	fn test_render_rejects_expressions() {
		let bindings = bindings_for(r"(\d+)", "4");
		for template in ["{i1 + 1}", "{i1.real}", "{g1!r}", "{}", "{g1[0]}"] {
			assert!(
				matches!(
					render_template(template, &bindings),
					Err(RerouteError::InvalidTemplate { .. })
				),
				"{template} should be rejected"
			);
		}
	}

	#[test]
	fn test_render_malformed_braces() {
		let bindings = bindings_for(r"(\d+)", "4");
		for template in ["{g1", "g1}", "{g{1}}"] {
			assert!(
				matches!(
					render_template(template, &bindings),
					Err(RerouteError::InvalidTemplate { .. })
				),
				"{template} should be rejected"
			);
		}
	}

	#[test]
	fn test_render_invalid_spec_for_value() {
		let bindings = bindings_for(r"(\d+)-(\w+)", "4-x");
		assert!(render_template("{g2:d}", &bindings).is_err());
		assert!(render_template("{g2:+}", &bindings).is_err());
		assert!(render_template("{i1:.2}", &bindings).is_err());
		assert!(render_template("{i1:x}", &bindings).is_err());
	}

	#[test]
	fn test_render_rejects_huge_width_and_precision() {
		let bindings = bindings_for(r"(\d+)-(\w+)-([\d.]+)", "4-x-1.5");
		for template in [
			"{g2:18446744073709551615}",
			"{g2:99999999999999999999999}",
			"{i1:01000000000000}",
			"{f3:.5000f}",
			"{g2:.4097}",
		] {
			assert!(
				matches!(
					render_template(template, &bindings),
					Err(RerouteError::InvalidTemplate { .. })
				),
				"{template} should be rejected"
			);
		}

		assert_eq!(render("{i1:4096}", &bindings).len(), MAX_FORMAT_WIDTH);
	}

	#[test]
	fn test_huge_width_in_rule_is_structured_error() {
		let transformer = crate::rules::Transformer::new(
			r#""(.*)" -re-> "{g1:18446744073709551615}""#,
		)
		.unwrap();
		let result = transformer.transform(&crate::rules::RulePath::from("a"));
		assert!(matches!(result, Err(RerouteError::InvalidTemplate { .. })));
	}

	#[test]
	fn test_float_repr() {
		assert_eq!(float_repr(42.0), "42.0");
		assert_eq!(float_repr(2.5), "2.5");
		assert_eq!(float_repr(f64::NAN), "nan");
		assert_eq!(float_repr(f64::INFINITY), "inf");
		assert_eq!(float_repr(0.0), "0.0");
		assert_eq!(float_repr(0.0001), "0.0001");
	}

	#[test]
	fn test_float_repr_exponent_form() {
		assert_eq!(float_repr(1e20), "1e+20");
		assert_eq!(float_repr(1e16), "1e+16");
		assert_eq!(float_repr(1.5e16), "1.5e+16");
		assert_eq!(float_repr(1e-5), "1e-05");
		assert_eq!(float_repr(2.5e-7), "2.5e-07");
		assert_eq!(float_repr(1e100), "1e+100");
	}
}
