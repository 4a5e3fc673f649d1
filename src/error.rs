use std::path::PathBuf;

/// A rule line that could not be parsed.
///
/// Carries the trimmed source line, the line number it was given during
/// construction (0-based), the column of the failure and a reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {}, column {}: {reason}", .line_nr + 1, .column + 1)]
pub struct RuleParseError {
	pub line: String,
	pub line_nr: usize,
	pub column: usize,
	pub reason: String,
}

impl RuleParseError {
	/// Render the offending line with a caret under the failing column.
	pub fn pretty_print(&self) -> String {
		let spaces = " ".repeat(self.column);
		format!(
			"Error parsing rule on line {}:\n{}\n{}^--- {}",
			self.line_nr + 1,
			self.line,
			spaces,
			self.reason
		)
	}
}

/// Library-level structured errors for reroute.
///
/// The CLI binary wraps these with `anyhow` for context chains.
#[derive(Debug, thiserror::Error)]
pub enum RerouteError {
	#[error("Invalid rule: {0}")]
	RuleParse(#[from] RuleParseError),

	#[error("Template {template:?} references unbound variable '{name}'")]
	UnboundVariable { name: String, template: String },

	#[error("Invalid template {template:?}: {reason}")]
	InvalidTemplate { template: String, reason: String },

	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to read rule file: {path}")]
	RulesReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Mutually exclusive options: {option1} and {option2}")]
	MutuallyExclusive { option1: String, option2: String },

	#[error("Config file defines no rules (set `transform` or `transform-file`): {path}")]
	MissingRules { path: PathBuf },
}

/// Result type alias using RerouteError.
pub type Result<T> = std::result::Result<T, RerouteError>;

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> RuleParseError {
		RuleParseError {
			line: "foo !bar".to_string(),
			line_nr: 2,
			column: 4,
			reason: "Expected '-'".to_string(),
		}
	}

	#[test]
	fn test_pretty_print_points_at_column() {
		let rendered = sample().pretty_print();
		let lines: Vec<_> = rendered.lines().collect();
		assert_eq!(lines[0], "Error parsing rule on line 3:");
		assert_eq!(lines[1], "foo !bar");
		assert_eq!(lines[2], "    ^--- Expected '-'");
	}

	#[test]
	fn test_display_is_one_based() {
		assert_eq!(sample().to_string(), "line 3, column 5: Expected '-'");
	}

	#[test]
	fn test_parse_error_is_std_error() {
		let err: Box<dyn std::error::Error> = Box::new(sample());
		assert_eq!(err.to_string(), "line 3, column 5: Expected '-'");
	}

	#[test]
	fn test_parse_error_converts() {
		let err: RerouteError = sample().into();
		assert!(matches!(err, RerouteError::RuleParse(_)));
	}
}
