use crate::error::RerouteError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration from a `.reroute.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
	/// Rule text, one rule per line. Usually a multi-line TOML string.
	#[serde(default)]
	pub transform: Option<String>,

	/// Path to a rule file, relative to the config file's directory.
	/// Mutually exclusive with `transform`.
	#[serde(default)]
	pub transform_file: Option<PathBuf>,
}

/// Where a config's rules come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
	Inline(String),
	File(PathBuf),
}

impl Config {
	/// Check that exactly one rule source is set.
	pub fn validate(&self, path: &Path) -> Result<(), RerouteError> {
		match (&self.transform, &self.transform_file) {
			(Some(_), Some(_)) => Err(RerouteError::MutuallyExclusive {
				option1: "transform".to_string(),
				option2: "transform-file".to_string(),
			}),
			(None, None) => Err(RerouteError::MissingRules {
				path: path.to_path_buf(),
			}),
			_ => Ok(()),
		}
	}

	/// The rule source, with `transform-file` resolved against the directory
	/// containing `config_path`.
	pub fn rule_source(&self, config_path: &Path) -> Result<RuleSource, RerouteError> {
		self.validate(config_path)?;

		if let Some(ref text) = self.transform {
			return Ok(RuleSource::Inline(text.clone()));
		}

		let file = self.transform_file.clone().unwrap_or_default();
		let resolved = match config_path.parent() {
			Some(dir) if file.is_relative() => dir.join(file),
			_ => file,
		};
		Ok(RuleSource::File(resolved))
	}
}
