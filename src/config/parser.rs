use crate::config::types::{Config, RuleSource};
use crate::error::{RerouteError, Result};
use crate::rules::Transformer;
use std::path::Path;

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".reroute.toml";

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Config> {
	if !path.exists() {
		return Err(RerouteError::ConfigNotFound {
			path: path.to_path_buf(),
		});
	}

	let content = std::fs::read_to_string(path).map_err(|source| RerouteError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_config_str(&content, path)
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(content: &str, path: &Path) -> Result<Config> {
	let config: Config =
		toml::from_str(content).map_err(|source| RerouteError::ConfigParseError {
			path: path.to_path_buf(),
			source,
		})?;

	config.validate(path)?;

	Ok(config)
}

/// Read a plain rule file.
pub fn read_rules_file(path: &Path) -> Result<String> {
	std::fs::read_to_string(path).map_err(|source| RerouteError::RulesReadError {
		path: path.to_path_buf(),
		source,
	})
}

/// Load the rule text a config file points at.
pub fn load_rules_text(config_path: &Path) -> Result<String> {
	let config = parse_config_file(config_path)?;
	match config.rule_source(config_path)? {
		RuleSource::Inline(text) => Ok(text),
		RuleSource::File(path) => {
			log::debug!("Loading rules from {}", path.display());
			read_rules_file(&path)
		}
	}
}

/// Load a config file and build its transformer.
pub fn load_transformer(config_path: &Path) -> Result<Transformer> {
	let text = load_rules_text(config_path)?;
	Ok(Transformer::new(&text)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use std::path::PathBuf;

	#[test]
	fn test_parse_inline_transform() {
		let content = r#"
transform = """
foo --> bar
"(.*)\\.pdf" -re-> "{g1}.txt"
"""
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		let text = config.transform.unwrap();
		let transformer = Transformer::new(&text).unwrap();
		assert_eq!(transformer.len(), 2);
	}

	#[test]
	fn test_parse_literal_string_keeps_backslashes() {
		let content = r#"
transform = '''
"(\d+)\.pdf" -re-> "{i1}"
'''
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();
		assert!(config.transform.unwrap().contains(r"(\d+)\.pdf"));
	}

	#[test]
	fn test_mutually_exclusive_sources() {
		let content = r#"
transform = "a --> b"
transform-file = "rules.txt"
"#;
		let path = PathBuf::from("test.toml");
		match parse_config_str(content, &path).unwrap_err() {
			RerouteError::MutuallyExclusive { option1, option2 } => {
				assert_eq!(option1, "transform");
				assert_eq!(option2, "transform-file");
			}
			other => panic!("Expected MutuallyExclusive error, got {other:?}"),
		}
	}

	#[test]
	fn test_missing_rules() {
		let path = PathBuf::from("test.toml");
		let result = parse_config_str("", &path);
		assert!(matches!(result, Err(RerouteError::MissingRules { .. })));
	}

	#[test]
	fn test_unknown_key_is_parse_error() {
		let path = PathBuf::from("test.toml");
		let result = parse_config_str("transfrom = \"a --> b\"", &path);
		assert!(matches!(result, Err(RerouteError::ConfigParseError { .. })));
	}

	#[test]
	fn test_config_not_found() {
		let temp_dir = tempfile::tempdir().unwrap();
		let result = parse_config_file(&temp_dir.path().join(DEFAULT_CONFIG_FILE));
		assert!(matches!(result, Err(RerouteError::ConfigNotFound { .. })));
	}

	#[test]
	fn test_transform_file_is_relative_to_config() {
		let temp_dir = tempfile::tempdir().unwrap();
		let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
		fs::create_dir(temp_dir.path().join("conf")).unwrap();
		fs::write(temp_dir.path().join("conf/rules.txt"), "a --> b\nc -exact-> !\n").unwrap();
		fs::write(&config_path, "transform-file = \"conf/rules.txt\"\n").unwrap();

		let transformer = load_transformer(&config_path).unwrap();
		assert_eq!(transformer.len(), 2);
	}

	#[test]
	fn test_missing_transform_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
		fs::write(&config_path, "transform-file = \"nope.txt\"\n").unwrap();

		let result = load_transformer(&config_path);
		assert!(matches!(result, Err(RerouteError::RulesReadError { .. })));
	}

	#[test]
	fn test_invalid_rule_surfaces_parse_error() {
		let temp_dir = tempfile::tempdir().unwrap();
		let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
		fs::write(&config_path, "transform = \"foo !bar\"\n").unwrap();

		match load_transformer(&config_path).unwrap_err() {
			RerouteError::RuleParse(err) => {
				assert_eq!(err.column, 4);
				assert_eq!(err.reason, "Expected '-'");
			}
			other => panic!("Expected RuleParse error, got {other:?}"),
		}
	}
}
