//! Configuration loading for reroute.
//!
//! This module handles:
//! - TOML config file parsing
//! - Resolving inline or file-based rule text
//! - Building a transformer from a config

pub mod parser;
pub mod types;

pub use parser::{
	DEFAULT_CONFIG_FILE, load_rules_text, load_transformer, parse_config_file, parse_config_str,
	read_rules_file,
};
pub use types::{Config, RuleSource};
