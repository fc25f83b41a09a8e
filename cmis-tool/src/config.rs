use std::io::{ErrorKind, Read};
use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Deserialize;

use cmis_xml::codec::Options;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_indent_char")]
    pub indent_char: String,
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,
    #[serde(default = "default_xml_declaration")]
    pub xml_declaration: bool,
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            indent_char: default_indent_char(),
            indent_size: default_indent_size(),
            xml_declaration: default_xml_declaration(),
        }
    }
}

impl OutputConfig {
    pub fn options(&self) -> Result<Options> {
        let indent_char = match self.indent_char.as_bytes() {
            [c] if c.is_ascii_whitespace() => *c,
            _ => bail!(
                "indent_char must be a single space or tab, got {:?}",
                self.indent_char
            ),
        };
        Ok(Options {
            indent_char,
            indent_size: self.indent_size,
            xml_declaration: self.xml_declaration,
        })
    }
}

/// Read the configuration file. When `optional` is set, a missing file
/// yields the built-in defaults.
pub fn read_config(config_file: PathBuf, optional: bool) -> Result<Config> {
    let mut file = match std::fs::OpenOptions::new()
        .read(true)
        .open(config_file.as_path())
    {
        Ok(f) => f,
        Err(e) if optional && e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %config_file.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(e) => return Err(e.into()),
    };

    let mut config = String::new();
    file.read_to_string(&mut config)?;

    Ok(toml::from_str(&config)?)
}

fn default_indent_char() -> String {
    " ".into()
}

fn default_indent_size() -> usize {
    4
}

fn default_xml_declaration() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str("[output]\nindent_size = 2\n").unwrap();
        let opts = config.output.options().unwrap();
        assert_eq!(opts.indent_char, b' ');
        assert_eq!(opts.indent_size, 2);
        assert!(opts.xml_declaration);
    }

    #[test]
    fn empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output.options().unwrap(), Options::default());
    }

    #[test]
    fn tabs_and_no_declaration() {
        let src = "[output]\nindent_char = \"\\t\"\nindent_size = 1\nxml_declaration = false\n";
        let config: Config = toml::from_str(src).unwrap();
        let opts = config.output.options().unwrap();
        assert_eq!(opts.indent_char, b'\t');
        assert!(!opts.xml_declaration);
    }

    #[test]
    fn bad_indent_char() {
        let config: Config = toml::from_str("[output]\nindent_char = \"ab\"\n").unwrap();
        assert!(config.output.options().is_err());
    }

    #[test]
    fn missing_file() {
        let path = PathBuf::from("/nonexistent/cmis-tool.toml");
        assert_eq!(read_config(path.clone(), true).unwrap(), Config::default());
        assert!(read_config(path, false).is_err());
    }
}
