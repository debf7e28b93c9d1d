// Copyright 2025 STARGA Inc.
// Licensed under the Apache License, Version 2.0 (the “License”);
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at:
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an “AS IS” BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Part of the Cady project (symbolic differentiation and code generation).

//! Generation settings, loadable from a TOML file such as:
//!
//! ```toml
//! mode = "reverse"
//!
//! [naming]
//! binding_prefix = "w"
//!
//! [emit]
//! indent = 4
//! preamble = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::autodiff::Mode;
use crate::codegen::EmitOptions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("prefix '{value}' for {field} cannot start a C++ identifier")]
    InvalidPrefix { field: &'static str, value: String },
}

/// Prefixes of every name the drivers invent.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Naming {
    /// Bindings created by CSE in reverse mode.
    #[serde(default = "default_binding_prefix")]
    pub binding_prefix: String,
    /// Bindings created by CSE in symbolic mode.
    #[serde(default = "default_symbol_prefix")]
    pub symbol_prefix: String,
    /// Forward tangents: `<prefix><statement>_<input>`.
    #[serde(default = "default_tangent_prefix")]
    pub tangent_prefix: String,
    /// Reverse adjoints: `<prefix><statement>`.
    #[serde(default = "default_adjoint_prefix")]
    pub adjoint_prefix: String,
}

fn default_binding_prefix() -> String {
    "w".to_string()
}

fn default_symbol_prefix() -> String {
    "__symbol_".to_string()
}

fn default_tangent_prefix() -> String {
    "__diff_".to_string()
}

fn default_adjoint_prefix() -> String {
    "__rev_ad_".to_string()
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            binding_prefix: default_binding_prefix(),
            symbol_prefix: default_symbol_prefix(),
            tangent_prefix: default_tangent_prefix(),
            adjoint_prefix: default_adjoint_prefix(),
        }
    }
}

impl Naming {
    pub fn tangent(&self, statement: &str, input: &str) -> String {
        format!("{}{statement}_{input}", self.tangent_prefix)
    }

    pub fn adjoint(&self, statement: &str) -> String {
        format!("{}{statement}", self.adjoint_prefix)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("binding_prefix", &self.binding_prefix),
            ("symbol_prefix", &self.symbol_prefix),
            ("tangent_prefix", &self.tangent_prefix),
            ("adjoint_prefix", &self.adjoint_prefix),
        ] {
            let starts_ok = value
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
            let rest_ok = value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !starts_ok || !rest_ok {
                return Err(ConfigError::InvalidPrefix {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GenerateOptions {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub naming: Naming,
    #[serde(default)]
    pub emit: EmitOptions,
}

impl GenerateOptions {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let options: GenerateOptions = toml::from_str(text)?;
        options.naming.validate()?;
        Ok(options)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loading generation options from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let options = GenerateOptions::from_toml_str("").unwrap();
        assert_eq!(options, GenerateOptions::default());
        assert_eq!(options.mode, Mode::Reverse);
        assert_eq!(options.naming.adjoint("black"), "__rev_ad_black");
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let options = GenerateOptions::from_toml_str(
            "mode = \"forward\"\n[naming]\ntangent_prefix = \"t_\"\n[emit]\nindent = 2\n",
        )
        .unwrap();
        assert_eq!(options.mode, Mode::Forward);
        assert_eq!(options.naming.tangent("d1", "S"), "t_d1_S");
        assert_eq!(options.naming.binding_prefix, "w");
        assert_eq!(options.emit.indent, 2);
    }

    #[test]
    fn rejects_unusable_prefixes() {
        let err = GenerateOptions::from_toml_str("[naming]\nbinding_prefix = \"9w\"\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPrefix {
                field: "binding_prefix",
                ..
            }
        ));
    }

    #[test]
    fn unknown_keys_are_errors() {
        assert!(matches!(
            GenerateOptions::from_toml_str("modes = \"forward\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let options = GenerateOptions::default().with_mode(Mode::Symbolic);
        let text = options.to_toml().unwrap();
        assert_eq!(GenerateOptions::from_toml_str(&text).unwrap(), options);
    }
}
