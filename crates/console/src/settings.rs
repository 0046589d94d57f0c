// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The manager's YAML settings document.
//!
//! The console edits the document as opaque YAML: it keeps a pristine copy
//! for restores, refuses to clobber state on a parse failure, and knows the
//! few semantic details the setup flow needs (placeholder variable rows, the
//! bundled-vs-external database choice).

use std::fmt;

use serde::Deserialize;

/// Payload of `GET /setup/data`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetupData {
    /// URLs the manager believes it is reachable on.
    #[serde(default)]
    pub own_urls: Vec<String>,
    #[serde(default)]
    pub config: serde_yaml::Value,
}

impl SetupData {
    pub fn parse(yaml: &str) -> Result<Self, YamlError> {
        serde_yaml::from_str(yaml).map_err(YamlError::from)
    }
}

/// A YAML parse failure with the offending line preserved for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlError {
    pub message: String,
    pub line: Option<usize>,
}

impl From<serde_yaml::Error> for YamlError {
    fn from(err: serde_yaml::Error) -> Self {
        Self { message: err.to_string(), line: err.location().map(|loc| loc.line()) }
    }
}

impl fmt::Display for YamlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {line})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for YamlError {}

/// Holds the configuration under edit plus the pristine copy it came from.
#[derive(Debug, Clone)]
pub struct SettingsEditor {
    current: serde_yaml::Value,
    pristine: serde_yaml::Value,
}

impl SettingsEditor {
    pub fn new(config: serde_yaml::Value) -> Self {
        Self { current: config.clone(), pristine: config }
    }

    pub fn config(&self) -> &serde_yaml::Value {
        &self.current
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.pristine
    }

    /// Replace the configuration and re-baseline the pristine copy; used
    /// after a successful load or save.
    pub fn set_config(&mut self, config: serde_yaml::Value) {
        self.current = config.clone();
        self.pristine = config;
    }

    /// Apply edited YAML text. On a parse failure the current state is left
    /// untouched and the error (with its line) is returned for reporting.
    pub fn apply_yaml(&mut self, yaml: &str) -> Result<(), YamlError> {
        self.current = serde_yaml::from_str(yaml)?;
        Ok(())
    }

    /// Throw away edits, back to the pristine copy.
    pub fn restore(&mut self) {
        self.current = self.pristine.clone();
    }

    /// Dump the current configuration as YAML.
    pub fn config_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(&self.current)?)
    }
}

/// Name given to freshly added variable rows; rows still carrying it were
/// never filled in and must not be saved.
const PLACEHOLDER_VARIABLE_NAME: &str = "variable-name";

/// Drop variable rows the user added but never renamed.
pub fn strip_placeholder_variables(rows: Vec<serde_yaml::Value>) -> Vec<serde_yaml::Value> {
    rows.into_iter()
        .filter(|row| {
            row.get("name").and_then(serde_yaml::Value::as_str) != Some(PLACEHOLDER_VARIABLE_NAME)
        })
        .collect()
}

/// "bundled" when no external database URL is configured.
pub fn database_choice(config: &serde_yaml::Value) -> &'static str {
    match config.get("database_url").and_then(serde_yaml::Value::as_str) {
        Some("") | None => "bundled",
        Some(_) => "external",
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
