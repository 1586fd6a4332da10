//! Retrieve-spec parsing.
//!
//! A retrieve spec is a multi-line text blob where every non-blank row reads
//! `<secret path> <secret data key> as <output key>`:
//!
//! ```text
//! eng/db/creds password as DB_PASS
//! eng/db/creds user     as DB_USER
//! ```
//!
//! Rows are kept in first-seen order so outputs are emitted deterministically.

use crate::{Error, Result};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static SECRET_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9:/@+._-]+$").expect("secret path pattern is valid")
});

/// A single `field -> output` mapping under a secret path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub field: String,
    pub output: String,
}

/// All mappings requested from one secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMapping {
    pub path: String,
    pub fields: Vec<FieldMapping>,
}

impl SecretMapping {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fields: Vec::new(),
        }
    }

    /// Output name mapped from `field`, if any.
    pub fn output_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.output.as_str())
    }

    fn insert(&mut self, field: &str, output: &str) {
        match self.fields.iter_mut().find(|m| m.field == field) {
            Some(existing) => existing.output = output.to_string(),
            None => self.fields.push(FieldMapping {
                field: field.to_string(),
                output: output.to_string(),
            }),
        }
    }
}

/// Parsed retrieve spec: secret path -> (secret field -> output name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieveSpec {
    secrets: Vec<SecretMapping>,
}

impl RetrieveSpec {
    /// Parse a retrieve spec, failing on the first malformed row.
    pub fn parse(input: &str) -> Result<Self> {
        let mut spec = Self::default();

        for row in input.lines() {
            let tokens: Vec<&str> = row
                .trim()
                .split([' ', '\t'])
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.is_empty() {
                continue;
            }
            if tokens.len() != 4 {
                return Err(Error::MalformedRetrieveLine {
                    line: tokens.join(" "),
                });
            }

            // tokens[2] is the positional "as"; its spelling is not checked.
            let (path, field, output) = (tokens[0], tokens[1], tokens[3]);
            if !is_valid_secret_path(path) {
                return Err(Error::InvalidSecretPath {
                    path: path.to_string(),
                });
            }

            spec.insert(path, field, output);
        }

        Ok(spec)
    }

    fn insert(&mut self, path: &str, field: &str, output: &str) {
        let idx = match self.secrets.iter().position(|s| s.path == path) {
            Some(idx) => idx,
            None => {
                self.secrets.push(SecretMapping::new(path));
                self.secrets.len() - 1
            }
        };
        self.secrets[idx].insert(field, output);
    }

    /// Mappings for one secret path.
    pub fn get(&self, path: &str) -> Option<&SecretMapping> {
        self.secrets.iter().find(|s| s.path == path)
    }

    /// Distinct secret paths in first-seen order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.secrets.iter().map(|s| s.path.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SecretMapping> {
        self.secrets.iter()
    }

    /// Total number of output mappings across all secrets.
    pub fn len(&self) -> usize {
        self.secrets.iter().map(|s| s.fields.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl FromStr for RetrieveSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a RetrieveSpec {
    type Item = &'a SecretMapping;
    type IntoIter = std::slice::Iter<'a, SecretMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Whether `path` only uses characters allowed in a secret path.
pub fn is_valid_secret_path(path: &str) -> bool {
    SECRET_PATH.is_match(path)
}

/// Parse a retrieve spec.
pub fn parse_retrieve_spec(input: &str) -> Result<RetrieveSpec> {
    RetrieveSpec::parse(input)
}
