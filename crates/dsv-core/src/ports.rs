//! Port traits.
//!
//! These traits define the interfaces between the output mapper and the
//! adapters that talk to the vault and to the CI runner.

use crate::Result;
use async_trait::async_trait;

/// Untyped secret document as returned by the vault.
pub type SecretDocument = serde_json::Value;

/// Source of secret documents, already authenticated.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the full secret document stored at `path`.
    async fn fetch_secret(&self, path: &str) -> Result<SecretDocument>;
}

/// CI-runner channel for named outputs.
pub trait OutputSink {
    /// Emit a named step output.
    fn set_output(&mut self, name: &str, value: &str) -> Result<()>;

    /// Export a variable to later pipeline steps.
    fn export_variable(&mut self, name: &str, value: &str) -> Result<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        (**self).set_output(name, value)
    }

    fn export_variable(&mut self, name: &str, value: &str) -> Result<()> {
        (**self).export_variable(name, value)
    }
}

/// A single emitted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub name: String,
    pub value: String,
}

impl OutputRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `NAME=value` line as written to environment and dotenv files.
    pub fn to_env_line(&self) -> String {
        format!("{}={}\n", self.name, self.value)
    }
}

/// In-memory sink that records everything it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub outputs: Vec<OutputRecord>,
    pub variables: Vec<OutputRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for MemorySink {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        self.outputs.push(OutputRecord::new(name, value));
        Ok(())
    }

    fn export_variable(&mut self, name: &str, value: &str) -> Result<()> {
        self.variables.push(OutputRecord::new(name, value));
        Ok(())
    }
}
