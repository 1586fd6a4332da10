//! Action configuration.

use crate::commands::ActionArgs;
use dsv_core::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Resolved action configuration, built once at startup.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Tenant server.
    pub server: String,
    pub client_id: String,
    pub client_secret: String,
    /// Retrieve-spec text.
    pub retrieve: String,
    /// Export outputs to the environment file.
    pub set_env: bool,
    pub output_format: OutputFormat,
    /// Runner environment file.
    pub env_file: Option<PathBuf>,
    /// Dotenv output file for the GitLab format.
    pub output_file: Option<PathBuf>,
    /// Client identification header override.
    pub client_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Github,
    Gitlab,
}

impl OutputFormat {
    /// Default value of the client identification header.
    pub fn client_name(self) -> &'static str {
        match self {
            OutputFormat::Github => dsv_client::DEFAULT_CLIENT_NAME,
            OutputFormat::Gitlab => "gitlab-action",
        }
    }
}

impl fmt::Debug for ActionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionConfig")
            .field("server", &self.server)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("retrieve", &self.retrieve)
            .field("set_env", &self.set_env)
            .field("output_format", &self.output_format)
            .field("env_file", &self.env_file)
            .field("output_file", &self.output_file)
            .field("client_name", &self.client_name)
            .finish()
    }
}

impl ActionConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("could not read config file {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            Error::configuration(format!("could not parse config file {}: {e}", path.display()))
        })
    }

    /// Build the configuration from an optional file overlaid with arguments.
    pub fn load(args: &ActionArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(args);
        Ok(config)
    }

    /// Load and validate the configuration.
    ///
    /// A failure carries the format to report it in: the loaded one once the
    /// file parsed, otherwise the `--format` flag.
    pub fn resolve(args: &ActionArgs) -> std::result::Result<Self, (OutputFormat, Error)> {
        let config = Self::load(args).map_err(|e| (args.format.unwrap_or_default(), e))?;
        match config.validate() {
            Ok(()) => Ok(config),
            Err(e) => Err((config.output_format, e)),
        }
    }

    fn apply(&mut self, args: &ActionArgs) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut self.server, &args.server);
        set(&mut self.client_id, &args.client_id);
        set(&mut self.client_secret, &args.client_secret);
        set(&mut self.retrieve, &args.retrieve);
        if let Some(set_env) = args.set_env {
            self.set_env = set_env;
        }
        if let Some(format) = args.format {
            self.output_format = format;
        }
        if args.env_file.is_some() {
            self.env_file = args.env_file.clone();
        }
        if args.output_file.is_some() {
            self.output_file = args.output_file.clone();
        }
        if args.client_name.is_some() {
            self.client_name = args.client_name.clone();
        }
    }

    /// Check every required input before any network call is made.
    pub fn validate(&self) -> Result<()> {
        if self.server.is_empty() {
            return Err(Error::configuration("server must be specified"));
        }
        let labels: Vec<&str> = self.server.split('.').collect();
        if labels.len() < 3 || labels.iter().any(|l| l.is_empty()) {
            return Err(Error::configuration(format!(
                "bad server input: '{}'",
                self.server
            )));
        }
        if self.client_id.is_empty() {
            return Err(Error::configuration("client id must be specified"));
        }
        if self.client_secret.is_empty() {
            return Err(Error::configuration("client secret must be specified"));
        }
        if self.retrieve.trim().is_empty() {
            return Err(Error::configuration("retrieve must be specified"));
        }
        if self.set_env && self.env_file.is_none() {
            return Err(Error::configuration(
                "environment file is not defined: set GITHUB_ENV or --env-file",
            ));
        }
        if self.output_format == OutputFormat::Gitlab && self.output_file.is_none() {
            return Err(Error::configuration(
                "gitlab output requires an output file: set DSV_OUTPUT_FILE or --output-file",
            ));
        }
        Ok(())
    }

    /// Value sent in the client identification header.
    pub fn client_name(&self) -> &str {
        self.client_name
            .as_deref()
            .unwrap_or_else(|| self.output_format.client_name())
    }
}
