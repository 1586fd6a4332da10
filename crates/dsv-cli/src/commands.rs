//! CLI argument definitions.

use crate::config::OutputFormat;
use clap::{Args, builder::BoolishValueParser};
use std::path::PathBuf;

/// Inputs accepted as flags or, in CI, as environment variables.
#[derive(Args, Debug, Default)]
pub struct ActionArgs {
    /// YAML file providing defaults for any of the inputs below
    #[arg(long, env = "DSV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tenant server, e.g. mytenant.secretsvaultcloud.com
    #[arg(long, env = "DSV_SERVER")]
    pub server: Option<String>,

    /// Client ID
    #[arg(long, env = "DSV_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret
    #[arg(long, env = "DSV_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Rows of `<secret path> <secret data key> as <output key>`
    #[arg(long, env = "DSV_RETRIEVE")]
    pub retrieve: Option<String>,

    /// Also export every output to the runner environment file
    #[arg(
        long,
        env = "DSV_SET_ENV",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub set_env: Option<bool>,

    /// CI output convention
    #[arg(long, value_enum, env = "DSV_OUTPUT_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Runner environment file
    #[arg(long, env = "GITHUB_ENV")]
    pub env_file: Option<PathBuf>,

    /// Dotenv file receiving outputs in GitLab format
    #[arg(long, env = "DSV_OUTPUT_FILE")]
    pub output_file: Option<PathBuf>,

    /// Value of the client identification header
    #[arg(long, env = "DSV_CLIENT_NAME")]
    pub client_name: Option<String>,
}
