//! CI output sinks.
//!
//! GitHub outputs are workflow commands on stdout; GitLab outputs are
//! `NAME=value` rows in a dotenv report file. Both formats can additionally
//! export variables to the runner environment file.

use crate::config::{ActionConfig, OutputFormat};
use dsv_core::{Error, OutputRecord, OutputSink, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// How an [`EnvFile`] writes values that span several lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Multiline {
    /// `NAME<<DELIM` block, as read by the GitHub runner.
    Heredoc,
    /// The format has no multi-line form.
    Reject,
}

/// Append-only `NAME=value` file, held open for the whole run.
#[derive(Debug)]
pub struct EnvFile {
    path: PathBuf,
    file: File,
    multiline: Multiline,
}

impl EnvFile {
    /// Open the runner environment file.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, Multiline::Heredoc)
    }

    /// Open a GitLab dotenv report file.
    pub fn dotenv(path: &Path) -> Result<Self> {
        Self::open_with(path, Multiline::Reject)
    }

    fn open_with(path: &Path, multiline: Multiline) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                Error::sink(format!(
                    "could not open environment file {}: {e}",
                    path.display()
                ))
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            multiline,
        })
    }

    pub fn append(&mut self, name: &str, value: &str) -> Result<()> {
        let entry = if value.contains(['\n', '\r']) {
            match self.multiline {
                Multiline::Heredoc => heredoc(name, value),
                Multiline::Reject => {
                    return Err(Error::sink(format!(
                        "value of {name} spans multiple lines and cannot be written to {}",
                        self.path.display()
                    )));
                }
            }
        } else {
            OutputRecord::new(name, value).to_env_line()
        };

        self.file.write_all(entry.as_bytes()).map_err(|e| {
            Error::sink(format!(
                "could not update environment file {}: {e}",
                self.path.display()
            ))
        })
    }
}

/// `NAME<<DELIM` block whose delimiter never occurs in `value`.
fn heredoc(name: &str, value: &str) -> String {
    let delimiter = loop {
        let candidate = format!("ghadelimiter_{}", Uuid::new_v4());
        if !value.contains(&candidate) {
            break candidate;
        }
    };
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

fn export(env: Option<&mut EnvFile>, name: &str, value: &str) -> Result<()> {
    env.ok_or_else(|| Error::sink("environment file is not defined"))?
        .append(name, value)
}

/// Escape workflow-command data.
fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow-command property value.
fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// GitHub Actions sink writing workflow commands.
pub struct GithubSink<W> {
    out: W,
    env: Option<EnvFile>,
}

impl<W: Write> GithubSink<W> {
    pub fn new(out: W, env: Option<EnvFile>) -> Self {
        Self { out, env }
    }
}

impl<W: Write> OutputSink for GithubSink<W> {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        writeln!(
            self.out,
            "::set-output name={}::{}",
            escape_property(name),
            escape_data(value)
        )
        .map_err(|e| Error::sink(format!("could not write output {name}: {e}")))
    }

    fn export_variable(&mut self, name: &str, value: &str) -> Result<()> {
        export(self.env.as_mut(), name, value)
    }
}

/// GitLab sink writing outputs to a dotenv report file.
pub struct GitlabSink {
    dotenv: EnvFile,
    env: Option<EnvFile>,
}

impl GitlabSink {
    pub fn new(dotenv: EnvFile, env: Option<EnvFile>) -> Self {
        Self { dotenv, env }
    }
}

impl OutputSink for GitlabSink {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        self.dotenv.append(name, value)
    }

    fn export_variable(&mut self, name: &str, value: &str) -> Result<()> {
        export(self.env.as_mut(), name, value)
    }
}

/// Open the sink selected by `config`.
///
/// The environment file is only opened when exporting is enabled.
pub fn open(config: &ActionConfig) -> Result<Box<dyn OutputSink>> {
    let env = match (&config.env_file, config.set_env) {
        (Some(path), true) => Some(EnvFile::open(path)?),
        _ => None,
    };

    match config.output_format {
        OutputFormat::Github => Ok(Box::new(GithubSink::new(io::stdout(), env))),
        OutputFormat::Gitlab => {
            let path = config
                .output_file
                .as_deref()
                .ok_or_else(|| Error::configuration("gitlab output requires an output file"))?;
            Ok(Box::new(GitlabSink::new(EnvFile::dotenv(path)?, env)))
        }
    }
}

/// Write `err` to the error channel of `format`.
pub fn write_error<W: Write>(
    out: &mut W,
    format: OutputFormat,
    err: &anyhow::Error,
) -> io::Result<()> {
    let message = format!("{err:#}");
    match format {
        OutputFormat::Github => writeln!(out, "::error::{}", escape_data(&message)),
        OutputFormat::Gitlab => writeln!(out, "ERROR: {message}"),
    }
}

/// Report a fatal error on the channel the runner reads.
pub fn report_error(format: OutputFormat, err: &anyhow::Error) {
    let result = match format {
        OutputFormat::Github => write_error(&mut io::stdout(), format, err),
        OutputFormat::Gitlab => write_error(&mut io::stderr(), format, err),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "could not report failure: {err:#}");
    }
}
