//! Command handlers.

use crate::config::ActionConfig;
use crate::sinks;
use anyhow::Context;
use dsv_client::{HttpTransport, VaultClient};
use dsv_core::{Error, MapSummary, OutputSink, RetrieveSpec, map_outputs};
use tracing::info;

/// Parse the retrieve spec, then open the configured sink and retrieve.
///
/// No output file is touched unless the retrieve rows parse.
pub async fn run<T: HttpTransport>(
    config: &ActionConfig,
    client: VaultClient<T>,
) -> anyhow::Result<MapSummary> {
    let spec = RetrieveSpec::parse(&config.retrieve)?;
    let mut sink = sinks::open(config)?;
    retrieve(config, &spec, client, sink.as_mut()).await
}

/// Fetch every secret in `spec` and emit its fields through `sink`.
pub async fn retrieve<T: HttpTransport>(
    config: &ActionConfig,
    spec: &RetrieveSpec,
    client: VaultClient<T>,
    sink: &mut dyn OutputSink,
) -> anyhow::Result<MapSummary> {
    info!("🔑 Fetching access token...");
    let session = client
        .login(&config.client_id, &config.client_secret)
        .await
        .context("authentication failed")?;

    info!(secrets = spec.paths().count(), "✨ Fetching secret(s) from DSV...");
    let summary = map_outputs(spec, &session, sink, config.set_env)
        .await
        .map_err(|err| match err {
            Error::MissingSecretData { .. } | Error::MissingSecretField { .. } | Error::Sink(_) => {
                anyhow::Error::new(err)
            }
            other => anyhow::Error::new(other).context("failed to fetch secret from DSV"),
        })?;

    info!(
        secrets = summary.secrets_fetched,
        outputs = summary.outputs_set,
        exported = summary.variables_exported,
        "Secrets retrieved"
    );
    Ok(summary)
}

/// Validate inputs and log the planned mapping without calling the vault.
pub fn dry_run(config: &ActionConfig) -> anyhow::Result<RetrieveSpec> {
    let spec = RetrieveSpec::parse(&config.retrieve)?;

    for secret in &spec {
        for mapping in &secret.fields {
            info!(
                path = %secret.path,
                field = %mapping.field,
                output = %mapping.output,
                "Would set output"
            );
        }
    }
    info!(
        server = %config.server,
        outputs = spec.len(),
        export = config.set_env,
        "Configuration is valid"
    );
    Ok(spec)
}
