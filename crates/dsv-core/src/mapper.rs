//! Maps requested secret fields to CI outputs.

use crate::ports::{OutputSink, SecretStore};
use crate::retrieve::RetrieveSpec;
use crate::{Error, Result};
use tracing::debug;

/// Counters for a completed mapping run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapSummary {
    pub secrets_fetched: usize,
    pub outputs_set: usize,
    pub variables_exported: usize,
}

/// Fetch every secret named in `spec` once and emit each requested field.
///
/// Stops at the first failure. Outputs emitted before the failure stay
/// emitted.
pub async fn map_outputs<S, O>(
    spec: &RetrieveSpec,
    store: &S,
    sink: &mut O,
    export_env: bool,
) -> Result<MapSummary>
where
    S: SecretStore + ?Sized,
    O: OutputSink + ?Sized,
{
    let mut summary = MapSummary::default();

    for secret in spec {
        let document = store.fetch_secret(&secret.path).await?;
        summary.secrets_fetched += 1;

        let data = document
            .get("data")
            .and_then(|d| d.as_object())
            .ok_or_else(|| Error::MissingSecretData {
                path: secret.path.clone(),
            })?;

        for mapping in &secret.fields {
            let value = data
                .get(&mapping.field)
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::MissingSecretField {
                    field: mapping.field.clone(),
                    path: secret.path.clone(),
                })?;

            debug!(
                path = %secret.path,
                field = %mapping.field,
                output = %mapping.output,
                "Setting output"
            );
            sink.set_output(&mapping.output, value)?;
            summary.outputs_set += 1;

            if export_env {
                sink.export_variable(&mapping.output, value)?;
                summary.variables_exported += 1;
            }
        }
    }

    Ok(summary)
}
