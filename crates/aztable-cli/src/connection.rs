//! Client construction from connection flags.

use anyhow::{Context, Result};
use tracing::debug;

use aztable_core::{ServiceEndpoint, StorageCredentials};
use aztable_rest::{ClientConfig, TableClient};

use crate::cli::ConnectionArgs;

impl ConnectionArgs {
    /// Build a signed client, failing before any I/O on bad settings.
    pub fn client(&self) -> Result<TableClient> {
        let account = self
            .account
            .as_deref()
            .context("No account given. Pass --account or set AZTABLE_ACCOUNT.")?;
        let key = self
            .key
            .as_deref()
            .context("No account key given. Pass --key or set AZTABLE_KEY.")?;

        let credentials = StorageCredentials::new(account, key).context("Invalid credentials")?;

        let endpoint = self
            .endpoint
            .as_deref()
            .map(ServiceEndpoint::new)
            .transpose()
            .context("Invalid endpoint")?;

        debug!(account = %credentials.account(), endpoint = ?endpoint, "connecting");

        let config = ClientConfig {
            endpoint,
            ..Default::default()
        };
        TableClient::with_config(&credentials, config).context("Failed to create client")
    }
}
