//! Sign command implementation: shows what a query string signs to, offline.

use crate::api::Signer;
use crate::config::Config;
use crate::format::Formatter;
use anyhow::{Context, Result};

/// Prints the string-to-sign and signature for a raw query.
pub struct SignCommand {
    config: Config,
}

impl SignCommand {
    /// Creates a new sign command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Signs `query` with the configured endpoint and secret key.
    pub fn execute(&self, query: &str) -> Result<String> {
        self.config.validate()?;

        let signer = Signer::new(&self.config.endpoint, self.config.credentials.clone())
            .context("Failed to create signer")?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_signature(&signer.string_to_sign(query), &signer.sign(query)))
    }
}
