//! `skinfit` terminal entry point.
//!
//! `skinfit` runs the compatibility wizard; `skinfit review` runs the product
//! review flow.

use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::io::BufReader;

use skinfit_client::shell::{ReviewShell, WizardShell};
use skinfit_client::{ClientConfig, CompatibilityChecker, HttpBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("invalid configuration")?;
    skinfit_observability::init_with(config.log_format);

    let backend = Arc::new(HttpBackend::new(&config)?);
    tracing::info!(api_url = %backend.api_url(), "starting skinfit");

    let input = BufReader::new(tokio::io::stdin());
    let out = std::io::stdout();

    match std::env::args().nth(1).as_deref() {
        None | Some("check") => {
            let checker = CompatibilityChecker::with_backend(backend);
            let mut shell = WizardShell::new(checker, out);
            shell.run(input).await
        }
        Some("review") => {
            let mut shell = ReviewShell::new(backend, out);
            shell.run(input).await
        }
        Some(other) => bail!("unknown mode `{other}`; expected `check` or `review`"),
    }
}
