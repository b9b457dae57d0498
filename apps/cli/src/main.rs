//! # Stockbook CLI
//!
//! ```text
//! $ STOCKBOOK_WORKBOOK=./tienda.db stockbook sale --vendor Ana CAM001:8
//! {"success":true,"data":{"saleId":"VTA-20240307-3f9a1c2e","total":"40.00",...}}
//! ```
//!
//! Exit status: 0 on success, 1 when the command failed, 2 when the
//! configuration is unusable.

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use stockbook_cli::cli::{self, Command, USAGE};
use stockbook_cli::config::AppConfig;
use stockbook_cli::response::Envelope;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("stockbook: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn try_main() -> anyhow::Result<ExitCode> {
    let config = AppConfig::from_env().context("Invalid STOCKBOOK_* configuration")?;
    stockbook_cli::init_tracing(&config.log_filter);

    let envelope = match cli::parse_args(env::args().skip(1)) {
        Ok(Command::Help) => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Ok(command) => {
            debug!(?command, "Running command");
            stockbook_cli::run(&config, command).await
        }
        Err(e) => Envelope::failure(e),
    };

    let json = serde_json::to_string(&envelope).context("Failed to encode response")?;
    println!("{json}");

    Ok(if envelope.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
