//! resilient-http command line client.
//!
//! Issues a single GET or POST through `RetryClient` and prints the final
//! response. Ctrl+C cancels the call, including any pending backoff.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use http::header::CONTENT_TYPE;

use resilient_http::config::{load_config, validate_config, ClientConfig, ConfigError};
use resilient_http::http::response::read_body;
use resilient_http::lifecycle::{signals, Shutdown};
use resilient_http::observability::logging;
use resilient_http::{ReplayBody, Request, RetryClient};

#[derive(Parser)]
#[command(name = "resilient-http")]
#[command(about = "HTTP client that retries failed requests with backoff", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Overrides {
    /// Maximum number of retries after the first attempt
    #[arg(long, global = true)]
    retry_max: Option<u32>,

    /// Minimum wait between attempts in milliseconds
    #[arg(long, global = true)]
    wait_min_ms: Option<u64>,

    /// Maximum wait between attempts in milliseconds
    #[arg(long, global = true)]
    wait_max_ms: Option<u64>,

    /// Overall deadline for the call, retries included
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get { url: String },
    /// Send a POST request
    Post {
        url: String,

        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,

        /// Inline request body
        #[arg(long, conflicts_with = "file")]
        data: Option<String>,

        /// Read the request body from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Apply command line overrides and re-check the result.
fn apply_overrides(mut config: ClientConfig, overrides: &Overrides) -> Result<ClientConfig, ConfigError> {
    if let Some(retry_max) = overrides.retry_max {
        config.retry.max_retries = retry_max;
    }
    if let Some(wait_min_ms) = overrides.wait_min_ms {
        config.retry.wait_min_ms = wait_min_ms;
    }
    if let Some(wait_max_ms) = overrides.wait_max_ms {
        config.retry.wait_max_ms = wait_max_ms;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    let config = apply_overrides(config, &cli.overrides)?;

    logging::init(&config.observability)?;

    tracing::debug!(
        path = ?cli.config,
        max_retries = config.retry.max_retries,
        wait_min_ms = config.retry.wait_min_ms,
        wait_max_ms = config.retry.wait_max_ms,
        "Configuration loaded"
    );

    let client = RetryClient::from_settings(&config);

    let shutdown = Arc::new(Shutdown::new());
    signals::cancel_on_ctrl_c(shutdown.clone());

    let mut ctx = shutdown.context();
    if let Some(secs) = cli.overrides.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    let request = match cli.command {
        Commands::Get { url } => Request::new(ctx, "GET", &url, None)?,
        Commands::Post {
            url,
            content_type,
            data,
            file,
        } => {
            let body = match (data, file) {
                (Some(data), _) => Some(ReplayBody::from(data)),
                (None, Some(path)) => Some(ReplayBody::file(tokio::fs::File::open(path).await?)),
                (None, None) => None,
            };
            Request::new(ctx, "POST", &url, body)?
                .with_header(CONTENT_TYPE.as_str(), &content_type)?
        }
    };

    let response = client.execute(request).await?;

    println!("{:?} {}", response.version(), response.status());
    for (name, value) in response.headers() {
        println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    println!();

    let body = read_body(response).await?;
    println!("{}", String::from_utf8_lossy(&body));

    Ok(())
}
