use anyhow::Result;
use clap::Parser;
use fetch_binary::cleanup;
use fetch_binary::config::{Config, Options};
use fetch_binary::error::FetchError;
use fetch_binary::http::HttpClient;
use fetch_binary::pipeline::Orchestrator;
use fetch_binary::platform::Platform;
use fetch_binary::runtime::RealRuntime;
use std::process::ExitCode;
use std::sync::{Arc, PoisonError};

/// fetch-binary - install a prebuilt binary from a GitHub release
///
/// Guesses the asset name for this machine (`<name>-<os>-<arch>`, raw, .gz or
/// .zip) and installs the first one the release actually has.
///
/// If GITHUB_TOKEN is set, it is sent as a bearer credential.
///
/// Examples:
///   OWNER=andrioid REPO=md-social fetch-binary
///   fetch-binary --owner andrioid --repo md-social --tag v0.3.1 -o ./md-social
#[derive(Parser, Debug)]
#[command(author, version = env!("FETCH_BINARY_VERSION"), about)]
struct Cli {
    #[command(flatten)]
    options: Options,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    let config = Config::load(&runtime, &cli.options)?;
    let http_client = HttpClient::with_timeout(config.timeout)?;
    let cleanup_ctx = cleanup::new_shared();

    let cleanup_ctx_clone = Arc::clone(&cleanup_ctx);
    let ctrl_c_handler = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cleaning up...");
            cleanup_ctx_clone
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .cleanup();
            std::process::exit(130);
        }
    });

    let platform = Platform::detect();
    let orchestrator = Orchestrator::new(&runtime, &http_client, &config, cleanup_ctx);
    let result = orchestrator.run(&platform).await;

    ctrl_c_handler.abort();

    match result {
        Ok(installed) => {
            println!(
                "Downloaded {} -> {}",
                installed.candidate,
                installed.path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => match e.downcast_ref::<FetchError>() {
            Some(exhausted @ FetchError::ExhaustedCandidates { .. }) => {
                eprintln!("{}", exhausted);
                Ok(ExitCode::FAILURE)
            }
            _ => Err(e),
        },
    }
}
