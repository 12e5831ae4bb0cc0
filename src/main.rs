use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tower_lsp::{LspService, Server};
use tracing::info;

use stacky_language_server::logging::init_logger;
use stacky_language_server::lsp::backend::{LANGUAGE_CONFIGURATION_METHOD, StackyBackend};
use stacky_language_server::lsp::execution_provider::EngineConfig;

#[derive(Parser, Debug)]
#[command(
    name = "stacky-language-server",
    version,
    about = "Language server for the Stacky stack-based instruction language"
)]
struct Cli {
    /// Communicate over stdin/stdout (default)
    #[arg(long, conflicts_with = "socket")]
    stdio: bool,

    /// Listen on a TCP port and serve the first client that connects
    #[arg(long, value_name = "PORT")]
    socket: Option<u16>,

    /// Log filter for stderr output (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr output
    #[arg(long)]
    no_color: bool,

    /// Do not write a session log to the cache directory
    #[arg(long)]
    no_file_logging: bool,

    /// Stacky interpreter used by the `stacky.run` command
    #[arg(long, value_name = "PATH")]
    engine: Option<String>,

    /// Extra argument passed to the interpreter (repeatable)
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Milliseconds a `stacky.run` interpreter process may run before it is killed
    #[arg(long, value_name = "MS", default_value_t = 500)]
    engine_timeout_ms: u64,

    /// Process id of the editor that launched the server
    #[arg(long, value_name = "PID")]
    client_process_id: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), !cli.no_file_logging)
        .context("failed to initialize logging")?;

    info!(
        "Starting {} {} (pid {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::process::id()
    );
    if let Some(pid) = cli.client_process_id {
        info!("Launched by client process {}", pid);
    }

    let engine_config = EngineConfig::from_cli_or_env(
        cli.engine,
        cli.engine_args,
        Duration::from_millis(cli.engine_timeout_ms),
    );
    let client_process_id = cli.client_process_id;

    let (service, socket) = LspService::build(|client| {
        StackyBackend::new(client, &engine_config, client_process_id)
    })
    .custom_method(LANGUAGE_CONFIGURATION_METHOD, StackyBackend::language_configuration)
    .finish();

    match cli.socket {
        Some(port) => {
            let listener = TcpListener::bind(("127.0.0.1", port))
                .await
                .with_context(|| format!("failed to bind port {}", port))?;
            info!("Listening on 127.0.0.1:{}", port);

            let (stream, peer) = listener.accept().await.context("failed to accept connection")?;
            info!("Client connected from {}", peer);

            let (read, write) = stream.into_split();
            Server::new(read, write, socket).serve(service).await;
        }
        None => {
            let transport = if cli.stdio { "" } else { " (default transport)" };
            info!("Serving over stdio{}", transport);
            Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
                .serve(service)
                .await;
        }
    }

    info!("Language server exited");
    Ok(())
}
