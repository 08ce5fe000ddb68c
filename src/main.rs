use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tincan::commands::{self, TerminalPrompt};
use tincan::config::{Settings, WebConfig};
use tincan::infrastructure::storage;
use tincan::services::storage::S3StorageService;
use tincan::{AppState, create_app};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "tincan",
    version,
    about = "TinCan - Simple file transfer via S3",
    long_about = "TinCan allows you to upload files to S3 from one machine and download them from another."
)]
struct Cli {
    /// Path to a tincan.yaml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a file to S3
    Upload {
        file: PathBuf,
        /// Object key to store the file under (defaults to the file name)
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Download a file from S3
    Download {
        name: String,
        /// Local destination (defaults to the file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List files in S3 bucket
    List,
    /// Delete a single file from S3
    Delete { name: String },
    /// Remove all files from S3 bucket
    Clean,
    /// Start web interface
    Web {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr so command output on stdout stays clean.
    let default_filter = if cli.verbose {
        "tincan=debug,tower_http=debug"
    } else if matches!(cli.command, Command::Web { .. }) {
        "tincan=info,tower_http=info"
    } else {
        "tincan=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut out = std::io::stdout();
    let mut prompt = TerminalPrompt;
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Upload { file, key } => {
            let storage = connect(config_path).await?;
            commands::upload::run(storage.as_ref(), &file, key.as_deref(), &mut out).await
        }
        Command::Download { name, output } => {
            let storage = connect(config_path).await?;
            commands::download::run(
                storage.as_ref(),
                &name,
                output.as_deref(),
                &mut out,
                &mut prompt,
            )
            .await
        }
        Command::List => {
            let storage = connect(config_path).await?;
            commands::list::run(storage.as_ref(), &mut out).await
        }
        Command::Delete { name } => {
            let storage = connect(config_path).await?;
            commands::delete::run(storage.as_ref(), &name, &mut out, &mut prompt).await
        }
        Command::Clean => {
            let storage = connect(config_path).await?;
            commands::clean::run(storage.as_ref(), &mut out, &mut prompt).await
        }
        Command::Web { port } => {
            let state = AppState {
                storage: connect(config_path).await?,
                config: WebConfig::from_env(),
            };
            run_web_server(state, port).await
        }
        Command::Version => commands::version::run(&mut out),
    }
}

/// Resolves configuration and builds the storage client. Configuration
/// problems surface here, before any network call.
async fn connect(config_path: Option<&Path>) -> anyhow::Result<Arc<S3StorageService>> {
    let settings = Settings::load(config_path)?;
    debug!("Resolved settings: {:?}", settings);
    Ok(storage::setup_storage(&settings).await)
}

async fn run_web_server(state: AppState, port: u16) -> anyhow::Result<()> {
    info!(
        "🛡️  Web Config: bucket={} max upload={}MB",
        state.storage.bucket(),
        state.config.max_upload_size / 1024 / 1024
    );

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    let app = create_app(state).layer(trace_layer);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("TinCan web interface starting on http://localhost:{}", port);
    info!("📖 Swagger UI documentation: http://localhost:{}/swagger-ui", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
