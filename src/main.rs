mod backend;
mod calc;
mod catalog;
mod form;
mod ipc;
mod telemetry;

use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendMode {
    Memory,
    Http,
}

impl BackendMode {
    fn as_str(self) -> &'static str {
        match self {
            BackendMode::Memory => "memory",
            BackendMode::Http => "http",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "kurumsal360d",
    about = "Sidecar daemon for the 360-degree evaluation suite",
    version
)]
struct Cli {
    /// Data source to start with; also selectable at runtime via backend.select
    #[arg(long, value_enum)]
    backend: Option<BackendMode>,
    /// Base URL of the evaluation service (http backend)
    #[arg(long)]
    base_url: Option<String>,
    /// Tracing filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_filter: String,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init(&cli.log_filter);

    let mut state = ipc::AppState::new();
    if let Some(mode) = cli.backend {
        let backend = ipc::build_backend(mode.as_str(), cli.base_url.as_deref(), &state.catalog)
            .map_err(|e| anyhow::anyhow!("cannot start {} backend: {}", mode.as_str(), e))?;
        tracing::info!(mode = backend.mode(), "backend selected");
        state.backend = Some(backend);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without an id; report and move on.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    Ok(())
}
