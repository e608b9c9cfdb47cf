mod calc;
mod config;
mod db;
mod ipc;
mod models;

use anyhow::Context;
use config::Config;
use db::Store;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    /// Requests on stdin, responses on stdout.
    Stdio,
    /// Line protocol over TCP, one thread per connection.
    Listen,
}

fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // stdout carries responses in stdio mode, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("examprepd=info")),
        )
        .init();

    if let Err(e) = run() {
        tracing::error!(error = ?e, "examprepd failed");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mode = parse_mode(std::env::args().skip(1))?;
    let config = Config::from_env()?;
    let store = Store::open(&config.db_path)?;
    tracing::info!(
        db = %store.path().display(),
        exam_date = %config.exam_date_raw,
        ?mode,
        "examprepd ready"
    );

    match mode {
        Mode::Stdio => {
            let state = ipc::AppState {
                db: store.connect()?,
                config,
            };
            let stdin = io::stdin();
            serve_lines(&state, stdin.lock(), io::stdout())?;
            Ok(())
        }
        Mode::Listen => listen(store, config),
    }
}

fn parse_mode<I: Iterator<Item = String>>(args: I) -> anyhow::Result<Mode> {
    let mut mode = Mode::Listen;
    for arg in args {
        match arg.as_str() {
            "--stdio" => mode = Mode::Stdio,
            "--listen" => mode = Mode::Listen,
            other => anyhow::bail!("unknown argument: {other} (expected --stdio or --listen)"),
        }
    }
    Ok(mode)
}

fn listen(store: Store, config: Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", config.server_port))
        .with_context(|| format!("binding port {}", config.server_port))?;
    tracing::info!(port = config.server_port, "listening");

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                continue;
            }
        };
        let store = store.clone();
        let config = config.clone();
        thread::spawn(move || {
            let peer = stream
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_default();
            tracing::debug!(%peer, "connection opened");
            match serve_connection(&store, config, stream) {
                Ok(()) => tracing::debug!(%peer, "connection closed"),
                Err(e) => tracing::warn!(%peer, error = ?e, "connection failed"),
            }
        });
    }
    Ok(())
}

fn serve_connection(store: &Store, config: Config, stream: TcpStream) -> anyhow::Result<()> {
    let state = ipc::AppState {
        db: store.connect()?,
        config,
    };
    let reader = BufReader::new(stream.try_clone()?);
    serve_lines(&state, reader, stream)?;
    Ok(())
}

fn serve_lines<R: BufRead, W: Write>(
    state: &ipc::AppState,
    mut reader: R,
    mut writer: W,
) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        // Bytes go straight to serde_json so non-UTF-8 input is a parse error, not an I/O one.
        let resp = match serde_json::from_slice::<ipc::Request>(&buf) {
            Ok(req) => ipc::handle_request(state, req),
            Err(e) => ipc::bad_json(e),
        };
        writeln!(writer, "{resp}")?;
        writer.flush()?;
    }
    Ok(())
}
