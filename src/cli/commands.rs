use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;

use crate::dispatcher::{Dispatcher, RequestMatch};
use crate::manifest::{load_manifest, HandlerRegistry, Manifest};
use crate::runtime_config::DispatchConfig;
use crate::server::{Reply, Request};

/// Command-line interface for brrtdispatch
///
/// Inspects route manifests and shows how requests would be dispatched,
/// without invoking any handler.
#[derive(Debug, Parser)]
#[command(name = "brrtdispatch")]
#[command(about = "Inspect action manifests and dispatch decisions", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the actions declared in a manifest
    Routes {
        /// Path to the manifest (YAML or JSON)
        #[arg(short, long, env = "BRRTD_MANIFEST")]
        manifest: PathBuf,

        /// Print action metadata as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show which action a request would be dispatched to
    Resolve {
        /// Path to the manifest (YAML or JSON)
        #[arg(short, long, env = "BRRTD_MANIFEST")]
        manifest: PathBuf,

        /// HTTP method
        #[arg(long, default_value = "GET")]
        method: String,

        /// Request target, including any query string
        #[arg(short, long)]
        path: String,

        /// Request Content-Type header
        #[arg(long)]
        content_type: Option<String>,

        /// Request Accept header
        #[arg(long)]
        accept: Option<String>,

        /// Send as a gRPC call (POST, application/grpc)
        #[arg(long, default_value_t = false, conflicts_with_all = ["websocket", "content_type"])]
        grpc: bool,

        /// Send as a WebSocket upgrade
        #[arg(long, default_value_t = false)]
        websocket: bool,

        /// Print the match as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Execute the CLI command, writing results to stdout
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or bound, or if no
/// action matches the request given to `resolve`.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(cli, &mut out)
}

/// Execute the CLI command, writing results to `out`
pub fn run_with(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match cli.command {
        Commands::Routes { manifest, json } => {
            let dispatcher = inspection_dispatcher(&load_manifest(&manifest)?)?;
            let metadata = dispatcher.metadata();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&metadata)?)?;
            } else {
                for action in &metadata {
                    let params: Vec<&str> =
                        action.parameters.iter().map(|p| p.name.as_str()).collect();
                    writeln!(
                        out,
                        "{:<10} {:<40} {} ({})",
                        action.dispatch_mechanism,
                        action.path,
                        action.name,
                        params.join(", ")
                    )?;
                }
            }
            Ok(())
        }
        Commands::Resolve {
            manifest,
            method,
            path,
            content_type,
            accept,
            grpc,
            websocket,
            json,
        } => {
            let dispatcher = inspection_dispatcher(&load_manifest(&manifest)?)?;
            let request = build_request(&method, &path, content_type, accept, grpc, websocket)?;
            let resolved = dispatcher.resolve(&request)?;
            let m = &resolved.request_match;
            let report = ResolveReport {
                action: resolved.action.action().name(),
                request_match: m,
            };
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                let params: Vec<String> = m
                    .params()
                    .params()
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                writeln!(out, "action:   {}", report.action)?;
                writeln!(out, "pattern:  {}", m.path_pattern)?;
                writeln!(out, "params:   {}", params.join(" "))?;
                writeln!(out, "accepts:  {}", m.accepted_media_range)?;
                writeln!(out, "produces: {}", m.response_content_type)?;
                writeln!(out, "charset:  {}", m.request_charset_match)?;
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    action: &'a str,
    #[serde(flatten)]
    request_match: &'a RequestMatch,
}

/// Bind a manifest to placeholder handlers that refuse to run
fn inspection_dispatcher(manifest: &Manifest) -> anyhow::Result<Dispatcher> {
    let mut handlers = HandlerRegistry::new();
    for decl in &manifest.actions {
        handlers.register_handler(decl.handler_name(), |_: Vec<Value>| -> anyhow::Result<Reply> {
            anyhow::bail!("handlers are not invoked during inspection")
        });
    }
    let builder = Dispatcher::builder().config(DispatchConfig::from_env());
    handlers
        .bind(manifest, builder)
        .context("failed to bind manifest")
}

fn build_request(
    method: &str,
    target: &str,
    content_type: Option<String>,
    accept: Option<String>,
    grpc: bool,
    websocket: bool,
) -> anyhow::Result<Request> {
    let method = if grpc {
        http::Method::POST
    } else if websocket {
        http::Method::GET
    } else {
        http::Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .with_context(|| format!("invalid method `{method}`"))?
    };

    let mut request = Request::new(method, target);
    let content_type = if grpc {
        Some("application/grpc".to_string())
    } else {
        content_type
    };
    if let Some(content_type) = content_type {
        request = request.with_header("content-type", content_type);
    }
    if let Some(accept) = accept {
        request = request.with_header("accept", accept);
    }
    if websocket {
        request = request
            .with_header("connection", "Upgrade")
            .with_header("upgrade", "websocket");
    }
    Ok(request)
}
