//! `fwdash` – FWD-Edu dashboard command line.
//!
//! Loads a layout file (device catalog plus simulated devices), decides which
//! devices belong to the FWD-Edu kit and prints the widget every service would
//! render, one JSON line per service.
//!
//! ```text
//! fwdash render layout.json [--all]
//! fwdash classify layout.json
//! fwdash schema
//! fwdash init [--force]
//! ```

mod config;
mod layout;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use tracing::{info, warn};

use fwdash_hal::{Device, DeviceCatalog, Fleet, Service};
use fwdash_types::{DashError, WidgetDescriptor};
use fwdash_widgets::{
    AssetCache, BuiltinLoader, DashboardContext, FsLoader, FwdEduClassifier,
    FwdSpecializedWidgets, Frame, ServiceWidgetHost,
};

use crate::config::Config;
use crate::layout::Layout;

#[derive(Debug, Parser)]
#[command(name = "fwdash", version, about = "FWD-Edu dashboard widget dispatch")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render every service of the FWD-Edu devices in a layout file.
    Render {
        layout: PathBuf,
        /// Render all devices, not only FWD-Edu ones.
        #[arg(long)]
        all: bool,
    },
    /// List the devices of a layout file and whether they are FWD-Edu.
    Classify { layout: PathBuf },
    /// Print the JSON schema of widget descriptors.
    Schema,
    /// Write a default `~/.fwdash/config.toml`.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the filter (default "info"); FWDASH_LOG_FORMAT=json
    // switches to newline-delimited JSON. Logs go to stderr so stdout stays
    // machine-readable.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("FWDASH_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Render { layout, all } => render(&layout, all).await,
        Command::Classify { layout } => classify(&layout),
        Command::Schema => schema(),
        Command::Init { force } => init(force),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<Config, DashError> {
    match config::load()? {
        Some(cfg) => {
            info!(path = %config::config_path().display(), "config loaded");
            Ok(cfg)
        }
        None => {
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            Ok(cfg)
        }
    }
}

fn load_layout(path: &Path) -> Result<(Layout, Fleet), DashError> {
    let layout = Layout::load(path)?;
    let fleet = layout.fleet()?;
    info!(devices = fleet.devices.len(), servers = fleet.servers.len(), "layout loaded");
    Ok((layout, fleet))
}

// ─────────────────────────────────────────────────────────────────────────────
// render
// ─────────────────────────────────────────────────────────────────────────────

async fn render(path: &Path, all: bool) -> Result<(), DashError> {
    let cfg = load_config()?;
    let classifier = FwdEduClassifier::with_pattern(&cfg.widgets.vendor_pattern)?;
    let (layout, fleet) = load_layout(path)?;
    let catalog = layout.catalog();

    let cache = Arc::new(match &cfg.asset_dir {
        Some(dir) => AssetCache::new(FsLoader::new(dir)),
        None => AssetCache::new(BuiltinLoader),
    });

    for device in &fleet.devices {
        let fwd_edu = classifier.is_fwd_edu(&catalog, device);
        if !fwd_edu && !all {
            continue;
        }
        for service in device.services() {
            let ctx = DashboardContext {
                device,
                service,
                servers: &fleet.servers,
                config: &cfg.widgets,
                specialized: &FwdSpecializedWidgets,
            };
            let frame = render_service(&ctx, &cache, &cfg).await;
            println!("{}", frame_line(device, service, fwd_edu, &frame));
        }
    }
    Ok(())
}

/// Mount a widget for one service and wait (bounded) for its artwork.
async fn render_service(ctx: &DashboardContext<'_>, cache: &Arc<AssetCache>, cfg: &Config) -> Frame {
    let mut host = ServiceWidgetHost::new(cache.clone());
    let frame = host.render(ctx);
    if !matches!(frame, Frame::Loading(_)) {
        return frame;
    }
    match tokio::time::timeout(cfg.load_timeout(), host.ready()).await {
        Ok(true) => {}
        Ok(false) => warn!(device = %ctx.device.id(), index = ctx.service.index(), "widget artwork unavailable"),
        Err(_) => warn!(
            device = %ctx.device.id(),
            index = ctx.service.index(),
            timeout_ms = cfg.load_timeout_ms,
            "timed out waiting for widget artwork"
        ),
    }
    host.render(ctx)
}

fn frame_line(device: &Device, service: &Service, fwd_edu: bool, frame: &Frame) -> serde_json::Value {
    let rendered = match frame {
        Frame::Specialized(widget) => json!({ "state": "specialized", "widget": widget }),
        Frame::Loading(spinner) => json!({ "state": "loading", "fallback": spinner }),
        Frame::Ready { widget, assets } => json!({
            "state": "ready",
            "widget": widget,
            "template": assets.template,
        }),
    };
    json!({
        "device": device.id().as_str(),
        "fwdEdu": fwd_edu,
        "service": service.index(),
        "serviceClass": format!("{:#010x}", service.class().class_id()),
        "frame": rendered,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// classify
// ─────────────────────────────────────────────────────────────────────────────

fn classify(path: &Path) -> Result<(), DashError> {
    let cfg = load_config()?;
    let classifier = FwdEduClassifier::with_pattern(&cfg.widgets.vendor_pattern)?;
    let (layout, fleet) = load_layout(path)?;
    let catalog = layout.catalog();

    println!(
        "  {} catalog entries, {} FWD-Edu product ids",
        catalog.specifications().len(),
        classifier.family_products(&catalog).len()
    );
    for device in &fleet.devices {
        let product = device
            .product_identifier()
            .map(|p| format!("{:#010x}", p.0))
            .unwrap_or_else(|| "-".to_string());
        if classifier.is_fwd_edu(&catalog, device) {
            println!("  {} {} ({})", "✓".green().bold(), device.id().as_str().bold(), product);
        } else {
            println!("  {} {} ({})", "✗".dimmed(), device.id().as_str(), product.dimmed());
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// init
// ─────────────────────────────────────────────────────────────────────────────

fn init(force: bool) -> Result<(), DashError> {
    let path = config::init(force)?;
    println!(
        "  {} Config saved to {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// schema
// ─────────────────────────────────────────────────────────────────────────────

fn schema() -> Result<(), DashError> {
    let schema = schemars::schema_for!(WidgetDescriptor);
    let raw = serde_json::to_string_pretty(&schema)
        .map_err(|e| DashError::Io(format!("failed to serialize schema: {e}")))?;
    println!("{raw}");
    Ok(())
}
