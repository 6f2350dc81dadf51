use std::io::Read;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fitbox::layout::{Document, Style};
use fitbox::{AppConfig, EventBus, FitBoxRegistry, CHANGE_EVENT};

#[derive(Debug, Serialize)]
struct Report {
    font_size: Option<f64>,
    need_truncate: bool,
    width: f64,
    height: f64,
    text: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting fitbox v{}", env!("CARGO_PKG_VERSION"));

    let text = match config.text.clone() {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            buf.trim_end_matches('\n').to_string()
        }
    };

    info!(
        "Fitting {} chars into {}x{} ({:?}, start {}px)",
        text.chars().count(),
        config.width,
        config.height,
        config.font,
        config.font_size
    );

    let document = Document::new();
    let container = document.create_container(
        text,
        Style::new(config.width, config.height, config.font_size)
            .with_font(config.font)
            .with_line_height(config.line_height),
    );
    let events = EventBus::default();
    let mut changes = events.subscribe_changes();

    let local = Rc::new(LocalSet::new());
    let need_truncate = local
        .run_until(async {
            let mut registry = FitBoxRegistry::new(document.clone(), events.clone())
                .with_task_set(local.clone());
            let instance = registry.attach_with_config(container, config.options.clone())?;
            let need_truncate = instance.borrow().need_truncate();
            anyhow::Ok(need_truncate)
        })
        .await?;

    loop {
        match changes.try_recv() {
            Ok(change) => println!("{CHANGE_EVENT} {}", serde_json::to_string(&change)?),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!("Skipped {skipped} change events");
            }
        }
    }

    let rendered = document.rendered_size(container);
    let report = Report {
        font_size: document.font_size(container),
        need_truncate,
        width: rendered.map(|size| size.width).unwrap_or_default(),
        height: rendered.map(|size| size.height).unwrap_or_default(),
        text: document.text_content(container),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
