//! Export a land rent receipt from command-line values
//!
//! ```text
//! cargo run -p receipt --example export_receipt -- [--config export.json] [--out dir] id=value...
//! RUST_LOG=receipt=debug cargo run -p receipt --example export_receipt -- ownerName="Ramesh Kumar" dateInput=2025-08-20
//! ```

use anyhow::{bail, Context};
use receipt::{
    ExportConfig, ExportOutcome, ExportPipeline, FileSink, FormView, NoticeBoard, PositionMap,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("receipt=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let mut config = ExportConfig::land_rent();
    let mut out_dir = String::from(".");
    let mut values = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config {path}"))?;
                config = ExportConfig::from_json(&json)?;
            }
            "--out" => out_dir = args.next().context("--out needs a directory")?,
            _ => match arg.split_once('=') {
                Some((id, value)) => values.push((id.to_string(), value.to_string())),
                None => bail!("expected id=value, got '{arg}'"),
            },
        }
    }

    let positions = PositionMap::land_rent_receipt();
    let mut view = FormView::from_position_map(&positions, &config.selector);
    for (id, value) in &values {
        if !view.set_value(id, value) {
            tracing::warn!(id = %id, "no such field, ignored");
        }
    }

    let mut pipeline = ExportPipeline::from_config(config, positions)?;
    let mut board = NoticeBoard::new();
    match pipeline.run(&mut view, &mut FileSink::new(&out_dir), &mut board) {
        ExportOutcome::Exported { filename, size, .. } => {
            println!("wrote {out_dir}/{filename} ({size} bytes)");
            Ok(())
        }
        ExportOutcome::Failed { reason } => bail!(reason),
    }
}
