//! Compression sweep with temperature-jump ignition detection; renders the
//! two-panel temperature/pressure figure.

use std::path::Path;

use anyhow::Result;
use log::info;

use idt::{detect, plot, sweep};

fn main() -> Result<()> {
    env_logger::init();

    let cfg = sweep::SweepConfig::default();
    let output = sweep::run(&cfg)?;

    let event = detect::temperature_sweep(&output);
    match &event {
        Some(e) => info!(
            "ignition after {:.5} ms at {:.2} K",
            e.time * 1e3,
            e.temperature
        ),
        None => info!("ignition did not occur"),
    }

    let path = Path::new("ignition_temperature.svg");
    plot::render_two_panel(path, &output, event.as_ref())?;
    info!("wrote {}", path.display());
    Ok(())
}
