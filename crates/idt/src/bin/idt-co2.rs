//! Compression sweep with CO2-buildup ignition detection; renders the
//! four-panel figure including the CO2 history.

use std::path::Path;

use anyhow::Result;
use log::info;

use idt::{detect, plot, sweep};

fn main() -> Result<()> {
    env_logger::init();

    let cfg = sweep::SweepConfig::default();
    let output = sweep::run(&cfg)?;

    let event = detect::co2_sweep(&output);
    match &event {
        Some(e) => info!(
            "ignition after {:.5} ms at {:.2} K, X_CO2 = {:.4}",
            e.time * 1e3,
            e.temperature,
            e.co2_fraction.unwrap_or(0.0)
        ),
        None => info!("ignition did not occur"),
    }

    let path = Path::new("ignition_co2.svg");
    plot::render_four_panel(path, &output, event.as_ref())?;
    info!("wrote {}", path.display());
    Ok(())
}
