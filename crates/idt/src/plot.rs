//! Figure rendering with plotters (SVG output).
//!
//! Uses the SVG backend to avoid system font dependencies. Two figure
//! layouts: a two-panel temperature/pressure view and a four-panel view
//! that adds the CO2 history and a text summary of the detected event.

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::path::Path;

use crate::detect::IgnitionEvent;
use crate::sweep::SweepOutput;
use gas::ONE_ATM;

/// Padded y-range over a family of sampled series.
fn value_range<'a>(series: impl Iterator<Item = &'a [f64]>) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for s in series {
        for &v in s {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = (0.05 * (hi - lo)).max(1e-12 + 0.05 * hi.abs());
    (lo - pad, hi + pad)
}

/// Draw every trajectory of one quantity into `area`, with an optional
/// hollow-circle ignition marker at `(t, y)` and its label offset.
fn draw_series_panel(
    area: &DrawingArea<SVGBackend, Shift>,
    title: &str,
    y_desc: &str,
    times: &[f64],
    series: &[Vec<f64>],
    color: &RGBColor,
    marker: Option<(f64, f64, f64)>,
) -> Result<()> {
    let t_max = match times.last() {
        Some(&t) if t > 0.0 => t,
        _ => 1.0,
    };
    let (y_lo, y_hi) = value_range(series.iter().map(Vec::as_slice));

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 16))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..t_max, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc(y_desc)
        .draw()?;

    for values in series {
        chart.draw_series(LineSeries::new(
            times.iter().copied().zip(values.iter().copied()),
            color,
        ))?;
    }

    if let Some((t, y, label_offset)) = marker {
        chart.draw_series(std::iter::once(Circle::new(
            (t, y),
            6,
            BLACK.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            "Ignition Point",
            (t + label_offset, y),
            ("sans-serif", 12).into_font().color(&BLACK),
        )))?;
    }

    Ok(())
}

fn draw_text_lines(
    area: &DrawingArea<SVGBackend, Shift>,
    lines: &[String],
    origin: (i32, i32),
) -> Result<()> {
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(
            line.clone(),
            (origin.0, origin.1 + i as i32 * 22),
            ("sans-serif", 14).into_font().color(&BLACK),
        ))?;
    }
    Ok(())
}

fn summary_lines(event: Option<&IgnitionEvent>) -> Vec<String> {
    match event {
        Some(e) => {
            let mut lines = vec![
                format!("Ignition Delay Time: {:.5} ms", e.time * 1e3),
                format!("Ignition Temperature: {:.2} K", e.temperature),
            ];
            if let Some(x) = e.co2_fraction {
                lines.push(format!("CO2 Mole Fraction: {x:.4}"));
            }
            lines
        }
        None => vec!["Ignition did not occur.".to_owned()],
    }
}

fn temperatures(output: &SweepOutput) -> Vec<Vec<f64>> {
    output
        .trajectories
        .iter()
        .map(|t| t.temperatures.clone())
        .collect()
}

fn pressures_atm(output: &SweepOutput) -> Vec<Vec<f64>> {
    output
        .trajectories
        .iter()
        .map(|t| t.pressures.iter().map(|p| p / ONE_ATM).collect())
        .collect()
}

fn co2_fractions(output: &SweepOutput) -> Vec<Vec<f64>> {
    output
        .trajectories
        .iter()
        .map(|t| t.co2_fractions.clone())
        .collect()
}

/// Side-by-side temperature and pressure panels, with the ignition point
/// marked on the temperature panel and a text summary beneath it.
pub fn render_two_panel(
    path: &Path,
    output: &SweepOutput,
    event: Option<&IgnitionEvent>,
) -> Result<()> {
    let root = SVGBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    let marker = event.map(|e| (e.time, e.temperature, 0.0005));
    draw_series_panel(
        &panels[0],
        "Temperature Change with Time",
        "Temperature (K)",
        &output.times,
        &temperatures(output),
        &RED,
        marker,
    )?;
    draw_text_lines(&panels[0], &summary_lines(event), (160, 545))?;

    draw_series_panel(
        &panels[1],
        "Pressure Change with Time",
        "Pressure (atm)",
        &output.times,
        &pressures_atm(output),
        &BLUE,
        None,
    )?;

    root.present()?;
    Ok(())
}

/// Four-panel layout: temperature, pressure, CO2 mole fraction and a text
/// summary. The pressure panel is drawn only when ignition was detected.
pub fn render_four_panel(
    path: &Path,
    output: &SweepOutput,
    event: Option<&IgnitionEvent>,
) -> Result<()> {
    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));

    let marker = event.map(|e| (e.time, e.temperature, 0.0001));
    draw_series_panel(
        &panels[0],
        "Temperature Change with Time",
        "Temperature (K)",
        &output.times,
        &temperatures(output),
        &RED,
        marker,
    )?;

    if event.is_some() {
        draw_series_panel(
            &panels[1],
            "Pressure Change with Time",
            "Pressure (atm)",
            &output.times,
            &pressures_atm(output),
            &BLUE,
            None,
        )?;
    }

    draw_series_panel(
        &panels[2],
        "CO2 Mole Fraction Change with Time",
        "CO2 Mole Fraction",
        &output.times,
        &co2_fractions(output),
        &GREEN,
        None,
    )?;

    draw_text_lines(&panels[3], &summary_lines(event), (60, 170))?;

    root.present()?;
    Ok(())
}
