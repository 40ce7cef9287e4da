use std::path::Path;

use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use tracing::warn;
use uuid::Uuid;

use crate::services::summary_service::{Category, Overview};

/// Bar chart of the three category amounts as PNG bytes
pub fn generate_overview_chart(overview: &Overview, width: u32, height: u32) -> Result<Vec<u8>, String> {
    let bars: Vec<(Category, f64)> = overview
        .shares
        .iter()
        .map(|share| (share.category, share.amount.to_f64().unwrap_or(0.0)))
        .collect();

    let max_amount = bars.iter().map(|(_, amount)| *amount).fold(0.0, f64::max);
    if max_amount <= 0.0 {
        return Err("❌ Nothing to chart yet, there are no transactions.".to_string());
    }

    with_temp_png(|path| draw_bars(path, &bars, max_amount, width, height))
}

/// Run `draw` against a fresh temp path and return the PNG it wrote.
/// The file is removed whether or not drawing succeeded.
fn with_temp_png<F>(draw: F) -> Result<Vec<u8>, String>
where
    F: FnOnce(&Path) -> Result<(), String>,
{
    // BitMapBackend encodes PNG only when writing to a path
    let temp_file = std::env::temp_dir().join(format!("pocketwallet_chart_{}.png", Uuid::new_v4()));

    let result = draw(&temp_file).and_then(|_| {
        std::fs::read(&temp_file).map_err(|e| format!("Failed to read chart file: {}", e))
    });

    if temp_file.exists() {
        if let Err(e) = std::fs::remove_file(&temp_file) {
            warn!("Could not remove chart file {}: {}", temp_file.display(), e);
        }
    }
    result
}

fn draw_bars(path: &Path, bars: &[(Category, f64)], max_amount: f64, width: u32, height: u32) -> Result<(), String> {
    {
        let backend = BitMapBackend::new(path, (width, height));
        let root = backend.into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| format!("Failed to fill canvas: {}", e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Transaction Amounts", ("sans-serif", 32.0).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d((0u32..bars.len() as u32).into_segmented(), 0f64..max_amount * 1.1)
            .map_err(|e| format!("Failed to build chart: {}", e))?;

        let label_for = |value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(i) => bars
                .get(*i as usize)
                .map(|(category, _)| category.label().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&label_for)
            .y_desc("Amount (BDT)")
            .draw()
            .map_err(|e| format!("Failed to draw mesh: {}", e))?;

        chart
            .draw_series(bars.iter().enumerate().map(|(i, (category, amount))| {
                let (r, g, b) = category.color();
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i as u32), 0.0),
                        (SegmentValue::Exact(i as u32 + 1), *amount),
                    ],
                    RGBColor(r, g, b).filled(),
                );
                bar.set_margin(0, 0, 20, 20);
                bar
            }))
            .map_err(|e| format!("Failed to draw bars: {}", e))?;

        root.present()
            .map_err(|e| format!("Failed to render chart: {}", e))?;
    }
    Ok(())
}
