// src/visualisation.rs

use crate::field::ScalarField2D;
use plotters::prelude::*;

/// Map a height to a grey level using a *local* min/max, so shallow relief
/// is still visible.
///
/// min maps to black, max to white.
fn height_to_color(h: f32, min_h: f32, max_h: f32) -> RGBColor {
    // Protect against min ≈ max (e.g. a perfectly flat field)
    let mut lo = min_h;
    let mut hi = max_h;
    if !lo.is_finite() || !hi.is_finite() || (hi - lo).abs() < 1e-9 {
        lo = 0.0;
        hi = 1.0;
    }

    let x = ((h - lo) / (hi - lo)).clamp(0.0, 1.0);
    let g = (255.0 * x) as u8;
    RGBColor(g, g, g)
}

/// Save a heightfield as a PNG plot with axes and labels.
/// - x/y axes are cell indices
/// - grey level encodes height (black ≈ min, white ≈ max)
pub fn save_height_plot(
    field: &ScalarField2D,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let nx = field.nx() as i32;
    let ny = field.ny() as i32;

    // First pass: find min/max height
    let mut min_h = f32::INFINITY;
    let mut max_h = f32::NEG_INFINITY;
    for &v in field.values() {
        if v.is_finite() {
            if v < min_h {
                min_h = v;
            }
            if v > max_h {
                max_h = v;
            }
        }
    }
    if !min_h.is_finite() || !max_h.is_finite() {
        min_h = 0.0;
        max_h = 1.0;
    }

    // Size of the output image in pixels
    let root = BitMapBackend::new(filename, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(40)
        .caption(
            "reconstructed heightfield (black = min, white = max)",
            ("sans-serif", 20),
        )
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0..nx, 0..ny)?;

    chart
        .configure_mesh()
        .x_desc("x (cell index)")
        .y_desc("y (cell index)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // Draw one shaded rectangle per cell
    chart.draw_series((0..ny).flat_map(|i| {
        (0..nx).map(move |j| {
            let h = field.get(i as usize, j as usize);
            let color = height_to_color(h, min_h, max_h);
            Rectangle::new([(j, i), (j + 1, i + 1)], color.filled())
        })
    }))?;

    Ok(())
}
