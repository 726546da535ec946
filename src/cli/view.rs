// ============================================================
// Layer 1 — Console Rendering
// ============================================================
// Text stand-ins for the plots a notebook would draw:
//
//   render_image          — grayscale image as ASCII shading
//   render_probabilities  — horizontal bar chart of class probabilities
//   render_matrix         — small row-major matrix with fixed precision
//
// Pure string functions; printing happens in cli/mod.rs.

use crate::domain::{image::{ImageSample, LabelSet}, prediction::Prediction};

/// Darkest to brightest
const SHADES: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

pub fn render_image(image: &ImageSample) -> String {
    let mut out = String::with_capacity((image.width + 1) * image.height);
    for row in image.pixels.chunks(image.width.max(1)) {
        for &p in row {
            let level = ((p.clamp(0.0, 255.0) / 255.0) * (SHADES.len() - 1) as f32).round() as usize;
            out.push(SHADES[level]);
        }
        out.push('\n');
    }
    out
}

pub fn render_probabilities(prediction: &Prediction, labels: LabelSet, bar_width: usize) -> String {
    let names: Vec<String> = (0..prediction.probabilities.len())
        .map(|c| labels.name(c))
        .collect();
    let name_width = names.iter().map(|n| n.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (name, &p) in names.iter().zip(&prediction.probabilities) {
        let filled = ((p.clamp(0.0, 1.0) * bar_width as f32).round()) as usize;
        out.push_str(&format!(
            "{:>nw$} |{:<bw$}| {:.3}\n",
            name,
            "#".repeat(filled),
            p,
            nw = name_width,
            bw = bar_width,
        ));
    }
    out
}

pub fn render_matrix(values: &[f32], cols: usize, precision: usize) -> String {
    values
        .chunks(cols.max(1))
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .map(|v| format!("{:>w$.p$}", v, w = precision + 4, p = precision))
                .collect();
            format!("[{}]", cells.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
