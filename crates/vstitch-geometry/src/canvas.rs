//! Square canvas that fits every camera plot.

use vstitch_models::CameraPlot;

/// Side length in metres of a square canvas, centred on the origin camera,
/// that contains every plotted vertex.
///
/// Returns `None` when there is nothing to draw.
pub fn canvas_span(plots: &[CameraPlot]) -> Option<f64> {
    let extreme = plots
        .iter()
        .flat_map(|p| p.vertices.iter())
        .map(|v| v.x.abs().max(v.y.abs()))
        .filter(|m| m.is_finite())
        .fold(0.0_f64, f64::max);

    (extreme > 0.0).then_some(2.0 * extreme)
}
