//! Price chart rendering for alert emails

use plotters::prelude::*;

use crate::models::PricePoint;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;

/// Generate a price chart image as PNG bytes.
///
/// Renders through a temporary file because the bitmap backend draws to a
/// path; the file is read back and removed before returning.
pub fn render_price_chart(
    points: &[PricePoint],
    title: &str,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    if points.len() < 2 {
        return Err("Not enough price data to render a chart (minimum 2 points required)".to_string());
    }

    let temp_file = format!(
        "/tmp/vigil_chart_{}_{}.png",
        std::process::id(),
        chrono::Utc::now().timestamp_millis()
    );

    {
        let root = BitMapBackend::new(&temp_file, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| format!("Failed to fill canvas: {}", e))?;

        let (y_min, y_max) = price_bounds(points);
        let x_min = points[0].timestamp;
        let x_max = points[points.len() - 1].timestamp;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 30.0).into_font())
            .margin(12)
            .x_label_area_size(35)
            .y_label_area_size(55)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| format!("Failed to build chart: {}", e))?;

        chart
            .configure_mesh()
            .y_desc("Price (USD)")
            .x_desc("Date")
            .draw()
            .map_err(|e| format!("Failed to draw mesh: {}", e))?;

        chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.timestamp, p.price)),
                &BLUE,
            ))
            .map_err(|e| format!("Failed to draw series: {}", e))?;

        root.present()
            .map_err(|e| format!("Failed to render chart: {}", e))?;
    }

    let image_data =
        std::fs::read(&temp_file).map_err(|e| format!("Failed to read chart file: {}", e))?;
    let _ = std::fs::remove_file(&temp_file);

    Ok(image_data)
}

/// Y-axis range: observed min/max padded by 10%, floored at zero. A flat
/// series still gets a visible band around the price.
fn price_bounds(points: &[PricePoint]) -> (f64, f64) {
    let min_price = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max_price = points
        .iter()
        .map(|p| p.price)
        .fold(f64::NEG_INFINITY, f64::max);

    let padding = (max_price - min_price).max(1e-8) * 0.1;
    ((min_price - padding).max(0.0), max_price + padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn points(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000 + i as i64 * 3600, 0)
                    .unwrap(),
                price,
            })
            .collect()
    }

    #[test]
    fn test_too_few_points_is_an_error() {
        let err = render_price_chart(&points(&[100.0]), "Gold", 800, 400).unwrap_err();
        assert!(err.contains("Not enough price data"));
    }

    #[test]
    fn test_bounds_are_padded_and_ordered() {
        let (y_min, y_max) = price_bounds(&points(&[100.0, 110.0, 90.0]));
        assert!(y_min < 90.0);
        assert!(y_max > 110.0);
    }

    #[test]
    fn test_bounds_never_go_below_zero() {
        let (y_min, _) = price_bounds(&points(&[0.5, 10.0]));
        assert!(y_min >= 0.0);
    }

    #[test]
    fn test_flat_series_still_has_a_range() {
        let (y_min, y_max) = price_bounds(&points(&[50.0, 50.0, 50.0]));
        assert!(y_max > y_min);
    }
}
