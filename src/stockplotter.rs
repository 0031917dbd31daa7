use std::ops::Range;

use chrono::{Duration, NaiveDate};
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use plotters::{drawing::DrawingAreaErrorKind, prelude::*};

use crate::{config::Config, error::ChartError, timeseries::PriceTable};

pub const CHART_TITLE: &str = "Historical Stock Prices of Major Banks and Hedge Funds";
pub const X_DESC: &str = "Date";
pub const Y_DESC: &str = "Closing Price (USD)";

/// Turns a price table into an encoded image.
pub trait ChartRenderer {
    fn render(&self, table: &PriceTable) -> Result<Vec<u8>, ChartError>;
}

pub struct StockPlotter {
    img_width: u32,
    img_height: u32,
}

impl StockPlotter {
    pub fn new(img_width: u32, img_height: u32) -> Self {
        StockPlotter {
            img_width,
            img_height,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        StockPlotter::new(config.img_width, config.img_height)
    }

    /// Draws every non-empty series as one labelled line on a shared chart
    /// and returns the raw RGB pixels.
    fn draw(&self, table: &PriceTable) -> Result<Vec<u8>, ChartError> {
        let (x_range, y_range) = axis_ranges(table).ok_or(ChartError::NoData)?;
        let mut buffer = vec![0u8; self.img_width as usize * self.img_height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.img_width, self.img_height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(CHART_TITLE, ("sans-serif", 28).into_font())
                .margin(15)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(x_range, y_range)
                .map_err(draw_err)?;

            chart
                .configure_mesh()
                .x_desc(X_DESC)
                .y_desc(Y_DESC)
                .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
                .draw()
                .map_err(draw_err)?;

            for (idx, series) in table.iter().filter(|s| !s.is_empty()).enumerate() {
                let color = Palette99::pick(idx).to_rgba();
                chart
                    .draw_series(LineSeries::new(series.iter(), &color))
                    .map_err(draw_err)?
                    .label(series.symbol.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            }

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(draw_err)?;

            root.present().map_err(draw_err)?;
        }
        Ok(buffer)
    }
}

impl ChartRenderer for StockPlotter {
    fn render(&self, table: &PriceTable) -> Result<Vec<u8>, ChartError> {
        let pixels = self.draw(table)?;
        encode_png(&pixels, self.img_width, self.img_height)
    }
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Date and price extents shared by all lines, with some headroom on the
/// price axis.
pub fn axis_ranges(table: &PriceTable) -> Option<(Range<NaiveDate>, Range<f64>)> {
    let (first, mut last) = table.date_span()?;
    let (min_close, max_close) = table.close_span()?;

    if last <= first {
        last = first + Duration::days(1);
    }

    let padding = (max_close - min_close).max(1e-8) * 0.1;
    let y_min = (min_close - padding).max(0.0);
    let y_max = max_close + padding;

    Some((first..last, y_min..y_max))
}

/// Encodes an RGB8 pixel buffer as PNG.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(pixels, width, height, ColorType::Rgb8)
        .map_err(|e| ChartError::Encode(e.to_string()))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::PriceSeries;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_table() -> PriceTable {
        let mut table = PriceTable::new();
        table.insert(PriceSeries::from_entries(
            "JPM",
            (0..60).map(|i| (day(2024, 1, 1) + Duration::days(i), 170.0 + i as f64)),
        ));
        table.insert(PriceSeries::from_entries(
            "GS",
            (0..60).map(|i| (day(2024, 1, 1) + Duration::days(i), 380.0 - i as f64)),
        ));
        table
    }

    #[test]
    fn empty_table_has_nothing_to_plot() {
        let plotter = StockPlotter::new(200, 100);
        assert!(matches!(plotter.render(&PriceTable::new()), Err(ChartError::NoData)));
    }

    #[test]
    fn ranges_cover_all_series_with_headroom() {
        let (x, y) = axis_ranges(&sample_table()).unwrap();
        assert_eq!(x, day(2024, 1, 1)..day(2024, 2, 29));
        assert!(y.start < 170.0 && y.start >= 0.0);
        assert!(y.end > 380.0);
    }

    #[test]
    fn single_point_still_gets_a_usable_range() {
        let mut table = PriceTable::new();
        table.insert(PriceSeries::from_entries("BX", vec![(day(2024, 5, 1), 120.0)]));
        let (x, y) = axis_ranges(&table).unwrap();
        assert_eq!(x, day(2024, 5, 1)..day(2024, 5, 2));
        assert!(y.start < y.end);
    }

    #[test]
    fn encodes_png() {
        let pixels = vec![255u8; 4 * 3 * 3];
        let png = encode_png(&pixels, 4, 3).unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn renders_table_to_png() {
        let plotter = StockPlotter::new(600, 300);
        let png = plotter.render(&sample_table()).unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
    }
}
