use crate::config::ChartConfig;
use crate::error::{Error, Result};
use crate::format::format_price;
use crate::models::market::OhlcvPoint;
use chrono::{DateTime, FixedOffset};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Half the width of a candle body, in x units (one unit per candle).
const BODY_HALF_WIDTH: f64 = 0.2;
const CAPTION_HEIGHT: u32 = 50;
const CAPTION_FONT_SIZE: u32 = 28;
const AXIS_FONT_SIZE: u32 = 14;
/// Gap between the x axis and the time labels, in pixels.
const X_LABEL_GAP: i32 = 8;
const CAPTION_COLOR: RGBColor = RGBColor(0x55, 0x55, 0x55);
const Y_PADDING_RATIO: f64 = 0.05;

fn render_err<E: Display>(e: E) -> Error {
    Error::RenderError(e.to_string())
}

pub fn parse_hex_color(s: &str) -> Result<RGBColor> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::ConfigError(format!("not a #rrggbb colour: {}", s)));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| Error::ConfigError(e.to_string()));
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Draws OHLCV windows as candlestick PNGs.
///
/// Candles sit at x = 0..n-1 regardless of their timestamps; the only
/// time labels are the first and last candle. There is no title, no grid
/// and no top/right border.
#[derive(Debug, Clone)]
pub struct CandlestickRenderer {
    width: u32,
    height: u32,
    up_color: RGBColor,
    down_color: RGBColor,
    label_offset: FixedOffset,
}

impl CandlestickRenderer {
    pub fn new(config: &ChartConfig) -> Result<Self> {
        if config.height <= CAPTION_HEIGHT * 2 || config.width == 0 {
            return Err(Error::ConfigError(format!(
                "chart size {}x{} is too small",
                config.width, config.height
            )));
        }
        let label_offset = config
            .label_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::ConfigError(format!(
                    "label offset out of range: {} minutes",
                    config.label_utc_offset_minutes
                ))
            })?;

        Ok(Self {
            width: config.width,
            height: config.height,
            up_color: parse_hex_color(&config.up_color)?,
            down_color: parse_hex_color(&config.down_color)?,
            label_offset,
        })
    }

    /// Writes the chart for `series` to `output`, overwriting it.
    /// Returns `None` for an empty series.
    pub fn render(&self, series: &[OhlcvPoint], output: &Path) -> Result<Option<PathBuf>> {
        if series.is_empty() {
            return Ok(None);
        }
        self.draw(series, output)?;
        Ok(Some(output.to_path_buf()))
    }

    /// The two x-axis labels: first and last candle as `%H:%M`.
    pub fn axis_labels(&self, series: &[OhlcvPoint]) -> Option<(String, String)> {
        let first = series.first()?;
        let last = series.last()?;
        Some((self.time_label(first.timestamp)?, self.time_label(last.timestamp)?))
    }

    fn time_label(&self, timestamp: i64) -> Option<String> {
        DateTime::from_timestamp(timestamp, 0)
            .map(|t| t.with_timezone(&self.label_offset).format("%H:%M").to_string())
    }

    fn draw(&self, series: &[OhlcvPoint], output: &Path) -> Result<()> {
        let (y_min, y_max) = price_range(series)?;
        let last_index = series.len() - 1;
        let last_x = last_index as f64;
        let (first_label, last_label) = self
            .axis_labels(series)
            .ok_or_else(|| Error::RenderError("timestamp out of range".into()))?;
        // format before drawing so a bad close fails without a half-written file
        let caption = format!("Price: {}", format_price(series[last_index].close)?);

        let root = BitMapBackend::new(output, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let (plot_area, caption_area) = root.split_vertically(self.height - CAPTION_HEIGHT);

        let mut chart = ChartBuilder::on(&plot_area)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(100)
            .build_cartesian_2d(-0.5..last_x + 0.5, y_min..y_max)
            .map_err(render_err)?;

        let y_formatter = |y: &f64| format_price(*y).unwrap_or_default();

        // x ticks are drawn by hand below: only the first and last candle
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(0)
            .y_label_formatter(&y_formatter)
            .y_labels(6)
            .label_style(("sans-serif", AXIS_FONT_SIZE))
            .draw()
            .map_err(render_err)?;

        let mut x_labels = vec![(0.0, first_label)];
        if last_index > 0 {
            x_labels.push((last_x, last_label));
        }
        let x_label_style = ("sans-serif", AXIS_FONT_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        for (x, label) in x_labels {
            let (px, py) = chart.backend_coord(&(x, y_min));
            root.draw(&Text::new(label, (px, py + X_LABEL_GAP), x_label_style.clone()))
                .map_err(render_err)?;
        }

        chart
            .draw_series(series.iter().enumerate().map(|(i, p)| {
                let x = i as f64;
                Rectangle::new(
                    [
                        (x - BODY_HALF_WIDTH, p.open.min(p.close)),
                        (x + BODY_HALF_WIDTH, p.open.max(p.close)),
                    ],
                    self.candle_color(p).filled(),
                )
            }))
            .map_err(render_err)?;

        chart
            .draw_series(series.iter().enumerate().map(|(i, p)| {
                let x = i as f64;
                PathElement::new(vec![(x, p.low), (x, p.high)], self.candle_color(p).stroke_width(1))
            }))
            .map_err(render_err)?;

        let caption_style = ("sans-serif", CAPTION_FONT_SIZE)
            .into_font()
            .color(&CAPTION_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Top));
        caption_area
            .draw(&Text::new(caption, ((self.width / 2) as i32, 5), caption_style))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    fn candle_color(&self, point: &OhlcvPoint) -> RGBColor {
        if point.close >= point.open {
            self.up_color
        } else {
            self.down_color
        }
    }
}

/// Y bounds covering every wick with a little headroom, never below zero.
fn price_range(series: &[OhlcvPoint]) -> Result<(f64, f64)> {
    let mut low = f64::INFINITY;
    let mut high = f64::NEG_INFINITY;
    for p in series {
        for v in [p.open, p.high, p.low, p.close] {
            if !v.is_finite() {
                return Err(Error::RenderError(format!("non-finite price at {}", p.timestamp)));
            }
            low = low.min(v);
            high = high.max(v);
        }
    }

    let span = high - low;
    let pad = if span > 0.0 {
        span * Y_PADDING_RATIO
    } else if high.abs() > 0.0 {
        high.abs() * Y_PADDING_RATIO
    } else {
        1e-9
    };
    Ok(((low - pad).max(0.0), high + pad))
}
