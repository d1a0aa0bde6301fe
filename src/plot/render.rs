//! PNG rendering of a session's listener curve
//!
//! Shaded area under the raw `current` series, a line on top (the
//! smoothed series when smoothing is enabled, the raw one otherwise),
//! dotted horizontal grid lines and plain axes.

use super::smoothing::{rolling_median_centered, samples_per_minute};
use crate::domain::Observation;
use crate::error::PlotError;

use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([190, 190, 190]);
const RAW: Rgb<u8> = Rgb([100, 149, 237]);
const SMOOTHED: Rgb<u8> = Rgb([255, 165, 0]);
const FILL_ALPHA: f64 = 0.2;

const MARGIN_LEFT: u32 = 70;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_TOP: u32 = 30;
const MARGIN_BOTTOM: u32 = 50;

/// Plot rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotOptions {
    /// Rolling-median window in minutes; `None` or 0 draws the raw line
    pub smooth_minutes: Option<u64>,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            smooth_minutes: Some(10),
            width: 1900,
            height: 1000,
        }
    }
}

/// Maps data coordinates onto the plot area
struct Frame {
    x0: f64,
    y0: f64,
    width: f64,
    height: f64,
    t_span: f64,
    y_max: f64,
}

impl Frame {
    fn px(&self, t: f64, y: f64) -> (f64, f64) {
        (
            self.x0 + t / self.t_span * self.width,
            self.y0 + self.height - (y / self.y_max) * self.height,
        )
    }

    fn bottom(&self) -> f64 {
        self.y0 + self.height
    }
}

/// Render `observations` to a PNG at `out`
pub fn render_plot(observations: &[Observation], options: &PlotOptions, out: &Path) -> Result<(), PlotError> {
    let raw: Vec<f64> = observations
        .iter()
        .map(|o| o.current().map_or(f64::NAN, f64::from))
        .collect();

    let max = raw.iter().copied().filter(|v| !v.is_nan()).fold(f64::NAN, f64::max);
    if max.is_nan() {
        return Err(PlotError::NoData);
    }

    let start = observations[0].timestamp();
    let times: Vec<f64> = observations
        .iter()
        .map(|o| (o.timestamp() - start).num_milliseconds() as f64 / 1000.0)
        .collect();

    let frame = Frame {
        x0: f64::from(MARGIN_LEFT),
        y0: f64::from(MARGIN_TOP),
        width: f64::from(options.width.saturating_sub(MARGIN_LEFT + MARGIN_RIGHT).max(1)),
        height: f64::from(options.height.saturating_sub(MARGIN_TOP + MARGIN_BOTTOM).max(1)),
        t_span: times.last().copied().unwrap_or(0.0).max(1.0),
        y_max: max + 5.0,
    };

    let mut img = RgbImage::from_pixel(options.width, options.height, BACKGROUND);

    draw_grid(&mut img, &frame);
    fill_under(&mut img, &frame, &times, &raw);

    let line = match options.smooth_minutes.filter(|m| *m > 0) {
        Some(minutes) => {
            let per_minute = samples_per_minute(
                &observations.iter().map(|o| o.timestamp()).collect::<Vec<_>>(),
            )
            .unwrap_or(1);
            let window = usize::try_from(minutes).unwrap_or(usize::MAX).saturating_mul(per_minute);
            log::debug!("Smoothing over {} samples", window);
            (rolling_median_centered(&raw, window), SMOOTHED)
        }
        None => (raw.clone(), RAW),
    };
    draw_series(&mut img, &frame, &times, &line.0, line.1);
    draw_axes(&mut img, &frame);

    img.save_with_format(out, ImageFormat::Png)?;
    log::info!("Plot saved to {}", out.display());
    Ok(())
}

/// Grid spacing giving roughly eight lines up to `y_max`
fn grid_step(y_max: f64) -> f64 {
    let rough = y_max / 8.0;
    let magnitude = 10f64.powf(rough.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= rough)
        .unwrap_or(10.0 * magnitude)
        .max(1.0)
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: f64) -> Rgb<u8> {
    let mix = |b: u8, o: u8| (f64::from(b) * (1.0 - alpha) + f64::from(o) * alpha).round() as u8;
    Rgb([mix(base[0], over[0]), mix(base[1], over[1]), mix(base[2], over[2])])
}

fn draw_grid(img: &mut RgbImage, frame: &Frame) {
    let step = grid_step(frame.y_max);
    let left = frame.x0 as i64;
    let right = (frame.x0 + frame.width) as i64;

    let mut value = step;
    while value < frame.y_max {
        let (_, y) = frame.px(0.0, value);
        let y = y.round() as i64;
        for x in (left..right).step_by(4) {
            put(img, x, y, GRID);
        }
        // tick
        for x in left - 6..left {
            put(img, x, y, AXIS);
        }
        value += step;
    }
}

/// Shade between the baseline and the raw series, skipping gaps
fn fill_under(img: &mut RgbImage, frame: &Frame, times: &[f64], values: &[f64]) {
    let columns = img.width() as usize;
    let mut tops: Vec<Option<f64>> = vec![None; columns];

    for i in 0..values.len().saturating_sub(1) {
        let (a, b) = (values[i], values[i + 1]);
        if a.is_nan() || b.is_nan() {
            continue;
        }
        let (xa, ya) = frame.px(times[i], a);
        let (xb, yb) = frame.px(times[i + 1], b);
        let (first, last) = (xa.round() as i64, xb.round() as i64);
        for x in first..=last {
            let frac = if last == first {
                0.0
            } else {
                (x - first) as f64 / (last - first) as f64
            };
            if let Some(slot) = usize::try_from(x).ok().and_then(|x| tops.get_mut(x)) {
                *slot = Some(ya + (yb - ya) * frac);
            }
        }
    }

    let bottom = frame.bottom().round() as i64;
    for (x, top) in tops.into_iter().enumerate() {
        let Some(top) = top else { continue };
        for y in top.round() as i64..bottom {
            if y >= 0 && (y as u32) < img.height() {
                let base = *img.get_pixel(x as u32, y as u32);
                img.put_pixel(x as u32, y as u32, blend(base, RAW, FILL_ALPHA));
            }
        }
    }
}

fn draw_segment(img: &mut RgbImage, from: (f64, f64), to: (f64, f64), color: Rgb<u8>) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as i64;
    for s in 0..=steps {
        let t = s as f64 / steps as f64;
        let x = (from.0 + (to.0 - from.0) * t).round() as i64;
        let y = (from.1 + (to.1 - from.1) * t).round() as i64;
        put(img, x, y, color);
        put(img, x, y + 1, color);
    }
}

fn draw_series(img: &mut RgbImage, frame: &Frame, times: &[f64], values: &[f64], color: Rgb<u8>) {
    for i in 0..values.len().saturating_sub(1) {
        let (a, b) = (values[i], values[i + 1]);
        if a.is_nan() || b.is_nan() {
            continue;
        }
        draw_segment(img, frame.px(times[i], a), frame.px(times[i + 1], b), color);
    }
}

fn draw_axes(img: &mut RgbImage, frame: &Frame) {
    let left = frame.x0.round();
    let right = (frame.x0 + frame.width).round();
    let top = frame.y0.round();
    let bottom = frame.bottom().round();
    draw_segment(img, (left, top), (left, bottom), AXIS);
    draw_segment(img, (left, bottom), (right, bottom), AXIS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn session(values: &[Option<u32>]) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2020, 11, 12)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let ts = start + Duration::seconds(30 * i as i64);
                match v {
                    Some(c) => Observation::on_air(ts, *c, *c),
                    None => Observation::off_air(ts),
                }
            })
            .collect()
    }

    fn small() -> PlotOptions {
        PlotOptions {
            smooth_minutes: Some(1),
            width: 320,
            height: 200,
        }
    }

    #[test]
    fn test_renders_png() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("audience-test.png");
        let values: Vec<Option<u32>> = (0..40).map(|i| if i == 20 { None } else { Some(i % 7 + 10) }).collect();

        render_plot(&session(&values), &small(), &out).unwrap();

        let img = image::open(&out).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (320, 200));
        // Something other than background was drawn inside the plot area.
        assert!(img.pixels().any(|p| *p == SMOOTHED));
        assert!(img.pixels().any(|p| *p != BACKGROUND && *p != AXIS));
    }

    #[test]
    fn test_raw_line_without_smoothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("raw.png");
        let options = PlotOptions {
            smooth_minutes: None,
            ..small()
        };
        render_plot(&session(&[Some(1), Some(5), Some(3)]), &options, &out).unwrap();

        let img = image::open(&out).unwrap().to_rgb8();
        assert!(img.pixels().any(|p| *p == RAW));
        assert!(!img.pixels().any(|p| *p == SMOOTHED));
    }

    #[test]
    fn test_no_counts_is_an_error() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("none.png");
        let result = render_plot(&session(&[None, None]), &small(), &out);
        assert!(matches!(result, Err(PlotError::NoData)));
        assert!(render_plot(&[], &small(), &out).is_err());
    }

    #[test]
    fn test_grid_step() {
        assert_eq!(grid_step(8.0), 1.0);
        assert_eq!(grid_step(105.0), 20.0);
        assert_eq!(grid_step(3.0), 1.0);
    }

    #[test]
    fn test_blend() {
        assert_eq!(blend(BACKGROUND, Rgb([0, 0, 0]), 0.2), Rgb([204, 204, 204]));
    }
}
