//! Petal waveform rendering.
//!
//! Paints a normalized envelope as mirrored line+arc+line "petal" segments
//! onto any [`DrawTarget`]. The drawing is one-shot and immediate-mode: the
//! caller sizes the surface from [`Viewport::buffer_size`], clears it, and
//! calls [`draw_waveform`] once per repaint.

pub mod petal;

use embedded_graphics::{
    geometry::{AngleUnit, Point, Size},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Arc, Line, PrimitiveStyle},
};

use crate::waveform::NormalizedEnvelope;

/// Vertical margin, in logical pixels, kept above and below the waveform.
///
/// Also acts as an amplitude floor: blocks quieter than
/// `PADDING / viewport_height` collapse to the baseline.
pub const PADDING: f32 = 20.0;

/// Logical drawing area plus the device pixel scale of the backing buffer.
///
/// Read once per render; the petal geometry works in logical pixels and the
/// scale is only applied when coordinates are mapped onto the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_scale: f32,
}

impl Viewport {
    /// Creates a viewport. Non-positive scales fall back to 1.0.
    pub fn new(width: u32, height: u32, pixel_scale: f32) -> Self {
        let pixel_scale = if pixel_scale > 0.0 { pixel_scale } else { 1.0 };
        Self {
            width,
            height,
            pixel_scale,
        }
    }

    /// Size of the backing pixel buffer: the logical area plus vertical
    /// padding on both sides, scaled to device pixels.
    pub fn buffer_size(&self) -> Size {
        let width = (self.width as f32 * self.pixel_scale).round() as u32;
        let height = ((self.height as f32 + 2.0 * PADDING) * self.pixel_scale).round() as u32;
        Size::new(width, height)
    }

    /// Maps a logical point to device pixels.
    ///
    /// Logical y=0 is the waveform centerline: the origin is translated down
    /// by half the viewport height plus the padding, then everything is
    /// scaled uniformly.
    pub(crate) fn device(&self, x: f32, y: f32) -> Point {
        let cy = self.height as f32 / 2.0 + PADDING;
        Point::new(
            (x * self.pixel_scale).round() as i32,
            ((y + cy) * self.pixel_scale).round() as i32,
        )
    }
}

/// Stroke and background colors for a waveform rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetalStyle {
    /// Accent color the petals are stroked with.
    pub color: Rgb888,
    /// Surface fill behind the waveform.
    pub background: Rgb888,
    /// Stroke width in logical pixels.
    pub stroke_width: u32,
}

impl Default for PetalStyle {
    fn default() -> Self {
        Self {
            color: Rgb888::new(0xFF, 0xC0, 0xCB),
            background: Rgb888::BLACK,
            stroke_width: 2,
        }
    }
}

/// Parses a `#rrggbb` (or bare `rrggbb`) hex color.
pub fn parse_hex_color(value: &str) -> Option<Rgb888> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb888::new(r, g, b))
}

/// Paints the envelope onto the target surface.
///
/// One petal is drawn per envelope value: a vertical line away from the
/// centerline, a semicircular cap, and a vertical line back. Petals
/// alternate strictly between the upper and lower half of the surface.
/// Silent blocks still draw their cap as a flat bump on the baseline.
///
/// # Errors
/// Propagates any error of the draw target; a surface that cannot accept
/// draw calls makes rendering impossible.
pub fn draw_waveform<D>(
    target: &mut D,
    viewport: &Viewport,
    envelope: &NormalizedEnvelope,
    style: &PetalStyle,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let stroke_width = (style.stroke_width as f32 * viewport.pixel_scale)
        .round()
        .max(1.0) as u32;
    let stroke = PrimitiveStyle::with_stroke(style.color, stroke_width);

    for petal in petal::layout(viewport, envelope) {
        let left_base = viewport.device(petal.x, 0.0);
        let left_tip = viewport.device(petal.x, petal.signed_height);
        Line::new(left_base, left_tip)
            .into_styled(stroke)
            .draw(target)?;

        // Semicircular cap on the side the petal points to. Angles are
        // measured counterclockwise from the positive x-axis, 90 degrees
        // pointing up the surface.
        let center = viewport.device(petal.x + petal.width / 2.0, petal.signed_height);
        let diameter = (petal.width * viewport.pixel_scale).round() as u32;
        let sweep = if petal.downward {
            (-180.0).deg()
        } else {
            180.0.deg()
        };
        Arc::with_center(center, diameter, 0.0.deg(), sweep)
            .into_styled(stroke)
            .draw(target)?;

        let right_tip = viewport.device(petal.x + petal.width, petal.signed_height);
        let right_base = viewport.device(petal.x + petal.width, 0.0);
        Line::new(right_tip, right_base)
            .into_styled(stroke)
            .draw(target)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics_simulator::SimulatorDisplay;

    #[test]
    fn test_buffer_size_includes_padding_and_scale() {
        assert_eq!(
            Viewport::new(640, 120, 1.0).buffer_size(),
            Size::new(640, 160)
        );
        assert_eq!(
            Viewport::new(640, 120, 2.0).buffer_size(),
            Size::new(1280, 320)
        );
    }

    #[test]
    fn test_device_mapping_translates_then_scales() {
        let viewport = Viewport::new(640, 120, 2.0);

        // Centerline sits at half height plus padding.
        assert_eq!(viewport.device(0.0, 0.0), Point::new(0, 160));
        assert_eq!(viewport.device(10.0, -30.0), Point::new(20, 100));
        assert_eq!(viewport.device(10.0, 30.0), Point::new(20, 220));
    }

    #[test]
    fn test_invalid_scale_falls_back_to_one() {
        assert_eq!(Viewport::new(640, 120, 0.0).pixel_scale, 1.0);
        assert_eq!(Viewport::new(640, 120, -2.0).pixel_scale, 1.0);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ffc0cb"), Some(Rgb888::new(255, 192, 203)));
        assert_eq!(parse_hex_color("000000"), Some(Rgb888::BLACK));
        assert_eq!(parse_hex_color("#FFFFFF"), Some(Rgb888::WHITE));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_petals_alternate_sides_on_the_surface() {
        let viewport = Viewport::new(70, 60, 1.0);
        let envelope = NormalizedEnvelope::from_values(vec![1.0; 5]);
        let style = PetalStyle::default();

        let mut display: SimulatorDisplay<Rgb888> =
            SimulatorDisplay::new(viewport.buffer_size());
        draw_waveform(&mut display, &viewport, &envelope, &style).unwrap();

        let size = viewport.buffer_size();
        let center_y = viewport.device(0.0, 0.0).y;
        let petal_width = 70 / 5;

        for i in 0..5 {
            // Scan interior columns only; neighboring petals share their
            // boundary column.
            let x_start = i * petal_width + 2;
            let x_end = (i + 1) * petal_width - 2;

            let mut above = 0;
            let mut below = 0;
            for x in x_start..x_end {
                for y in 0..size.height as i32 {
                    if display.get_pixel(Point::new(x, y)) == style.color {
                        if y < center_y {
                            above += 1;
                        } else if y > center_y {
                            below += 1;
                        }
                    }
                }
            }

            let downward = (i + 1) % 2 == 0;
            if downward {
                assert!(below > 0, "petal {i} should paint below the centerline");
                assert_eq!(above, 0, "petal {i} leaked above the centerline");
            } else {
                assert!(above > 0, "petal {i} should paint above the centerline");
                assert_eq!(below, 0, "petal {i} leaked below the centerline");
            }
        }
    }

    #[test]
    fn test_full_envelope_draws_without_error() {
        let viewport = Viewport::new(640, 120, 2.0);
        let envelope = NormalizedEnvelope::from_values(vec![1.0; 70]);
        let style = PetalStyle::default();

        let mut display: SimulatorDisplay<Rgb888> =
            SimulatorDisplay::new(viewport.buffer_size());
        draw_waveform(&mut display, &viewport, &envelope, &style).unwrap();
    }

    #[test]
    fn test_empty_envelope_draws_nothing() {
        let viewport = Viewport::new(640, 120, 1.0);
        let envelope = NormalizedEnvelope::from_values(Vec::new());
        let style = PetalStyle::default();

        let mut display: SimulatorDisplay<Rgb888> =
            SimulatorDisplay::new(viewport.buffer_size());
        draw_waveform(&mut display, &viewport, &envelope, &style).unwrap();
    }
}
