//! Pure petal layout math.
//!
//! Computes where every petal sits and how far it extends from the
//! centerline, independent of any drawing surface. Coordinates are logical
//! pixels; y grows downward and y=0 is the horizontal centerline.

use crate::waveform::NormalizedEnvelope;

use super::{Viewport, PADDING};

/// Geometry of one petal segment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Petal {
    /// Left edge, logical pixels from the surface's left border.
    pub x: f32,
    /// Horizontal extent of the segment.
    pub width: f32,
    /// Extent from the centerline; positive points down the surface,
    /// negative up. Zero for silent blocks.
    pub signed_height: f32,
    /// Parity flag: petals alternate strictly, odd indices point down.
    /// Kept separate from the height sign so flat petals still know which
    /// side their cap bulges to.
    pub downward: bool,
}

/// Lays the envelope out as alternating petals across the viewport width.
pub(crate) fn layout(viewport: &Viewport, envelope: &NormalizedEnvelope) -> Vec<Petal> {
    if envelope.is_empty() {
        return Vec::new();
    }

    let width = viewport.width as f32 / envelope.len() as f32;

    envelope
        .values()
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let height = clamped_height(*value, viewport.height as f32);
            let downward = (i + 1) % 2 == 0;
            Petal {
                x: width * i as f32,
                width,
                signed_height: if downward { height } else { -height },
                downward,
            }
        })
        .collect()
}

/// Maps an envelope value to a petal height, clamped to half the viewport.
///
/// The vertical padding is subtracted so quiet blocks collapse to the
/// baseline instead of cluttering the centerline with short stubs.
fn clamped_height(value: f32, viewport_height: f32) -> f32 {
    (value * viewport_height - PADDING).clamp(0.0, viewport_height / 2.0)
}
