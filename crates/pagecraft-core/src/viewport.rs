//! Viewport transform: pan, zoom and page format.
//!
//! Maps between screen coordinates (pixels inside the visible viewport) and
//! canvas coordinates (the page-local space components live in):
//! `screen = canvas * scale + offset`.

use crate::units::{PIXEL_PER_CM, PIXEL_PER_INCH};
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of the rulers drawn along the top and left viewport edges.
pub const RULER_SIZE: f64 = 32.0;

/// Zoom limits, step and wheel sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Smallest allowed scale.
    pub min: f64,
    /// Largest allowed scale.
    pub max: f64,
    /// Increment used by the zoom in/out buttons.
    pub step: f64,
    /// Exponent per unit of zoom delta: `factor = exp(delta * sensitivity)`.
    pub sensitivity: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 5.0,
            step: 0.1,
            sensitivity: 0.001,
        }
    }
}

impl ZoomConfig {
    /// Whether the limits form a usable range and both zoom directions
    /// keep their sign.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min > 0.0
            && self.min <= self.max
            && self.step.is_finite()
            && self.step > 0.0
            && self.sensitivity.is_finite()
            && self.sensitivity > 0.0
    }

    /// Clamp a scale into `[min, max]`.
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

/// Page size preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
    Custom,
}

impl PageFormat {
    /// Fixed size of a named preset in canvas units; `None` for `Custom`.
    pub fn preset_size(self) -> Option<Size> {
        match self {
            PageFormat::A4 => Some(Size::new(
                210.0 * PIXEL_PER_CM / 10.0,
                297.0 * PIXEL_PER_CM / 10.0,
            )),
            PageFormat::Letter => Some(Size::new(8.5 * PIXEL_PER_INCH, 11.0 * PIXEL_PER_INCH)),
            PageFormat::Custom => None,
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageFormat::A4 => write!(f, "A4"),
            PageFormat::Letter => write!(f, "Letter"),
            PageFormat::Custom => write!(f, "Custom"),
        }
    }
}

impl FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            "custom" => Ok(PageFormat::Custom),
            _ => Err(format!("Unknown page format: {}", s)),
        }
    }
}

/// Viewport manages the view transform and the page dimensions.
///
/// The scale always stays within the configured zoom limits and every field
/// stays finite; setters ignore input that would break that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    scale: f64,
    /// Pan offset in screen pixels.
    offset: Vec2,
    /// Page size in canvas units.
    page_size: Size,
    page_format: PageFormat,
    /// Dimensions restored when switching back to `Custom`.
    custom_size: Size,
    zoom: ZoomConfig,
    ruler_size: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Create a viewport at 100% showing an A4 page.
    pub fn new() -> Self {
        Self::with_config(ZoomConfig::default(), RULER_SIZE)
    }

    /// Create a viewport with custom zoom limits and ruler inset.
    ///
    /// An unusable zoom range falls back to the defaults.
    pub fn with_config(zoom: ZoomConfig, ruler_size: f64) -> Self {
        let zoom = if zoom.is_valid() {
            zoom
        } else {
            log::warn!("Invalid zoom configuration {:?}, using defaults", zoom);
            ZoomConfig::default()
        };
        let ruler_size = if ruler_size.is_finite() { ruler_size.max(0.0) } else { RULER_SIZE };
        let format = PageFormat::default();
        let page_size = format.preset_size().unwrap_or(Size::new(800.0, 1100.0));

        Self {
            scale: zoom.clamp(1.0),
            offset: Vec2::ZERO,
            page_size,
            page_format: format,
            custom_size: page_size,
            zoom,
            ruler_size,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn page_format(&self) -> PageFormat {
        self.page_format
    }

    pub fn custom_size(&self) -> Size {
        self.custom_size
    }

    pub fn zoom_config(&self) -> &ZoomConfig {
        &self.zoom
    }

    /// Transform from canvas to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Transform from screen to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Set the scale directly (clamped).
    pub fn set_scale(&mut self, scale: f64) {
        if !scale.is_finite() {
            log::warn!("Ignoring non-finite scale {}", scale);
            return;
        }
        self.scale = self.zoom.clamp(scale);
    }

    /// Set the pan offset directly.
    pub fn set_offset(&mut self, offset: Vec2) {
        if !offset.is_finite() {
            log::warn!("Ignoring non-finite offset {:?}", offset);
            return;
        }
        self.offset = offset;
    }

    /// Set scale (clamped) and offset together.
    pub fn set_transform(&mut self, scale: f64, offset: Vec2) {
        if !scale.is_finite() || !offset.is_finite() {
            log::warn!("Ignoring non-finite transform {} {:?}", scale, offset);
            return;
        }
        self.scale = self.zoom.clamp(scale);
        self.offset = offset;
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.set_offset(self.offset + delta);
    }

    /// Zoom in by one step, without anchoring.
    pub fn zoom_in_step(&mut self) {
        self.scale = self.zoom.clamp(self.scale + self.zoom.step);
    }

    /// Zoom out by one step, without anchoring.
    pub fn zoom_out_step(&mut self) {
        self.scale = self.zoom.clamp(self.scale - self.zoom.step);
    }

    /// Zoom by `exp(delta * sensitivity)`, keeping the canvas point under
    /// `pointer` (screen coordinates) fixed on screen.
    ///
    /// Positive deltas zoom in; callers feeding wheel events negate `deltaY`.
    /// Returns false when the scale is already at the limit in that direction.
    pub fn adjust_zoom(&mut self, delta: f64, pointer: Point) -> bool {
        if !delta.is_finite() || !pointer.is_finite() {
            log::warn!("Ignoring zoom request {} at {:?}", delta, pointer);
            return false;
        }

        let factor = (delta * self.zoom.sensitivity).exp();
        let new_scale = self.zoom.clamp(self.scale * factor);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }

        // Canvas point under the pointer before the change
        let anchor = self.screen_to_canvas(pointer);

        self.scale = new_scale;
        self.offset = Vec2::new(
            pointer.x - anchor.x * new_scale,
            pointer.y - anchor.y * new_scale,
        );
        true
    }

    /// Reset to 100% and centre the page inside a viewport of the given size.
    ///
    /// The ruler inset is subtracted first and offsets never go negative.
    pub fn reset_zoom(&mut self, viewport: Size) {
        self.scale = self.zoom.clamp(1.0);
        let content = self.page_size * self.scale;
        let offset_x = ((viewport.width - self.ruler_size - content.width) / 2.0).max(0.0);
        let offset_y = ((viewport.height - self.ruler_size - content.height) / 2.0).max(0.0);
        self.set_offset(Vec2::new(offset_x, offset_y));
    }

    /// Switch page format. Presets load their fixed size; `Custom` restores
    /// the last explicitly set custom dimensions.
    pub fn set_page_format(&mut self, format: PageFormat) {
        self.page_size = format.preset_size().unwrap_or(self.custom_size);
        self.page_format = format;
    }

    /// Set the page size directly. This always switches to `Custom` and
    /// remembers the size for later switches back.
    pub fn set_custom_size(&mut self, width: f64, height: f64) -> bool {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            log::warn!("Ignoring invalid page size {}x{}", width, height);
            return false;
        }
        self.custom_size = Size::new(width, height);
        self.page_size = self.custom_size;
        self.page_format = PageFormat::Custom;
        true
    }
}
