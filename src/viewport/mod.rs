//! Viewport transform engine (pure).
//!
//! Scale/translate state for rendered content inside a fixed-size stage.
//! Every operation is a pure function `(state, inputs) -> state`; the only
//! side effect, writing the CSS transform to the display element, belongs to
//! the host and is driven by [`ViewportState::to_css_transform`].
//!
//! # Coordinate model
//!
//! A world point `w` is drawn at screen point `s = w * scale + translate`
//! (transform origin `0 0`). Pointer coordinates and the stage rectangle are
//! stage-local.

pub mod gesture;

use crate::model::{Point, Rect};

pub use gesture::{DragTracker, wheel_zoom_factor};

/// Inclusive bounds for [`ViewportState::scale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBounds {
    min: f64,
    max: f64,
}

/// Error returned for scale bounds that exclude 1.0 or are not positive.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("Scale bounds must satisfy 0 < min <= 1 <= max (got min={min}, max={max})")]
pub struct InvalidScaleBounds {
    /// Requested minimum.
    pub min: f64,
    /// Requested maximum.
    pub max: f64,
}

impl ScaleBounds {
    /// Bounds of the preview panel: 20% to 400%.
    pub const DEFAULT: Self = Self { min: 0.2, max: 4.0 };

    /// Smart constructor. `1.0` must lie inside the bounds so that
    /// reset-and-center always produces a valid state.
    pub fn new(min: f64, max: f64) -> Result<Self, InvalidScaleBounds> {
        let valid = min.is_finite() && max.is_finite() && min > 0.0 && min <= 1.0 && max >= 1.0;
        if valid {
            Ok(Self { min, max })
        } else {
            Err(InvalidScaleBounds { min, max })
        }
    }

    /// Smallest allowed scale.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest allowed scale.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// `scale` limited to the bounds.
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Scale and translation of the content element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Zoom factor. 1.0 shows content at its natural size.
    pub scale: f64,
    /// Horizontal offset of the content origin in stage pixels.
    pub translate_x: f64,
    /// Vertical offset of the content origin in stage pixels.
    pub translate_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportState {
    /// Scale 1.0, no translation.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// State from raw parts. The scale is not clamped.
    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
        }
    }

    /// Multiply the scale by `factor` (clamped), keeping the world point
    /// under `pointer` fixed on screen.
    pub fn zoom_at_point(&self, factor: f64, pointer: Point, bounds: ScaleBounds) -> Self {
        debug_assert!(factor > 0.0, "zoom factor must be positive");
        let prev = self.scale;
        let next = bounds.clamp(prev * factor);
        let world = self.screen_to_world(pointer);
        Self {
            scale: next,
            translate_x: pointer.x - world.x * next,
            translate_y: pointer.y - world.y * next,
        }
    }

    /// Shift by a screen-space delta. Translation is unbounded.
    pub fn pan_by(&self, delta_x: f64, delta_y: f64) -> Self {
        Self {
            scale: self.scale,
            translate_x: self.translate_x + delta_x,
            translate_y: self.translate_y + delta_y,
        }
    }

    /// Scale `content` to fit `stage` minus `padding` on every side, centered.
    ///
    /// Content with zero width or height has not been laid out yet; the
    /// current state is returned unchanged.
    pub fn fit_to_bounds(
        &self,
        content: Rect,
        stage: Rect,
        padding: f64,
        bounds: ScaleBounds,
    ) -> Self {
        if content.is_degenerate() {
            return *self;
        }
        let avail_w = stage.width - 2.0 * padding;
        let avail_h = stage.height - 2.0 * padding;
        let scale = bounds.clamp((avail_w / content.width).min(avail_h / content.height));
        Self::centered(content, stage, scale)
    }

    /// Scale 1.0 with `content` centered in `stage`.
    pub fn reset_and_center(content: Rect, stage: Rect) -> Self {
        Self::centered(content, stage, 1.0)
    }

    /// Zoom about the stage center to `target` (clamped).
    pub fn set_scale_clamped(&self, target: f64, stage: Rect, bounds: ScaleBounds) -> Self {
        self.zoom_at_point(target / self.scale, stage.center(), bounds)
    }

    /// Zoom about the stage center by `factor` (toolbar buttons).
    pub fn zoom_at_center(&self, factor: f64, stage: Rect, bounds: ScaleBounds) -> Self {
        self.zoom_at_point(factor, stage.center(), bounds)
    }

    /// Stage point to content coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate_x) / self.scale,
            (screen.y - self.translate_y) / self.scale,
        )
    }

    /// Content point to stage coordinates. Inverse of [`Self::screen_to_world`].
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.translate_x,
            world.y * self.scale + self.translate_y,
        )
    }

    /// CSS `transform` value for the content element (origin `0 0`).
    pub fn to_css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }

    /// Zoom indicator value, e.g. `150` for 1.5x.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round().max(0.0) as u32
    }

    fn centered(content: Rect, stage: Rect, scale: f64) -> Self {
        Self {
            scale,
            translate_x: stage.x + (stage.width - content.width * scale) / 2.0 - content.x * scale,
            translate_y: stage.y + (stage.height - content.height * scale) / 2.0
                - content.y * scale,
        }
    }
}

/// Owner of the live [`ViewportState`] plus its configuration.
///
/// Mutation happens only through these operations; each returns the new
/// state so callers can forward it to the display boundary.
#[derive(Debug, Clone)]
pub struct ViewportEngine {
    state: ViewportState,
    bounds: ScaleBounds,
    padding: f64,
}

impl ViewportEngine {
    /// Engine at the identity transform.
    pub fn new(bounds: ScaleBounds, padding: f64) -> Self {
        Self {
            state: ViewportState::IDENTITY,
            bounds,
            padding,
        }
    }

    /// Current transform.
    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Allowed scale range.
    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    /// Fit padding in pixels.
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// See [`ViewportState::zoom_at_point`].
    pub fn zoom_at_point(&mut self, factor: f64, pointer: Point) -> ViewportState {
        self.state = self.state.zoom_at_point(factor, pointer, self.bounds);
        self.state
    }

    /// See [`ViewportState::pan_by`].
    pub fn pan_by(&mut self, delta_x: f64, delta_y: f64) -> ViewportState {
        self.state = self.state.pan_by(delta_x, delta_y);
        self.state
    }

    /// See [`ViewportState::fit_to_bounds`]. Uses the engine's padding.
    pub fn fit_to_bounds(&mut self, content: Rect, stage: Rect) -> ViewportState {
        self.state = self
            .state
            .fit_to_bounds(content, stage, self.padding, self.bounds);
        self.state
    }

    /// See [`ViewportState::reset_and_center`].
    pub fn reset_and_center(&mut self, content: Rect, stage: Rect) -> ViewportState {
        self.state = ViewportState::reset_and_center(content, stage);
        self.state
    }

    /// See [`ViewportState::set_scale_clamped`].
    pub fn set_scale_clamped(&mut self, target: f64, stage: Rect) -> ViewportState {
        self.state = self.state.set_scale_clamped(target, stage, self.bounds);
        self.state
    }

    /// See [`ViewportState::zoom_at_center`].
    pub fn zoom_at_center(&mut self, factor: f64, stage: Rect) -> ViewportState {
        self.state = self.state.zoom_at_center(factor, stage, self.bounds);
        self.state
    }

    /// Back to the identity transform (no content to center on).
    pub fn reset(&mut self) -> ViewportState {
        self.state = ViewportState::IDENTITY;
        self.state
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
