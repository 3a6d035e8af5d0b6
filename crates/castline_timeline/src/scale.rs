// SPDX-License-Identifier: MIT OR Apache-2.0
//! Millisecond/pixel coordinate mapping.
//!
//! [`TimeScale`] is an immutable value: every navigation operation returns a
//! new scale. [`Viewport`] is the plain, UI-facing mirror of the same numbers.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Visible duration of a freshly opened timeline
pub const DEFAULT_VISIBLE_DURATION_MS: i64 = 30_000;

/// Viewport width assumed before the host reports one
pub const DEFAULT_VIEWPORT_WIDTH_PX: f64 = 800.0;

/// Named zoom level for zoom controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomPreset {
    /// Label shown in the control
    pub label: &'static str,
    /// Visible duration the preset selects
    pub duration_ms: i64,
}

const ZOOM_PRESETS: [ZoomPreset; 7] = [
    ZoomPreset { label: "10s", duration_ms: 10_000 },
    ZoomPreset { label: "30s", duration_ms: 30_000 },
    ZoomPreset { label: "1m", duration_ms: 60_000 },
    ZoomPreset { label: "5m", duration_ms: 300_000 },
    ZoomPreset { label: "10m", duration_ms: 600_000 },
    ZoomPreset { label: "30m", duration_ms: 1_800_000 },
    ZoomPreset { label: "1h", duration_ms: 3_600_000 },
];

/// Mapping between timeline milliseconds and screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeScale {
    ms_per_px: f64,
    view_start_ms: i64,
    content_offset_px: f64,
    viewport_width_px: f64,
}

impl TimeScale {
    /// Create a scale, rejecting non-positive `ms_per_px` and negative pixel extents
    pub fn new(
        ms_per_px: f64,
        view_start_ms: i64,
        content_offset_px: f64,
        viewport_width_px: f64,
    ) -> Result<Self, ConfigurationError> {
        if !ms_per_px.is_finite() || ms_per_px <= 0.0 {
            return Err(ConfigurationError::InvalidMsPerPx(ms_per_px));
        }
        if !content_offset_px.is_finite() || content_offset_px < 0.0 {
            return Err(ConfigurationError::InvalidContentOffset(content_offset_px));
        }
        if !viewport_width_px.is_finite() || viewport_width_px < 0.0 {
            return Err(ConfigurationError::InvalidViewportWidth(viewport_width_px));
        }
        Ok(Self {
            ms_per_px,
            view_start_ms: view_start_ms.max(0),
            content_offset_px,
            viewport_width_px,
        })
    }

    /// Milliseconds represented by one pixel
    pub fn ms_per_px(&self) -> f64 {
        self.ms_per_px
    }

    /// Time at the left edge of the content area
    pub fn view_start_ms(&self) -> i64 {
        self.view_start_ms
    }

    /// Pixel offset of the content area (track headers etc.)
    pub fn content_offset_px(&self) -> f64 {
        self.content_offset_px
    }

    /// Width of the content area
    pub fn viewport_width_px(&self) -> f64 {
        self.viewport_width_px
    }

    /// Convert time to x position
    pub fn x_of(&self, time_ms: i64) -> f64 {
        self.content_offset_px + (time_ms - self.view_start_ms) as f64 / self.ms_per_px
    }

    /// Convert x position to time
    pub fn t_of(&self, px: f64) -> f64 {
        self.view_start_ms as f64 + (px - self.content_offset_px) * self.ms_per_px
    }

    /// Convert x position to a whole, non-negative time
    pub fn time_at(&self, px: f64) -> i64 {
        (self.t_of(px).round() as i64).max(0)
    }

    /// Convert a pixel distance to milliseconds
    pub fn px_to_ms(&self, delta_px: f64) -> f64 {
        delta_px * self.ms_per_px
    }

    /// Duration covered by the viewport
    pub fn visible_duration_ms(&self) -> f64 {
        self.viewport_width_px * self.ms_per_px
    }

    /// `[start, end)` of the visible time range
    pub fn visible_range(&self) -> (i64, i64) {
        let end = self
            .view_start_ms
            .saturating_add(self.visible_duration_ms().round() as i64);
        (self.view_start_ms, end)
    }

    /// Whether a time is inside the visible range
    pub fn contains(&self, time_ms: i64) -> bool {
        let (start, end) = self.visible_range();
        time_ms >= start && time_ms < end
    }

    /// Fit `duration_ms` into `viewport_width_px`, keeping the view start
    pub fn set_visible_duration(&self, duration_ms: i64, viewport_width_px: f64) -> Result<Self, ConfigurationError> {
        if !viewport_width_px.is_finite() || viewport_width_px <= 0.0 {
            return Err(ConfigurationError::InvalidViewportWidth(viewport_width_px));
        }
        if duration_ms <= 0 {
            return Err(ConfigurationError::InvalidDuration(duration_ms));
        }
        Self::new(
            duration_ms as f64 / viewport_width_px,
            self.view_start_ms,
            self.content_offset_px,
            viewport_width_px,
        )
    }

    /// Scroll by a pixel distance; the view never starts before zero
    pub fn pan_by_pixels(&self, delta_px: f64) -> Self {
        let shifted = self.view_start_ms as f64 + self.px_to_ms(delta_px);
        Self {
            view_start_ms: (shifted.round() as i64).max(0),
            ..*self
        }
    }

    /// Scale `ms_per_px` by `factor` keeping the time under `anchor_px` in place
    pub fn zoom_around(&self, anchor_px: f64, factor: f64) -> Result<Self, ConfigurationError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigurationError::InvalidZoomFactor(factor));
        }
        let anchor_ms = self.t_of(anchor_px);
        let ms_per_px = self.ms_per_px * factor;
        let view_start = anchor_ms - (anchor_px - self.content_offset_px) * ms_per_px;
        Self::new(
            ms_per_px,
            view_start.round() as i64,
            self.content_offset_px,
            self.viewport_width_px,
        )
    }

    /// Same scale with a different view start (clamped to zero)
    pub fn with_view_start(&self, view_start_ms: i64) -> Self {
        Self {
            view_start_ms: view_start_ms.max(0),
            ..*self
        }
    }

    /// Ordered zoom presets for zoom controls
    pub fn zoom_presets() -> &'static [ZoomPreset] {
        &ZOOM_PRESETS
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            ms_per_px: DEFAULT_VISIBLE_DURATION_MS as f64 / DEFAULT_VIEWPORT_WIDTH_PX,
            view_start_ms: 0,
            content_offset_px: 0.0,
            viewport_width_px: DEFAULT_VIEWPORT_WIDTH_PX,
        }
    }
}

/// Mutable, UI-facing view parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Time at the left edge of the content area
    pub view_start_ms: i64,
    /// Milliseconds per pixel
    pub ms_per_px: f64,
    /// Pixel offset of the content area
    pub content_offset_px: f64,
    /// Width of the content area
    pub viewport_width_px: f64,
}

impl Viewport {
    /// Build the matching time scale
    pub fn scale(&self) -> Result<TimeScale, ConfigurationError> {
        TimeScale::new(
            self.ms_per_px,
            self.view_start_ms,
            self.content_offset_px,
            self.viewport_width_px,
        )
    }
}

impl From<TimeScale> for Viewport {
    fn from(scale: TimeScale) -> Self {
        Self {
            view_start_ms: scale.view_start_ms,
            ms_per_px: scale.ms_per_px,
            content_offset_px: scale.content_offset_px,
            viewport_width_px: scale.viewport_width_px,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        TimeScale::default().into()
    }
}
