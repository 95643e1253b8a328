//! Display and quality options forwarded to the embedded client.
//!
//! Every field is optional. An unset field is left out of the client's
//! initialisation bag so the client applies its own default.
//!
//! # Example
//!
//! ```
//! use rfb_frontend::DisplayOptions;
//!
//! let options = DisplayOptions::new()
//!     .with_quality_level(6)
//!     .with_compression_level(2)
//!     .with_view_only(true);
//!
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Highest quality/compression level the client understands.
const MAX_LEVEL: i64 = 9;

// ============================================================================
// DisplayOptions
// ============================================================================

/// Optional display, quality and input settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    /// JPEG quality level (0-9).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_level: Option<i64>,

    /// Compression level (0-9).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<i64>,

    /// Client-side retry window in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_duration: Option<i64>,

    /// Suppress keyboard and pointer input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_only: Option<bool>,

    /// Focus the canvas when it is clicked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_on_click: Option<bool>,

    /// Ask the server to resize the remote session to the viewport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize_session: Option<bool>,

    /// Render a dot when the server hides the cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_dot_cursor: Option<bool>,

    /// CSS background behind the remote desktop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    /// Lower bound for dynamic quality.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_quality_min: Option<i64>,

    /// Upper bound for dynamic quality.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_quality_max: Option<i64>,

    /// JPEG quality used in video mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpeg_video_quality: Option<i64>,

    /// WebP quality used in video mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webp_video_quality: Option<i64>,

    /// Maximum video-mode width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_video_resolution_x: Option<i64>,

    /// Maximum video-mode height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_video_resolution_y: Option<i64>,

    /// Target frame rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<i64>,

    /// Minutes of inactivity before the server disconnects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_disconnect: Option<i64>,

    /// Send relative pointer motion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer_relative: Option<bool>,

    /// Video quality preset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_quality: Option<i64>,

    /// Anti-aliasing mode for scaled rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_aliasing: Option<i64>,
}

// ============================================================================
// Builder Methods
// ============================================================================

impl DisplayOptions {
    /// Creates an options instance with every field unset.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the quality level.
    #[inline]
    #[must_use]
    pub fn with_quality_level(mut self, level: i64) -> Self {
        self.quality_level = Some(level);
        self
    }

    /// Sets the compression level.
    #[inline]
    #[must_use]
    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Sets the client retry window.
    #[inline]
    #[must_use]
    pub fn with_retry_duration(mut self, millis: i64) -> Self {
        self.retry_duration = Some(millis);
        self
    }

    /// Sets view-only mode.
    #[inline]
    #[must_use]
    pub fn with_view_only(mut self, view_only: bool) -> Self {
        self.view_only = Some(view_only);
        self
    }

    /// Sets the background.
    #[inline]
    #[must_use]
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DisplayOptions {
    /// Checks the ranges the client is known to enforce.
    ///
    /// Out-of-range values are still forwarded; callers use this for
    /// diagnostics only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("qualityLevel", self.quality_level),
            ("compressionLevel", self.compression_level),
        ] {
            if let Some(v) = value
                && !(0..=MAX_LEVEL).contains(&v)
            {
                return Err(Error::invalid_argument(format!(
                    "{name} must be between 0 and {MAX_LEVEL}, got {v}"
                )));
            }
        }

        if let (Some(min), Some(max)) = (self.dynamic_quality_min, self.dynamic_quality_max)
            && min > max
        {
            return Err(Error::invalid_argument(format!(
                "dynamicQualityMin ({min}) is greater than dynamicQualityMax ({max})"
            )));
        }

        if let Some(retry) = self.retry_duration
            && retry < 0
        {
            return Err(Error::invalid_argument(format!(
                "retryDuration must not be negative, got {retry}"
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
