use serde::{Deserialize, Serialize};

use crate::layout::justified::Tile;
use crate::models::MediaItem;

/// Observed widths below this use the small row-height ratio.
pub const BREAKPOINT_MEDIUM: f64 = 768.0;
/// Observed widths at or above this use the large row-height ratio.
pub const BREAKPOINT_LARGE: f64 = 1024.0;

/// Width class of the observed viewport (or container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Breakpoint {
    Small,
    Medium,
    Large,
}

impl Breakpoint {
    /// `None` for a width that is zero, negative or not a number.
    pub fn from_width(width: f64) -> Option<Self> {
        if !width.is_finite() || width <= 0.0 {
            None
        } else if width >= BREAKPOINT_LARGE {
            Some(Self::Large)
        } else if width >= BREAKPOINT_MEDIUM {
            Some(Self::Medium)
        } else {
            Some(Self::Small)
        }
    }
}

/// Mosaic configuration. Field names follow the JSON the pages embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Target row height as a fraction of the container width, below 768px.
    #[serde(rename = "rowHeightSM")]
    pub row_height_sm: f64,
    #[serde(rename = "rowHeightMD")]
    pub row_height_md: f64,
    /// At 1024px and above.
    #[serde(rename = "rowHeightXL")]
    pub row_height_xl: f64,
    /// Sniff dimensions of items that arrive without them.
    pub should_retrieve_width_and_height: bool,
    pub fallback_image_width: f64,
    pub fallback_image_height: f64,
    pub max_image_ratio: f64,
    pub min_image_ratio: f64,
    /// 0 means unlimited.
    pub max_rows: usize,
    pub stretch_last_row: bool,
    pub shuffle_images: bool,
    /// Horizontal and vertical spacing in pixels.
    pub gap: f64,
    pub play_button_on_video_cover: bool,
    /// Pick the breakpoint from the viewport instead of the container.
    pub observe_window_width: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            row_height_sm: 0.25,
            row_height_md: 0.2,
            row_height_xl: 0.18,
            should_retrieve_width_and_height: false,
            fallback_image_width: 1000.0,
            fallback_image_height: 1000.0,
            max_image_ratio: 1.6,
            min_image_ratio: 0.65,
            max_rows: 0,
            stretch_last_row: true,
            shuffle_images: false,
            gap: 4.0,
            play_button_on_video_cover: true,
            observe_window_width: true,
        }
    }
}

impl LayoutOptions {
    /// Row-height ratio for a breakpoint; an unknown width uses the small one.
    pub fn row_height_ratio(&self, breakpoint: Option<Breakpoint>) -> f64 {
        match breakpoint {
            Some(Breakpoint::Large) => self.row_height_xl,
            Some(Breakpoint::Medium) => self.row_height_md,
            Some(Breakpoint::Small) | None => self.row_height_sm,
        }
    }

    /// Dimensions used for packing: unknown sides take the fallback and the
    /// ratio is clamped by adjusting the width.
    pub fn working_dimensions(&self, item: &MediaItem) -> Tile {
        let mut width = match item.width {
            0 => self.fallback_image_width,
            w => f64::from(w),
        };
        let height = match item.height {
            0 => self.fallback_image_height,
            h => f64::from(h),
        };

        let ratio = width / height;
        if ratio > self.max_image_ratio {
            width = self.max_image_ratio * height;
        } else if ratio < self.min_image_ratio {
            width = self.min_image_ratio * height;
        }
        Tile { width, height }
    }

    pub fn apply(&mut self, update: LayoutOptionsUpdate) {
        let LayoutOptionsUpdate {
            row_height,
            mut row_height_sm,
            mut row_height_md,
            mut row_height_xl,
            should_retrieve_width_and_height,
            fallback_image_width,
            fallback_image_height,
            max_image_ratio,
            min_image_ratio,
            max_rows,
            stretch_last_row,
            shuffle_images,
            gap,
            play_button_on_video_cover,
            observe_window_width,
        } = update;

        if let Some(all) = row_height.filter(|v| *v != 0.0 && !v.is_nan()) {
            row_height_sm = Some(all);
            row_height_md = Some(all);
            row_height_xl = Some(all);
        }

        if let Some(v) = row_height_sm {
            self.row_height_sm = v;
        }
        if let Some(v) = row_height_md {
            self.row_height_md = v;
        }
        if let Some(v) = row_height_xl {
            self.row_height_xl = v;
        }
        if let Some(v) = should_retrieve_width_and_height {
            self.should_retrieve_width_and_height = v;
        }
        if let Some(v) = fallback_image_width {
            self.fallback_image_width = v;
        }
        if let Some(v) = fallback_image_height {
            self.fallback_image_height = v;
        }
        if let Some(v) = max_image_ratio {
            self.max_image_ratio = v;
        }
        if let Some(v) = min_image_ratio {
            self.min_image_ratio = v;
        }
        if let Some(v) = max_rows {
            self.max_rows = v;
        }
        if let Some(v) = stretch_last_row {
            self.stretch_last_row = v;
        }
        if let Some(v) = shuffle_images {
            self.shuffle_images = v;
        }
        if let Some(v) = gap {
            self.gap = v;
        }
        if let Some(v) = play_button_on_video_cover {
            self.play_button_on_video_cover = v;
        }
        if let Some(v) = observe_window_width {
            self.observe_window_width = v;
        }
    }

    pub fn merged(mut self, update: LayoutOptionsUpdate) -> Self {
        self.apply(update);
        self
    }
}

/// Partial options; unset fields keep their current value.
///
/// `rowHeight` is a shorthand that overwrites all three breakpoint ratios,
/// including any of them set in the same update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptionsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_height: Option<f64>,
    #[serde(rename = "rowHeightSM", skip_serializing_if = "Option::is_none")]
    pub row_height_sm: Option<f64>,
    #[serde(rename = "rowHeightMD", skip_serializing_if = "Option::is_none")]
    pub row_height_md: Option<f64>,
    #[serde(rename = "rowHeightXL", skip_serializing_if = "Option::is_none")]
    pub row_height_xl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_retrieve_width_and_height: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_image_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_image_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_image_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_image_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stretch_last_row: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_images: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_button_on_video_cover: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observe_window_width: Option<bool>,
}
