use serde::{Deserialize, Serialize};

/// Viewer configuration. Field names follow the JSON the pages embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerOptions {
    pub zoom: bool,
    /// Ascending scale factors; zoom level `k` uses entry `k - 1`.
    pub zoom_levels: Vec<f64>,
    pub counter: bool,
    pub preload: bool,
    pub title: bool,
    pub info: bool,
    /// Allow hiding the interface chrome.
    pub hide: bool,
    /// Parse metadata of images that carry no embedded EXIF.
    pub load_exif: bool,
    pub thumbnails: bool,
    /// Thumbnail edge length in pixels.
    pub thumbnails_size: f64,
    pub thumbnails_gap: f64,
    pub click_outside_to_close: bool,
    pub translate_on_horizontal_swipe: bool,
    pub translate_on_vertical_swipe: bool,
    pub animation: String,
    pub theme: String,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            zoom: true,
            zoom_levels: vec![1.5, 2.0, 2.5, 3.0],
            counter: true,
            preload: true,
            title: true,
            info: true,
            hide: true,
            load_exif: true,
            thumbnails: true,
            thumbnails_size: 48.0,
            thumbnails_gap: 4.0,
            click_outside_to_close: true,
            translate_on_horizontal_swipe: true,
            translate_on_vertical_swipe: true,
            animation: "short-slide".into(),
            theme: "dark".into(),
        }
    }
}

impl ViewerOptions {
    pub fn apply(&mut self, update: ViewerOptionsUpdate) {
        let ViewerOptionsUpdate {
            zoom,
            zoom_levels,
            counter,
            preload,
            title,
            info,
            hide,
            load_exif,
            thumbnails,
            thumbnails_size,
            thumbnails_gap,
            click_outside_to_close,
            translate_on_horizontal_swipe,
            translate_on_vertical_swipe,
            animation,
            theme,
        } = update;

        if let Some(v) = zoom {
            self.zoom = v;
        }
        if let Some(v) = zoom_levels {
            self.zoom_levels = v;
        }
        if let Some(v) = counter {
            self.counter = v;
        }
        if let Some(v) = preload {
            self.preload = v;
        }
        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = info {
            self.info = v;
        }
        if let Some(v) = hide {
            self.hide = v;
        }
        if let Some(v) = load_exif {
            self.load_exif = v;
        }
        if let Some(v) = thumbnails {
            self.thumbnails = v;
        }
        if let Some(v) = thumbnails_size {
            self.thumbnails_size = v;
        }
        if let Some(v) = thumbnails_gap {
            self.thumbnails_gap = v;
        }
        if let Some(v) = click_outside_to_close {
            self.click_outside_to_close = v;
        }
        if let Some(v) = translate_on_horizontal_swipe {
            self.translate_on_horizontal_swipe = v;
        }
        if let Some(v) = translate_on_vertical_swipe {
            self.translate_on_vertical_swipe = v;
        }
        if let Some(v) = animation {
            self.animation = v;
        }
        if let Some(v) = theme {
            self.theme = v;
        }
    }

    pub fn merged(mut self, update: ViewerOptionsUpdate) -> Self {
        self.apply(update);
        self
    }
}

/// Partial viewer options; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerOptionsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_levels: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preload: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_exif: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_outside_to_close: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_on_horizontal_swipe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_on_vertical_swipe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}
