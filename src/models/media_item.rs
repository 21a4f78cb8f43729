use serde::{Deserialize, Deserializer, Serialize};

/// Extensions treated as video, matched case-insensitively against the end of the URL.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "webm", "mov", "avi", "wmv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Text,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else if ext.is_empty() {
            None
        } else {
            Some(Self::Image)
        }
    }

    /// Classifies an entry by its source URL: no source means text.
    pub fn from_source(src: Option<&str>) -> Self {
        match src {
            None | Some("") => Self::Text,
            Some(url) if is_video_url(url) => Self::Video,
            Some(_) => Self::Image,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Text => "text",
        }
    }
}

pub fn is_video_url(url: &str) -> bool {
    url.rsplit_once('.')
        .and_then(|(_, ext)| MediaKind::from_extension(ext))
        == Some(MediaKind::Video)
}

/// Parses `"28/10"` or `"2.8"` into a number.
pub fn parse_rational(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let value: Option<f64> = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then_some(num / den)
        }
        None => raw.parse().ok(),
    };
    value.filter(|v| v.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Accepts a JSON number, a numeric or rational string, or null.
/// Anything else deserializes to `None` rather than failing the record.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(t)) => parse_rational(&t),
        Some(NumberOrText::Other(_)) | None => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Text(t)) => Some(t),
        Some(NumberOrText::Number(n)) => Some(n.to_string()),
        Some(NumberOrText::Other(_)) | None => None,
    })
}

/// Camera metadata attached to an image, keyed the way the backend emits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifMetadata {
    #[serde(
        rename = "DateTimeOriginal",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_time_original: Option<String>,
    #[serde(
        rename = "FNumber",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub f_number: Option<f64>,
    #[serde(
        rename = "ExposureTime",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub exposure_time: Option<f64>,
    #[serde(
        rename = "ISO",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub iso: Option<f64>,
    #[serde(
        rename = "FocalLength",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub focal_length: Option<f64>,
    #[serde(
        rename = "ExifImageWidth",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_width: Option<f64>,
    #[serde(
        rename = "ExifImageHeight",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_height: Option<f64>,
    #[serde(
        rename = "Make",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub make: Option<String>,
    #[serde(
        rename = "Model",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<String>,
    #[serde(
        rename = "LensModel",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub lens_model: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub latitude: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub longitude: Option<f64>,
}

impl ExifMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Kind of a backend manifest record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Image,
    Video,
    Title,
    Text,
    Unknown,
}

/// One record of an album manifest as the backend serves it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Legacy alias for `src`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exif: Option<ExifMetadata>,
    /// Id of a document element whose children are shown as text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl ManifestEntry {
    pub fn image(src: &str) -> Self {
        Self {
            entry_type: Some("image".into()),
            src: Some(src.to_string()),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(f64::from(width));
        self.height = Some(f64::from(height));
        self
    }

    pub fn kind(&self) -> EntryKind {
        match self.entry_type.as_deref() {
            Some("image") => EntryKind::Image,
            Some("video") => EntryKind::Video,
            Some("title") => EntryKind::Title,
            Some("text") => EntryKind::Text,
            _ => EntryKind::Unknown,
        }
    }
}

fn dimension(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 => v.min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A normalized media descriptor shared by the mosaic and the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub source_url: Option<String>,
    pub preview_url: Option<String>,
    /// Intrinsic width in pixels, 0 when unknown.
    pub width: u32,
    /// Intrinsic height in pixels, 0 when unknown.
    pub height: u32,
    pub kind: MediaKind,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub exif: Option<ExifMetadata>,
    /// Markup shown by the viewer for text entries.
    pub text: Option<String>,
    /// Id of a document element whose children are cloned into the viewer.
    pub element: Option<String>,
}

impl MediaItem {
    /// Create an image or video item with just the essential display fields
    pub fn new(src: &str, width: u32, height: u32) -> Self {
        let mut item = Self::from_entry(ManifestEntry::image(src));
        item.width = width;
        item.height = height;
        item
    }

    /// Normalizes a manifest record. `url` aliases `src`, a preview-only
    /// record uses the preview as its source and the preview falls back to
    /// the source. Width and height are both kept only when both are known.
    pub fn from_entry(entry: ManifestEntry) -> Self {
        let mut src = non_empty(entry.src).or(non_empty(entry.url));
        let mut preview = non_empty(entry.preview);
        if src.is_none() {
            src = preview.clone();
        }
        if preview.is_none() {
            preview = src.clone();
        }

        let (mut width, mut height) = (dimension(entry.width), dimension(entry.height));
        if width == 0 || height == 0 {
            width = 0;
            height = 0;
        }

        Self {
            kind: MediaKind::from_source(src.as_deref()),
            source_url: src,
            preview_url: preview,
            width,
            height,
            title: non_empty(entry.title),
            alt: non_empty(entry.alt),
            exif: entry.exif.filter(|e| !e.is_empty()),
            text: non_empty(entry.text),
            element: non_empty(entry.element),
        }
    }

    pub fn src(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview_url.as_deref().or(self.src())
    }

    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    pub fn is_text(&self) -> bool {
        self.kind == MediaKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_source() {
        assert_eq!(MediaKind::from_source(Some("a/b/clip.MP4")), MediaKind::Video);
        assert_eq!(MediaKind::from_source(Some("clip.wmv")), MediaKind::Video);
        assert_eq!(MediaKind::from_source(Some("photo.jpg")), MediaKind::Image);
        assert_eq!(MediaKind::from_source(Some("notmp4")), MediaKind::Image);
        assert_eq!(MediaKind::from_source(None), MediaKind::Text);
        assert_eq!(MediaKind::from_source(Some("")), MediaKind::Text);
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(MediaKind::from_extension("WebM"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension(""), None);
        assert!(is_video_url("trip/v1.2/final.MOV"));
        assert!(!is_video_url("clip.webm?v=3"));
        assert!(!is_video_url("https://cdn.example.org/mp4"));
    }

    #[test]
    fn test_parse_rational() {
        assert_eq!(parse_rational("28/10"), Some(2.8));
        assert_eq!(parse_rational(" 1/250 "), Some(0.004));
        assert_eq!(parse_rational("4.5"), Some(4.5));
        assert_eq!(parse_rational("1/0"), None);
        assert_eq!(parse_rational("f/2"), None);
    }

    #[test]
    fn test_url_aliases_src_and_preview_falls_back() {
        let entry: ManifestEntry =
            serde_json::from_str(r#"{"type":"image","url":"a.jpg","width":300,"height":200}"#)
                .unwrap();
        let item = MediaItem::from_entry(entry);
        assert_eq!(item.src(), Some("a.jpg"));
        assert_eq!(item.preview(), Some("a.jpg"));
        assert_eq!((item.width, item.height), (300, 200));
        assert_eq!(item.kind, MediaKind::Image);
    }

    #[test]
    fn test_preview_only_record_uses_preview_as_source() {
        let entry = ManifestEntry {
            preview: Some("small.jpg".into()),
            ..ManifestEntry::default()
        };
        let item = MediaItem::from_entry(entry);
        assert_eq!(item.src(), Some("small.jpg"));
        assert_eq!(item.kind, MediaKind::Image);
    }

    #[test]
    fn test_partial_dimensions_become_unknown() {
        let entry = ManifestEntry {
            width: Some(640.0),
            ..ManifestEntry::image("a.png")
        };
        let item = MediaItem::from_entry(entry);
        assert!(!item.has_dimensions());
        assert_eq!((item.width, item.height), (0, 0));
    }

    #[test]
    fn test_text_entry_without_source() {
        let entry: ManifestEntry =
            serde_json::from_str(r#"{"type":"text","text":"<b>hi</b>"}"#).unwrap();
        assert_eq!(entry.kind(), EntryKind::Text);
        let item = MediaItem::from_entry(entry);
        assert!(item.is_text());
        assert_eq!(item.text.as_deref(), Some("<b>hi</b>"));
    }

    #[test]
    fn test_exif_accepts_numbers_and_rationals() {
        let exif: ExifMetadata = serde_json::from_str(
            r#"{"FNumber":"28/10","ExposureTime":0.004,"ISO":"400","Make":"Fujifilm","latitude":null,"Flash":16}"#,
        )
        .unwrap();
        assert_eq!(exif.f_number, Some(2.8));
        assert_eq!(exif.exposure_time, Some(0.004));
        assert_eq!(exif.iso, Some(400.0));
        assert_eq!(exif.make.as_deref(), Some("Fujifilm"));
        assert_eq!(exif.latitude, None);
    }

    #[test]
    fn test_exif_round_trips_backend_keys() {
        let exif = ExifMetadata {
            f_number: Some(1.8),
            model: Some("X100V".into()),
            ..ExifMetadata::default()
        };
        let json = serde_json::to_string(&exif).unwrap();
        assert_eq!(json, r#"{"FNumber":1.8,"Model":"X100V"}"#);
    }
}
