//! Camera metadata for the viewer's info panel.
//!
//! Parsing sits behind [`MetadataParser`] so the viewer can run without it;
//! the default [`ExifParser`] reads EXIF from a fetched prefix of the image.

use std::io::Cursor;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config;
use crate::models::ExifMetadata;
use crate::probe::fetch::RangeFetcher;

#[async_trait]
pub trait MetadataParser: Send + Sync {
    async fn parse(&self, url: &str) -> Result<ExifMetadata>;
}

/// EXIF reader over a [`RangeFetcher`], caching parsed results per URL.
pub struct ExifParser {
    fetcher: Arc<dyn RangeFetcher>,
    prefix_len: usize,
    cache: Mutex<LruCache<String, ExifMetadata>>,
}

impl ExifParser {
    pub fn new(fetcher: Arc<dyn RangeFetcher>) -> Self {
        Self {
            fetcher,
            prefix_len: config::sniff_bytes(),
            cache: Mutex::new(LruCache::new(config::metadata_cache_entries())),
        }
    }
}

#[async_trait]
impl MetadataParser for ExifParser {
    async fn parse(&self, url: &str) -> Result<ExifMetadata> {
        if let Some(hit) = self.cache.lock().get(url) {
            trace!("exif cache hit for {}", url);
            return Ok(hit.clone());
        }

        let bytes = self
            .fetcher
            .fetch_prefix(url, self.prefix_len)
            .await
            .with_context(|| format!("fetching metadata for {url}"))?;
        let exif = parse_exif_bytes(&bytes).with_context(|| format!("parsing EXIF of {url}"))?;
        debug!("parsed EXIF for {}", url);

        self.cache.lock().put(url.to_string(), exif.clone());
        Ok(exif)
    }
}

fn ascii(field: &exif::Field) -> Option<String> {
    match &field.value {
        exif::Value::Ascii(parts) => {
            let text = parts
                .iter()
                .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').trim().to_string())
                .collect::<Vec<_>>()
                .join(" ");
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

fn number(field: &exif::Field) -> Option<f64> {
    let value = match &field.value {
        exif::Value::Rational(v) => v.first().map(|r| r.to_f64()),
        exif::Value::SRational(v) => v.first().map(|r| r.to_f64()),
        other => other.get_uint(0).map(f64::from),
    };
    value.filter(|v| v.is_finite())
}

fn gps_coordinate(value: &exif::Value) -> Option<f64> {
    match value {
        exif::Value::Rational(r) if r.len() >= 3 => {
            Some(r[0].to_f64() + r[1].to_f64() / 60.0 + r[2].to_f64() / 3600.0)
        }
        _ => None,
    }
}

fn signed_coordinate(
    exif: &exif::Exif,
    tag: exif::Tag,
    ref_tag: exif::Tag,
    negative: char,
) -> Option<f64> {
    let value = gps_coordinate(&exif.get_field(tag, exif::In::PRIMARY)?.value)?;
    let reference = exif
        .get_field(ref_tag, exif::In::PRIMARY)
        .map(|f| f.display_value().to_string())
        .unwrap_or_default();
    Some(if reference.contains(negative) {
        -value
    } else {
        value
    })
}

/// Extracts the panel fields from any container kamadak-exif understands
/// (JPEG, TIFF, PNG, WebP, HEIF).
pub fn parse_exif_bytes(bytes: &[u8]) -> Result<ExifMetadata> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .context("no readable EXIF block")?;

    let field = |tag: exif::Tag| exif.get_field(tag, exif::In::PRIMARY);

    let date_time_original = field(exif::Tag::DateTimeOriginal)
        .or_else(|| field(exif::Tag::DateTime))
        .map(|f| f.display_value().to_string());

    Ok(ExifMetadata {
        date_time_original,
        f_number: field(exif::Tag::FNumber).and_then(number),
        exposure_time: field(exif::Tag::ExposureTime).and_then(number),
        iso: field(exif::Tag::PhotographicSensitivity).and_then(number),
        focal_length: field(exif::Tag::FocalLength).and_then(number),
        image_width: field(exif::Tag::PixelXDimension).and_then(number),
        image_height: field(exif::Tag::PixelYDimension).and_then(number),
        make: field(exif::Tag::Make).and_then(ascii),
        model: field(exif::Tag::Model).and_then(ascii),
        lens_model: field(exif::Tag::LensModel).and_then(ascii),
        latitude: signed_coordinate(
            &exif,
            exif::Tag::GPSLatitude,
            exif::Tag::GPSLatitudeRef,
            'S',
        ),
        longitude: signed_coordinate(
            &exif,
            exif::Tag::GPSLongitude,
            exif::Tag::GPSLongitudeRef,
            'W',
        ),
    })
}
