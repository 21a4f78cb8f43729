//! Image dimension sniffing from a byte prefix.
//!
//! Only container headers are parsed, so the first 64 KiB of a file is
//! enough for every supported format. Unsupported or truncated input yields
//! [`Dimensions::UNKNOWN`] instead of an error, and callers treat a zero size
//! as "unknown", never as an empty image.

use tracing::trace;

const PNG_SIGNATURE: u32 = 0x8950_4E47;
const PNG_SIGNATURE_END: u32 = 0x0D0A_1A0A;
const JPEG_SOI: u16 = 0xFFD8;
const RIFF: u32 = 0x5249_4646;
const WEBP: u32 = 0x5745_4250;
const CHUNK_VP8: u32 = 0x5650_3820;
const CHUNK_VP8L: u32 = 0x5650_384C;
const CHUNK_VP8X: u32 = 0x5650_3858;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    Unknown,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl Dimensions {
    pub const UNKNOWN: Self = Self {
        width: 0,
        height: 0,
        format: ImageFormat::Unknown,
    };

    fn new(width: u32, height: u32, format: ImageFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

fn u8_at(bytes: &[u8], offset: usize) -> Option<u8> {
    bytes.get(offset).copied()
}

fn be_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let b = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

fn be_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn le_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let b = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

fn le_u24(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset.checked_add(3)?)?;
    Some(u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16))
}

fn le_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Reads width, height and format from the leading bytes of an image.
pub fn sniff_bytes(bytes: &[u8]) -> Dimensions {
    if let Some(dims) = parse_png(bytes) {
        return dims;
    }
    if be_u16(bytes, 0) == Some(JPEG_SOI) {
        if let Some(dims) = parse_jpeg(bytes) {
            return dims;
        }
    }
    if let Some(dims) = parse_webp(bytes) {
        return dims;
    }
    trace!(len = bytes.len(), "no supported image header found");
    Dimensions::UNKNOWN
}

fn parse_png(bytes: &[u8]) -> Option<Dimensions> {
    if be_u32(bytes, 0)? != PNG_SIGNATURE || be_u32(bytes, 4)? != PNG_SIGNATURE_END {
        return None;
    }
    // IHDR is always the first chunk.
    let width = be_u32(bytes, 16)?;
    let height = be_u32(bytes, 20)?;
    trace!("png header {}x{}", width, height);
    Some(Dimensions::new(width, height, ImageFormat::Png))
}

fn is_start_of_frame(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// Walks marker segments until a start-of-frame marker.
fn parse_jpeg(bytes: &[u8]) -> Option<Dimensions> {
    let mut offset = 2usize;
    while offset < bytes.len() {
        if u8_at(bytes, offset)? != 0xFF {
            break;
        }
        let marker = u8_at(bytes, offset + 1)?;
        let length = be_u16(bytes, offset + 2)?;

        if is_start_of_frame(marker) {
            let height = be_u16(bytes, offset + 5)?;
            let width = be_u16(bytes, offset + 7)?;
            trace!("jpeg SOF {:#04x} {}x{}", marker, width, height);
            return Some(Dimensions::new(
                u32::from(width),
                u32::from(height),
                ImageFormat::Jpeg,
            ));
        }
        offset = offset.checked_add(2 + usize::from(length))?;
    }
    None
}

fn parse_webp(bytes: &[u8]) -> Option<Dimensions> {
    if be_u32(bytes, 0)? != RIFF || be_u32(bytes, 8)? != WEBP {
        return None;
    }

    let mut offset = 12usize;
    while offset < bytes.len() {
        let chunk = be_u32(bytes, offset)?;
        let size = le_u32(bytes, offset + 4)? as usize;
        let data = offset + 8;

        match chunk {
            CHUNK_VP8 => {
                // 3-byte frame tag, 3-byte start code, then 14-bit sizes.
                let width = le_u16(bytes, data + 6)? & 0x3FFF;
                let height = le_u16(bytes, data + 8)? & 0x3FFF;
                return Some(Dimensions::new(
                    u32::from(width),
                    u32::from(height),
                    ImageFormat::Webp,
                ));
            }
            CHUNK_VP8L => {
                // 0x2F signature byte, then width-1 and height-1 packed in 28 bits.
                let b0 = u32::from(u8_at(bytes, data + 1)?);
                let b1 = u32::from(u8_at(bytes, data + 2)?);
                let b2 = u32::from(u8_at(bytes, data + 3)?);
                let b3 = u32::from(u8_at(bytes, data + 4)?);
                let width = 1 + (((b1 & 0x3F) << 8) | b0);
                let height = 1 + (((b3 & 0x0F) << 10) | (b2 << 2) | ((b1 & 0xC0) >> 6));
                return Some(Dimensions::new(width, height, ImageFormat::Webp));
            }
            CHUNK_VP8X => {
                let width = 1 + le_u24(bytes, offset + 12)?;
                let height = 1 + le_u24(bytes, offset + 15)?;
                return Some(Dimensions::new(width, height, ImageFormat::Webp));
            }
            _ => {}
        }

        offset = data.checked_add(size)?.checked_add(size % 2)?;
    }
    None
}
