//! Decoder for uncompressed true-color Targa (TGA) images.
//!
//! Only the raw 24- and 32-bit variant (data type 2) is supported.
//! Decoded images are always top-down, 8-bit RGBA with premultiplied alpha,
//! which is the layout `tiny-skia` pixmaps use.

use std::collections::TryReserveError;

/// Size in bytes of the fixed TGA header.
pub const HEADER_SIZE: usize = 18;

/// Data type code of an uncompressed true-color image.
const UNCOMPRESSED_TRUE_COLOR: u8 = 2;

/// Image descriptor bit set when rows are stored top to bottom.
const TOP_DOWN_BIT: u8 = 1 << 5;

/// An error returned from [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("texture data is not larger than the 18-byte TGA header")]
    TruncatedHeader,
    #[error("unsupported TGA data type {0}; only uncompressed true-color images are supported")]
    UnsupportedCompression(u8),
    #[error("unsupported pixel depth of {0} bits; only 24 and 32 bit images are supported")]
    UnsupportedPixelDepth(u8),
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: i16, height: i16 },
    #[error("pixel data is {actual} bytes, expected at least {expected}")]
    TruncatedPayload { expected: usize, actual: usize },
    #[error("failed to allocate texture memory")]
    AllocationFailure,
}

impl From<TryReserveError> for DecodeError {
    fn from(_: TryReserveError) -> Self {
        DecodeError::AllocationFailure
    }
}

/// The fixed 18-byte header at the start of every TGA file.
///
/// Multi-byte fields are little-endian.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    pub id_length: u8,
    pub color_map_type: u8,
    pub data_type: u8,
    pub color_map_origin: i16,
    pub color_map_length: i16,
    pub color_map_depth: u8,
    pub x_origin: i16,
    pub y_origin: i16,
    pub width: i16,
    pub height: i16,
    pub bits_per_pixel: u8,
    pub image_descriptor: u8,
}

impl ImageHeader {
    /// Reads the header from the first [`HEADER_SIZE`] bytes of `bytes`.
    ///
    /// Fails if `bytes` does not extend past the header.
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() <= HEADER_SIZE {
            return Err(DecodeError::TruncatedHeader);
        }

        let i16_at = |offset: usize| i16::from_le_bytes([bytes[offset], bytes[offset + 1]]);

        Ok(Self {
            id_length: bytes[0],
            color_map_type: bytes[1],
            data_type: bytes[2],
            color_map_origin: i16_at(3),
            color_map_length: i16_at(5),
            color_map_depth: bytes[7],
            x_origin: i16_at(8),
            y_origin: i16_at(10),
            width: i16_at(12),
            height: i16_at(14),
            bits_per_pixel: bytes[16],
            image_descriptor: bytes[17],
        })
    }

    /// Source bytes per pixel.
    pub fn color_mode(&self) -> usize {
        usize::from(self.bits_per_pixel / 8)
    }

    /// Whether scanlines are stored starting from the top of the image.
    pub fn is_top_down(&self) -> bool {
        self.image_descriptor & TOP_DOWN_BIT != 0
    }
}

/// A decoded image in top-down RGBA8 with premultiplied alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTexture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl DecodedTexture {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel data, `width * height * 4` bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Decodes an uncompressed 24- or 32-bit TGA image.
///
/// Blue and red are swapped, bottom-up images are flipped so that the first
/// row of the output is the top of the image, and 32-bit pixels are
/// premultiplied by their alpha.
pub fn decode(bytes: &[u8]) -> Result<DecodedTexture, DecodeError> {
    let header = ImageHeader::parse(bytes)?;

    if header.data_type != UNCOMPRESSED_TRUE_COLOR {
        return Err(DecodeError::UnsupportedCompression(header.data_type));
    }

    let color_mode = header.color_mode();
    if !(3..=4).contains(&color_mode) {
        return Err(DecodeError::UnsupportedPixelDepth(header.bits_per_pixel));
    }

    if header.width < 0 || header.height < 0 {
        return Err(DecodeError::InvalidDimensions {
            width: header.width,
            height: header.height,
        });
    }
    let width = header.width as usize;
    let height = header.height as usize;

    let source = &bytes[HEADER_SIZE..];
    let expected = width * height * color_mode;
    if source.len() < expected {
        return Err(DecodeError::TruncatedPayload {
            expected,
            actual: source.len(),
        });
    }

    let mut data = Vec::new();
    data.try_reserve_exact(width * height * 4)?;
    data.resize(width * height * 4, 0);

    if width > 0 {
        let source_rows = source[..expected].chunks_exact(width * color_mode);
        for (y, source_row) in source_rows.enumerate() {
            let dest_y = if header.is_top_down() {
                y
            } else {
                height - y - 1
            };
            let dest_row = &mut data[dest_y * width * 4..(dest_y + 1) * width * 4];
            convert_row(source_row, dest_row, color_mode);
        }
    }

    Ok(DecodedTexture {
        width: width as u32,
        height: height as u32,
        data,
    })
}

/// Converts one scanline of BGR or BGRA pixels to premultiplied RGBA.
fn convert_row(source: &[u8], dest: &mut [u8], color_mode: usize) {
    for (src, dst) in source
        .chunks_exact(color_mode)
        .zip(dest.chunks_exact_mut(4))
    {
        let (b, g, r) = (src[0], src[1], src[2]);
        if color_mode == 4 {
            let a = src[3];
            dst.copy_from_slice(&[premultiply(r, a), premultiply(g, a), premultiply(b, a), a]);
        } else {
            dst.copy_from_slice(&[r, g, b, u8::MAX]);
        }
    }
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    (u16::from(channel) * u16::from(alpha) / 255) as u8
}
