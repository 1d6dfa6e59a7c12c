//! Image decoders for various formats
//!
//! Support for PNG and TIFF micrograph files. All decode failures surface
//! here, before the classifier ever runs; the classifier itself never sees
//! a missing or malformed image.

use std::path::Path;

/// Decoded image data: interleaved 8-bit RGB in raster order.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Interleaved RGB data, one byte per channel
    pub data: Vec<u8>,

    /// Number of channels (3 for RGB)
    pub channels: u8,
}

/// Decode an image from a file path
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<DecodedImage, String> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| "No file extension found".to_string())?;

    match extension.as_str() {
        "png" => decode_png(path),
        "tif" | "tiff" => decode_tiff(path),
        _ => Err(format!("Unsupported file format: {}", extension)),
    }
}

/// Decode a PNG file
fn decode_png<P: AsRef<Path>>(path: P) -> Result<DecodedImage, String> {
    use std::fs::File;
    use std::io::BufReader;

    let file = File::open(path.as_ref()).map_err(|e| format!("Failed to open PNG file: {}", e))?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder
        .read_info()
        .map_err(|e| format!("Failed to read PNG info: {}", e))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame_info = reader
        .next_frame(&mut buf)
        .map_err(|e| format!("Failed to read PNG frame: {}", e))?;
    let bytes = &buf[..frame_info.buffer_size()];

    let data = match (color_type, bit_depth) {
        (png::ColorType::Rgb, png::BitDepth::Eight) => {
            expect_len(bytes, width, height, 3, 1)?;
            bytes.to_vec()
        }
        (png::ColorType::Rgb, png::BitDepth::Sixteen) => {
            expect_len(bytes, width, height, 3, 2)?;
            // PNG 16-bit is big-endian; keep the high byte.
            bytes.chunks_exact(2).map(|pair| pair[0]).collect()
        }
        (png::ColorType::Rgba, png::BitDepth::Eight) => {
            expect_len(bytes, width, height, 4, 1)?;
            drop_alpha(bytes, 4)
        }
        (png::ColorType::Rgba, png::BitDepth::Sixteen) => {
            expect_len(bytes, width, height, 4, 2)?;
            let narrowed: Vec<u8> = bytes.chunks_exact(2).map(|pair| pair[0]).collect();
            drop_alpha(&narrowed, 4)
        }
        (png::ColorType::Grayscale, png::BitDepth::Eight) => {
            expect_len(bytes, width, height, 1, 1)?;
            expand_gray(bytes)
        }
        (png::ColorType::Grayscale, png::BitDepth::Sixteen) => {
            expect_len(bytes, width, height, 1, 2)?;
            let narrowed: Vec<u8> = bytes.chunks_exact(2).map(|pair| pair[0]).collect();
            expand_gray(&narrowed)
        }
        (png::ColorType::GrayscaleAlpha, _) => {
            return Err("Grayscale+Alpha PNG not yet supported".to_string());
        }
        (png::ColorType::Indexed, _) => {
            return Err("Indexed PNG not supported".to_string());
        }
        _ => {
            return Err(format!(
                "Unsupported PNG format: {:?} with bit depth {:?}",
                color_type, bit_depth
            ));
        }
    };

    Ok(DecodedImage {
        width,
        height,
        data,
        channels: 3,
    })
}

/// Decode a TIFF file
fn decode_tiff<P: AsRef<Path>>(path: P) -> Result<DecodedImage, String> {
    use std::fs::File;
    use std::io::BufReader;

    let file = File::open(path.as_ref()).map_err(|e| format!("Failed to open TIFF file: {}", e))?;

    let mut decoder = tiff::decoder::Decoder::new(BufReader::new(file))
        .map_err(|e| format!("Failed to create TIFF decoder: {}", e))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| format!("Failed to get TIFF dimensions: {}", e))?;

    let color_type = decoder
        .colortype()
        .map_err(|e| format!("Failed to get TIFF color type: {}", e))?;

    let source_channels = match color_type {
        tiff::ColorType::Gray(_) => 1,
        tiff::ColorType::RGB(_) => 3,
        tiff::ColorType::RGBA(_) => 4,
        other => return Err(format!("Unsupported TIFF color type: {:?}", other)),
    };

    let image_data = decoder
        .read_image()
        .map_err(|e| format!("Failed to read TIFF image data: {}", e))?;

    // Narrow to 8-bit channels before structural conversion.
    let bytes: Vec<u8> = match image_data {
        tiff::decoder::DecodingResult::U8(buf) => buf,
        tiff::decoder::DecodingResult::U16(buf) => buf.iter().map(|&v| (v >> 8) as u8).collect(),
        _ => return Err("Only 8-bit and 16-bit TIFF samples are supported".to_string()),
    };

    expect_len(&bytes, width, height, source_channels, 1)?;

    let data = match source_channels {
        1 => expand_gray(&bytes),
        4 => drop_alpha(&bytes, 4),
        _ => bytes,
    };

    Ok(DecodedImage {
        width,
        height,
        data,
        channels: 3,
    })
}

/// Validate a decoded buffer length against the declared geometry
fn expect_len(
    bytes: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    bytes_per_sample: usize,
) -> Result<(), String> {
    let expected = width as usize * height as usize * channels * bytes_per_sample;
    if bytes.len() != expected {
        return Err(format!(
            "Image buffer size mismatch: expected {}, got {}",
            expected,
            bytes.len()
        ));
    }
    Ok(())
}

/// Expand single-channel grayscale to interleaved RGB
fn expand_gray(bytes: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(bytes.len() * 3);
    for &gray in bytes {
        rgb.push(gray);
        rgb.push(gray);
        rgb.push(gray);
    }
    rgb
}

/// Drop the alpha channel from interleaved RGBA-like data
fn drop_alpha(bytes: &[u8], stride: usize) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(bytes.len() / stride * 3);
    for pixel in bytes.chunks_exact(stride) {
        rgb.push(pixel[0]);
        rgb.push(pixel[1]);
        rgb.push(pixel[2]);
    }
    rgb
}
