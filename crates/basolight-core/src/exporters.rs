//! Image exporters
//!
//! Export highlighted images to PNG for viewing.

use crate::decoders::DecodedImage;
use std::path::Path;

/// Export an image to 8-bit RGB PNG
pub fn export_png<P: AsRef<Path>>(image: &DecodedImage, path: P) -> Result<(), String> {
    use std::fs::File;
    use std::io::BufWriter;

    if image.channels != 3 {
        return Err(format!(
            "PNG export only supports 3-channel RGB, got {} channels",
            image.channels
        ));
    }

    let expected_len = image.width as usize * image.height as usize * 3;
    if image.data.len() != expected_len {
        return Err(format!(
            "Image buffer size mismatch: expected {}, got {}",
            expected_len,
            image.data.len()
        ));
    }

    let file =
        File::create(path.as_ref()).map_err(|e| format!("Failed to create PNG file: {}", e))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| format!("Failed to write PNG header: {}", e))?;

    png_writer
        .write_image_data(&image.data)
        .map_err(|e| format!("Failed to write PNG image data: {}", e))
}
