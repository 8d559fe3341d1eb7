use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reorders GL's bottom-up RGBA rows into top-down image order.
pub fn flip_rows(pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    let row = width as usize * 4;
    debug_assert_eq!(pixels.len(), row * height as usize);

    pixels
        .chunks_exact(row)
        .rev()
        .flat_map(|r| r.iter().copied())
        .collect()
}

/// Writes bottom-up RGBA pixels read back from GL as a PNG file.
pub fn write_png(
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<(), ScreenshotError> {
    let path = path.as_ref();
    let expected = width as usize * height as usize * 4;

    if pixels.len() != expected {
        return Err(ScreenshotError::Size {
            expected,
            actual: pixels.len(),
        });
    }

    let io_err = |source| ScreenshotError::Io {
        path: path.to_owned(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let writer = BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&flip_rows(pixels, width, height))?;

    log::info!("wrote {}x{} screenshot to {:?}", width, height, path);

    Ok(())
}

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("could not create {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode PNG: {0}")]
    Encoding(#[from] png::EncodingError),
    #[error("expected {expected} bytes of pixel data, got {actual}")]
    Size { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_reversed() {
        // 1x3 image, one RGBA pixel per row
        let bottom_up = [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3];

        assert_eq!(
            flip_rows(&bottom_up, 1, 3),
            vec![3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1]
        );
    }

    #[test]
    fn pixels_within_a_row_keep_their_order() {
        let bottom_up = [1, 0, 0, 255, 2, 0, 0, 255, 3, 0, 0, 255, 4, 0, 0, 255];

        assert_eq!(
            flip_rows(&bottom_up, 2, 2),
            vec![3, 0, 0, 255, 4, 0, 0, 255, 1, 0, 0, 255, 2, 0, 0, 255]
        );
    }

    #[test]
    fn short_buffer_is_rejected() {
        let path = std::env::temp_dir().join("resin-short-screenshot.png");
        let res = write_png(&path, 2, 2, &[0; 8]);

        assert!(matches!(
            res,
            Err(ScreenshotError::Size {
                expected: 16,
                actual: 8
            })
        ));
    }

    #[test]
    fn png_round_trips_top_down() {
        let path = std::env::temp_dir().join(format!("resin-shot-{}.png", std::process::id()));
        // bottom row red, top row blue
        let bottom_up = [255, 0, 0, 255, 0, 0, 255, 255];

        write_png(&path, 1, 2, &bottom_up).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut buf).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(buf, vec![0, 0, 255, 255, 255, 0, 0, 255]);
    }
}
