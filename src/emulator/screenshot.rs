// Screenshot functionality
//
// Saves a rendered RGBA frame as a PNG file.

use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Bytes in one RGBA frame
pub const FRAME_BYTES: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 4;

/// Errors that can occur during screenshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),

    /// The frame buffer is smaller than 256x240 RGBA
    BufferTooShort { expected: usize, actual: usize },
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
            ScreenshotError::BufferTooShort { expected, actual } => write!(
                f,
                "Frame buffer too short: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Save an RGBA frame as a PNG file
///
/// The file goes to `<dir>/<rom name>/`. With `timestamped` the name carries
/// the local time (`screenshot_YYYYMMDD_HHMMSS.png`), otherwise it is
/// `screenshot.png` and is overwritten.
///
/// # Returns
///
/// The path of the written file
///
/// # Example
///
/// ```no_run
/// use nesemu::emulator::save_screenshot;
/// use std::path::Path;
///
/// let frame = vec![0u8; 256 * 240 * 4];
/// let path = save_screenshot(&frame, Path::new("screenshots"), None, true)
///     .expect("Failed to save screenshot");
/// println!("Screenshot saved to: {}", path.display());
/// ```
pub fn save_screenshot(
    rgba: &[u8],
    dir: &Path,
    rom_path: Option<&Path>,
    timestamped: bool,
) -> Result<PathBuf, ScreenshotError> {
    if rgba.len() < FRAME_BYTES {
        return Err(ScreenshotError::BufferTooShort {
            expected: FRAME_BYTES,
            actual: rgba.len(),
        });
    }

    let screenshots_dir = screenshot_directory(dir, rom_path);
    fs::create_dir_all(&screenshots_dir)?;

    let filename = if timestamped {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("screenshot_{}.png", timestamp)
    } else {
        "screenshot.png".to_string()
    };
    let file_path = screenshots_dir.join(filename);

    save_png(
        &file_path,
        &rgba[..FRAME_BYTES],
        SCREEN_WIDTH as u32,
        SCREEN_HEIGHT as u32,
    )?;
    log::info!("screenshot saved to {}", file_path.display());

    Ok(file_path)
}

/// Directory for screenshots of the current ROM: `<dir>/<rom_name>/`
fn screenshot_directory(dir: &Path, rom_path: Option<&Path>) -> PathBuf {
    match rom_path.and_then(Path::file_stem) {
        Some(rom_name) => dir.join(rom_name),
        None => dir.join("default"),
    }
}

fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;
    writer.finish()?;

    Ok(())
}
