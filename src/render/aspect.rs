//! Aspect-ratio normalization by letterboxing

use crate::error::{Error, Result};
use image::{imageops, Rgb, RgbImage};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Largest canvas, in pixels, [`add_black_bars`] will allocate
pub const MAX_CANVAS_PIXELS: u64 = 100_000_000;

/// Target aspect ratios for normalized slide images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    /// 4:3
    Standard,
    /// 16:9
    Widescreen,
}

impl AspectRatio {
    /// Every ratio an export produces, in manifest order
    pub const ALL: [AspectRatio; 2] = [AspectRatio::Standard, AspectRatio::Widescreen];

    /// Parse a ratio tag. Only `"4:3"` and `"16:9"` are accepted.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "4:3" => Ok(AspectRatio::Standard),
            "16:9" => Ok(AspectRatio::Widescreen),
            other => Err(Error::UnsupportedAspectRatio {
                ratio: other.to_string(),
            }),
        }
    }

    /// Tag as used in the manifest
    pub fn tag(self) -> &'static str {
        match self {
            AspectRatio::Standard => "4:3",
            AspectRatio::Widescreen => "16:9",
        }
    }

    /// Subdirectory holding images of this ratio
    pub fn folder_name(self) -> &'static str {
        match self {
            AspectRatio::Standard => "4_3",
            AspectRatio::Widescreen => "16_9",
        }
    }

    fn terms(self) -> (u64, u64) {
        match self {
            AspectRatio::Standard => (4, 3),
            AspectRatio::Widescreen => (16, 9),
        }
    }

    /// Smallest canvas of this ratio that contains a `width`x`height` image.
    ///
    /// Each side is `max(source side, other side scaled by the ratio)`, with the
    /// scaled value rounded half up. An image already at the ratio keeps its size.
    pub fn target_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        let (w, h) = self.terms();
        (
            width.max(scale_rounded(height, w, h)),
            height.max(scale_rounded(width, h, w)),
        )
    }
}

/// `round(value * num / den)`, half up, in integer arithmetic
fn scale_rounded(value: u32, num: u64, den: u64) -> u32 {
    let scaled = (2 * value as u64 * num + den) / (2 * den);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Pad `image_path` with black bars to `ratio_tag` and save it under
/// `output_folder` with the same file name.
///
/// The source is centered on the new canvas; odd padding puts the extra pixel
/// on the right/bottom. The folder is created if needed and an existing file
/// of the same name is overwritten. An unsupported tag fails before any I/O.
pub fn add_black_bars(image_path: &Path, output_folder: &Path, ratio_tag: &str) -> Result<PathBuf> {
    add_black_bars_with_limit(image_path, output_folder, ratio_tag, MAX_CANVAS_PIXELS)
}

/// [`add_black_bars`] with an explicit canvas limit.
///
/// The source header is read first; if the padded canvas would exceed
/// `max_pixels` the call fails with [`Error::ImageDimensionExceeded`] before
/// the image is decoded.
pub fn add_black_bars_with_limit(
    image_path: &Path,
    output_folder: &Path,
    ratio_tag: &str,
    max_pixels: u64,
) -> Result<PathBuf> {
    let ratio = AspectRatio::parse(ratio_tag)?;
    tracing::debug!(path = %image_path.display(), ratio = %ratio, "Adding black bars");

    let file_name = image_path.file_name().ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Image path has no file name: {}", image_path.display()),
        ))
    })?;

    let (width, height) = image::image_dimensions(image_path)?;
    let (target_width, target_height) = ratio.target_dimensions(width, height);
    let pixel_area = u64::from(target_width) * u64::from(target_height);
    if pixel_area > max_pixels {
        return Err(Error::ImageDimensionExceeded {
            detail: format!(
                "{}x{} canvas = {} pixels, max is {}",
                target_width, target_height, pixel_area, max_pixels
            ),
        });
    }

    let source = image::open(image_path)?.to_rgb8();

    let mut canvas = RgbImage::from_pixel(target_width, target_height, Rgb([0, 0, 0]));
    let x = (target_width - width) / 2;
    let y = (target_height - height) / 2;
    imageops::replace(&mut canvas, &source, i64::from(x), i64::from(y));

    std::fs::create_dir_all(output_folder)?;
    let output_path = output_folder.join(file_name);
    canvas.save(&output_path)?;

    tracing::debug!(
        path = %output_path.display(),
        width = target_width,
        height = target_height,
        "Saved image with black bars"
    );
    Ok(output_path)
}
