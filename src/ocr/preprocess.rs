use image::{DynamicImage, GrayImage, imageops};
use serde::{Deserialize, Serialize};

/// A rectangle in relative coordinates (0.0 to 1.0) of the image it is
/// applied to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelativeRect {
    /// X position of top-left corner (0.0 = left edge, 1.0 = right edge)
    pub x: f32,
    /// Y position of top-left corner (0.0 = top edge, 1.0 = bottom edge)
    pub y: f32,
    /// Width as fraction of image width
    pub width: f32,
    /// Height as fraction of image height
    pub height: f32,
}

/// Crops a sub-region from an image using relative coordinates.
///
/// Converts the relative rect to absolute pixel coordinates, clamps to image
/// bounds, and returns the cropped region in grayscale.
pub fn crop_region(img: &DynamicImage, region: &RelativeRect) -> GrayImage {
    let (w, h) = (img.width(), img.height());

    let x0 = ((region.x.max(0.0) * w as f32) as u32).min(w);
    let y0 = ((region.y.max(0.0) * h as f32) as u32).min(h);
    let rw = ((region.width.max(0.0) * w as f32) as u32).min(w - x0);
    let rh = ((region.height.max(0.0) * h as f32) as u32).min(h - y0);

    img.crop_imm(x0, y0, rw, rh).to_luma8()
}

/// Preprocessing applied to a region before handing it to the OCR engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Variant {
    Gray,
    Inverted,
    /// Contrast stretched around mid-gray by the given factor
    Contrast(f32),
    /// Black/white at the Otsu threshold
    Binarized,
}

/// Applies one preprocessing variant to a grayscale region.
pub fn apply_variant(region: &GrayImage, variant: Variant) -> GrayImage {
    match variant {
        Variant::Gray => region.clone(),
        Variant::Inverted => {
            let mut inverted = region.clone();
            imageops::invert(&mut inverted);
            inverted
        }
        Variant::Contrast(factor) => enhance_contrast(region, factor),
        Variant::Binarized => binarize_otsu(region),
    }
}

/// Threshold that maximizes the between-class variance of the histogram.
pub fn otsu_threshold(region: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in region.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let sum_total: u64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as u64 * count)
        .sum();

    let mut sum_b = 0u64;
    let mut w_b = 0u64;
    let mut max_var = 0.0f64;
    let mut threshold = 0u8;

    for (i, &count) in histogram.iter().enumerate() {
        w_b += count;
        if w_b == 0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f == 0 {
            break;
        }
        sum_b += i as u64 * count;
        let m_b = sum_b as f64 / w_b as f64;
        let m_f = (sum_total - sum_b) as f64 / w_f as f64;
        let between = w_b as f64 * w_f as f64 * (m_b - m_f).powi(2);
        if between > max_var {
            max_var = between;
            threshold = i as u8;
        }
    }

    threshold
}

/// Pixels above the Otsu threshold become white, the rest black.
pub fn binarize_otsu(region: &GrayImage) -> GrayImage {
    let threshold = otsu_threshold(region);
    let mut output = region.clone();
    for pixel in output.pixels_mut() {
        pixel[0] = if pixel[0] > threshold { 255 } else { 0 };
    }
    output
}

/// Enlarges a region by an integer factor with cubic interpolation.
pub fn upscale(region: &GrayImage, factor: u32) -> GrayImage {
    if factor <= 1 {
        return region.clone();
    }
    imageops::resize(
        region,
        region.width() * factor,
        region.height() * factor,
        imageops::FilterType::CatmullRom,
    )
}

/// Optional preparation of the name bands before OCR.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NamePreprocess {
    /// Integer upscale factor, 1 leaves the size unchanged
    pub scale: u32,
    pub binarize: bool,
}

impl Default for NamePreprocess {
    fn default() -> Self {
        Self {
            scale: 1,
            binarize: false,
        }
    }
}

impl NamePreprocess {
    pub fn apply(&self, region: &GrayImage) -> GrayImage {
        let prepared = if self.binarize {
            binarize_otsu(region)
        } else {
            region.clone()
        };
        upscale(&prepared, self.scale)
    }
}

/// Scales every pixel's distance from mid-gray by `factor`.
///
/// A factor of 1.0 is the identity, 2.0 doubles the contrast.
pub fn enhance_contrast(region: &GrayImage, factor: f32) -> GrayImage {
    let mut output = region.clone();
    for pixel in output.pixels_mut() {
        let value = pixel[0] as f32;
        pixel[0] = (128.0 + (value - 128.0) * factor).clamp(0.0, 255.0) as u8;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgba};

    #[test]
    fn test_crop_region() {
        // 100x200 image, red channel = x, green = y
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(100, 200, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let img = DynamicImage::ImageRgba8(img);

        let region = RelativeRect { x: 0.1, y: 0.25, width: 0.5, height: 0.1 };
        let cropped = crop_region(&img, &region);

        assert_eq!(cropped.dimensions(), (50, 20));
    }

    #[test]
    fn test_crop_region_clamps() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(100, 100));
        let region = RelativeRect { x: 0.9, y: 0.9, width: 0.5, height: 0.5 };
        let cropped = crop_region(&img, &region);

        // Should clamp to 10x10 (remaining pixels)
        assert_eq!(cropped.dimensions(), (10, 10));
    }

    #[test]
    fn test_inverted_variant() {
        let region = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 200 }]));
        let inverted = apply_variant(&region, Variant::Inverted);

        assert_eq!(inverted.get_pixel(0, 0)[0], 255);
        assert_eq!(inverted.get_pixel(1, 0)[0], 55);
    }

    #[test]
    fn test_enhance_contrast() {
        let region = GrayImage::from_fn(3, 1, |x, _| Luma([[100u8, 128, 250][x as usize]]));
        let enhanced = enhance_contrast(&region, 2.0);

        assert_eq!(enhanced.get_pixel(0, 0)[0], 72, "Dark pixel moves further from mid-gray");
        assert_eq!(enhanced.get_pixel(1, 0)[0], 128, "Mid-gray is unchanged");
        assert_eq!(enhanced.get_pixel(2, 0)[0], 255, "Bright pixel saturates");
    }

    #[test]
    fn test_otsu_separates_two_levels() {
        let region = GrayImage::from_fn(10, 1, |x, _| Luma([if x < 6 { 40 } else { 210 }]));
        let threshold = otsu_threshold(&region);
        assert!((40..210).contains(&threshold));

        let binary = apply_variant(&region, Variant::Binarized);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(9, 0)[0], 255);
    }

    #[test]
    fn test_otsu_uniform_region() {
        let region = GrayImage::from_pixel(4, 4, Luma([128]));
        let binary = binarize_otsu(&region);
        // A single level has nothing to separate; every pixel lands on one side
        let first = binary.get_pixel(0, 0)[0];
        assert!(binary.pixels().all(|p| p[0] == first));
    }

    #[test]
    fn test_name_preprocess() {
        let region = GrayImage::from_fn(8, 4, |x, _| Luma([if x < 4 { 30 } else { 220 }]));

        let unchanged = NamePreprocess::default().apply(&region);
        assert_eq!(unchanged, region);

        let prepared = NamePreprocess { scale: 2, binarize: true }.apply(&region);
        assert_eq!(prepared.dimensions(), (16, 8));
        assert_eq!(prepared.get_pixel(0, 0)[0], 0);
        assert_eq!(prepared.get_pixel(15, 7)[0], 255);
    }
}
