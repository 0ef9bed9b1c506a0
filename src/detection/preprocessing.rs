use image::{DynamicImage, Rgb, RgbImage, imageops::FilterType};
use rten_tensor::NdTensor;

use crate::models::BoundingBox;

/// Padding value ultralytics uses for letterboxing
const PAD_VALUE: u8 = 114;

/// How a source image was fitted into the square model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: u32,
    pub pad_y: u32,
    pub resized_width: u32,
    pub resized_height: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub input_size: u32,
}

impl Letterbox {
    /// Compute the aspect-preserving fit of a `width` x `height` image
    pub fn fit(width: u32, height: u32, input_size: u32) -> Self {
        let scale = (input_size as f32 / width.max(1) as f32)
            .min(input_size as f32 / height.max(1) as f32);

        let resized_width = ((width as f32 * scale).round() as u32).clamp(1, input_size);
        let resized_height = ((height as f32 * scale).round() as u32).clamp(1, input_size);

        Self {
            scale,
            pad_x: (input_size - resized_width) / 2,
            pad_y: (input_size - resized_height) / 2,
            resized_width,
            resized_height,
            source_width: width,
            source_height: height,
            input_size,
        }
    }

    /// Map a centre-format box in model-input space back to source pixels
    pub fn to_source(&self, cx: f32, cy: f32, w: f32, h: f32) -> BoundingBox {
        let x1 = (cx - w / 2.0 - self.pad_x as f32) / self.scale;
        let y1 = (cy - h / 2.0 - self.pad_y as f32) / self.scale;
        let x2 = (cx + w / 2.0 - self.pad_x as f32) / self.scale;
        let y2 = (cy + h / 2.0 - self.pad_y as f32) / self.scale;

        BoundingBox::new(x1, y1, x2, y2).clamp_to(self.source_width, self.source_height)
    }
}

/// Resize `img` into a padded square canvas
pub fn letterbox_image(img: &DynamicImage, input_size: u32) -> (RgbImage, Letterbox) {
    let letterbox = Letterbox::fit(img.width(), img.height(), input_size);

    let resized = img
        .resize_exact(
            letterbox.resized_width,
            letterbox.resized_height,
            FilterType::Triangle,
        )
        .to_rgb8();

    let mut canvas = RgbImage::from_pixel(input_size, input_size, Rgb([PAD_VALUE; 3]));
    image::imageops::overlay(
        &mut canvas,
        &resized,
        letterbox.pad_x.into(),
        letterbox.pad_y.into(),
    );

    (canvas, letterbox)
}

/// Convert to a normalized `[1, 3, H, W]` tensor
pub fn to_nchw_tensor(img: &RgbImage) -> NdTensor<f32, 4> {
    let (width, height) = img.dimensions();
    let mut tensor = NdTensor::zeros([1, 3, height as usize, width as usize]);

    for (x, y, pixel) in img.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}
