//! Overlay rendering: each detection gets a thin outline in its class colour
//! and a caption with its class name and confidence.

use ab_glyph::{FontRef, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::warn;

use crate::models::Detection;

const FONT_DATA: &[u8] = include_bytes!("../../assets/font.ttf");

const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_TEXT_HEIGHT: i32 = 20;
const LABEL_CHAR_WIDTH: f32 = 9.0; // rough average glyph width
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Per-class colours, cycled for indices past the table
const CLASS_COLORS: [[u8; 3]; 5] = [
    [255, 56, 56],
    [255, 157, 151],
    [255, 112, 31],
    [255, 178, 29],
    [207, 210, 49],
];

/// `"<class> <confidence>"`
pub fn caption(detection: &Detection) -> String {
    format!("{} {:.2}", detection.class_name(), detection.confidence)
}

fn class_color(class_index: u32) -> Rgb<u8> {
    Rgb(CLASS_COLORS[class_index as usize % CLASS_COLORS.len()])
}

/// Copy of `image` with every detection outlined and captioned
pub fn plot_detections(image: &DynamicImage, detections: &[Detection]) -> DynamicImage {
    let mut canvas = image.to_rgb8();

    let font = match FontRef::try_from_slice(FONT_DATA) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Caption font unavailable, drawing outlines only: {}", e);
            None
        }
    };

    for detection in detections {
        draw_labelled_box(&mut canvas, detection, font.as_ref());
    }

    DynamicImage::ImageRgb8(canvas)
}

fn draw_labelled_box(canvas: &mut RgbImage, detection: &Detection, font: Option<&FontRef>) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let bbox = detection.bbox.clamp_to(width - 1, height - 1);
    let x1 = bbox.x1 as i32;
    let y1 = bbox.y1 as i32;
    let x2 = bbox.x2 as i32;
    let y2 = bbox.y2 as i32;
    if x2 <= x1 || y2 <= y1 {
        return;
    }

    let color = class_color(detection.class_index);
    let outline = Rect::at(x1, y1).of_size((x2 - x1 + 1) as u32, (y2 - y1 + 1) as u32);
    draw_hollow_rect_mut(canvas, outline, color);

    let label = caption(detection);
    let text_width = (label.len() as f32 * LABEL_CHAR_WIDTH) as i32;

    // Above the box, or pinned to the top edge when there is no room
    let label_x = x1;
    let label_y = (y1 - LABEL_TEXT_HEIGHT).max(0);
    let label_width = text_width.min(width as i32 - label_x);
    if label_width <= 0 {
        return;
    }

    let background = Rect::at(label_x, label_y).of_size(label_width as u32, LABEL_TEXT_HEIGHT as u32);
    draw_filled_rect_mut(canvas, background, color);

    if let Some(font) = font {
        draw_text_mut(
            canvas,
            LABEL_TEXT_COLOR,
            label_x,
            label_y + LABEL_TEXT_VERTICAL_PADDING,
            PxScale::from(LABEL_FONT_SIZE),
            font,
            &label,
        );
    }
}
