use image::DynamicImage;

/// Axis-aligned box in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter_w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let inter_h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let inter = inter_w * inter_h;
        let union = self.area() + other.area() - inter;

        if union <= f32::EPSILON {
            return 0.0;
        }

        inter / union
    }

    /// Clamp the box into a `width` x `height` image
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        Self {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
        }
    }
}

/// One defect region reported by the detector
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f32,
    /// Zero-based class index as the model reports it
    pub class_index: u32,
}

impl Detection {
    pub fn defect_class(&self) -> Option<DefectClass> {
        DefectClass::from_model_index(self.class_index)
    }

    /// Display name for the report, `Unknown` when the index has no entry
    pub fn class_name(&self) -> &'static str {
        self.defect_class()
            .map(DefectClass::name)
            .unwrap_or(DefectClass::UNKNOWN)
    }
}

/// Fixed table of defect classes the weights were trained on.
///
/// The table is one-based; the model reports zero-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefectClass {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl DefectClass {
    pub const UNKNOWN: &'static str = "Unknown";

    pub const ALL: [DefectClass; 5] = [
        DefectClass::One,
        DefectClass::Two,
        DefectClass::Three,
        DefectClass::Four,
        DefectClass::Five,
    ];

    /// Look up a one-based table id
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(DefectClass::One),
            2 => Some(DefectClass::Two),
            3 => Some(DefectClass::Three),
            4 => Some(DefectClass::Four),
            5 => Some(DefectClass::Five),
            _ => None,
        }
    }

    /// Look up a zero-based model index
    pub fn from_model_index(index: u32) -> Option<Self> {
        index.checked_add(1).and_then(Self::from_id)
    }

    pub fn name(self) -> &'static str {
        match self {
            DefectClass::One => "1",
            DefectClass::Two => "2",
            DefectClass::Three => "3",
            DefectClass::Four => "4",
            DefectClass::Five => "5",
        }
    }
}

/// Everything a detector hands back for one image
#[derive(Debug, Clone, Default)]
pub struct Detections {
    /// Pre-rendered overlay, if the detector draws one itself
    pub overlay: Option<DynamicImage>,
    pub items: Vec<Detection>,
}

impl Detections {
    pub fn new(items: Vec<Detection>) -> Self {
        Self {
            overlay: None,
            items,
        }
    }

    pub fn with_overlay(mut self, overlay: DynamicImage) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
