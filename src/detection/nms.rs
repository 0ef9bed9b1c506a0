use crate::models::Detection;

/// Per-class non-maximum suppression.
///
/// Returns the surviving detections sorted by descending confidence, at most
/// `max_detections` of them.
pub fn non_max_suppression(
    mut detections: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut suppressed = vec![false; detections.len()];
    let mut kept = Vec::new();

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        if kept.len() >= max_detections {
            break;
        }

        let current = &detections[i];
        for j in (i + 1)..detections.len() {
            if suppressed[j] || detections[j].class_index != current.class_index {
                continue;
            }
            if current.bbox.iou(&detections[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }

        kept.push(current.clone());
    }

    kept
}
