//! The page-space text region record.
//!
//! A [`Region`] is created when a raw detection is remapped into page space.
//! It is then mutated in place as the pipeline advances: consolidation grows
//! its box and text, recognition fills `original_text`/`text_confidence`, and
//! translation fills `translated_text`. The safe segmenter only reads it.

use serde::{Deserialize, Serialize};

use crate::processors::geometry::Quad;

/// Detection classes reported by the text-area detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionLabel {
    /// A speech-bubble outline with no text of its own.
    Bubble,
    /// Text inside a speech bubble.
    TextBubble,
    /// Free-floating text outside any bubble.
    TextFree,
}

impl RegionLabel {
    /// Maps the detector's numeric class id to a label.
    pub fn from_class_id(class_id: u32) -> Option<Self> {
        match class_id {
            0 => Some(RegionLabel::Bubble),
            1 => Some(RegionLabel::TextBubble),
            2 => Some(RegionLabel::TextFree),
            _ => None,
        }
    }

    /// Returns true for classes that carry text. Bare bubble outlines are
    /// dropped before consolidation.
    pub fn is_text(&self) -> bool {
        !matches!(self, RegionLabel::Bubble)
    }
}

/// A consolidated, page-space text-area record.
///
/// Persists as a JSON object whose `box` field is a flat list of `[x, y]`
/// corner pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Page-space bounding quad.
    #[serde(rename = "box")]
    pub bbox: Quad,
    /// Detection confidence.
    pub confidence: f32,
    /// Detection class.
    pub label: RegionLabel,
    /// Recognized source text. Empty until recognition runs.
    #[serde(default)]
    pub original_text: String,
    /// Recognition confidence. Zero until recognition runs.
    #[serde(default)]
    pub text_confidence: f32,
    /// Translated text. Empty until translation runs.
    #[serde(default)]
    pub translated_text: String,
    /// Vertical center of the box, kept in sync with `bbox`.
    pub center_y: f32,
    /// Name of the chunk (or page) this region belongs to.
    pub image_name: String,
    /// Index of the chunk this region belongs to.
    pub index: usize,
}

impl Region {
    /// Creates a region with empty text fields.
    pub fn new(
        bbox: Quad,
        label: RegionLabel,
        confidence: f32,
        image_name: impl Into<String>,
        index: usize,
    ) -> Self {
        Self {
            bbox,
            confidence,
            label,
            original_text: String::new(),
            text_confidence: 0.0,
            translated_text: String::new(),
            center_y: bbox.center_y(),
            image_name: image_name.into(),
            index,
        }
    }

    /// Replaces the box and keeps `center_y` in sync.
    pub fn set_bbox(&mut self, bbox: Quad) {
        self.bbox = bbox;
        self.center_y = bbox.center_y();
    }

    /// Folds `other` into this region: the boxes are unioned and the texts
    /// concatenated with a separating space (this region's text first).
    pub fn absorb(&mut self, other: &Region) {
        self.set_bbox(self.bbox.union(&other.bbox));

        if other.original_text.is_empty() {
            return;
        }
        if self.original_text.is_empty() {
            self.original_text = other.original_text.clone();
        } else {
            self.original_text.push(' ');
            self.original_text.push_str(&other.original_text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_class_ids() {
        assert_eq!(RegionLabel::from_class_id(0), Some(RegionLabel::Bubble));
        assert_eq!(RegionLabel::from_class_id(1), Some(RegionLabel::TextBubble));
        assert_eq!(RegionLabel::from_class_id(2), Some(RegionLabel::TextFree));
        assert_eq!(RegionLabel::from_class_id(3), None);

        assert!(!RegionLabel::Bubble.is_text());
        assert!(RegionLabel::TextBubble.is_text());
        assert!(RegionLabel::TextFree.is_text());
    }

    #[test]
    fn test_absorb_unions_box_and_concatenates_text() {
        let mut first = Region::new(
            Quad::from_rect(10, 10, 50, 50),
            RegionLabel::TextBubble,
            0.9,
            "page_00",
            0,
        );
        first.original_text = "hello".to_string();

        let mut second = Region::new(
            Quad::from_rect(12, 12, 52, 52),
            RegionLabel::TextBubble,
            0.8,
            "page_00",
            0,
        );
        second.original_text = "world".to_string();

        first.absorb(&second);
        assert_eq!(first.bbox, Quad::from_rect(10, 10, 52, 52));
        assert_eq!(first.original_text, "hello world");
        assert_eq!(first.center_y, 31.0);
    }

    #[test]
    fn test_absorb_with_empty_text_adds_no_stray_spaces() {
        let mut canonical = Region::new(
            Quad::from_rect(0, 0, 10, 10),
            RegionLabel::TextFree,
            0.9,
            "page_00",
            0,
        );
        let duplicate = Region::new(
            Quad::from_rect(1, 1, 11, 11),
            RegionLabel::TextFree,
            0.8,
            "page_00",
            0,
        );

        canonical.absorb(&duplicate);
        assert_eq!(canonical.original_text, "");
    }

    #[test]
    fn test_region_json_shape() {
        let region = Region::new(
            Quad::from_rect(1, 2, 3, 4),
            RegionLabel::TextFree,
            0.5,
            "image_00",
            0,
        );
        let json = serde_json::to_string(&region).unwrap();
        assert!(json.contains("\"box\":[[1,2],[3,2],[3,4],[1,4]]"));
        assert!(json.contains("\"label\":\"text_free\""));
    }
}
