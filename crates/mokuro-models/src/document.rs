//! The mokuro output document format.
//!
//! Snake_case JSON produced by the OCR engine: one document per
//! volume with a list of per-page recognized text regions. Parsing is
//! deliberately lenient (defaults everywhere) — finalization only
//! depends on `pages`.

use serde::{Deserialize, Serialize};

/// A generated mokuro document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MokuroDocument {
    /// Format version reported by the engine
    #[serde(default)]
    pub version: String,
    /// Series title, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_uuid: Option<String>,
    /// Volume name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_uuid: Option<String>,
    /// One entry per processed page, in reading order
    #[serde(default)]
    pub pages: Vec<MokuroPage>,
}

impl MokuroDocument {
    /// Number of page entries.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Recognized text regions for one page image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MokuroPage {
    #[serde(default)]
    pub img_width: u32,
    #[serde(default)]
    pub img_height: u32,
    /// Page image path relative to the volume root
    #[serde(default)]
    pub img_path: String,
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

/// One detected text block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBlock {
    /// Bounding box as xmin, ymin, xmax, ymax
    #[serde(rename = "box", default)]
    pub bbox: [i32; 4],
    /// Vertical text orientation
    #[serde(default)]
    pub vertical: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Per-line quadrilateral coordinates
    #[serde(default)]
    pub lines_coords: Vec<Vec<[f64; 2]>>,
    /// Recognized text, one entry per line
    #[serde(default)]
    pub lines: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_engine_output() {
        let raw = r#"{
            "version": "0.2.1",
            "title": "Sample",
            "volume": "Sample v01",
            "pages": [
                {
                    "img_width": 1690,
                    "img_height": 2400,
                    "img_path": "001.jpg",
                    "blocks": [
                        {
                            "box": [100, 200, 300, 600],
                            "vertical": true,
                            "font_size": 28.5,
                            "lines": ["こんにちは"]
                        }
                    ]
                },
                { "img_path": "002.jpg" }
            ]
        }"#;

        let document: MokuroDocument = serde_json::from_str(raw).expect("parse document");
        assert_eq!(document.page_count(), 2);
        assert_eq!(document.pages[0].blocks[0].bbox, [100, 200, 300, 600]);
        assert!(document.pages[0].blocks[0].vertical);
        assert_eq!(document.pages[1].blocks.len(), 0);
    }

    #[test]
    fn missing_pages_defaults_to_empty() {
        let document: MokuroDocument = serde_json::from_str("{}").expect("parse empty");
        assert_eq!(document.page_count(), 0);
    }
}
