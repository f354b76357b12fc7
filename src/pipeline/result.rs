//! Result types and persistence for the translation pipeline.

use std::path::Path;

use crate::core::errors::PipelineError;
use crate::domain::region::Region;
use crate::processors::segment::Chunk;

/// Everything the pipeline hands off for one page: the consolidated,
/// recognized, translated regions and the text-safe chunks the downstream
/// overlay stage renders onto.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Name of the processed page.
    pub page_name: String,
    /// Final regions, in chunk order then reading order.
    pub regions: Vec<Region>,
    /// Text-safe vertical chunks covering the page.
    pub chunks: Vec<Chunk>,
    /// Forced cut positions, when the segmenter had to bisect a region.
    pub forced_splits: Vec<u32>,
}

impl PageResult {
    /// Returns an iterator over regions that have a translation.
    pub fn translated_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions
            .iter()
            .filter(|region| !region.translated_text.is_empty())
    }

    /// Returns all recognized source text joined with the given separator.
    pub fn concatenated_text(&self, separator: &str) -> String {
        self.regions
            .iter()
            .map(|region| region.original_text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Persists the region list as a JSON array.
///
/// Boxes serialize as flat lists of `[x, y]` corner pairs; all numbers are
/// native JSON numbers. A later run can reload this file and skip the
/// detection and recognition stages.
pub fn save_results(path: impl AsRef<Path>, regions: &[Region]) -> Result<(), PipelineError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), regions)?;
    Ok(())
}

/// Loads a region list persisted by [`save_results`].
pub fn load_results(path: impl AsRef<Path>) -> Result<Vec<Region>, PipelineError> {
    let contents = std::fs::read_to_string(path)?;
    let regions: Vec<Region> = serde_json::from_str(&contents)?;
    tracing::info!(regions = regions.len(), "loaded existing results");
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::region::RegionLabel;
    use crate::processors::geometry::Quad;

    fn region(text: &str, translated: &str) -> Region {
        let mut r = Region::new(
            Quad::from_rect(10, 20, 110, 80),
            RegionLabel::TextBubble,
            0.87,
            "image_00",
            0,
        );
        r.original_text = text.to_string();
        r.translated_text = translated.to_string();
        r
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join("comic_trans_result_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("result.json");

        let regions = vec![region("やあ", "hi"), region("元気？", "how are you?")];
        save_results(&path, &regions).unwrap();
        let loaded = load_results(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].bbox, regions[0].bbox);
        assert_eq!(loaded[0].original_text, "やあ");
        assert_eq!(loaded[1].translated_text, "how are you?");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_persisted_box_is_corner_pairs() {
        let json = serde_json::to_string(&vec![region("a", "b")]).unwrap();
        assert!(json.contains("[[10,20],[110,20],[110,80],[10,80]]"));
    }

    #[test]
    fn test_translated_regions_filter() {
        let result = PageResult {
            page_name: "page_00".to_string(),
            regions: vec![region("a", "A"), region("b", "")],
            chunks: Vec::new(),
            forced_splits: Vec::new(),
        };
        assert_eq!(result.translated_regions().count(), 1);
        assert_eq!(result.concatenated_text(" "), "a b");
    }
}
