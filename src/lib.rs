//! Translation pipeline for long, single-column comic and manga pages.
//!
//! The crate's job is the geometry between the ML calls: pages too tall for a
//! detection model are sliced into overlapping tiles, the per-tile detections
//! are remapped into page space and consolidated into one deduplicated region
//! set, and the composite page is re-partitioned into render-sized chunks
//! along cut lines that never pass through detected text.
//!
//! The model work itself (text-area detection, recognition, translation) is
//! delegated to collaborator traits ([`TextAreaDetector`], [`TextRecognizer`],
//! [`Translator`]); the pipeline owns scheduling, coordinate spaces, region
//! identity, and partitioning.
//!
//! # Example
//!
//! ```no_run
//! use comic_trans::{ComicTranslator, PipelineConfig};
//! # use comic_trans::pipeline::{RawDetection, RecognizedText};
//! # use comic_trans::{PipelineError, TextAreaDetector, TextRecognizer, Translator};
//! # struct Det; struct Rec; struct Tr;
//! # impl TextAreaDetector for Det {
//! #     fn detect(&mut self, _i: &ndarray::Array4<f32>, _t: (u32, u32))
//! #         -> Result<Vec<RawDetection>, PipelineError> { Ok(Vec::new()) }
//! # }
//! # impl TextRecognizer for Rec {
//! #     fn recognize(&mut self, _c: &image::RgbImage, _l: &str)
//! #         -> Result<RecognizedText, PipelineError> { unimplemented!() }
//! # }
//! # impl Translator for Tr {
//! #     fn translate(&mut self, t: &[String], _s: &str, _d: &str, _m: &str)
//! #         -> Result<Vec<String>, PipelineError> { Ok(t.to_vec()) }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_file("config.json")?;
//! let pipeline = ComicTranslator::new(config, Det, Rec, Tr)?;
//!
//! let images = vec![image::open("001.png")?.to_rgb8()];
//! for page in pipeline.run("chapter_01", images)? {
//!     println!("{}: {} regions", page.page_name, page.regions.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod utils;

pub use crate::core::config::PipelineConfig;
pub use crate::core::errors::{CollaboratorStage, PipelineError, ProcessingStage};
pub use crate::core::parallel::ParallelPolicy;
pub use crate::domain::region::{Region, RegionLabel};
pub use crate::pipeline::{
    ComicTranslator, PageResult, TextAreaDetector, TextRecognizer, Translator, load_results,
    save_results,
};
pub use crate::processors::geometry::{Point, Quad};
pub use crate::processors::segment::Chunk;
