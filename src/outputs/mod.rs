//! Output generation for the visualization layer.
//!
//! # Submodules
//!
//! - [`json`]: per-year dataset files and the combined file
//! - [`index`]: the timeline index derived from every emitted dataset
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── year_in_llms_2024.json
//! ├── year_in_llms_2025.json
//! ├── year_in_llms_all.json
//! └── timeline_index.json
//! ```

pub mod index;
pub mod json;
