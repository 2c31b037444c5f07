//! Storage hand-off for completed post records.
//!
//! The indexing backend that ultimately stores posts is an external
//! collaborator; this crate's side of the contract is one JSON file per
//! record, grouped by publication date:
//!
//! ```text
//! output_dir/
//! └── 2019-11-12/
//!     ├── 9717030.json
//!     └── 9717031.json
//! ```

pub mod json;
