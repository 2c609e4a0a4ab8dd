//! Documents, identifiers and the option/result types exchanged with store
//! collections.
//!
//! A [Document] is an insertion-ordered map of string keys to [crate::common::Value]s.
//! Embedded fields are addressed with dotted keys:
//!
//! ```rust
//! use docrepo::collection::Document;
//!
//! let mut doc = Document::new();
//! doc.put("car_name", "Roadster").unwrap();
//! doc.put("engine.serial", "X1").unwrap();
//! assert_eq!(doc.get("engine.serial").unwrap().as_str(), Some("X1"));
//! ```

mod document;
mod find_options;
mod object_id;
mod update_options;
mod write_result;

pub use document::*;
pub use find_options::*;
pub use object_id::*;
pub use update_options::*;
pub use write_result::*;
