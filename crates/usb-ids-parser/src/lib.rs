//! # usb-ids-parser
//!
//! Parse the `usb.ids` database into typed, path-annotated records.
//!
//! The database is a line-oriented text file where leading tabs encode
//! nesting depth and a short marker at the start of a root line (`C`, `HID`,
//! `L`, ...) switches to another taxonomy. Every non-blank, non-comment line
//! becomes a [`Record`] whose `path` holds the keys of all its ancestors.
//!
//! ## Example
//!
//! ```
//! use usb_ids_parser::{parse_lines, RecordType};
//!
//! let records = parse_lines(["046d  Logitech, Inc.", "\t2131  Webcam"]);
//! let devices = records.records(RecordType::Device);
//!
//! assert_eq!(devices[1].path, vec!["046d", "2131"]);
//! assert_eq!(devices[1].value, "Webcam");
//! ```
//!
//! ## Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `parse_reader()` | O(n) + I/O |
//! | `parse_lines()` | O(n) |
//! | `records(kind)` | O(1) |

mod error;
mod parser;
mod record;

pub use error::SourceReadError;
pub use parser::{parse_lines, parse_reader, LineParser};
pub use record::{Record, RecordCollection, RecordType};
