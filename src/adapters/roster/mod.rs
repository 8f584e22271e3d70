//! Patient roster loading
//!
//! The roster is a pipe-delimited text file, one patient per line:
//!
//! ```text
//! Mary Johnson | 123 Main Street, Boston, MA, 02142 | 1980-04-12 | female | phone, mobile, 617-231-3345 | http://mgb.org, 356-444-9972
//! ```

pub mod parser;

pub use parser::{load_roster, parse_line, parse_roster};
