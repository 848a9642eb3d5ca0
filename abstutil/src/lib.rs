//! Small utilities shared by the rest of the workspace: logging setup and JSON file I/O.

pub mod logger;
mod io;

pub use crate::io::{read_json, to_json, write_json, write_or_print};
