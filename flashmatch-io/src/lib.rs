//! flashmatch-io: File I/O for flashmatch.
//!
//! This crate reads JSON event, configuration and visibility library files
//! and writes reconstruction results as CSV or JSON.
//!

mod config;
mod error;
mod event;
mod visibility;
mod writer;

pub use config::ReconstructionConfig;
pub use error::{Error, Result};
pub use event::EventRecord;
pub use visibility::{parse_visibility_library, read_visibility_library};
pub use writer::{DataFileWriter, OutputFormat};
