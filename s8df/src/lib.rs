// src/lib.rs
pub mod data {
    pub mod tree;
    pub mod output;
}

pub mod config;
pub mod converter;
pub mod error;

pub use config::{Args, Config};
pub use converter::Converter;
pub use data::output::{OutputDirectory, OutputFile};
pub use data::tree::{open_event_source, EventSource, JsonLinesEventSource, SqliteEventSource};
pub use error::{DfError, Result};
