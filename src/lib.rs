pub mod batch;
pub mod books;
pub mod chunk_plan;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod registry;
pub mod report;
pub mod segment;
pub mod transform;
pub mod util;

pub use error::{Error, Result};
