#![allow(clippy::implicit_hasher)]
#![allow(unknown_lints)]

pub mod models;
pub mod constants;
pub mod error;
pub mod logging;
pub mod time;
pub mod geometry;
pub mod config;
pub mod resolver;
pub mod estimator;
pub mod projector;
pub mod diagram;
pub mod pipeline;
pub mod loader;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::DiagramConfig;
pub use error::{DataError, TrainError};
pub use pipeline::{build_diagrams, BatchOptions, DiagramBatch, ReferenceData};
