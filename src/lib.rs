pub mod capture;
pub mod cart;
pub mod catalog;
pub mod clause;
pub mod config;
pub mod error;
pub mod extract;
pub mod lexicon;
pub mod matcher;
pub mod operation;
pub mod pipeline;
pub mod postprocess;
pub mod quantity;
pub mod recovery;
pub mod settings_store;

pub use error::{Error, Result};
pub use pipeline::{KioskPipeline, SessionOutcome};
