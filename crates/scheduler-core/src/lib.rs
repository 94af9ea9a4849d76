pub mod candidates;
pub mod config;
pub mod dimensions;
pub mod domain;
pub mod engine;
pub mod graph;
pub mod normalizer;
pub mod ports;
pub mod progression;
pub mod scoring;
pub mod selection;
pub mod suggestion_store;

pub use config::Settings;
pub use dimensions::DimensionRegistry;
pub use domain::{Result, SchedulerError};
pub use engine::Engine;
pub use ports::{PracticeEntryUpdate, Repository};
pub use suggestion_store::{Suggestion, SuggestionStore};
