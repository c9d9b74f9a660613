// Domain module: models, value objects, configuration and the engine contract

pub mod config;
pub mod engine_service;
pub mod error;
pub mod models;
pub mod value_objects;

pub use config::*;
pub use engine_service::*;
pub use error::{Result, SolverError};
pub use models::*;
pub use value_objects::*;
