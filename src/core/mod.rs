pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, ProportionPolicy};
pub use error::{Result, SelectionError};
pub use types::{EntityId, EntityKind, GroupId, HerdChangeReason, Sex};
