//! Declarative resource model
//!
//! Resource types and their endpoints, the specs describing what to
//! provision, placeholders linking specs together, and the validated plan
//! that orders them.

pub mod catalog;
pub mod placeholder;
pub mod plan;
pub mod spec;
pub mod types;

pub use plan::Plan;
pub use spec::{HandleKey, ResourceSpec, SpecId};
pub use types::{CollectionLocation, ListEndpoint, RemoteId, ResourceType};
