//! Tagging core: facet resolution, DRS identity assignment, the persisted
//! realization registry, and the dataset orchestrator.

pub mod error;
pub mod identity;
pub mod process;
pub mod registry;
pub mod resolver;

pub use error::CoreError;
pub use identity::{IdentityBuilder, components_from};
pub use process::{DatasetTagger, FileRecord, RunSummary, TagOptions};
pub use registry::RealizationRegistry;
pub use resolver::{FacetResolver, Resolution};
