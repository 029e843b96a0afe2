//! Model export and serialization module
//!
//! - Parameter records: JSON-safe descriptions of fitted components
//! - Artifacts: checksummed binary bundles of a fitted hybrid model

mod artifact;
mod params;

pub use artifact::{ArtifactStore, HybridModel};
pub use params::{serialize_params_dict, OpaqueParam, ParamMap, ParamValue};
