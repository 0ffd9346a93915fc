//! FHIR models used for mustSupport extraction

pub mod element_definition;
pub mod must_support;
pub mod resource;
pub mod structure_definition;

// Re-exports
pub use element_definition::*;
pub use must_support::*;
pub use resource::*;
pub use structure_definition::*;
