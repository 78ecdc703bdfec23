//! Component descriptors
//!
//! Every mountable component ships a static [`definition::ComponentDefinition`] that the
//! host reads once at load time: which other components it depends on, which
//! feature toggles it understands, and which localizable strings it owns.

pub mod definition;

pub use definition::{FeatureFlags, FlagName, DEFINITION, NAMESPACE};
