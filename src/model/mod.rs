//! Data model of the footpath network.
//!
//! Contains the node/edge components, the deserializable input features,
//! and the graph itself.

pub mod components;
pub mod features;
pub mod network;

pub use components::{NodeKind, PathNode};
pub use features::{FeatureGeometry, PathFeature};
pub use network::PathNetwork;
