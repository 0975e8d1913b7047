//! Voxel lighting: deterministic ceiling lights diffused through air

pub mod seeds;
pub mod propagate;

pub use propagate::LightPropagator;
