//! Tools related to homogeneously deformed volumes.
//!
//! [`shear_distance`] reads the raw shear offset of a single frame,
//! [`UnwrapCache`] turns the raw offsets into a continuous shear history and
//! [`RemoveSimpleShear`] uses that history to hand out frames in a fixed
//! rectangular cell.
pub mod remove_shear;
pub mod shear_distance;
pub mod unwrap_cache;

pub use remove_shear::RemoveSimpleShear;
pub use shear_distance::shear_distance;
pub use unwrap_cache::{UnwrapCache, UnwrapState};
