//! The frame struct holding one snapshot of a trajectory can be found here.
pub mod new;
pub mod transformations;

pub use new::{Frame, Info, InfoValue};
