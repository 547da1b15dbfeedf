//! Removal of simple-shear deformation from periodic MD trajectories.
//!
//! Simulations under simple shear, with a tilted cell or with Lees-Edwards
//! boundary conditions, store a shear offset that is only known modulo the
//! box length. LAMMPS for instance flips a tilt factor from `+L/2` to `-L/2`
//! once it grows past half a box. [`deformation::RemoveSimpleShear`] rebuilds
//! the continuous shear history frame by frame and hands out every frame in
//! its rectangular cell with the affine shear taken out of the positions.
extern crate nalgebra as na;

pub mod constants;
pub mod deformation;
pub mod errors;
pub mod extensions;
pub mod frame;
pub mod math;
pub mod readers;
pub mod simulation_box;
pub mod trajectory;
pub mod writers;
