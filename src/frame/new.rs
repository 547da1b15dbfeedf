use std::collections::HashMap;

use na::{Matrix3, Matrix3xX, Vector3};

use crate::simulation_box::SimulationBox;

/// A typed value of the per-frame metadata map.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Float(f64),
    Int(i64),
    Vector(Vector3<f64>),
    Matrix(Matrix3<f64>),
}

impl InfoValue {
    pub fn as_vector(&self) -> Option<&Vector3<f64>> {
        match self {
            InfoValue::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Matrix3<f64>> {
        match self {
            InfoValue::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            InfoValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

pub type Info = HashMap<String, InfoValue>;

/// One snapshot of a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub n_atoms: usize,
    /// Absolute positions, one column per atom.
    pub positions: Matrix3xX<f64>,
    pub type_ids: Vec<usize>,
    pub sim_box: SimulationBox,
    pub info: Info,
}

impl Frame {
    pub fn new(sim_box: SimulationBox, positions: Matrix3xX<f64>) -> Self {
        let n_atoms = positions.ncols();
        Self {
            n_atoms,
            positions,
            type_ids: vec![1; n_atoms],
            sim_box,
            info: Info::new(),
        }
    }

    pub fn cell(&self) -> &Matrix3<f64> {
        &self.sim_box.h
    }
}
