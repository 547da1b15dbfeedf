use na::{Matrix3, Matrix3xX};

use crate::errors::Result;
use crate::frame::new::Frame;
use crate::math::wrap_fractional;
use crate::simulation_box::SimulationBox;

impl Frame {
    /// Replaces the cell.
    ///
    /// With `scale_atoms` the fractional coordinates are held fixed and the
    /// absolute positions follow the new cell; without it the absolute
    /// positions stay put and the fractional coordinates change implicitly.
    pub fn set_cell(&mut self, h: Matrix3<f64>, scale_atoms: bool) -> Result<()> {
        let new_box = SimulationBox::new(h, self.sim_box.pbc)?;
        if scale_atoms {
            let s = self.sim_box.fractional(&self.positions);
            self.positions = new_box.cartesian(&s);
        }
        self.sim_box = new_box;
        Ok(())
    }

    pub fn scaled_positions(&self) -> Matrix3xX<f64> {
        self.sim_box.fractional(&self.positions)
    }

    pub fn set_scaled_positions(&mut self, scaled: &Matrix3xX<f64>) {
        self.positions = self.sim_box.cartesian(scaled);
    }

    /// Folds every atom back into the cell, component-wise to `[0, 1)`.
    pub fn wrap(&mut self) {
        let mut s = self.scaled_positions();
        wrap_fractional(&mut s);
        self.set_scaled_positions(&s);
    }
}
