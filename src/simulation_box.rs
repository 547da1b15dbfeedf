use na::{Matrix3, Matrix3xX, Vector3};

use crate::errors::{Result, UnshearError};

/// Periodic cell of a frame.
///
/// The columns of `h` are the cell vectors `a`, `b` and `c`, so a fractional
/// coordinate `s` maps to the absolute position `h * s`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationBox {
    pub h: Matrix3<f64>,
    pub h_inv: Matrix3<f64>,
    pub pbc: [bool; 3],
}

impl SimulationBox {
    pub fn new(h: Matrix3<f64>, pbc: [bool; 3]) -> Result<Self> {
        let h_inv = h.try_inverse().ok_or(UnshearError::SingularCell)?;
        Ok(Self { h, h_inv, pbc })
    }

    /// Builds a fully periodic box from row vectors `[cx, cy, cz]`.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Result<Self> {
        let h = Matrix3::from_columns(&[
            Vector3::from(rows[0]),
            Vector3::from(rows[1]),
            Vector3::from(rows[2]),
        ]);
        Self::new(h, [true; 3])
    }

    /// Rectangular box with edge lengths `lengths`.
    pub fn orthogonal(lengths: Vector3<f64>, pbc: [bool; 3]) -> Result<Self> {
        Self::new(Matrix3::from_diagonal(&lengths), pbc)
    }

    /// Box in the LAMMPS convention `a = (lx, 0, 0)`, `b = (xy, ly, 0)`, `c = (xz, yz, lz)`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_lammps_data(
        xlo: f64,
        xhi: f64,
        ylo: f64,
        yhi: f64,
        zlo: f64,
        zhi: f64,
        xy: f64,
        xz: f64,
        yz: f64,
    ) -> Result<Self> {
        #[rustfmt::skip]
        let h = Matrix3::new(
            xhi - xlo, xy, xz,
            0.0, yhi - ylo, yz,
            0.0, 0.0, zhi - zlo,
        );
        Self::new(h, [true; 3])
    }

    /// Cell vector `i` (0 = a, 1 = b, 2 = c).
    pub fn vector(&self, i: usize) -> Vector3<f64> {
        self.h.column(i).into_owned()
    }

    /// Edge lengths along the cell diagonal `(h_xx, h_yy, h_zz)`.
    pub fn diagonal(&self) -> Vector3<f64> {
        self.h.diagonal()
    }

    pub fn is_orthogonal(&self) -> bool {
        self.h.iter().enumerate().all(|(k, v)| k % 4 == 0 || *v == 0.0)
    }

    /// Tilt factors `(xy, xz, yz)` of a LAMMPS-style upper-triangular `h`.
    pub fn tilt_factors(&self) -> (f64, f64, f64) {
        (self.h[(0, 1)], self.h[(0, 2)], self.h[(1, 2)])
    }

    pub fn fractional(&self, positions: &Matrix3xX<f64>) -> Matrix3xX<f64> {
        self.h_inv * positions
    }

    pub fn cartesian(&self, scaled: &Matrix3xX<f64>) -> Matrix3xX<f64> {
        self.h * scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_rows_places_vectors_in_columns() {
        let sim_box =
            SimulationBox::from_rows([[10.0, 0.0, 0.0], [0.0, 8.0, 0.0], [1.5, -0.5, 6.0]]).unwrap();
        assert_eq!(sim_box.vector(2), Vector3::new(1.5, -0.5, 6.0));
        assert_eq!(sim_box.h[(0, 2)], 1.5);
        assert_eq!(sim_box.diagonal(), Vector3::new(10.0, 8.0, 6.0));
        assert!(!sim_box.is_orthogonal());
    }

    #[test]
    fn test_singular_cell_is_rejected() {
        let result = SimulationBox::from_rows([[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(matches!(result, Err(UnshearError::SingularCell)));
    }

    #[test]
    fn test_lammps_tilts_round_trip() {
        let sim_box =
            SimulationBox::from_lammps_data(-1.0, 9.0, 0.0, 8.0, 2.0, 8.0, 0.0, 2.5, -1.0).unwrap();
        assert_eq!(sim_box.tilt_factors(), (0.0, 2.5, -1.0));
        assert_eq!(sim_box.diagonal(), Vector3::new(10.0, 8.0, 6.0));
    }

    #[test]
    fn test_fractional_cartesian_inverse() {
        let sim_box =
            SimulationBox::from_rows([[10.0, 0.0, 0.0], [0.0, 8.0, 0.0], [3.0, 2.0, 6.0]]).unwrap();
        let positions = Matrix3xX::from_column_slice(&[1.0, 2.0, 3.0, 9.5, 0.1, 5.9]);
        let back = sim_box.cartesian(&sim_box.fractional(&positions));
        assert_relative_eq!(back, positions, epsilon = 1e-12);
    }
}
