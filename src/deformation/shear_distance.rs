use crate::constants::{SHEAR_DX_KEY, TRIANGULAR_TOLERANCE};
use crate::errors::{Result, UnshearError};
use crate::frame::Frame;
use crate::math::is_negligible;

/// Off-diagonal entries as `(label, row, column)` of `h`, where cell vector
/// `c_i` is column `i`.
const IN_PLANE_ENTRIES: [(&str, usize, usize); 4] = [
    ("cx[1]", 1, 0),
    ("cx[2]", 2, 0),
    ("cy[0]", 0, 1),
    ("cy[2]", 2, 1),
];

const SHEAR_ROW_ENTRIES: [(&str, usize, usize); 2] = [("cz[0]", 0, 2), ("cz[1]", 1, 2)];

fn check_zero(frame: &Frame, entries: &[(&'static str, usize, usize)]) -> Result<()> {
    for &(entry, row, col) in entries {
        let value = frame.sim_box.h[(row, col)];
        if !is_negligible(value) {
            return Err(UnshearError::GeometryPrecondition {
                entry,
                value,
                tolerance: TRIANGULAR_TOLERANCE,
            });
        }
    }
    Ok(())
}

/// Returns the raw `(dx, dy)` a volume has moved during simple shear.
///
/// Frames carrying a `shear_dx` metadata vector (Lees-Edwards boundary
/// conditions) must have a fully rectangular cell and report the first two
/// components of that vector. All other frames report the in-plane
/// components of the third cell vector.
pub fn shear_distance(frame: &Frame) -> Result<(f64, f64)> {
    match frame.info.get(SHEAR_DX_KEY) {
        Some(value) => {
            check_zero(frame, &IN_PLANE_ENTRIES)?;
            check_zero(frame, &SHEAR_ROW_ENTRIES)?;
            let d = value.as_vector().ok_or_else(|| UnshearError::InvalidMetadata {
                key: SHEAR_DX_KEY.to_string(),
                expected: "a vector (dx, dy, dz)",
            })?;
            Ok((d[0], d[1]))
        }
        None => {
            check_zero(frame, &IN_PLANE_ENTRIES)?;
            let c = frame.sim_box.vector(2);
            Ok((c[0], c[1]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::InfoValue;
    use crate::simulation_box::SimulationBox;
    use na::{Matrix3xX, Vector3};

    fn frame_with_rows(rows: [[f64; 3]; 3]) -> Frame {
        Frame::new(SimulationBox::from_rows(rows).unwrap(), Matrix3xX::zeros(0))
    }

    #[test]
    fn test_cell_mode_reads_third_vector() {
        let frame = frame_with_rows([[10.0, 0.0, 0.0], [0.0, 12.0, 0.0], [3.5, -1.25, 8.0]]);
        assert_eq!(shear_distance(&frame).unwrap(), (3.5, -1.25));
    }

    #[test]
    fn test_explicit_mode_reads_metadata() {
        let mut frame = frame_with_rows([[10.0, 0.0, 0.0], [0.0, 12.0, 0.0], [0.0, 0.0, 8.0]]);
        frame.info.insert(
            SHEAR_DX_KEY.to_string(),
            InfoValue::Vector(Vector3::new(-4.0, 0.5, 99.0)),
        );
        assert_eq!(shear_distance(&frame).unwrap(), (-4.0, 0.5));
    }

    #[test]
    fn test_explicit_mode_rejects_tilted_cell() {
        let mut frame = frame_with_rows([[10.0, 0.0, 0.0], [0.0, 12.0, 0.0], [1.0, 0.0, 8.0]]);
        frame.info.insert(
            SHEAR_DX_KEY.to_string(),
            InfoValue::Vector(Vector3::new(1.0, 0.0, 0.0)),
        );
        match shear_distance(&frame) {
            Err(UnshearError::GeometryPrecondition { entry, value, .. }) => {
                assert_eq!(entry, "cz[0]");
                assert_eq!(value, 1.0);
            }
            other => panic!("expected a precondition violation, got {:?}", other),
        }
    }

    #[test]
    fn test_in_plane_entry_above_tolerance() {
        let frame = frame_with_rows([[10.0, 1e-6, 0.0], [0.0, 12.0, 0.0], [1.0, 0.0, 8.0]]);
        match shear_distance(&frame) {
            Err(UnshearError::GeometryPrecondition { entry, value, .. }) => {
                assert_eq!(entry, "cx[1]");
                assert_eq!(value, 1e-6);
            }
            other => panic!("expected a precondition violation, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_below_tolerance_is_accepted() {
        let frame = frame_with_rows([[10.0, 0.0, 0.0], [5e-13, 12.0, 0.0], [1.0, 2.0, 8.0]]);
        assert_eq!(shear_distance(&frame).unwrap(), (1.0, 2.0));
    }

    #[test]
    fn test_wrongly_typed_metadata() {
        let mut frame = frame_with_rows([[10.0, 0.0, 0.0], [0.0, 12.0, 0.0], [0.0, 0.0, 8.0]]);
        frame
            .info
            .insert(SHEAR_DX_KEY.to_string(), InfoValue::Float(1.0));
        assert!(matches!(
            shear_distance(&frame),
            Err(UnshearError::InvalidMetadata { .. })
        ));
    }
}
