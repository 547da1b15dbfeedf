use crate::constants::TRUE_CELL_KEY;
use crate::deformation::unwrap_cache::UnwrapCache;
use crate::errors::{Result, UnshearError};
use crate::frame::{Frame, InfoValue};
use crate::trajectory::Trajectory;

/// Removes a homogeneous simple-shear deformation from a trajectory.
///
/// Takes care of cells that are instantaneously flipped from +0.5 to -0.5
/// strain during simple shear, as e.g. generated by LAMMPS. Every frame
/// handed out by [`RemoveSimpleShear::get`] lives in the rectangular cell of
/// its box lengths, with the affine shear taken out of the positions and the
/// atoms folded back into the cell. The sheared cell is kept in the frame
/// metadata under `true_cell`.
///
/// Frames are corrected in place: `get` returns a mutable borrow of the frame
/// owned by the wrapped trajectory, not a copy. Asking for the same index
/// again reapplies the same cached cells to the frame as it is now, so the
/// positions of an already corrected frame are unsheared a second time.
///
/// # Examples
///
/// ```
/// use unshear::deformation::RemoveSimpleShear;
/// # use unshear::{frame::Frame, simulation_box::SimulationBox};
/// # fn main() -> unshear::errors::Result<()> {
/// # let frames: Vec<Frame> = [4.9, -4.9]
/// #     .iter()
/// #     .map(|&dx| {
/// #         let rows = [[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [dx, 0.0, 10.0]];
/// #         Frame::new(SimulationBox::from_rows(rows).unwrap(), nalgebra::Matrix3xX::zeros(0))
/// #     })
/// #     .collect();
/// let mut view = RemoveSimpleShear::new(frames);
/// let frame = view.get(-1)?;
/// assert!(frame.sim_box.is_orthogonal());
/// # Ok(())
/// # }
/// ```
pub struct RemoveSimpleShear<T: Trajectory> {
    traj: T,
    cache: UnwrapCache,
}

impl<T: Trajectory> RemoveSimpleShear<T> {
    pub fn new(traj: T) -> Self {
        Self {
            traj,
            cache: UnwrapCache::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.traj.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traj.is_empty()
    }

    /// Python-style index normalisation: negative indices count from the end.
    fn normalize(&self, index: isize) -> Result<usize> {
        let len = self.len();
        let resolved = if index < 0 {
            len as isize + index
        } else {
            index
        };
        if resolved < 0 || resolved as usize >= len {
            return Err(UnshearError::IndexOutOfRange { index, len });
        }
        Ok(resolved as usize)
    }

    /// Returns frame `index` with the shear removed.
    pub fn get(&mut self, index: isize) -> Result<&mut Frame> {
        let i = self.normalize(index)?;
        self.cache.fill_upto(&self.traj, i)?;

        let state = self
            .cache
            .state(i)
            .ok_or(UnshearError::MissingFrame { index: i })?;
        let frame = self
            .traj
            .frame_mut(i)
            .ok_or(UnshearError::MissingFrame { index: i })?;

        // True cell shape
        frame.set_cell(state.sheared_cell, false)?;
        // Unshear
        frame.set_cell(state.unsheared_cell, true)?;
        frame.wrap();

        frame.info.insert(
            TRUE_CELL_KEY.to_string(),
            InfoValue::Matrix(state.sheared_cell),
        );
        Ok(frame)
    }

    /// The last frame with the shear removed.
    pub fn last(&mut self) -> Result<&mut Frame> {
        self.get(-1)
    }

    pub fn cache(&self) -> &UnwrapCache {
        &self.cache
    }

    pub fn source(&self) -> &T {
        &self.traj
    }
}
