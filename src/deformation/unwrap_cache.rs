use na::{Matrix3, Vector3};

use crate::deformation::shear_distance::shear_distance;
use crate::errors::{Result, UnshearError};
use crate::trajectory::Trajectory;

/// Shear history of a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct UnwrapState {
    /// Cumulative, unwrapped shear `(dx, dy)`.
    pub shear: (f64, f64),
    /// Raw shear of this frame after the wrap correction; the reference for
    /// the next frame.
    pub last_raw: (f64, f64),
    /// `diag(sx, sy, sz)` with the cumulative shear in the third cell vector.
    pub sheared_cell: Matrix3<f64>,
    /// `diag(sx, sy, sz)`.
    pub unsheared_cell: Matrix3<f64>,
}

/// Append-only shear history, one [`UnwrapState`] per trajectory index.
///
/// Entries are produced strictly in index order and are never recomputed,
/// so a frame's history does not depend on the order frames are requested in.
#[derive(Debug, Default)]
pub struct UnwrapCache {
    states: Vec<UnwrapState>,
}

/// Moves `cur` by whole periods `length` until it is no more than half a
/// period behind `last`. Forward jumps are left alone.
///
/// Returns `None` when `cur` is too far behind `last` for a period to be
/// resolved at f64 precision.
fn unwrap_backward(cur: f64, last: f64, length: f64) -> Option<f64> {
    let half = length / 2.0;
    if cur - last >= -half {
        return Some(cur);
    }
    let periods = ((-half - (cur - last)) / length).ceil();
    let mut cur = cur + periods * length;
    // one more period absorbs rounding in the step count
    if cur - last < -half {
        cur += length;
    }
    (cur.is_finite() && cur - last >= -half).then_some(cur)
}

fn check_unwrappable(frame: usize, lengths: &Vector3<f64>, cur: (f64, f64)) -> Result<()> {
    for (axis, &length) in ["x", "y"].iter().zip(lengths.iter()) {
        if !length.is_finite() || length <= 0.0 {
            return Err(UnshearError::DegenerateShear {
                frame,
                reason: format!("box length along {} is {}", axis, length),
            });
        }
    }
    if !cur.0.is_finite() || !cur.1.is_finite() {
        return Err(UnshearError::DegenerateShear {
            frame,
            reason: format!("shear offset ({}, {}) is not finite", cur.0, cur.1),
        });
    }
    Ok(())
}

impl UnwrapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames whose history has been computed.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<&UnwrapState> {
        self.states.get(index)
    }

    pub fn states(&self) -> &[UnwrapState] {
        &self.states
    }

    /// Extends the history so that it covers frame `index`.
    ///
    /// Frames are visited from the first unfilled index up to `index`. The
    /// new entries are committed together, so on error the cache is left as
    /// it was.
    pub fn fill_upto<T: Trajectory + ?Sized>(&mut self, traj: &T, index: usize) -> Result<()> {
        if index < self.states.len() {
            return Ok(());
        }

        let i0 = self.states.len();
        let (mut last_dx, mut last_dy, mut dx, mut dy) = match self.states.last() {
            Some(prev) => (prev.last_raw.0, prev.last_raw.1, prev.shear.0, prev.shear.1),
            None => {
                let first = traj.frame(0).ok_or(UnshearError::MissingFrame { index: 0 })?;
                let (last_dx, last_dy) = shear_distance(first)?;
                (last_dx, last_dy, last_dx, last_dy)
            }
        };

        tracing::debug!("extending shear history from frame {} to {}", i0, index);

        let mut staged = Vec::with_capacity(index + 1 - i0);
        for a in i0..=index {
            let frame = traj.frame(a).ok_or(UnshearError::MissingFrame { index: a })?;
            let lengths = frame.sim_box.diagonal();
            let (sx, sy, sz) = (lengths[0], lengths[1], lengths[2]);

            let (raw_dx, raw_dy) = shear_distance(frame)?;
            check_unwrappable(a, &lengths, (raw_dx, raw_dy))?;

            let (cur_dx, cur_dy) = match (
                unwrap_backward(raw_dx, last_dx, sx),
                unwrap_backward(raw_dy, last_dy, sy),
            ) {
                (Some(cur_dx), Some(cur_dy)) => (cur_dx, cur_dy),
                _ => {
                    return Err(UnshearError::DegenerateShear {
                        frame: a,
                        reason: format!(
                            "shear ({}, {}) is too far behind ({}, {}) to unwrap",
                            raw_dx, raw_dy, last_dx, last_dy
                        ),
                    })
                }
            };
            if cur_dx != raw_dx || cur_dy != raw_dy {
                tracing::debug!(
                    "cell flip at frame {}: raw shear ({}, {}) unwrapped to ({}, {})",
                    a,
                    raw_dx,
                    raw_dy,
                    cur_dx,
                    cur_dy
                );
            }

            dx += cur_dx - last_dx;
            dy += cur_dy - last_dy;
            last_dx = cur_dx;
            last_dy = cur_dy;

            #[rustfmt::skip]
            let sheared_cell = Matrix3::new(
                sx, 0.0, dx,
                0.0, sy, dy,
                0.0, 0.0, sz,
            );
            staged.push(UnwrapState {
                shear: (dx, dy),
                last_raw: (last_dx, last_dy),
                sheared_cell,
                unsheared_cell: Matrix3::from_diagonal(&lengths),
            });
        }

        self.states.extend(staged);
        Ok(())
    }
}
