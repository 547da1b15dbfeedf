//! Random-access frame storage consumed by the shear removal.

use crate::frame::Frame;

/// An indexable, length-queryable sequence of frames.
pub trait Trajectory {
    fn len(&self) -> usize;

    fn frame(&self, index: usize) -> Option<&Frame>;

    fn frame_mut(&mut self, index: usize) -> Option<&mut Frame>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Trajectory for Vec<Frame> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn frame(&self, index: usize) -> Option<&Frame> {
        self.get(index)
    }

    fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.get_mut(index)
    }
}
