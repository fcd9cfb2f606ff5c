use crate::{window::Direction, UdfError};

/// Inclusive row range `[start, end]` inside the current partition.
/// `start > end` is an empty frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub start: usize,
    pub end: usize,
}

impl Frame {
    pub fn new(start: usize, end: usize) -> Self { Self { start, end } }

    pub fn empty() -> Self { Self { start: 1, end: 0 } }

    pub fn is_empty(&self) -> bool { self.start > self.end }

    pub fn len(&self) -> usize {
        if self.is_empty() { 0 } else { self.end - self.start + 1 }
    }

    /// Fail fast instead of reading past the partition.
    pub fn check_within(&self, row_count: usize) -> Result<(), UdfError> {
        if !self.is_empty() && self.end >= row_count {
            return Err(UdfError::FrameOutOfBounds { start: self.start, end: self.end, row_count });
        }
        Ok(())
    }

    /// The same rows in scan positions for `direction`, as `(first, last)`.
    /// Only meaningful for non-empty frames already checked against `row_count`.
    pub fn scan_range(&self, direction: Direction, row_count: usize) -> (usize, usize) {
        match direction {
            Direction::First => (self.start, self.end),
            Direction::Last => (direction.mirror(self.end, row_count), direction.mirror(self.start, row_count)),
        }
    }
}

/// One side of a ROWS frame clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(usize),
    CurrentRow,
    Following(usize),
    UnboundedFollowing,
}

impl FrameBound {
    /// Row index this bound points at, saturating instead of wrapping.
    fn offset(&self, row: usize, row_count: usize) -> i64 {
        let row = saturating_i64(row);
        match self {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::Preceding(n) => row.saturating_sub(saturating_i64(*n)),
            FrameBound::CurrentRow => row,
            FrameBound::Following(n) => row.saturating_add(saturating_i64(*n)),
            FrameBound::UnboundedFollowing => saturating_i64(row_count) - 1,
        }
    }
}

fn saturating_i64(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

/// `ROWS BETWEEN start AND end`, evaluated per output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBounds {
    pub start: FrameBound,
    pub end: FrameBound,
}

impl Default for FrameBounds {
    /// The SQL default for an ordered window: unbounded preceding to current row.
    fn default() -> Self {
        Self { start: FrameBound::UnboundedPreceding, end: FrameBound::CurrentRow }
    }
}

impl FrameBounds {
    pub fn new(start: FrameBound, end: FrameBound) -> Self { Self { start, end } }

    pub fn whole_partition() -> Self {
        Self::new(FrameBound::UnboundedPreceding, FrameBound::UnboundedFollowing)
    }

    pub fn sliding(preceding: usize, following: usize) -> Self {
        Self::new(FrameBound::Preceding(preceding), FrameBound::Following(following))
    }

    /// Frame for `row`, clamped to the partition.
    pub fn frame_for(&self, row: usize, row_count: usize) -> Frame {
        if row_count == 0 { return Frame::empty(); }
        let last = saturating_i64(row_count) - 1;
        let start = self.start.offset(row, row_count).max(0);
        let end = self.end.offset(row, row_count).min(last);
        if start > end || end < 0 || start > last {
            return Frame::empty();
        }
        Frame::new(start as usize, end as usize)
    }
}
