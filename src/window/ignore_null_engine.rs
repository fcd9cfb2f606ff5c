use tracing::trace;

use crate::{window::{Direction, Frame, ValueAccessor}, UdfError};

/// What the previous scan proved about the partition, in scan positions:
/// positions `[origin, resume)` are null and, when `hit` is set, position
/// `resume` holds a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KnownNulls {
    origin: usize,
    resume: usize,
    hit: bool,
    row_count: usize,
}

/// Finds the non-null value nearest to a frame's starting edge.
///
/// One engine serves one partition at a time; call [`reset`](Self::reset)
/// when a new partition starts. Between calls the engine remembers the null
/// run it walked, so running and sliding frames only scan rows they have not
/// seen. Frames that move backwards fall back to a full rescan. Results never
/// depend on the cache.
#[derive(Debug, Clone)]
pub struct IgnoreNullEngine {
    direction: Direction,
    cache_enabled: bool,
    known: Option<KnownNulls>,
}

impl IgnoreNullEngine {
    pub fn new(direction: Direction) -> Self {
        Self { direction, cache_enabled: true, known: None }
    }

    /// Engine that rescans the whole frame on every call.
    pub fn uncached(direction: Direction) -> Self {
        Self { direction, cache_enabled: false, known: None }
    }

    pub fn direction(&self) -> Direction { self.direction }

    pub fn reset(&mut self) {
        self.known = None;
    }

    /// The nearest non-null value in `frame`, or `None`.
    pub fn evaluate<'a, A: ValueAccessor>(&mut self, frame: Frame, accessor: &'a A) -> Result<Option<A::Value<'a>>, UdfError> {
        Ok(self.locate(frame, accessor)?.and_then(|offset| accessor.value_at(offset)))
    }

    /// Row offset of the nearest non-null value in `frame`, or `None`.
    pub fn locate<A: ValueAccessor>(&mut self, frame: Frame, accessor: &A) -> Result<Option<usize>, UdfError> {
        let row_count = accessor.row_count();
        frame.check_within(row_count)?;
        if frame.is_empty() {
            return Ok(None);
        }
        let (lo, hi) = frame.scan_range(self.direction, row_count);

        let reusable = self.known
            .filter(|k| self.cache_enabled && k.row_count == row_count && k.origin <= lo && lo <= k.resume);

        let (origin, mut pos) = match reusable {
            Some(k) if k.hit => {
                trace!(direction = %self.direction, lo, hi, resume = k.resume, "reusing known hit");
                return Ok((k.resume <= hi).then(|| self.direction.mirror(k.resume, row_count)));
            }
            Some(k) => {
                trace!(direction = %self.direction, lo, hi, resume = k.resume, "resuming after known nulls");
                (k.origin, k.resume)
            }
            None => (lo, lo),
        };

        while pos <= hi {
            let offset = self.direction.mirror(pos, row_count);
            if !accessor.is_null_at(offset) {
                self.remember(KnownNulls { origin, resume: pos, hit: true, row_count });
                return Ok(Some(offset));
            }
            pos += 1;
        }
        self.remember(KnownNulls { origin, resume: pos, hit: false, row_count });
        Ok(None)
    }

    fn remember(&mut self, known: KnownNulls) {
        if self.cache_enabled {
            self.known = Some(known);
        }
    }
}
