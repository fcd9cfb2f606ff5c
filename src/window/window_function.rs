use crate::{window::{ColumnBuilder, Frame, Partition}, SqlType, UdfError};

/// A bound window function as the host sees it.
///
/// The host calls `reset` when a partition starts, then `process_row` once
/// per output row with that row's frame. One instance serves one partition
/// at a time; instances for different partitions share nothing.
pub trait WindowFunction: Send {
    fn name(&self) -> &str;

    fn return_type(&self) -> SqlType;

    fn argument_types(&self) -> &[SqlType];

    /// Drop all per-partition state.
    fn reset(&mut self);

    /// Append the value for the current row to `output`.
    fn process_row(&mut self, partition: &Partition, frame: Frame, output: &mut ColumnBuilder) -> Result<(), UdfError>;
}
