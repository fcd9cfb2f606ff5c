use std::{panic, thread};

use tracing::debug;

use crate::{
    window::{ColumnBuilder, ColumnData, FrameBounds, Partition, WindowFunction},
    UdfError,
};

/// Host-side loop: one frame per output row, one function call per frame.
pub struct WindowDriver;

impl WindowDriver {
    pub fn run_partition(function: &mut dyn WindowFunction, partition: &Partition, bounds: &FrameBounds) -> Result<ColumnData, UdfError> {
        let row_count = partition.row_count();
        function.reset();
        let mut output = ColumnBuilder::with_capacity(function.return_type(), row_count);
        for row in 0..row_count {
            let frame = bounds.frame_for(row, row_count);
            function.process_row(partition, frame, &mut output)?;
        }
        Ok(output.finish())
    }

    /// Process independent partitions in parallel. Each partition gets its own
    /// function instance from `factory`; outputs keep partition order. A panic
    /// in any worker is re-raised on the calling thread.
    pub fn run_partitions<F>(factory: F, partitions: &[Partition], bounds: &FrameBounds) -> Result<Vec<ColumnData>, UdfError>
    where
        F: Fn() -> Result<Box<dyn WindowFunction>, UdfError> + Sync,
    {
        debug!(partitions = partitions.len(), "running window function over partitions");
        let factory = &factory;
        thread::scope(|scope| {
            let handles: Vec<_> = partitions.iter()
                .map(|partition| scope.spawn(move || {
                    let mut function = factory()?;
                    Self::run_partition(function.as_mut(), partition, bounds)
                }))
                .collect();
            handles.into_iter()
                .map(|h| h.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{window::{BindingConfig, FrameBound}, SqlType, SqlValue};

    fn partition(values: Vec<Option<i64>>) -> Partition {
        Partition::new(vec![ColumnData::bigint(values)]).unwrap()
    }

    #[test]
    fn running_frame_carries_last_value_forward() {
        let p = partition(vec![None, Some(1), None, Some(4), None]);
        let mut f = BindingConfig::last_non_null(SqlType::Bigint).with_channels(&[0]).build().unwrap();
        let out = WindowDriver::run_partition(&mut f, &p, &FrameBounds::default()).unwrap();
        let b = SqlValue::Bigint;
        assert_eq!(out.to_values(), vec![SqlValue::Null, b(1), b(1), b(4), b(4)]);
    }

    #[test]
    fn sliding_frame_forgets_values_that_fall_out() {
        let p = partition(vec![Some(1), None, None, None, Some(5)]);
        let mut f = BindingConfig::first_non_null(SqlType::Bigint).with_channels(&[0]).build().unwrap();
        let out = WindowDriver::run_partition(&mut f, &p, &FrameBounds::sliding(1, 0)).unwrap();
        let b = SqlValue::Bigint;
        assert_eq!(out.to_values(), vec![b(1), b(1), SqlValue::Null, SqlValue::Null, b(5)]);
    }

    #[test]
    fn following_frame_looks_ahead() {
        let p = partition(vec![None, None, Some(3), None]);
        let bounds = FrameBounds::new(FrameBound::CurrentRow, FrameBound::UnboundedFollowing);
        let mut f = BindingConfig::first_non_null(SqlType::Bigint).with_channels(&[0]).build().unwrap();
        let out = WindowDriver::run_partition(&mut f, &p, &bounds).unwrap();
        let b = SqlValue::Bigint;
        assert_eq!(out.to_values(), vec![b(3), b(3), b(3), SqlValue::Null]);
    }

    #[test]
    fn partitions_do_not_share_state() {
        let partitions = vec![
            partition(vec![Some(1), None, None]),
            partition(vec![None, None, None]),
            partition(vec![None, Some(2)]),
            partition(vec![]),
        ];
        let factory = || -> Result<Box<dyn WindowFunction>, UdfError> {
            Ok(Box::new(BindingConfig::first_non_null(SqlType::Bigint).with_channels(&[0]).build()?))
        };
        let outs = WindowDriver::run_partitions(factory, &partitions, &FrameBounds::whole_partition()).unwrap();
        let b = SqlValue::Bigint;
        assert_eq!(outs[0].to_values(), vec![b(1), b(1), b(1)]);
        assert_eq!(outs[1].to_values(), vec![SqlValue::Null; 3]);
        assert_eq!(outs[2].to_values(), vec![b(2), b(2)]);
        assert!(outs[3].is_empty());
    }

    #[test]
    fn errors_from_a_partition_surface() {
        let partitions = vec![partition(vec![Some(1)])];
        let factory = || -> Result<Box<dyn WindowFunction>, UdfError> {
            Ok(Box::new(BindingConfig::first_non_null(SqlType::Bigint).with_channels(&[2]).build()?))
        };
        let err = WindowDriver::run_partitions(factory, &partitions, &FrameBounds::default()).unwrap_err();
        assert!(matches!(err, UdfError::ChannelOutOfRange { channel: 2, .. }));
    }

    #[test]
    #[should_panic(expected = "factory exploded")]
    fn worker_panics_reach_the_caller() {
        let partitions = vec![partition(vec![Some(1)]), partition(vec![None])];
        let factory = || -> Result<Box<dyn WindowFunction>, UdfError> { panic!("factory exploded") };
        let _ = WindowDriver::run_partitions(factory, &partitions, &FrameBounds::default());
    }
}
