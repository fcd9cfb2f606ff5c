use tracing::debug;

use crate::{
    window::{
        ColumnBuilder, ColumnData, Direction, FixedWidthAccessor, Frame, IgnoreNullEngine,
        LongAndDoubleState, Partition, ResultSlot, SliceAccessor, WindowFunction,
    },
    SqlType, UdfError,
};

pub const FIRST_NON_NULL_VALUE: &str = "first_non_null_value";
pub const LAST_NON_NULL_VALUE: &str = "last_non_null_value";

/// Everything needed to bind a null-skipping value function: its public name,
/// the SQL type it reads and returns, the scan direction, and the channel that
/// supplies the argument column.
///
/// Build the record first, then turn it into a function with [`build`](Self::build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    pub name: String,
    pub sql_type: SqlType,
    pub direction: Direction,
    pub argument_channels: Vec<usize>,
}

impl BindingConfig {
    pub fn new(name: &str, sql_type: SqlType, direction: Direction) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            sql_type,
            direction,
            argument_channels: Vec::new(),
        }
    }

    pub fn first_non_null(sql_type: SqlType) -> Self {
        Self::new(FIRST_NON_NULL_VALUE, sql_type, Direction::First)
    }

    pub fn last_non_null(sql_type: SqlType) -> Self {
        Self::new(LAST_NON_NULL_VALUE, sql_type, Direction::Last)
    }

    pub fn with_channels(mut self, channels: &[usize]) -> Self {
        self.argument_channels = channels.to_vec();
        self
    }

    pub fn argument_types(&self) -> Vec<SqlType> { vec![self.sql_type] }

    pub fn build(self) -> Result<IgnoreNullValueFunction, UdfError> {
        let [channel] = self.argument_channels.as_slice() else {
            return Err(UdfError::ChannelMismatch {
                name: self.name.clone(),
                expected: 1,
                got: self.argument_channels.len(),
            });
        };
        debug!(name = %self.name, ty = %self.sql_type, channel, "binding window function");
        Ok(IgnoreNullValueFunction {
            channel: *channel,
            argument_types: self.argument_types(),
            engine: IgnoreNullEngine::new(self.direction),
            state: LongAndDoubleState::new(),
            slot: ResultSlot::Null,
            config: self,
        })
    }
}

/// `first_non_null_value` / `last_non_null_value` bound to one SQL type.
#[derive(Debug, Clone)]
pub struct IgnoreNullValueFunction {
    config: BindingConfig,
    channel: usize,
    argument_types: Vec<SqlType>,
    engine: IgnoreNullEngine,
    state: LongAndDoubleState,
    slot: ResultSlot,
}

impl IgnoreNullValueFunction {
    pub fn config(&self) -> &BindingConfig { &self.config }

    pub fn direction(&self) -> Direction { self.config.direction }

    fn update(&mut self, column: &ColumnData, frame: Frame) -> Result<(), UdfError> {
        self.slot = match column {
            ColumnData::Long { values, .. } => match self.engine.evaluate(frame, &FixedWidthAccessor::new(values))? {
                Some(v) => { self.state.set_long(v); ResultSlot::Fixed }
                None => ResultSlot::Null,
            },
            ColumnData::Double { values, .. } => match self.engine.evaluate(frame, &FixedWidthAccessor::new(values))? {
                Some(v) => { self.state.set_double(v); ResultSlot::Fixed }
                None => ResultSlot::Null,
            },
            ColumnData::Slice { values, .. } => self.engine
                .locate(frame, &SliceAccessor::new(values))?
                .map(ResultSlot::SliceRef)
                .unwrap_or(ResultSlot::Null),
        };
        Ok(())
    }

    fn write(&self, column: &ColumnData, output: &mut ColumnBuilder) -> Result<(), UdfError> {
        match (self.slot, column) {
            (ResultSlot::Null, _) => { output.append_null(); Ok(()) }
            (ResultSlot::Fixed, ColumnData::Long { .. }) => output.append_long(self.state.get_long()),
            (ResultSlot::Fixed, ColumnData::Double { .. }) => output.append_double(self.state.get_double()),
            (ResultSlot::SliceRef(row), ColumnData::Slice { values, .. }) => match values.get(row).and_then(|v| v.as_deref()) {
                Some(text) => output.append_slice(text),
                None => { output.append_null(); Ok(()) }
            },
            (_, other) => Err(UdfError::TypeMismatch { expected: self.config.sql_type, got: other.sql_type().to_string() }),
        }
    }
}

impl WindowFunction for IgnoreNullValueFunction {
    fn name(&self) -> &str { &self.config.name }

    fn return_type(&self) -> SqlType { self.config.sql_type }

    fn argument_types(&self) -> &[SqlType] { &self.argument_types }

    fn reset(&mut self) {
        self.engine.reset();
        self.slot = ResultSlot::Null;
    }

    fn process_row(&mut self, partition: &Partition, frame: Frame, output: &mut ColumnBuilder) -> Result<(), UdfError> {
        let column = partition.column(self.channel)?;
        if column.sql_type() != self.config.sql_type {
            return Err(UdfError::TypeMismatch { expected: self.config.sql_type, got: column.sql_type().to_string() });
        }
        self.update(column, frame)?;
        self.write(column, output)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::SqlValue;

    fn run(f: &mut dyn WindowFunction, p: &Partition, frames: &[Frame]) -> Vec<SqlValue> {
        f.reset();
        let mut out = ColumnBuilder::new(f.return_type());
        for frame in frames {
            f.process_row(p, *frame, &mut out).unwrap();
        }
        out.finish().to_values()
    }

    #[test]
    fn metadata_comes_from_the_config() {
        let f = BindingConfig::last_non_null(SqlType::Varchar).with_channels(&[0]).build().unwrap();
        assert_eq!(f.name(), "last_non_null_value");
        assert_eq!(f.return_type(), SqlType::Varchar);
        assert_eq!(f.argument_types(), &[SqlType::Varchar]);
        assert_eq!(f.direction(), Direction::Last);
    }

    #[test]
    fn build_requires_exactly_one_channel() {
        let none = BindingConfig::first_non_null(SqlType::Bigint).build().unwrap_err();
        assert_eq!(none, UdfError::ChannelMismatch { name: "first_non_null_value".into(), expected: 1, got: 0 });
        let two = BindingConfig::first_non_null(SqlType::Bigint).with_channels(&[0, 1]).build();
        assert!(matches!(two, Err(UdfError::ChannelMismatch { got: 2, .. })));
    }

    #[test]
    fn long_double_and_text_columns() {
        let p = Partition::new(vec![
            ColumnData::bigint(vec![None, None, Some(7), None, Some(9)]),
            ColumnData::double(vec![Some(0.5), None, None, Some(2.5), None]),
            ColumnData::varchar(vec![None, Some("x"), None, Some("y"), None]),
        ]).unwrap();
        let all = [Frame::new(0, 4)];

        let mut f = BindingConfig::first_non_null(SqlType::Bigint).with_channels(&[0]).build().unwrap();
        assert_eq!(run(&mut f, &p, &all), vec![SqlValue::Bigint(7)]);
        let mut l = BindingConfig::last_non_null(SqlType::Bigint).with_channels(&[0]).build().unwrap();
        assert_eq!(run(&mut l, &p, &all), vec![SqlValue::Bigint(9)]);

        let mut fd = BindingConfig::first_non_null(SqlType::Double).with_channels(&[1]).build().unwrap();
        assert_eq!(run(&mut fd, &p, &all), vec![SqlValue::double(0.5)]);
        let mut ld = BindingConfig::last_non_null(SqlType::Double).with_channels(&[1]).build().unwrap();
        assert_eq!(run(&mut ld, &p, &all), vec![SqlValue::double(2.5)]);

        let mut ls = BindingConfig::last_non_null(SqlType::Varchar).with_channels(&[2]).build().unwrap();
        assert_eq!(run(&mut ls, &p, &all), vec![SqlValue::varchar("y")]);
    }

    fn sample_values(ty: SqlType) -> (Value, Value) {
        match ty {
            SqlType::Bigint => (json!(-7), json!(9)),
            SqlType::Integer => (json!(i32::MIN), json!(i32::MAX)),
            SqlType::Boolean => (json!(false), json!(true)),
            SqlType::Date => (json!("1969-12-31"), json!("2024-02-29")),
            SqlType::Time => (json!("00:00:01.250"), json!("23:59:59")),
            SqlType::Timestamp => (json!("2024-01-01 00:00:00"), json!("1960-06-30 12:00:00.5")),
            SqlType::TimeWithTimeZone => (json!("08:00:00+02:00"), json!("23:30:00-05:00")),
            SqlType::TimestampWithTimeZone => (json!("2024-03-10 01:30:00-05:00"), json!("2024-03-10 03:30:00+14:00")),
            SqlType::Double => (json!(-0.5), json!(1e300)),
            SqlType::Real => (json!(0.25), json!(-3.5)),
            SqlType::Varchar => (json!(""), json!("y")),
        }
    }

    #[test]
    fn every_type_binds_end_to_end() {
        for ty in SqlType::ALL {
            let (a, b) = sample_values(ty);
            let column = ColumnData::from_json(ty, &[json!(null), a.clone(), json!(null), b.clone(), json!(null)]).unwrap();
            assert_eq!(column.sql_type(), ty);
            let p = Partition::new(vec![column]).unwrap();
            let want_first = SqlValue::from_json(&a, ty).unwrap();
            let want_last = SqlValue::from_json(&b, ty).unwrap();
            let frames = [Frame::new(0, 4), Frame::new(0, 0), Frame::new(2, 4)];

            let mut f = BindingConfig::first_non_null(ty).with_channels(&[0]).build().unwrap();
            assert_eq!(run(&mut f, &p, &frames), vec![want_first.clone(), SqlValue::Null, want_last.clone()], "first {}", ty);
            let mut l = BindingConfig::last_non_null(ty).with_channels(&[0]).build().unwrap();
            assert_eq!(run(&mut l, &p, &frames), vec![want_last.clone(), SqlValue::Null, want_last], "last {}", ty);
            assert_eq!(l.return_type(), ty);
        }
    }

    #[test]
    fn running_frame_fills_forward() {
        let p = Partition::new(vec![ColumnData::varchar(vec![None, Some("a"), None, None, Some("b"), None])]).unwrap();
        let frames: Vec<Frame> = (0..6).map(|row| Frame::new(0, row)).collect();
        let mut f = BindingConfig::last_non_null(SqlType::Varchar).with_channels(&[0]).build().unwrap();
        let s = SqlValue::varchar;
        assert_eq!(run(&mut f, &p, &frames), vec![SqlValue::Null, s("a"), s("a"), s("a"), s("b"), s("b")]);
    }

    #[test]
    fn null_rows_do_not_leak_previous_results() {
        let p = Partition::new(vec![ColumnData::bigint(vec![Some(1), None, None])]).unwrap();
        let frames = [Frame::new(0, 0), Frame::new(1, 2), Frame::empty()];
        let mut f = BindingConfig::first_non_null(SqlType::Bigint).with_channels(&[0]).build().unwrap();
        assert_eq!(run(&mut f, &p, &frames), vec![SqlValue::Bigint(1), SqlValue::Null, SqlValue::Null]);
    }

    #[test]
    fn wrong_column_type_is_rejected() {
        let p = Partition::new(vec![ColumnData::bigint(vec![Some(1)])]).unwrap();
        let mut f = BindingConfig::first_non_null(SqlType::Varchar).with_channels(&[0]).build().unwrap();
        let mut out = ColumnBuilder::new(SqlType::Varchar);
        let err = f.process_row(&p, Frame::new(0, 0), &mut out).unwrap_err();
        assert!(matches!(err, UdfError::TypeMismatch { expected: SqlType::Varchar, .. }));

        let mut g = BindingConfig::first_non_null(SqlType::Bigint).with_channels(&[4]).build().unwrap();
        let mut out = ColumnBuilder::new(SqlType::Bigint);
        assert!(matches!(g.process_row(&p, Frame::new(0, 0), &mut out), Err(UdfError::ChannelOutOfRange { channel: 4, .. })));
    }
}
