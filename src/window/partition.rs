use serde_json::Value;

use crate::{PhysicalType, SqlType, SqlValue, UdfError, ZonedMillis};

/// One column of a partition, stored unboxed by physical type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Long { ty: SqlType, values: Vec<Option<i64>> },
    Double { ty: SqlType, values: Vec<Option<f64>> },
    Slice { ty: SqlType, values: Vec<Option<String>> },
}

impl ColumnData {
    pub fn bigint(values: Vec<Option<i64>>) -> Self { ColumnData::Long { ty: SqlType::Bigint, values } }

    pub fn double(values: Vec<Option<f64>>) -> Self { ColumnData::Double { ty: SqlType::Double, values } }

    pub fn varchar(values: Vec<Option<&str>>) -> Self {
        ColumnData::Slice { ty: SqlType::Varchar, values: values.into_iter().map(|v| v.map(str::to_string)).collect() }
    }

    pub fn sql_type(&self) -> SqlType {
        match self {
            ColumnData::Long { ty, .. } | ColumnData::Double { ty, .. } | ColumnData::Slice { ty, .. } => *ty,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Long { values, .. } => values.len(),
            ColumnData::Double { values, .. } => values.len(),
            ColumnData::Slice { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Boxed view of one row, for display and assertions.
    pub fn get(&self, row: usize) -> SqlValue {
        match self {
            ColumnData::Long { ty, values } => match values.get(row).copied().flatten() {
                None => SqlValue::Null,
                Some(v) => match ty {
                    SqlType::Integer => SqlValue::Integer(v as i32),
                    SqlType::Boolean => SqlValue::Boolean(v != 0),
                    SqlType::Date => SqlValue::Date(v as i32),
                    SqlType::Time => SqlValue::Time(v),
                    SqlType::Timestamp => SqlValue::Timestamp(v),
                    SqlType::TimeWithTimeZone => ZonedMillis::from_bits(v)
                        .map(SqlValue::TimeWithTimeZone)
                        .unwrap_or(SqlValue::Null),
                    SqlType::TimestampWithTimeZone => ZonedMillis::from_bits(v)
                        .map(SqlValue::TimestampWithTimeZone)
                        .unwrap_or(SqlValue::Null),
                    _ => SqlValue::Bigint(v),
                },
            },
            ColumnData::Double { ty, values } => match values.get(row).copied().flatten() {
                None => SqlValue::Null,
                Some(v) if *ty == SqlType::Real => SqlValue::Real((v as f32).into()),
                Some(v) => SqlValue::double(v),
            },
            ColumnData::Slice { values, .. } => values.get(row)
                .and_then(|v| v.as_deref())
                .map(SqlValue::varchar)
                .unwrap_or(SqlValue::Null),
        }
    }

    pub fn to_values(&self) -> Vec<SqlValue> {
        (0..self.len()).map(|row| self.get(row)).collect()
    }

    /// Build a column of `ty` from JSON rows; JSON null is SQL null.
    pub fn from_json(ty: SqlType, rows: &[Value]) -> Result<Self, UdfError> {
        let mut builder = ColumnBuilder::with_capacity(ty, rows.len());
        for row in rows {
            builder.append_value(&SqlValue::from_json(row, ty)?)?;
        }
        Ok(builder.finish())
    }
}

/// Rows sharing a partition key, one column per argument channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    columns: Vec<ColumnData>,
    row_count: usize,
}

impl Partition {
    /// All columns must have the same number of rows.
    pub fn new(columns: Vec<ColumnData>) -> Result<Self, UdfError> {
        let row_count = columns.first().map(ColumnData::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(UdfError::InvalidArgument(format!(
                "partition columns differ in length: {} vs {}", row_count, bad.len()
            )));
        }
        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize { self.row_count }

    pub fn column_count(&self) -> usize { self.columns.len() }

    pub fn column(&self, channel: usize) -> Result<&ColumnData, UdfError> {
        self.columns.get(channel)
            .ok_or(UdfError::ChannelOutOfRange { channel, columns: self.columns.len() })
    }
}

/// Output column written one row at a time by a window function.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBuilder {
    column: ColumnData,
}

impl ColumnBuilder {
    pub fn new(ty: SqlType) -> Self { Self::with_capacity(ty, 0) }

    pub fn with_capacity(ty: SqlType, capacity: usize) -> Self {
        let column = match ty.physical() {
            PhysicalType::Long => ColumnData::Long { ty, values: Vec::with_capacity(capacity) },
            PhysicalType::Double => ColumnData::Double { ty, values: Vec::with_capacity(capacity) },
            PhysicalType::Slice => ColumnData::Slice { ty, values: Vec::with_capacity(capacity) },
        };
        Self { column }
    }

    pub fn sql_type(&self) -> SqlType { self.column.sql_type() }

    pub fn len(&self) -> usize { self.column.len() }

    pub fn is_empty(&self) -> bool { self.column.is_empty() }

    pub fn append_null(&mut self) {
        match &mut self.column {
            ColumnData::Long { values, .. } => values.push(None),
            ColumnData::Double { values, .. } => values.push(None),
            ColumnData::Slice { values, .. } => values.push(None),
        }
    }

    /// Narrow types only take values their own encoding can produce.
    pub fn append_long(&mut self, value: i64) -> Result<(), UdfError> {
        match &mut self.column {
            ColumnData::Long { ty, values } => {
                check_long_encoding(*ty, value)?;
                values.push(Some(value));
                Ok(())
            }
            other => Err(UdfError::TypeMismatch { expected: other.sql_type(), got: "long".into() }),
        }
    }

    pub fn append_double(&mut self, value: f64) -> Result<(), UdfError> {
        match &mut self.column {
            ColumnData::Double { values, .. } => { values.push(Some(value)); Ok(()) }
            other => Err(UdfError::TypeMismatch { expected: other.sql_type(), got: "double".into() }),
        }
    }

    pub fn append_slice(&mut self, value: &str) -> Result<(), UdfError> {
        match &mut self.column {
            ColumnData::Slice { values, .. } => { values.push(Some(value.to_string())); Ok(()) }
            other => Err(UdfError::TypeMismatch { expected: other.sql_type(), got: "varchar".into() }),
        }
    }

    pub fn append_value(&mut self, value: &SqlValue) -> Result<(), UdfError> {
        match value {
            SqlValue::Null => { self.append_null(); Ok(()) }
            SqlValue::Bigint(v) | SqlValue::Time(v) | SqlValue::Timestamp(v) => self.append_long(*v),
            SqlValue::Integer(v) | SqlValue::Date(v) => self.append_long(*v as i64),
            SqlValue::TimeWithTimeZone(z) | SqlValue::TimestampWithTimeZone(z) => self.append_long(z.bits()),
            SqlValue::Boolean(b) => self.append_long(*b as i64),
            SqlValue::Double(f) => self.append_double(f.into_inner()),
            SqlValue::Real(f) => self.append_double(f.into_inner() as f64),
            SqlValue::Varchar(s) => self.append_slice(s),
        }
    }

    pub fn finish(self) -> ColumnData { self.column }
}

fn check_long_encoding(ty: SqlType, value: i64) -> Result<(), UdfError> {
    let valid = match ty {
        SqlType::Integer | SqlType::Date => i32::try_from(value).is_ok(),
        SqlType::Boolean => value == 0 || value == 1,
        SqlType::TimeWithTimeZone | SqlType::TimestampWithTimeZone => ZonedMillis::from_bits(value).is_ok(),
        _ => true,
    };
    if !valid {
        return Err(UdfError::InvalidArgument(format!("{} is not a valid {} value", value, ty)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partition_rejects_ragged_columns() {
        let err = Partition::new(vec![
            ColumnData::bigint(vec![Some(1), None]),
            ColumnData::varchar(vec![Some("a")]),
        ]).unwrap_err();
        assert!(matches!(err, UdfError::InvalidArgument(_)));
    }

    #[test]
    fn missing_channel_is_an_error() {
        let p = Partition::new(vec![ColumnData::bigint(vec![Some(1)])]).unwrap();
        assert_eq!(p.row_count(), 1);
        assert_eq!(p.column(3).unwrap_err(), UdfError::ChannelOutOfRange { channel: 3, columns: 1 });
    }

    #[test]
    fn builder_checks_physical_type() {
        let mut b = ColumnBuilder::new(SqlType::Date);
        b.append_long(3).unwrap();
        b.append_null();
        assert!(b.append_double(1.0).is_err());
        assert!(b.append_slice("x").is_err());
        assert_eq!(b.finish().to_values(), vec![SqlValue::Date(3), SqlValue::Null]);
    }

    #[test]
    fn narrow_types_reject_values_outside_their_encoding() {
        let mut int = ColumnBuilder::new(SqlType::Integer);
        int.append_long(i32::MAX as i64).unwrap();
        assert!(matches!(int.append_long(i32::MAX as i64 + 1), Err(UdfError::InvalidArgument(_))));

        let mut date = ColumnBuilder::new(SqlType::Date);
        assert!(date.append_long(i64::MIN).is_err());

        let mut flag = ColumnBuilder::new(SqlType::Boolean);
        flag.append_long(1).unwrap();
        assert!(flag.append_long(2).is_err());
        assert_eq!(flag.finish().to_values(), vec![SqlValue::Boolean(true)]);

        let mut zoned = ColumnBuilder::new(SqlType::TimestampWithTimeZone);
        assert!(zoned.append_long(0xFFF).is_err());

        let mut wide = ColumnBuilder::new(SqlType::Bigint);
        wide.append_long(i64::MIN).unwrap();
        assert_eq!(wide.finish().to_values(), vec![SqlValue::Bigint(i64::MIN)]);
    }

    #[test]
    fn columns_load_from_json() {
        let c = ColumnData::from_json(SqlType::Boolean, &[json!(true), json!(null), json!(false)]).unwrap();
        assert_eq!(c.to_values(), vec![SqlValue::Boolean(true), SqlValue::Null, SqlValue::Boolean(false)]);

        let t = ColumnData::from_json(SqlType::Varchar, &[json!("x"), json!(null)]).unwrap();
        assert_eq!(t.get(0), SqlValue::varchar("x"));
        assert!(ColumnData::from_json(SqlType::Bigint, &[json!("x")]).is_err());
    }
}
