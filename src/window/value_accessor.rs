/// Read-only random access to one column of the current partition.
///
/// `value_at` returns `None` for a null row; the `Option` is the
/// `(value, is_null)` pair. Offsets are absolute within the partition.
pub trait ValueAccessor {
    type Value<'a> where Self: 'a;

    fn row_count(&self) -> usize;

    fn value_at(&self, offset: usize) -> Option<Self::Value<'_>>;

    fn is_null_at(&self, offset: usize) -> bool {
        self.value_at(offset).is_none()
    }
}

/// Accessor over an unboxed fixed-width column.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthAccessor<'c, T: Copy> {
    values: &'c [Option<T>],
}

impl<'c, T: Copy> FixedWidthAccessor<'c, T> {
    pub fn new(values: &'c [Option<T>]) -> Self { Self { values } }
}

impl<'c, T: Copy> ValueAccessor for FixedWidthAccessor<'c, T> {
    type Value<'a> = T where Self: 'a;

    fn row_count(&self) -> usize { self.values.len() }

    fn value_at(&self, offset: usize) -> Option<T> {
        self.values.get(offset).copied().flatten()
    }
}

/// Accessor over a varchar column; values are borrowed from the partition.
#[derive(Debug, Clone, Copy)]
pub struct SliceAccessor<'c> {
    values: &'c [Option<String>],
}

impl<'c> SliceAccessor<'c> {
    pub fn new(values: &'c [Option<String>]) -> Self { Self { values } }
}

impl<'c> ValueAccessor for SliceAccessor<'c> {
    type Value<'a> = &'a str where Self: 'a;

    fn row_count(&self) -> usize { self.values.len() }

    fn value_at(&self, offset: usize) -> Option<&str> {
        self.values.get(offset).and_then(|v| v.as_deref())
    }
}
