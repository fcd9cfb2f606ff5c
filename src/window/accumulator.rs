/// Compact holder for one fixed-width result.
///
/// Exactly one slot is meaningful for a given binding: the long slot for
/// integer-like types, the double slot for floating-point types. The other slot
/// is unspecified and must not be read. Validity lives with the caller because
/// neither slot can encode "no value".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LongAndDoubleState {
    long: i64,
    double: f64,
}

impl LongAndDoubleState {
    pub fn new() -> Self { Self::default() }

    pub fn get_long(&self) -> i64 { self.long }

    pub fn set_long(&mut self, value: i64) { self.long = value; }

    pub fn get_double(&self) -> f64 { self.double }

    pub fn set_double(&mut self, value: f64) { self.double = value; }
}

/// Where the last result computed for a partition lives.
///
/// `Fixed` means the binding's `LongAndDoubleState` holds a valid value;
/// varchar keeps the row offset of the hit instead, since the text is owned
/// by the partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultSlot {
    #[default]
    Null,
    Fixed,
    SliceRef(usize),
}

impl ResultSlot {
    pub fn is_null(&self) -> bool { matches!(self, ResultSlot::Null) }
}
