use std::fmt::Display;

/// Scan order of a null-skipping search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// frame start towards frame end
    First,
    /// frame end towards frame start
    Last,
}

impl Direction {
    /// Map between row offsets and scan positions. Scan position 0 is the
    /// first row this direction visits; the mapping is its own inverse.
    pub fn mirror(&self, offset: usize, row_count: usize) -> usize {
        match self {
            Direction::First => offset,
            Direction::Last => row_count - 1 - offset,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::First => f.write_str("first"),
            Direction::Last => f.write_str("last"),
        }
    }
}
