#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct ByteOffset(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct CharOffset(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl CharOffset {
    pub fn saturating_sub(self, rhs: usize) -> Self {
        CharOffset(self.0.saturating_sub(rhs))
    }

    pub fn saturating_add(self, rhs: usize) -> Self {
        CharOffset(self.0.saturating_add(rhs))
    }
}

impl From<usize> for CharOffset {
    fn from(n: usize) -> Self {
        CharOffset(n)
    }
}

impl From<usize> for ByteOffset {
    fn from(n: usize) -> Self {
        ByteOffset(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_orders_by_line_then_column() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(1, 0) < Position::new(1, 3));
    }

    #[test]
    fn test_char_offset_saturates() {
        assert_eq!(CharOffset(2).saturating_sub(5), CharOffset(0));
        assert_eq!(CharOffset(2).saturating_add(3), CharOffset(5));
    }
}
