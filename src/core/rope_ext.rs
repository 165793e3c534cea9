use ropey::Rope;

use super::position::{CharOffset, Position};

pub trait RopeExt {
    fn char_to_position(&self, char_idx: CharOffset) -> Position;
    fn position_to_char(&self, pos: Position) -> CharOffset;
    fn line_len_chars(&self, line_idx: usize) -> usize;
    fn line_start_char(&self, line_idx: usize) -> CharOffset;
    fn line_end_char(&self, line_idx: usize) -> CharOffset;
    fn leading_whitespace(&self, line_idx: usize) -> String;
    fn line_text(&self, line_idx: usize) -> String;
}

impl RopeExt for Rope {
    fn char_to_position(&self, char_idx: CharOffset) -> Position {
        let char_idx = char_idx.0.min(self.len_chars());
        let line = self.char_to_line(char_idx);
        Position::new(line, char_idx - self.line_to_char(line))
    }

    fn position_to_char(&self, pos: Position) -> CharOffset {
        let line = pos.line.min(self.len_lines().saturating_sub(1));
        let column = pos.column.min(self.line_len_chars(line));
        CharOffset(self.line_to_char(line) + column)
    }

    fn line_len_chars(&self, line_idx: usize) -> usize {
        if line_idx >= self.len_lines() {
            return 0;
        }
        let line = self.line(line_idx);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    fn line_start_char(&self, line_idx: usize) -> CharOffset {
        CharOffset(self.line_to_char(line_idx.min(self.len_lines().saturating_sub(1))))
    }

    fn line_end_char(&self, line_idx: usize) -> CharOffset {
        let line_idx = line_idx.min(self.len_lines().saturating_sub(1));
        CharOffset(self.line_to_char(line_idx) + self.line_len_chars(line_idx))
    }

    fn leading_whitespace(&self, line_idx: usize) -> String {
        if line_idx >= self.len_lines() {
            return String::new();
        }
        self.line(line_idx)
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    fn line_text(&self, line_idx: usize) -> String {
        if line_idx >= self.len_lines() {
            return String::new();
        }
        let start = self.line_to_char(line_idx);
        self.slice(start..start + self.line_len_chars(line_idx)).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_position_round_trip() {
        let rope = Rope::from_str("ab\ncde\n");
        let pos = rope.char_to_position(CharOffset(4));
        assert_eq!(pos, Position::new(1, 1));
        assert_eq!(rope.position_to_char(pos), CharOffset(4));
    }

    #[test]
    fn test_position_clamps_to_line_end() {
        let rope = Rope::from_str("ab\ncde");
        assert_eq!(rope.position_to_char(Position::new(0, 40)), CharOffset(2));
        assert_eq!(rope.position_to_char(Position::new(9, 0)), CharOffset(3));
    }

    #[test]
    fn test_leading_whitespace() {
        let rope = Rope::from_str("<ul>\n    <li>\n");
        assert_eq!(rope.leading_whitespace(1), "    ");
        assert_eq!(rope.leading_whitespace(0), "");
        assert_eq!(rope.line_text(1), "    <li>");
    }
}
