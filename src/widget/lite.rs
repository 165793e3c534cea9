use unicode_segmentation::UnicodeSegmentation;

use crate::core::{ByteOffset, Position};
use crate::keybinding::{Key, KeyEvent, Modifiers};

use super::{scroll_to_show, DocumentId, Language, Surface, Viewport};

const HISTORY_DEPTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Input,
    Delete,
    Undo,
    Redo,
    SetValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub origin: Origin,
    pub from: ByteOffset,
    pub removed: String,
    pub inserted: String,
}

#[derive(Debug, Clone)]
struct Snapshot {
    text: String,
    cursor: ByteOffset,
}

// Document contents, selection and history. Only the document currently
// shown in a `LiteView` raises change events.
#[derive(Debug, Clone)]
pub struct Doc {
    id: DocumentId,
    text: String,
    language: Language,
    cursor: ByteOffset,
    scroll_line: usize,
    done: Vec<Snapshot>,
    undone: Vec<Snapshot>,
}

impl Doc {
    pub fn new(text: impl Into<String>, language: Language) -> Self {
        Self {
            id: DocumentId::new(),
            text: text.into(),
            language,
            cursor: ByteOffset(0),
            scroll_line: 0,
            done: Vec::new(),
            undone: Vec::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> ByteOffset {
        self.cursor
    }

    pub fn set_value(&mut self, text: &str) -> Change {
        self.checkpoint();
        let removed = std::mem::replace(&mut self.text, text.to_string());
        self.cursor = ByteOffset(0);
        self.scroll_line = 0;
        Change {
            origin: Origin::SetValue,
            from: ByteOffset(0),
            removed,
            inserted: text.to_string(),
        }
    }

    fn checkpoint(&mut self) {
        self.done.push(Snapshot {
            text: self.text.clone(),
            cursor: self.cursor,
        });
        if self.done.len() > HISTORY_DEPTH {
            self.done.remove(0);
        }
        self.undone.clear();
    }

    fn replace_range(&mut self, from: usize, to: usize, inserted: &str, origin: Origin) -> Change {
        self.checkpoint();
        let removed = self.text[from..to].to_string();
        self.text.replace_range(from..to, inserted);
        self.cursor = ByteOffset(from + inserted.len());
        Change {
            origin,
            from: ByteOffset(from),
            removed,
            inserted: inserted.to_string(),
        }
    }

    fn restore(&mut self, undo: bool) -> Option<Change> {
        let (from, to) = if undo {
            (&mut self.done, &mut self.undone)
        } else {
            (&mut self.undone, &mut self.done)
        };
        let snapshot = from.pop()?;
        to.push(Snapshot {
            text: std::mem::replace(&mut self.text, snapshot.text),
            cursor: self.cursor,
        });
        self.cursor = snapshot.cursor;
        Some(Change {
            origin: if undo { Origin::Undo } else { Origin::Redo },
            from: ByteOffset(0),
            removed: to.last().map(|s| s.text.clone()).unwrap_or_default(),
            inserted: self.text.clone(),
        })
    }

    fn prev_boundary(&self) -> usize {
        let cursor = self.cursor.0;
        self.text[..cursor]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        let cursor = self.cursor.0;
        self.text[cursor..]
            .graphemes(true)
            .next()
            .map_or(cursor, |g| cursor + g.len())
    }

    fn line_starts(&self) -> Vec<usize> {
        std::iter::once(0)
            .chain(self.text.match_indices('\n').map(|(i, _)| i + 1))
            .collect()
    }

    fn position(&self) -> Position {
        let starts = self.line_starts();
        let line = starts.partition_point(|&s| s <= self.cursor.0) - 1;
        let column = self.text[starts[line]..self.cursor.0].graphemes(true).count();
        Position::new(line, column)
    }

    fn offset_of(&self, pos: Position) -> usize {
        let starts = self.line_starts();
        let line = pos.line.min(starts.len() - 1);
        let start = starts[line];
        let end = starts
            .get(line + 1)
            .map_or(self.text.len(), |next| next - 1);
        self.text[start..end]
            .grapheme_indices(true)
            .nth(pos.column)
            .map_or(end, |(i, _)| start + i)
    }

    fn open_tag_before_cursor(&self) -> Option<String> {
        let before = &self.text[..self.cursor.0];
        let tag = before.strip_suffix('>')?;
        let open = tag.rfind('<')?;
        let tag = &tag[open + 1..];
        if tag.starts_with('/') || tag.starts_with('!') || tag.ends_with('/') {
            return None;
        }
        let name: String = tag
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        (!name.is_empty() && !is_void_element(&name)).then_some(name)
    }
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

fn closing_bracket(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '`' => Some('`'),
        _ => None,
    }
}

pub type ChangesListener = Box<dyn FnMut(&[Change])>;

pub struct LiteView {
    doc: Option<Doc>,
    listeners: Vec<ChangesListener>,
    size: Viewport,
}

impl LiteView {
    pub fn new(size: Viewport) -> Self {
        Self {
            doc: None,
            listeners: Vec::new(),
            size,
        }
    }

    pub fn doc(&self) -> Option<&Doc> {
        self.doc.as_ref()
    }

    pub fn swap_doc(&mut self, doc: Doc) -> Option<Doc> {
        self.doc.replace(doc)
    }

    pub fn on_changes(&mut self, listener: ChangesListener) {
        self.listeners.push(listener);
    }

    pub fn set_value(&mut self, text: &str) {
        if let Some(doc) = self.doc.as_mut() {
            let change = doc.set_value(text);
            self.announce(vec![change]);
        }
    }

    pub fn set_size(&mut self, size: Viewport) {
        self.size = size;
        self.reveal_cursor();
    }

    fn announce(&mut self, changes: Vec<Change>) {
        if changes.is_empty() {
            return;
        }
        for listener in self.listeners.iter_mut() {
            listener(&changes);
        }
    }

    fn reveal_cursor(&mut self) {
        let height = self.size.height;
        if let Some(doc) = self.doc.as_mut() {
            let line = doc.position().line;
            doc.scroll_line = scroll_to_show(doc.scroll_line, line, height);
        }
    }

    fn edit(doc: &mut Doc, key: KeyEvent) -> Option<Vec<Change>> {
        let cursor = doc.cursor.0;
        let changes = match (key.key, key.modifiers) {
            (Key::Char('z'), Modifiers::CTRL) => doc.restore(true).into_iter().collect(),
            (Key::Char('y'), Modifiers::CTRL) => doc.restore(false).into_iter().collect(),
            (Key::Char(c), m) if !c.is_control() && (m - Modifiers::SHIFT).is_empty() => {
                let mut changes = Vec::new();
                let next = doc.text[cursor..].chars().next();
                if next == Some(c) && ")]}\"'`".contains(c) {
                    doc.cursor = ByteOffset(cursor + c.len_utf8());
                    return Some(changes);
                }
                let mut inserted = c.to_string();
                if let Some(close) = closing_bracket(c) {
                    inserted.push(close);
                }
                changes.push(doc.replace_range(cursor, cursor, &inserted, Origin::Input));
                doc.cursor = ByteOffset(cursor + c.len_utf8());

                if c == '>' && doc.language == Language::Html {
                    if let Some(name) = doc.open_tag_before_cursor() {
                        let at = doc.cursor.0;
                        changes.push(doc.replace_range(at, at, &format!("</{}>", name), Origin::Input));
                        doc.cursor = ByteOffset(at);
                    }
                }
                changes
            }
            (Key::Enter, Modifiers::NONE) => {
                vec![doc.replace_range(cursor, cursor, "\n", Origin::Input)]
            }
            (Key::Tab, Modifiers::NONE) => {
                vec![doc.replace_range(cursor, cursor, "  ", Origin::Input)]
            }
            (Key::Backspace, Modifiers::NONE) if cursor > 0 => {
                let from = doc.prev_boundary();
                vec![doc.replace_range(from, cursor, "", Origin::Delete)]
            }
            (Key::Delete, Modifiers::NONE) if cursor < doc.text.len() => {
                let to = doc.next_boundary();
                vec![doc.replace_range(cursor, to, "", Origin::Delete)]
            }
            (Key::Backspace | Key::Delete, Modifiers::NONE) => Vec::new(),
            (Key::Left, _) => {
                doc.cursor = ByteOffset(doc.prev_boundary());
                Vec::new()
            }
            (Key::Right, _) => {
                doc.cursor = ByteOffset(doc.next_boundary());
                Vec::new()
            }
            (Key::Up | Key::Down | Key::Home | Key::End, _) => {
                let pos = doc.position();
                let target = match key.key {
                    Key::Up if pos.line == 0 => Position::new(0, 0),
                    Key::Up => Position::new(pos.line - 1, pos.column),
                    Key::Down => Position::new(pos.line + 1, pos.column),
                    Key::Home => Position::new(pos.line, 0),
                    _ => Position::new(pos.line, usize::MAX),
                };
                let last_line = doc.line_starts().len() - 1;
                doc.cursor = if key.key == Key::Down && pos.line == last_line {
                    ByteOffset(doc.text.len())
                } else {
                    ByteOffset(doc.offset_of(target))
                };
                Vec::new()
            }
            _ => return None,
        };
        Some(changes)
    }
}

impl Surface for LiteView {
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let changes = match self.doc.as_mut() {
            Some(doc) => Self::edit(doc, key),
            None => return false,
        };
        match changes {
            Some(changes) => {
                self.announce(changes);
                self.reveal_cursor();
                true
            }
            None => false,
        }
    }

    fn visible_lines(&self) -> Vec<String> {
        match &self.doc {
            Some(doc) => doc
                .text
                .split('\n')
                .skip(doc.scroll_line)
                .take(usize::from(self.size.height))
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    fn cursor_position(&self) -> Position {
        self.doc.as_ref().map(Doc::position).unwrap_or_default()
    }

    fn scroll_line(&self) -> usize {
        self.doc.as_ref().map_or(0, |doc| doc.scroll_line)
    }

    fn viewport(&self) -> Viewport {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn view_with(text: &str, language: Language) -> (LiteView, Rc<RefCell<Vec<Origin>>>) {
        let mut view = LiteView::new(Viewport::new(40, 5));
        view.swap_doc(Doc::new(text, language));
        let origins = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&origins);
        view.on_changes(Box::new(move |changes| {
            sink.borrow_mut().extend(changes.iter().map(|c| c.origin));
        }));
        (view, origins)
    }

    fn value(view: &LiteView) -> String {
        view.doc().map(|d| d.value().to_string()).unwrap_or_default()
    }

    #[test]
    fn test_swap_doc_returns_previous() {
        let mut view = LiteView::new(Viewport::new(10, 10));
        assert!(view.swap_doc(Doc::new("a", Language::Html)).is_none());
        let previous = view.swap_doc(Doc::new("b", Language::JavaScript)).unwrap();
        assert_eq!(previous.value(), "a");
        assert_eq!(value(&view), "b");
    }

    #[test]
    fn test_set_value_is_tagged() {
        let (mut view, origins) = view_with("", Language::JavaScript);
        view.set_value("let a = 1;");
        view.handle_key(KeyEvent::char('x'));
        assert_eq!(*origins.borrow(), vec![Origin::SetValue, Origin::Input]);
    }

    #[test]
    fn test_brackets_close_and_step_over() {
        let (mut view, _) = view_with("", Language::JavaScript);
        view.handle_key(KeyEvent::char('f'));
        view.handle_key(KeyEvent::char('('));
        assert_eq!(value(&view), "f()");
        view.handle_key(KeyEvent::char(')'));
        view.handle_key(KeyEvent::char(';'));
        assert_eq!(value(&view), "f();");
    }

    #[test]
    fn test_tags_close_in_html() {
        let (mut view, _) = view_with("", Language::Html);
        for c in "<div class=\"a\">".chars() {
            view.handle_key(KeyEvent::char(c));
        }
        assert_eq!(value(&view), "<div class=\"a\"></div>");
        assert_eq!(view.cursor_position(), Position::new(0, 15));

        let (mut view, _) = view_with("", Language::Html);
        for c in "<br>".chars() {
            view.handle_key(KeyEvent::char(c));
        }
        assert_eq!(value(&view), "<br>");
    }

    #[test]
    fn test_backspace_removes_grapheme() {
        let (mut view, origins) = view_with("e\u{301}", Language::JavaScript);
        view.handle_key(KeyEvent::new(Key::End, Modifiers::NONE));
        view.handle_key(KeyEvent::new(Key::Backspace, Modifiers::NONE));
        assert_eq!(value(&view), "");
        assert_eq!(*origins.borrow(), vec![Origin::Delete]);
    }

    #[test]
    fn test_undo_redo() {
        let (mut view, origins) = view_with("a", Language::JavaScript);
        view.handle_key(KeyEvent::new(Key::End, Modifiers::NONE));
        view.handle_key(KeyEvent::char('b'));
        view.handle_key(KeyEvent::ctrl('z'));
        assert_eq!(value(&view), "a");
        view.handle_key(KeyEvent::ctrl('y'));
        assert_eq!(value(&view), "ab");
        assert_eq!(
            *origins.borrow(),
            vec![Origin::Input, Origin::Undo, Origin::Redo]
        );
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let (mut view, _) = view_with("long line\nab\n", Language::JavaScript);
        view.handle_key(KeyEvent::new(Key::End, Modifiers::NONE));
        view.handle_key(KeyEvent::new(Key::Down, Modifiers::NONE));
        assert_eq!(view.cursor_position(), Position::new(1, 2));
        view.handle_key(KeyEvent::new(Key::Down, Modifiers::NONE));
        assert_eq!(view.cursor_position(), Position::new(2, 0));
    }
}
