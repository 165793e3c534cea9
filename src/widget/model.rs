use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ropey::Rope;

use crate::core::{CharOffset, Edit, Position, RopeExt, UndoHistory};
use crate::keybinding::{Key, KeyEvent, Modifiers};

use super::{scroll_to_show, DocumentId, Language, Surface, Viewport};

const TAB_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentChange {
    pub is_flush: bool,
}

pub type ContentListener = Box<dyn FnMut(&ContentChange)>;

// Text plus edit history for one file. Every mutation, programmatic or not,
// notifies the content listeners.
pub struct TextModel {
    id: DocumentId,
    text: Rope,
    language: Language,
    history: UndoHistory,
    listeners: Vec<ContentListener>,
}

pub type SharedModel = Rc<RefCell<TextModel>>;

impl TextModel {
    pub fn new(content: &str, language: Language) -> Self {
        Self {
            id: DocumentId::new(),
            text: Rope::from_str(content),
            language,
            history: UndoHistory::default(),
            listeners: Vec::new(),
        }
    }

    pub fn shared(content: &str, language: Language) -> SharedModel {
        Rc::new(RefCell::new(Self::new(content, language)))
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn rope(&self) -> &Rope {
        &self.text
    }

    pub fn value(&self) -> String {
        self.text.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn on_did_change_content(&mut self, listener: ContentListener) {
        self.listeners.push(listener);
    }

    pub fn set_value(&mut self, content: &str) {
        self.text = Rope::from_str(content);
        self.history.clear();
        self.emit(true);
    }

    pub fn insert(&mut self, at: CharOffset, text: &str, cursor_before: CharOffset) {
        if text.is_empty() {
            return;
        }
        let at = CharOffset(at.0.min(self.text.len_chars()));
        self.history.record_insert(at, text, cursor_before);
        self.text.insert(at.0, text);
        self.emit(false);
    }

    pub fn remove(&mut self, start: CharOffset, end: CharOffset, cursor_before: CharOffset) -> String {
        let len = self.text.len_chars();
        let (start, end) = (start.0.min(len), end.0.min(len));
        if start >= end {
            return String::new();
        }
        let removed = self.text.slice(start..end).to_string();
        self.history.record_delete(CharOffset(start), &removed, cursor_before);
        self.text.remove(start..end);
        self.emit(false);
        removed
    }

    pub fn push_undo_stop(&mut self) {
        self.history.break_coalesce();
    }

    pub fn undo(&mut self, cursor: CharOffset) -> Option<CharOffset> {
        let step = self.history.undo(cursor)?;
        self.apply_raw(&step.edits);
        Some(step.cursor)
    }

    pub fn redo(&mut self, cursor: CharOffset) -> Option<CharOffset> {
        let step = self.history.redo(cursor)?;
        self.apply_raw(&step.edits);
        Some(step.cursor)
    }

    fn apply_raw(&mut self, edits: &[Edit]) {
        for edit in edits {
            let len = self.text.len_chars();
            match edit {
                Edit::Insert { position, text } => {
                    self.text.insert(position.0.min(len), text);
                }
                Edit::Delete { position, text } => {
                    let start = position.0.min(len);
                    let end = (start + text.chars().count()).min(len);
                    self.text.remove(start..end);
                }
            }
        }
        self.emit(false);
    }

    fn emit(&mut self, is_flush: bool) {
        let change = ContentChange { is_flush };
        for listener in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ViewState {
    cursor: CharOffset,
    scroll_line: usize,
}

pub type Command = Box<dyn FnMut()>;

pub struct IdeView {
    model: Option<SharedModel>,
    cursor: CharOffset,
    scroll_line: usize,
    viewport: Viewport,
    saved_states: HashMap<DocumentId, ViewState>,
    commands: HashMap<KeyEvent, Command>,
}

impl IdeView {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            model: None,
            cursor: CharOffset(0),
            scroll_line: 0,
            viewport,
            saved_states: HashMap::new(),
            commands: HashMap::new(),
        }
    }

    pub fn model(&self) -> Option<&SharedModel> {
        self.model.as_ref()
    }

    pub fn set_model(&mut self, model: SharedModel) {
        if let Some(current) = self.model.take() {
            let id = current.borrow().id();
            self.saved_states.insert(
                id,
                ViewState {
                    cursor: self.cursor,
                    scroll_line: self.scroll_line,
                },
            );
        }
        let state = self
            .saved_states
            .get(&model.borrow().id())
            .copied()
            .unwrap_or_default();
        self.cursor = CharOffset(state.cursor.0.min(model.borrow().len_chars()));
        self.scroll_line = state.scroll_line;
        self.model = Some(model);
    }

    // A flushed model starts over at the top, whether it is on screen or
    // parked.
    pub fn model_flushed(&mut self, model: &SharedModel) {
        let id = model.borrow().id();
        let shown = self
            .model
            .as_ref()
            .is_some_and(|current| current.borrow().id() == id);
        if shown {
            self.cursor = CharOffset(0);
            self.scroll_line = 0;
        } else {
            self.saved_states.remove(&id);
        }
    }

    pub fn add_command(&mut self, key: KeyEvent, command: Command) {
        self.commands.insert(key, command);
    }

    pub fn layout(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.reveal_cursor();
    }

    pub fn cursor(&self) -> CharOffset {
        self.cursor
    }

    fn reveal_cursor(&mut self) {
        let line = match &self.model {
            Some(model) => model.borrow().rope().char_to_position(self.cursor).line,
            None => return,
        };
        self.scroll_line = scroll_to_show(self.scroll_line, line, self.viewport.height);
    }

    fn type_text(&mut self, model: &SharedModel, text: &str) {
        let cursor = self.cursor;
        model.borrow_mut().insert(cursor, text, cursor);
        self.cursor = cursor.saturating_add(text.chars().count());
    }

    fn newline(&mut self, model: &SharedModel) {
        let indent = {
            let model = model.borrow();
            let line = model.rope().char_to_position(self.cursor).line;
            model.rope().leading_whitespace(line)
        };
        model.borrow_mut().push_undo_stop();
        self.type_text(model, &format!("\n{}", indent));
        model.borrow_mut().push_undo_stop();
    }

    fn tab(&mut self, model: &SharedModel) {
        let column = model.borrow().rope().char_to_position(self.cursor).column;
        let spaces = TAB_SIZE - (column % TAB_SIZE);
        self.type_text(model, &" ".repeat(spaces));
    }

    fn delete_backward(&mut self, model: &SharedModel) {
        if self.cursor.0 == 0 {
            return;
        }
        let cursor = self.cursor;
        model
            .borrow_mut()
            .remove(cursor.saturating_sub(1), cursor, cursor);
        self.cursor = cursor.saturating_sub(1);
    }

    fn delete_forward(&mut self, model: &SharedModel) {
        let cursor = self.cursor;
        model
            .borrow_mut()
            .remove(cursor, cursor.saturating_add(1), cursor);
    }

    fn move_cursor(&mut self, model: &SharedModel, key: Key) {
        let model = model.borrow();
        let rope = model.rope();
        let pos = rope.char_to_position(self.cursor);
        self.cursor = match key {
            Key::Left => self.cursor.saturating_sub(1),
            Key::Right => CharOffset((self.cursor.0 + 1).min(rope.len_chars())),
            Key::Up if pos.line > 0 => {
                rope.position_to_char(Position::new(pos.line - 1, pos.column))
            }
            Key::Up => CharOffset(0),
            Key::Down if pos.line + 1 < rope.len_lines() => {
                rope.position_to_char(Position::new(pos.line + 1, pos.column))
            }
            Key::Down => CharOffset(rope.len_chars()),
            Key::Home => rope.line_start_char(pos.line),
            Key::End => rope.line_end_char(pos.line),
            _ => self.cursor,
        };
    }
}

impl Surface for IdeView {
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Some(command) = self.commands.get_mut(&key) {
            command();
            return true;
        }

        let model = match &self.model {
            Some(model) => Rc::clone(model),
            None => return false,
        };

        let handled = match (key.key, key.modifiers) {
            (Key::Char('z'), Modifiers::CTRL) => {
                let restored = model.borrow_mut().undo(self.cursor);
                if let Some(cursor) = restored {
                    self.cursor = cursor;
                }
                true
            }
            (Key::Char('y'), Modifiers::CTRL) => {
                let restored = model.borrow_mut().redo(self.cursor);
                if let Some(cursor) = restored {
                    self.cursor = cursor;
                }
                true
            }
            (Key::Char(c), m) if !c.is_control() && (m - Modifiers::SHIFT).is_empty() => {
                self.type_text(&model, &c.to_string());
                true
            }
            (Key::Enter, Modifiers::NONE) => {
                self.newline(&model);
                true
            }
            (Key::Tab, Modifiers::NONE) => {
                self.tab(&model);
                true
            }
            (Key::Backspace, Modifiers::NONE) => {
                self.delete_backward(&model);
                true
            }
            (Key::Delete, Modifiers::NONE) => {
                self.delete_forward(&model);
                true
            }
            (k @ (Key::Left | Key::Right | Key::Up | Key::Down | Key::Home | Key::End), _) => {
                model.borrow_mut().push_undo_stop();
                self.move_cursor(&model, k);
                true
            }
            _ => false,
        };

        if handled {
            self.reveal_cursor();
        }
        handled
    }

    fn visible_lines(&self) -> Vec<String> {
        let model = match &self.model {
            Some(model) => model.borrow(),
            None => return Vec::new(),
        };
        let rope = model.rope();
        (self.scroll_line..rope.len_lines())
            .take(usize::from(self.viewport.height))
            .map(|line| rope.line_text(line))
            .collect()
    }

    fn cursor_position(&self) -> Position {
        match &self.model {
            Some(model) => model.borrow().rope().char_to_position(self.cursor),
            None => Position::default(),
        }
    }

    fn scroll_line(&self) -> usize {
        self.scroll_line
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn view_with(content: &str) -> (IdeView, SharedModel) {
        let model = TextModel::shared(content, Language::Html);
        let mut view = IdeView::new(Viewport::new(40, 10));
        view.set_model(Rc::clone(&model));
        (view, model)
    }

    #[test]
    fn test_set_value_notifies_as_flush() {
        let mut model = TextModel::new("a", Language::JavaScript);
        let flushes = Rc::new(Cell::new(0));
        let seen = Rc::clone(&flushes);
        model.on_did_change_content(Box::new(move |change| {
            if change.is_flush {
                seen.set(seen.get() + 1);
            }
        }));
        model.set_value("b");
        assert_eq!(flushes.get(), 1);
        assert_eq!(model.value(), "b");
    }

    #[test]
    fn test_typing_and_undo() {
        let (mut view, model) = view_with("");
        for c in "hello".chars() {
            view.handle_key(KeyEvent::char(c));
        }
        assert_eq!(model.borrow().value(), "hello");

        view.handle_key(KeyEvent::ctrl('z'));
        assert_eq!(model.borrow().value(), "");
        assert_eq!(view.cursor(), CharOffset(0));

        view.handle_key(KeyEvent::ctrl('y'));
        assert_eq!(model.borrow().value(), "hello");
    }

    #[test]
    fn test_enter_keeps_indent() {
        let (mut view, model) = view_with("  <ul>");
        view.handle_key(KeyEvent::new(Key::End, Modifiers::NONE));
        view.handle_key(KeyEvent::new(Key::Enter, Modifiers::NONE));
        assert_eq!(model.borrow().value(), "  <ul>\n  ");
        assert_eq!(view.cursor_position(), Position::new(1, 2));
    }

    #[test]
    fn test_commands_take_precedence() {
        let (mut view, model) = view_with("x");
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        view.add_command(KeyEvent::ctrl('s'), Box::new(move || counter.set(counter.get() + 1)));

        assert!(view.handle_key(KeyEvent::ctrl('s')));
        assert_eq!(hits.get(), 1);
        assert_eq!(model.borrow().value(), "x");
    }

    #[test]
    fn test_view_state_is_kept_per_model() {
        let (mut view, first) = view_with("abc");
        view.handle_key(KeyEvent::new(Key::End, Modifiers::NONE));
        let second = TextModel::shared("hello world", Language::JavaScript);
        view.set_model(Rc::clone(&second));
        assert_eq!(view.cursor(), CharOffset(0));

        view.set_model(first);
        assert_eq!(view.cursor(), CharOffset(3));
    }

    #[test]
    fn test_visible_lines_follow_scroll() {
        let content: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let (mut view, _model) = view_with(&content);
        for _ in 0..15 {
            view.handle_key(KeyEvent::new(Key::Down, Modifiers::NONE));
        }
        assert_eq!(view.scroll_line(), 6);
        assert_eq!(view.visible_lines()[0], "line 6");
    }
}
