use super::position::CharOffset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert { position: CharOffset, text: String },
    Delete { position: CharOffset, text: String },
}

impl Edit {
    fn inverse(&self) -> Edit {
        match self {
            Edit::Insert { position, text } => Edit::Delete {
                position: *position,
                text: text.clone(),
            },
            Edit::Delete { position, text } => Edit::Insert {
                position: *position,
                text: text.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoStep {
    pub edits: Vec<Edit>,
    pub cursor: CharOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoalesceMode {
    Insertion,
    Deletion,
    None,
}

// Linear undo/redo history that merges consecutive single-character typing
// or deleting into word-sized steps.
#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: Vec<UndoStep>,
    redo_stack: Vec<UndoStep>,
    pending: Vec<Edit>,
    pending_cursor: Option<CharOffset>,
    coalesce_mode: CoalesceMode,
    last_insert_end: Option<CharOffset>,
    last_delete_pos: Option<CharOffset>,
    max_steps: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl UndoHistory {
    pub fn new(max_steps: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: Vec::new(),
            pending_cursor: None,
            coalesce_mode: CoalesceMode::None,
            last_insert_end: None,
            last_delete_pos: None,
            max_steps,
        }
    }

    fn is_word_boundary(c: char) -> bool {
        c.is_whitespace() || c.is_ascii_punctuation()
    }

    fn single_word_char(text: &str) -> bool {
        let mut chars = text.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if !Self::is_word_boundary(c))
    }

    pub fn record_insert(&mut self, position: CharOffset, text: &str, cursor_before: CharOffset) {
        let text_len = text.chars().count();
        let extends = self.coalesce_mode == CoalesceMode::Insertion
            && self.last_insert_end == Some(position)
            && Self::single_word_char(text);

        if extends {
            if let Some(Edit::Insert { text: existing, .. }) = self.pending.last_mut() {
                existing.push_str(text);
                self.last_insert_end = Some(position.saturating_add(text_len));
                return;
            }
        }

        self.flush();
        self.pending_cursor = Some(cursor_before);
        self.pending.push(Edit::Insert {
            position,
            text: text.to_string(),
        });
        self.coalesce_mode = if Self::single_word_char(text) {
            CoalesceMode::Insertion
        } else {
            CoalesceMode::None
        };
        self.last_insert_end = Some(position.saturating_add(text_len));
        self.last_delete_pos = None;
    }

    pub fn record_delete(&mut self, position: CharOffset, text: &str, cursor_before: CharOffset) {
        let extends = self.coalesce_mode == CoalesceMode::Deletion
            && Self::single_word_char(text)
            && self.last_delete_pos.is_some_and(|last| {
                position.saturating_add(1) == last || position == last
            });

        if extends {
            if let Some(Edit::Delete {
                position: del_pos,
                text: existing,
            }) = self.pending.last_mut()
            {
                if position < *del_pos {
                    existing.insert_str(0, text);
                    *del_pos = position;
                } else {
                    existing.push_str(text);
                }
                self.last_delete_pos = Some(position);
                return;
            }
        }

        self.flush();
        self.pending_cursor = Some(cursor_before);
        self.pending.push(Edit::Delete {
            position,
            text: text.to_string(),
        });
        self.coalesce_mode = CoalesceMode::Deletion;
        self.last_delete_pos = Some(position);
        self.last_insert_end = None;
    }

    pub fn break_coalesce(&mut self) {
        self.flush();
    }

    fn flush(&mut self) {
        self.coalesce_mode = CoalesceMode::None;
        self.last_insert_end = None;
        self.last_delete_pos = None;
        if self.pending.is_empty() {
            return;
        }

        self.redo_stack.clear();
        self.undo_stack.push(UndoStep {
            edits: std::mem::take(&mut self.pending),
            cursor: self.pending_cursor.take().unwrap_or_default(),
        });
        if self.undo_stack.len() > self.max_steps {
            self.undo_stack.remove(0);
        }
    }

    pub fn undo(&mut self, cursor_now: CharOffset) -> Option<UndoStep> {
        self.flush();
        let step = self.undo_stack.pop()?;
        let inverse = UndoStep {
            edits: step.edits.iter().rev().map(Edit::inverse).collect(),
            cursor: step.cursor,
        };
        self.redo_stack.push(UndoStep {
            edits: step.edits,
            cursor: cursor_now,
        });
        Some(inverse)
    }

    pub fn redo(&mut self, cursor_now: CharOffset) -> Option<UndoStep> {
        self.flush();
        let step = self.redo_stack.pop()?;
        let inverse_cursor = step.cursor;
        self.undo_stack.push(UndoStep {
            edits: step.edits.clone(),
            cursor: cursor_now,
        });
        Some(UndoStep {
            edits: step.edits,
            cursor: inverse_cursor,
        })
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || !self.pending.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending.clear();
        self.pending_cursor = None;
        self.coalesce_mode = CoalesceMode::None;
        self.last_insert_end = None;
        self.last_delete_pos = None;
    }
}
