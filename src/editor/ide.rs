use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::{Slot, SlotPair};
use crate::keybinding::KeyEvent;
use crate::widget::{BootError, BootManifest, IdeView, Language, SharedModel, Surface, TextModel};

use super::stage::Stage;
use super::traits::{BackendKind, ChangeHandler, Container, EditorCore, EditorError, SaveShortcut};

struct IdeWidget {
    models: SlotPair<SharedModel>,
    view: IdeView,
}

pub struct IdeEditor {
    mode: Slot,
    stage: Stage<IdeWidget>,
    container: Container,
    // Set while we write into a model ourselves so listeners can tell those
    // writes apart from typing.
    programmatic: Rc<Cell<bool>>,
}

impl IdeEditor {
    pub fn new() -> Self {
        Self {
            mode: Slot::Markup,
            stage: Stage::default(),
            container: Container::new("ide-editor"),
            programmatic: Rc::new(Cell::new(false)),
        }
    }

    pub fn boot_error(&self) -> Option<&BootError> {
        self.stage.error()
    }
}

impl Default for IdeEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn language(slot: Slot) -> Language {
    match slot {
        Slot::Markup => Language::Html,
        Slot::Script => Language::JavaScript,
    }
}

impl EditorCore for IdeEditor {
    fn kind(&self) -> BackendKind {
        BackendKind::Ide
    }

    fn value_of(&self, slot: Slot) -> String {
        match &self.stage {
            Stage::Ready(widget) => widget.models[slot].borrow().value(),
            stage => stage.buffered(slot).unwrap_or_default().to_string(),
        }
    }

    fn set_value_of(&mut self, slot: Slot, content: &str) {
        if let Some(buffer) = self.stage.buffered_mut(slot) {
            if buffer != content {
                buffer.replace_range(.., content);
            }
            return;
        }

        if let Some(widget) = self.stage.ready_mut() {
            let model = Rc::clone(&widget.models[slot]);
            if model.borrow().value() == content {
                return;
            }
            self.programmatic.set(true);
            model.borrow_mut().set_value(content);
            self.programmatic.set(false);
            widget.view.model_flushed(&model);
        }
    }

    fn mode(&self) -> Slot {
        self.mode
    }

    fn set_mode(&mut self, slot: Slot) {
        self.mode = slot;
        if let Some(widget) = self.stage.ready_mut() {
            widget.view.set_model(Rc::clone(&widget.models[slot]));
        }
    }

    fn add_change_handler(&mut self, handler: ChangeHandler) {
        let Some(widget) = self.stage.ready_mut() else {
            log::warn!("ide editor not ready, dropping change handler");
            return;
        };

        let handler = Rc::new(RefCell::new(handler));
        for slot in Slot::ALL {
            let handler = Rc::clone(&handler);
            let programmatic = Rc::clone(&self.programmatic);
            widget.models[slot]
                .borrow_mut()
                .on_did_change_content(Box::new(move |_| {
                    if !programmatic.get() {
                        (handler.borrow_mut())(slot);
                    }
                }));
        }
    }

    fn is_ready(&self) -> bool {
        self.stage.is_ready()
    }

    fn container(&mut self) -> &mut Container {
        &mut self.container
    }

    fn surface(&self) -> Option<&dyn Surface> {
        self.stage.ready().map(|widget| &widget.view as &dyn Surface)
    }

    fn surface_mut(&mut self) -> Option<&mut dyn Surface> {
        self.stage
            .ready_mut()
            .map(|widget| &mut widget.view as &mut dyn Surface)
    }

    fn resize(&mut self) {
        let bounds = self.container.bounds();
        if let Some(widget) = self.stage.ready_mut() {
            log::debug!(
                "laying out {} at {}x{}",
                self.container.class_name(),
                bounds.width,
                bounds.height
            );
            widget.view.layout(bounds);
        }
    }

    fn boot_manifest(&self) -> BootManifest {
        BootManifest::new()
            .then(["ide/loader"])
            .then(["ide/editor.main"])
    }

    fn complete_boot(&mut self, result: Result<(), BootError>) -> Result<(), EditorError> {
        let mode = self.mode;
        let bounds = self.container.bounds();
        self.stage.complete(result, |frames| {
            let models = frames.map(|slot, text| TextModel::shared(&text, language(slot)));
            let mut view = IdeView::new(bounds);
            view.set_model(Rc::clone(&models[mode]));
            IdeWidget { models, view }
        })?;
        log::info!("ide editor ready");
        Ok(())
    }

    fn as_save_shortcut(&mut self) -> Option<&mut dyn SaveShortcut> {
        Some(self)
    }
}

impl SaveShortcut for IdeEditor {
    fn register_save_shortcut(&mut self, on_save: Box<dyn FnMut()>) {
        match self.stage.ready_mut() {
            Some(widget) => widget.view.add_command(KeyEvent::ctrl('s'), on_save),
            None => log::warn!("ide editor not ready, dropping save shortcut"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;
    use crate::keybinding::{Key, Modifiers};

    fn ready_editor() -> IdeEditor {
        let mut editor = IdeEditor::new();
        editor.complete_boot(Ok(())).unwrap();
        editor
    }

    fn recording_handler(editor: &mut IdeEditor) -> Rc<RefCell<Vec<Slot>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.add_change_handler(Box::new(move |slot| sink.borrow_mut().push(slot)));
        seen
    }

    #[test]
    fn test_buffer_handed_to_models_on_ready() {
        let mut editor = IdeEditor::new();
        editor.set_value_of(Slot::Markup, "<p>hi</p>");
        editor.set_value_of(Slot::Script, "go()");
        assert!(!editor.is_ready());
        assert!(editor.surface().is_none());

        editor.complete_boot(Ok(())).unwrap();
        assert!(editor.is_ready());
        assert_eq!(editor.value_of(Slot::Markup), "<p>hi</p>");
        assert_eq!(editor.value_of(Slot::Script), "go()");
        assert_eq!(editor.surface().unwrap().visible_lines()[0], "<p>hi</p>");
    }

    #[test]
    fn test_programmatic_writes_are_silent() {
        let mut editor = ready_editor();
        let seen = recording_handler(&mut editor);

        editor.set_value_of(Slot::Script, "a()");
        editor.set_value_of(Slot::Script, "a()");
        assert!(seen.borrow().is_empty());
        assert_eq!(editor.value_of(Slot::Script), "a()");
    }

    #[test]
    fn test_typing_reports_slot() {
        let mut editor = ready_editor();
        let seen = recording_handler(&mut editor);

        editor.set_mode(Slot::Script);
        editor.surface_mut().unwrap().handle_key(KeyEvent::char('x'));
        assert_eq!(*seen.borrow(), vec![Slot::Script]);
        assert_eq!(editor.value(), "x");
        assert_eq!(editor.value_of(Slot::Markup), "");
    }

    fn type_keys(editor: &mut IdeEditor, keys: &[KeyEvent]) {
        let surface = editor.surface_mut().unwrap();
        for key in keys {
            surface.handle_key(*key);
        }
    }

    #[test]
    fn test_edits_after_shorter_set_value() {
        let mut editor = ready_editor();
        let typed: Vec<KeyEvent> = "hello world".chars().map(KeyEvent::char).collect();
        type_keys(&mut editor, &typed);
        assert_eq!(editor.value(), "hello world");

        editor.set_value_of(Slot::Markup, "");
        assert_eq!(editor.surface().unwrap().cursor_position(), Position::default());

        let backspace = KeyEvent::new(Key::Backspace, Modifiers::NONE);
        type_keys(&mut editor, &[KeyEvent::char('a'), KeyEvent::char('b'), backspace]);
        assert_eq!(editor.value(), "a");
    }

    #[test]
    fn test_parked_slot_restarts_after_set_value() {
        let mut editor = ready_editor();
        editor.set_mode(Slot::Script);
        let typed: Vec<KeyEvent> = "let x = 1;".chars().map(KeyEvent::char).collect();
        type_keys(&mut editor, &typed);
        editor.set_mode(Slot::Markup);

        editor.set_value_of(Slot::Script, "go()");
        editor.set_mode(Slot::Script);
        assert_eq!(editor.surface().unwrap().cursor_position(), Position::default());
        type_keys(&mut editor, &[KeyEvent::char('x')]);
        assert_eq!(editor.value(), "xgo()");
    }

    #[test]
    fn test_mode_switch_keeps_content() {
        let mut editor = ready_editor();
        editor.set_value_of(Slot::Markup, "<b>");
        editor.set_value_of(Slot::Script, "b()");

        editor.set_mode(Slot::Script);
        assert_eq!(editor.value(), "b()");
        editor.set_mode(Slot::Markup);
        assert_eq!(editor.value(), "<b>");
        assert_eq!(editor.value_of(Slot::Script), "b()");
    }

    #[test]
    fn test_handler_dropped_while_loading() {
        let mut editor = IdeEditor::new();
        let seen = recording_handler(&mut editor);
        editor.complete_boot(Ok(())).unwrap();

        editor.surface_mut().unwrap().handle_key(KeyEvent::char('x'));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_failed_boot_keeps_buffer() {
        let mut editor = IdeEditor::new();
        editor.set_value("<i>");
        let err = editor
            .complete_boot(Err(BootError::Asset {
                asset: "ide/loader".into(),
                reason: "missing".into(),
            }))
            .unwrap_err();
        assert!(matches!(err, EditorError::Boot(_)));
        assert!(!editor.is_ready());
        assert!(editor.boot_error().is_some());

        editor.set_value_of(Slot::Script, "later()");
        assert_eq!(editor.value_of(Slot::Markup), "<i>");
        assert_eq!(editor.value_of(Slot::Script), "later()");
        editor.resize();
    }

    #[test]
    fn test_save_shortcut_binds_ctrl_s() {
        let mut editor = ready_editor();
        let saved = Rc::new(Cell::new(0));
        let counter = Rc::clone(&saved);
        editor
            .as_save_shortcut()
            .unwrap()
            .register_save_shortcut(Box::new(move || counter.set(counter.get() + 1)));

        let surface = editor.surface_mut().unwrap();
        assert!(surface.handle_key(KeyEvent::new(Key::Char('s'), Modifiers::CTRL)));
        assert_eq!(saved.get(), 1);
        assert_eq!(editor.value(), "");
    }

    #[test]
    fn test_resize_follows_container() {
        let mut editor = ready_editor();
        editor.container().set_bounds(crate::widget::Viewport::new(40, 10));
        editor.resize();
        assert_eq!(
            editor.surface().unwrap().viewport(),
            crate::widget::Viewport::new(40, 10)
        );
    }
}
