use std::cell::Cell;
use std::rc::Rc;

use crate::core::Slot;
use crate::widget::{BootError, BootManifest, Doc, Language, LiteView, Origin, Surface};

use super::stage::Stage;
use super::traits::{BackendKind, ChangeHandler, Container, EditorCore, EditorError};

struct LiteWidget {
    view: LiteView,
    // The slot not currently shown. Only `None` for the instant of a swap.
    parked: Option<Doc>,
}

pub struct LiteEditor {
    mode: Rc<Cell<Slot>>,
    stage: Stage<LiteWidget>,
    container: Container,
}

impl LiteEditor {
    pub fn new() -> Self {
        Self {
            mode: Rc::new(Cell::new(Slot::Markup)),
            stage: Stage::default(),
            container: Container::new("lite-editor"),
        }
    }

    pub fn boot_error(&self) -> Option<&BootError> {
        self.stage.error()
    }
}

impl Default for LiteEditor {
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

impl LiteWidget {
    fn doc(&self, slot: Slot, mode: Slot) -> Option<&Doc> {
        if slot == mode {
            self.view.doc()
        } else {
            self.parked.as_ref()
        }
    }
}

impl EditorCore for LiteEditor {
    fn kind(&self) -> BackendKind {
        BackendKind::Lite
    }

    fn value_of(&self, slot: Slot) -> String {
        match &self.stage {
            Stage::Ready(widget) => widget
                .doc(slot, self.mode.get())
                .map(|doc| doc.value().to_string())
                .unwrap_or_default(),
            stage => stage.buffered(slot).unwrap_or_default().to_string(),
        }
    }

    fn set_value_of(&mut self, slot: Slot, content: &str) {
        let mode = self.mode.get();
        match &mut self.stage {
            Stage::Ready(widget) => {
                let current = widget.doc(slot, mode).map(Doc::value);
                if current == Some(content) {
                    return;
                }
                if slot == mode {
                    // Announced with a SetValue origin, which the change
                    // listener skips.
                    widget.view.set_value(content);
                } else if let Some(doc) = widget.parked.as_mut() {
                    doc.set_value(content);
                }
            }
            stage => {
                if let Some(buffer) = stage.buffered_mut(slot) {
                    if *buffer != content {
                        buffer.replace_range(.., content);
                    }
                }
            }
        }
    }

    fn mode(&self) -> Slot {
        self.mode.get()
    }

    fn set_mode(&mut self, slot: Slot) {
        if slot == self.mode.get() {
            return;
        }
        if let Some(widget) = self.stage.ready_mut() {
            if let Some(incoming) = widget.parked.take() {
                widget.parked = widget.view.swap_doc(incoming);
            }
        }
        self.mode.set(slot);
    }

    fn add_change_handler(&mut self, mut handler: ChangeHandler) {
        let Some(widget) = self.stage.ready_mut() else {
            log::warn!("lite editor not ready, dropping change handler");
            return;
        };

        let mode = Rc::clone(&self.mode);
        widget.view.on_changes(Box::new(move |changes| {
            if changes.iter().any(|change| change.origin != Origin::SetValue) {
                handler(mode.get());
            }
        }));
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
            widget.view.set_size(bounds);
        }
    }

    fn boot_manifest(&self) -> BootManifest {
        BootManifest::new().then(["lite/core"]).then([
            "lite/mode/javascript",
            "lite/mode/xml",
            "lite/mode/htmlmixed",
            "lite/addon/closetag",
            "lite/addon/closebrackets",
        ])
    }

    fn complete_boot(&mut self, result: Result<(), BootError>) -> Result<(), EditorError> {
        let mode = self.mode.get();
        let bounds = self.container.bounds();
        self.stage.complete(result, |frames| {
            let mut docs = frames.map(|slot, text| Some(Doc::new(text, language(slot))));
            let mut view = LiteView::new(bounds);
            if let Some(shown) = docs[mode].take() {
                view.swap_doc(shown);
            }
            LiteWidget {
                view,
                parked: docs[mode.other()].take(),
            }
        })?;
        log::info!("lite editor ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::keybinding::KeyEvent;

    fn ready_editor() -> LiteEditor {
        let mut editor = LiteEditor::new();
        editor.complete_boot(Ok(())).unwrap();
        editor
    }

    fn recording_handler(editor: &mut LiteEditor) -> Rc<RefCell<Vec<Slot>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.add_change_handler(Box::new(move |slot| sink.borrow_mut().push(slot)));
        seen
    }

    #[test]
    fn test_buffer_handed_to_docs_on_ready() {
        let mut editor = LiteEditor::new();
        editor.set_value_of(Slot::Markup, "<p>");
        editor.set_value_of(Slot::Script, "run()");
        editor.set_mode(Slot::Script);

        editor.complete_boot(Ok(())).unwrap();
        assert_eq!(editor.value(), "run()");
        assert_eq!(editor.value_of(Slot::Markup), "<p>");
        assert_eq!(editor.surface().unwrap().visible_lines(), vec!["run()"]);
    }

    #[test]
    fn test_programmatic_writes_are_silent() {
        let mut editor = ready_editor();
        let seen = recording_handler(&mut editor);

        editor.set_value_of(Slot::Markup, "<a>");
        editor.set_value_of(Slot::Script, "b()");
        editor.set_value_of(Slot::Markup, "<a>");
        assert!(seen.borrow().is_empty());
        assert_eq!(editor.value_of(Slot::Markup), "<a>");
        assert_eq!(editor.value_of(Slot::Script), "b()");
    }

    #[test]
    fn test_typing_reports_active_slot() {
        let mut editor = ready_editor();
        let seen = recording_handler(&mut editor);

        editor.surface_mut().unwrap().handle_key(KeyEvent::char('x'));
        editor.set_mode(Slot::Script);
        editor.surface_mut().unwrap().handle_key(KeyEvent::char('y'));

        assert_eq!(*seen.borrow(), vec![Slot::Markup, Slot::Script]);
        assert_eq!(editor.value_of(Slot::Markup), "x");
        assert_eq!(editor.value_of(Slot::Script), "y");
    }

    #[test]
    fn test_mode_switch_keeps_content() {
        let mut editor = ready_editor();
        editor.set_value_of(Slot::Markup, "<b>");
        editor.set_value_of(Slot::Script, "b()");

        editor.set_mode(Slot::Script);
        editor.set_mode(Slot::Script);
        assert_eq!(editor.value(), "b()");
        editor.set_mode(Slot::Markup);
        assert_eq!(editor.value(), "<b>");
        assert_eq!(editor.value_of(Slot::Script), "b()");
    }

    #[test]
    fn test_no_save_shortcut() {
        let mut editor = ready_editor();
        assert!(editor.as_save_shortcut().is_none());
    }

    #[test]
    fn test_failed_boot_keeps_buffer() {
        let mut editor = LiteEditor::new();
        editor.set_value_of(Slot::Script, "f()");
        let result = editor.complete_boot(Err(BootError::Asset {
            asset: "lite/core".into(),
            reason: "missing".into(),
        }));
        assert!(result.is_err());
        assert!(!editor.is_ready());
        assert!(editor.surface().is_none());
        assert_eq!(editor.value_of(Slot::Script), "f()");
    }
}
