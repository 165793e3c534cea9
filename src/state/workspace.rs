use std::rc::Rc;
use std::time::Instant;

use crate::config::Config;
use crate::core::Slot;
use crate::editor::{create_core, select_backend, DeviceClass, EditorCore};
use crate::keybinding::{default_keymap, Action, Key, KeyEvent, KeyMap};
use crate::services::Telemetry;
use crate::widget::Viewport;

use super::controller::{Request, Settings, SyncController};
use super::event::{Effect, Event};
use super::preview::{PreviewFrame, PreviewReconciler};
use super::record::{FrameRecord, FrameStore, RecordObserver, RecordPatch};
use super::router::{History, Route, EMPTY_PAD, WELCOME_PAD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn contains_column(&self, column: u16) -> bool {
        column >= self.x && column < self.x + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaneLayout {
    pub top_bar: Rect,
    pub preview: Rect,
    pub divider: Option<u16>,
    pub settings_bar: Option<Rect>,
    pub editor: Rect,
    pub status: Rect,
}

impl PaneLayout {
    pub fn compute(screen: Viewport, pane_split: f32, settings_visible: bool) -> Self {
        let body_height = screen.height.saturating_sub(2);
        let preview_width = ((f32::from(screen.width) * pane_split / 100.0).round() as u16)
            .min(screen.width);
        let editor_width = screen.width - preview_width;
        let divider = (preview_width > 0 && editor_width > 0).then_some(preview_width);
        let editor_x = preview_width + u16::from(divider.is_some());
        let editor_width = editor_width.saturating_sub(u16::from(divider.is_some()));

        let settings_bar = settings_visible.then_some(Rect {
            x: editor_x,
            y: 1,
            width: editor_width,
            height: 1u16.min(body_height),
        });
        let editor_top = 1 + settings_bar.map_or(0, |bar| bar.height);

        Self {
            top_bar: Rect {
                x: 0,
                y: 0,
                width: screen.width,
                height: 1u16.min(screen.height),
            },
            preview: Rect {
                x: 0,
                y: 1,
                width: preview_width,
                height: body_height,
            },
            divider,
            settings_bar,
            editor: Rect {
                x: editor_x,
                y: editor_top,
                width: editor_width,
                height: body_height.saturating_sub(editor_top - 1),
            },
            status: Rect {
                x: 0,
                y: screen.height.saturating_sub(1),
                width: screen.width,
                height: 1u16.min(screen.height),
            },
        }
    }
}

pub fn snap_split(split: f32) -> f32 {
    if split < 1.0 {
        0.0
    } else if split > 99.0 {
        100.0
    } else if split > 49.0 && split < 51.0 {
        50.0
    } else {
        split
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    Quit,
}

pub struct Workspace {
    config: Rc<Config>,
    telemetry: Rc<dyn Telemetry>,
    store: FrameStore,
    controller: SyncController,
    preview: PreviewReconciler<PreviewFrame>,
    history: History,
    keymap: KeyMap,
    effects: Vec<Effect>,
    screen: Viewport,
    pane_split: f32,
    dragging: bool,
    confirm_quit: bool,
}

impl Workspace {
    pub fn new(config: Rc<Config>, telemetry: Rc<dyn Telemetry>) -> Self {
        let device = DeviceClass::from_user_agent(&config.user_agent);
        let core = create_core(select_backend(device, config.backend));
        Self::with_core(core, config, telemetry)
    }

    pub fn with_core(
        core: Box<dyn EditorCore>,
        config: Rc<Config>,
        telemetry: Rc<dyn Telemetry>,
    ) -> Self {
        let controller = SyncController::new(core, Rc::clone(&config), Rc::clone(&telemetry));
        let preview = PreviewReconciler::new(
            PreviewFrame::new(),
            config.origin.clone(),
            Rc::clone(&telemetry),
        );
        Self {
            history: History::new(config.launch.clone()),
            config,
            telemetry,
            store: FrameStore::new(),
            controller,
            preview,
            keymap: default_keymap(),
            effects: Vec::new(),
            screen: Viewport::new(80, 24),
            pane_split: 50.0,
            dragging: false,
            confirm_quit: false,
        }
    }

    pub fn open(&mut self, now: Instant) {
        self.controller.start();
        self.pump();
        self.relayout(now);
        let path = self.history.current().path.clone();
        self.route(&path);
        self.pump();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn record(&self) -> &FrameRecord {
        self.store.get()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn preview(&self) -> &PreviewFrame {
        self.preview.surface()
    }

    pub fn core(&self) -> &dyn EditorCore {
        self.controller.core()
    }

    pub fn settings(&self) -> Settings {
        self.controller.settings()
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn pane_split(&self) -> f32 {
        self.pane_split
    }

    pub fn layout(&self) -> PaneLayout {
        PaneLayout::compute(self.screen, self.pane_split, self.settings().visible)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.get().has_live_render()
    }

    pub fn status(&self) -> Option<&str> {
        if self.confirm_quit {
            return Some("Unsaved changes will be lost. Quit anyway? (y/n)");
        }
        self.controller.status()
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.next_deadline()
    }

    pub fn tick(&mut self, now: Instant) {
        self.controller.tick(now);
        self.pump();
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::BackendBooted(result) => self.controller.backend_booted(result, now),
            Event::FetchCompleted {
                slot,
                identity,
                result,
            } => self
                .controller
                .fetch_completed(self.store.get(), slot, identity, result),
            Event::StoreCompleted {
                ticket,
                slot,
                result,
            } => self
                .controller
                .store_completed(self.store.get(), ticket, slot, result),
        }
        self.pump();
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> KeyOutcome {
        if self.confirm_quit {
            self.confirm_quit = false;
            return match key.key {
                Key::Char('y') | Key::Char('Y') => KeyOutcome::Quit,
                _ => KeyOutcome::Handled,
            };
        }

        let outcome = match self.keymap.get(&key) {
            Some(action) => self.perform(action, now),
            None => {
                let consumed = self
                    .controller
                    .core_mut()
                    .surface_mut()
                    .map_or(false, |surface| surface.handle_key(key));
                self.controller.poll_edits(now);
                if consumed {
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
        };
        self.pump();
        outcome
    }

    pub fn perform(&mut self, action: Action, now: Instant) -> KeyOutcome {
        match action {
            Action::SwitchMode(slot) => self.switch_mode(slot),
            Action::Save => self.controller.save(),
            Action::RefreshPreview => self.refresh_preview(),
            Action::ToggleSettings => {
                self.controller.toggle_settings();
                self.relayout(now);
            }
            Action::ToggleAsYouType => self.controller.toggle_as_you_type(),
            Action::ShiftSplit(delta) => {
                self.set_pane_split(self.pane_split + f32::from(delta), now);
                self.emit_split();
            }
            Action::Quit => {
                if !self.has_unsaved_changes() {
                    return KeyOutcome::Quit;
                }
                self.confirm_quit = true;
            }
        }
        self.pump();
        KeyOutcome::Handled
    }

    pub fn switch_mode(&mut self, slot: Slot) {
        self.controller.switch_mode(slot);
        self.pump();
    }

    pub fn refresh_preview(&mut self) {
        self.preview.refresh(self.store.get());
    }

    pub fn resize_screen(&mut self, width: u16, height: u16, now: Instant) {
        self.screen = Viewport::new(width, height);
        self.relayout(now);
    }

    pub fn set_pane_split(&mut self, split: f32, now: Instant) {
        self.pane_split = snap_split(split.clamp(0.0, 100.0));
        self.relayout(now);
    }

    pub fn begin_drag(&mut self, column: u16) -> bool {
        self.dragging = self.layout().divider == Some(column);
        self.dragging
    }

    pub fn drag_to(&mut self, column: u16, now: Instant) {
        if !self.dragging || self.screen.width == 0 {
            return;
        }
        let split = f32::from(column) / f32::from(self.screen.width) * 100.0;
        self.set_pane_split(split, now);
    }

    pub fn end_drag(&mut self) {
        if std::mem::take(&mut self.dragging) {
            self.emit_split();
        }
    }

    pub fn go(&mut self, path: &str, replace: bool) {
        self.navigate(path, replace);
        self.pump();
    }

    pub fn back(&mut self) -> bool {
        let path = match self.history.back() {
            Some(location) => location.path.clone(),
            None => return false,
        };
        self.route(&path);
        self.pump();
        true
    }

    fn emit_split(&self) {
        let label = format!("editor {}", self.pane_split);
        self.telemetry.emit("workspace", "resize", Some(&label));
    }

    fn relayout(&mut self, now: Instant) {
        let editor = self.layout().editor;
        self.controller
            .core_mut()
            .container()
            .set_bounds(Viewport::new(editor.width, editor.height));
        self.controller.request_resize(now);
    }

    fn navigate(&mut self, path: &str, replace: bool) {
        log::info!(
            "navigating to {}{}",
            path,
            if replace { " (replace)" } else { "" }
        );
        if replace {
            self.history.replace(path);
        } else {
            self.history.push(path);
        }
        self.route(path);
    }

    fn route(&mut self, path: &str) {
        match Route::parse(path) {
            Route::Edit { html, js } => self.update_record(RecordPatch::route(html, js)),
            Route::Welcome => self.navigate(WELCOME_PAD, true),
            Route::New => self.navigate(EMPTY_PAD, true),
        }
    }

    fn update_record(&mut self, patch: RecordPatch) {
        let record = self.store.update(patch);
        self.controller.record_updated(record);
        self.preview.record_updated(record);
    }

    fn pump(&mut self) {
        loop {
            let requests = self.controller.take_requests();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                match request {
                    Request::Update(patch) => self.update_record(patch),
                    Request::Navigate(path) => self.navigate(&path, false),
                    Request::ReplaceFragment(slot) => self.history.replace_fragment(slot.as_str()),
                    Request::Run(effect) => self.effects.push(effect),
                }
            }
        }
    }
}
