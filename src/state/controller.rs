use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use crate::config::Config;
use crate::core::{Identity, Slot, SlotPair};
use crate::editor::EditorCore;
use crate::services::{StoreError, Telemetry};
use crate::widget::BootError;

use super::debounce::Debouncer;
use super::event::{Effect, SaveTicket};
use super::record::{FrameRecord, RecordObserver, RecordPatch};
use super::router::Route;

pub const LIVE_FRAME_TITLE: &str = "Live Frame | livepad";

pub fn live_document(markup: &str, script: &str, runtime_script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <meta charset="utf-8"/>
        <meta name="viewport" content="width=device-width,initial-scale=1"/>
        <title>{title}</title>
    </head>
    <body>
        {markup}
        <script src="{runtime_script}"></script>
        <script>{script}</script>
    </body>
</html>"#,
        title = LIVE_FRAME_TITLE,
        markup = markup,
        runtime_script = runtime_script,
        script = script,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub visible: bool,
    pub as_you_type: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            visible: false,
            as_you_type: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Update(RecordPatch),
    Navigate(String),
    ReplaceFragment(Slot),
    Run(Effect),
}

#[derive(Debug)]
struct PendingSave {
    ticket: SaveTicket,
    results: SlotPair<Option<Result<Identity, String>>>,
}

pub struct SyncController {
    core: Box<dyn EditorCore>,
    config: Rc<Config>,
    telemetry: Rc<dyn Telemetry>,
    settings: Settings,
    last_fetched: Option<(Identity, Identity)>,
    live_render: Debouncer,
    resize: Debouncer,
    edits: Rc<RefCell<Vec<Slot>>>,
    save_requested: Rc<Cell<bool>>,
    pending_save: Option<PendingSave>,
    next_ticket: u64,
    requests: Vec<Request>,
    status: Option<String>,
}

impl SyncController {
    pub fn new(core: Box<dyn EditorCore>, config: Rc<Config>, telemetry: Rc<dyn Telemetry>) -> Self {
        Self {
            core,
            live_render: Debouncer::new(config.live_render_quiet),
            resize: Debouncer::new(config.resize_quiet),
            config,
            telemetry,
            settings: Settings::default(),
            last_fetched: None,
            edits: Rc::new(RefCell::new(Vec::new())),
            save_requested: Rc::new(Cell::new(false)),
            pending_save: None,
            next_ticket: 1,
            requests: Vec::new(),
            status: None,
        }
    }

    pub fn start(&mut self) {
        log::info!("starting {} editor", self.core.kind());
        self.requests
            .push(Request::Run(Effect::Boot(self.core.boot_manifest())));
        if let Some(tab) = self.config.prefill.tab {
            self.switch_mode(tab);
        }
    }

    pub fn core(&self) -> &dyn EditorCore {
        self.core.as_ref()
    }

    pub fn core_mut(&mut self) -> &mut dyn EditorCore {
        self.core.as_mut()
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    pub fn backend_booted(&mut self, result: Result<(), BootError>, now: Instant) {
        if let Err(e) = self.core.complete_boot(result) {
            log::error!("{}", e);
            self.status = Some(e.to_string());
            return;
        }

        let prefill = &self.config.prefill;
        if prefill.has_content() {
            self.core.set_value_of(Slot::Markup, &prefill.html);
            self.core.set_value_of(Slot::Script, &prefill.js);
            self.render_live();
        }

        let edits = Rc::clone(&self.edits);
        self.core
            .add_change_handler(Box::new(move |slot| edits.borrow_mut().push(slot)));

        if let Some(shortcut) = self.core.as_save_shortcut() {
            let save_requested = Rc::clone(&self.save_requested);
            shortcut.register_save_shortcut(Box::new(move || save_requested.set(true)));
        }

        self.request_resize(now);
    }

    pub fn fetch_completed(
        &mut self,
        record: &FrameRecord,
        slot: Slot,
        identity: Identity,
        result: Result<String, StoreError>,
    ) {
        let content = match result {
            Ok(content) => content,
            Err(e) => {
                log::error!("fetching {} {} failed: {}", slot, identity, e);
                return;
            }
        };
        if record.has_live_render() {
            log::debug!("discarding fetched {}: live edits are newer", slot);
            return;
        }
        if *record.frame_hash(slot) != identity {
            log::debug!("discarding fetched {} {}: route moved on", slot, identity);
            return;
        }
        self.core.set_value_of(slot, &content);
    }

    // Stores both slots. A save already in flight absorbs the request.
    pub fn save(&mut self) {
        if self.pending_save.is_some() {
            log::debug!("save already in flight");
            return;
        }

        let ticket = SaveTicket(self.next_ticket);
        self.next_ticket += 1;
        for slot in Slot::ALL {
            self.requests.push(Request::Run(Effect::Store {
                ticket,
                slot,
                content: self.core.value_of(slot),
            }));
        }
        self.pending_save = Some(PendingSave {
            ticket,
            results: SlotPair::default(),
        });
        self.status = Some("Saving...".into());
    }

    pub fn store_completed(
        &mut self,
        record: &FrameRecord,
        ticket: SaveTicket,
        slot: Slot,
        result: Result<Identity, StoreError>,
    ) {
        let pending = match self.pending_save.as_mut() {
            Some(pending) if pending.ticket == ticket => pending,
            _ => {
                log::debug!("ignoring store result for {:?}", ticket);
                return;
            }
        };

        pending.results[slot] = Some(result.map_err(|e| {
            log::error!("saving {} failed: {}", slot, e);
            e.to_string()
        }));
        if pending.results.iter().any(|(_, result)| result.is_none()) {
            return;
        }

        let results = match self.pending_save.take() {
            Some(pending) => pending.results,
            None => return,
        };
        match (results.markup, results.script) {
            (Some(Ok(html)), Some(Ok(js))) => {
                if record.identities() == (html.clone(), js.clone()) {
                    self.requests.push(Request::Update(RecordPatch::clear_live()));
                } else {
                    self.requests
                        .push(Request::Navigate(Route::edit_path(&html, &js)));
                }
                self.status = Some("Saved".into());
                self.telemetry.emit("editor", "save", None);
            }
            (markup, script) => {
                let reason = [markup, script]
                    .into_iter()
                    .filter_map(|result| result.and_then(Result::err))
                    .collect::<Vec<_>>()
                    .join("; ");
                self.status = Some(format!("Save failed: {}", reason));
                self.telemetry.emit("editor", "save", Some("failed"));
            }
        }
    }

    pub fn switch_mode(&mut self, slot: Slot) {
        self.core.set_mode(slot);
        self.requests.push(Request::ReplaceFragment(slot));
        self.telemetry.emit("editor", "switchmode", Some(slot.as_str()));
    }

    pub fn toggle_settings(&mut self) {
        self.settings.visible = !self.settings.visible;
    }

    pub fn toggle_as_you_type(&mut self) {
        self.settings.as_you_type = !self.settings.as_you_type;
        if self.settings.as_you_type {
            self.render_live();
        }
        let label = self.settings.as_you_type.to_string();
        self.telemetry
            .emit("editor", "settings.asyoutype", Some(&label));
    }

    pub fn request_resize(&mut self, now: Instant) {
        if self.resize.call(now) {
            self.core.resize();
        }
    }

    pub fn poll_edits(&mut self, now: Instant) {
        let edits: Vec<Slot> = self.edits.borrow_mut().drain(..).collect();
        for slot in edits {
            log::trace!("{} edited", slot);
            if self.live_render.call(now) {
                self.render_live();
            }
        }
        if self.save_requested.replace(false) {
            self.save();
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if self.live_render.fire_due(now) {
            self.render_live();
        }
        if self.resize.fire_due(now) {
            self.core.resize();
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        [self.live_render.deadline(), self.resize.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    fn render_live(&mut self) {
        if !self.settings.as_you_type {
            return;
        }
        let document = live_document(
            &self.core.value_of(Slot::Markup),
            &self.core.value_of(Slot::Script),
            &self.config.runtime_script,
        );
        self.requests.push(Request::Update(RecordPatch::live(document)));
    }
}

impl RecordObserver for SyncController {
    fn record_updated(&mut self, record: &FrameRecord) {
        let pair = record.identities();
        if pair.0.is_empty() || self.last_fetched.as_ref() == Some(&pair) {
            return;
        }
        log::debug!("fetching {} / {}", pair.0, pair.1);
        self.requests.push(Request::Run(Effect::Fetch {
            slot: Slot::Markup,
            identity: pair.0.clone(),
        }));
        if !pair.1.is_empty() {
            self.requests.push(Request::Run(Effect::Fetch {
                slot: Slot::Script,
                identity: pair.1.clone(),
            }));
        }
        self.last_fetched = Some(pair);
    }
}
