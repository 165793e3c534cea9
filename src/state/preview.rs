use std::rc::Rc;

use crate::core::Identity;
use crate::services::Telemetry;

use super::record::{FrameRecord, RecordObserver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewTarget {
    Live(String),
    Saved(String),
}

impl PreviewTarget {
    pub fn for_record(record: &FrameRecord, origin: &str) -> Self {
        match &record.live_render_markup {
            Some(markup) => PreviewTarget::Live(live_url(markup)),
            None => PreviewTarget::Saved(saved_url(
                origin,
                &record.html_frame_hash,
                &record.js_frame_hash,
            )),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            PreviewTarget::Live(url) | PreviewTarget::Saved(url) => url,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, PreviewTarget::Live(_))
    }
}

pub fn live_url(markup: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(markup))
}

pub fn saved_url(origin: &str, html: &Identity, js: &Identity) -> String {
    format!("{}/f/{}/{}.html", origin.trim_end_matches('/'), html, js)
}

pub trait PreviewSurface {
    fn has_content(&self) -> bool;

    fn assign(&mut self, url: &str);

    fn replace(&mut self, url: &str);
}

#[derive(Debug, Clone, Default)]
pub struct PreviewFrame {
    current: Option<String>,
    history: Vec<String>,
    loads: usize,
}

impl PreviewFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn live_markup(&self) -> Option<String> {
        let encoded = self.current.as_deref()?.strip_prefix("data:text/html,")?;
        urlencoding::decode(encoded).ok().map(|markup| markup.into_owned())
    }
}

impl PreviewSurface for PreviewFrame {
    fn has_content(&self) -> bool {
        self.current.is_some()
    }

    fn assign(&mut self, url: &str) {
        self.history.push(url.to_string());
        self.current = Some(url.to_string());
        self.loads += 1;
    }

    fn replace(&mut self, url: &str) {
        self.current = Some(url.to_string());
        self.loads += 1;
    }
}

pub struct PreviewReconciler<S: PreviewSurface> {
    surface: S,
    origin: String,
    last_applied: Option<PreviewTarget>,
    telemetry: Rc<dyn Telemetry>,
}

impl<S: PreviewSurface> PreviewReconciler<S> {
    pub fn new(surface: S, origin: impl Into<String>, telemetry: Rc<dyn Telemetry>) -> Self {
        Self {
            surface,
            origin: origin.into(),
            last_applied: None,
            telemetry,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn reconcile(&mut self, record: &FrameRecord) {
        let target = PreviewTarget::for_record(record, &self.origin);
        self.apply(target);
    }

    pub fn refresh(&mut self, record: &FrameRecord) {
        self.last_applied = None;
        self.reconcile(record);
        self.telemetry.emit("preview", "refresh", None);
    }

    fn apply(&mut self, target: PreviewTarget) {
        if self.last_applied.as_ref() == Some(&target) {
            return;
        }
        if self.surface.has_content() {
            self.surface.replace(target.url());
        } else {
            self.surface.assign(target.url());
        }
        log::debug!(
            "preview now {}",
            if target.is_live() { "live" } else { target.url() }
        );
        self.last_applied = Some(target);
    }
}

impl<S: PreviewSurface> RecordObserver for PreviewReconciler<S> {
    fn record_updated(&mut self, record: &FrameRecord) {
        self.reconcile(record);
    }
}
