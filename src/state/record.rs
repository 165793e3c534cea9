use crate::core::{Identity, Slot};

// Shared view state of a pad.
// `live_render_markup` is present exactly when the preview shows unsaved
// edits instead of the stored content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameRecord {
    pub html_frame_hash: Identity,
    pub js_frame_hash: Identity,
    pub live_render_markup: Option<String>,
}

impl FrameRecord {
    pub fn frame_hash(&self, slot: Slot) -> &Identity {
        match slot {
            Slot::Markup => &self.html_frame_hash,
            Slot::Script => &self.js_frame_hash,
        }
    }

    pub fn identities(&self) -> (Identity, Identity) {
        (self.html_frame_hash.clone(), self.js_frame_hash.clone())
    }

    pub fn has_live_render(&self) -> bool {
        self.live_render_markup.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub html_frame_hash: Option<Identity>,
    pub js_frame_hash: Option<Identity>,
    pub live_render_markup: Option<Option<String>>,
}

impl RecordPatch {
    pub fn route(html: Identity, js: Identity) -> Self {
        Self {
            html_frame_hash: Some(html),
            js_frame_hash: Some(js),
            live_render_markup: Some(None),
        }
    }

    pub fn live(markup: String) -> Self {
        Self {
            live_render_markup: Some(Some(markup)),
            ..Self::default()
        }
    }

    pub fn clear_live() -> Self {
        Self {
            live_render_markup: Some(None),
            ..Self::default()
        }
    }

    pub fn apply(self, record: &mut FrameRecord) {
        if let Some(html) = self.html_frame_hash {
            record.html_frame_hash = html;
        }
        if let Some(js) = self.js_frame_hash {
            record.js_frame_hash = js;
        }
        if let Some(live) = self.live_render_markup {
            record.live_render_markup = live;
        }
    }
}

pub trait RecordObserver {
    fn record_updated(&mut self, record: &FrameRecord);
}

// Owner of the record. Each update bumps the revision, even one that
// changes nothing, and observers are notified after every update.
#[derive(Debug, Default)]
pub struct FrameStore {
    record: FrameRecord,
    revision: u64,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &FrameRecord {
        &self.record
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn update(&mut self, patch: RecordPatch) -> &FrameRecord {
        patch.apply(&mut self.record);
        self.revision += 1;
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_patch_clears_live() {
        let mut store = FrameStore::new();
        store.update(RecordPatch::live("<p>".into()));
        assert!(store.get().has_live_render());

        let html = Identity::parse("abc").unwrap();
        let js = Identity::parse("def").unwrap();
        let record = store.update(RecordPatch::route(html.clone(), js.clone()));
        assert_eq!(record.identities(), (html, js));
        assert_eq!(record.live_render_markup, None);
    }

    #[test]
    fn test_empty_patch_still_counts() {
        let mut store = FrameStore::new();
        store.update(RecordPatch::default());
        store.update(RecordPatch::default());
        assert_eq!(store.revision(), 2);
        assert_eq!(store.get(), &FrameRecord::default());
    }

    #[test]
    fn test_live_patch_keeps_identities() {
        let mut record = FrameRecord {
            html_frame_hash: Identity::parse("aaa").unwrap(),
            ..FrameRecord::default()
        };
        RecordPatch::live("x".into()).apply(&mut record);
        assert_eq!(record.frame_hash(Slot::Markup).as_str(), "aaa");
        assert_eq!(record.live_render_markup.as_deref(), Some("x"));
        RecordPatch::clear_live().apply(&mut record);
        assert!(!record.has_live_render());
    }
}
