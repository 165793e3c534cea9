use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::services::ContentStore;
use crate::state::{Effect, Event};
use crate::widget::{run_manifest, AssetLoader};

pub struct Runtime {
    store: Arc<dyn ContentStore>,
    loader: Arc<dyn AssetLoader>,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Runtime {
    pub fn new(store: Arc<dyn ContentStore>, loader: Arc<dyn AssetLoader>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            store,
            loader,
            tx,
            rx,
        }
    }

    pub fn spawn(&self, effect: Effect) {
        let tx = self.tx.clone();
        let store = Arc::clone(&self.store);
        let loader = Arc::clone(&self.loader);
        thread::spawn(move || {
            let event = match effect {
                Effect::Boot(manifest) => Event::BackendBooted(run_manifest(loader.as_ref(), &manifest)),
                Effect::Fetch { slot, identity } => Event::FetchCompleted {
                    slot,
                    result: store.fetch(&identity),
                    identity,
                },
                Effect::Store {
                    ticket,
                    slot,
                    content,
                } => Event::StoreCompleted {
                    ticket,
                    slot,
                    result: store.store(&content),
                },
            };
            // The receiver is gone only when the frontend has shut down.
            let _ = tx.send(event);
        });
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
