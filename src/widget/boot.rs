use std::collections::HashSet;
use std::thread;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootError {
    #[error("Failed to load editor asset {asset}: {reason}")]
    Asset { asset: String, reason: String },
}

// Assets a backend needs before it can start, as ordered stages.
// Stages load strictly one after another; the assets of one stage load in
// parallel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootManifest {
    stages: Vec<Vec<String>>,
}

impl BootManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages.push(assets.into_iter().map(Into::into).collect());
        self
    }

    pub fn stages(&self) -> &[Vec<String>] {
        &self.stages
    }
}

pub trait AssetLoader: Send + Sync {
    fn load(&self, asset: &str) -> Result<(), BootError>;
}

pub fn run_manifest(loader: &dyn AssetLoader, manifest: &BootManifest) -> Result<(), BootError> {
    for stage in manifest.stages() {
        thread::scope(|scope| {
            let handles: Vec<_> = stage
                .iter()
                .map(|asset| (asset, scope.spawn(move || loader.load(asset))))
                .collect();

            handles
                .into_iter()
                .map(|(asset, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(BootError::Asset {
                            asset: asset.clone(),
                            reason: "loader panicked".to_string(),
                        })
                    })
                })
                .collect::<Result<Vec<()>, BootError>>()
        })?;
        log::debug!("Loaded editor assets: {}", stage.join(", "));
    }
    Ok(())
}

pub const BUNDLED: &[&str] = &[
    "ide/loader",
    "ide/editor.main",
    "lite/core",
    "lite/mode/javascript",
    "lite/mode/xml",
    "lite/mode/htmlmixed",
    "lite/addon/closetag",
    "lite/addon/closebrackets",
];

#[derive(Debug, Clone)]
pub struct BundledAssets {
    available: HashSet<String>,
}

impl BundledAssets {
    pub fn new() -> Self {
        Self::with(BUNDLED.iter().copied())
    }

    pub fn with<'a>(assets: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            available: assets.into_iter().map(str::to_string).collect(),
        }
    }
}

impl Default for BundledAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for BundledAssets {
    fn load(&self, asset: &str) -> Result<(), BootError> {
        if self.available.contains(asset) {
            Ok(())
        } else {
            Err(BootError::Asset {
                asset: asset.to_string(),
                reason: "not bundled".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recorder {
        loaded: Mutex<Vec<String>>,
    }

    impl AssetLoader for Recorder {
        fn load(&self, asset: &str) -> Result<(), BootError> {
            if let Ok(mut loaded) = self.loaded.lock() {
                loaded.push(asset.to_string());
            }
            Ok(())
        }
    }

    #[test]
    fn test_stages_load_in_order() {
        let recorder = Recorder {
            loaded: Mutex::new(Vec::new()),
        };
        let manifest = BootManifest::new()
            .then(["core"])
            .then(["mode/a", "mode/b"]);
        run_manifest(&recorder, &manifest).unwrap();

        let loaded = recorder.loaded.into_inner().unwrap();
        assert_eq!(loaded[0], "core");
        assert_eq!(loaded.len(), 3);
    }

    #[test]
    fn test_missing_asset_fails_the_boot() {
        let loader = BundledAssets::with(["core"]);
        let manifest = BootManifest::new().then(["core"]).then(["missing"]);
        let err = run_manifest(&loader, &manifest).unwrap_err();
        assert_eq!(
            err,
            BootError::Asset {
                asset: "missing".into(),
                reason: "not bundled".into()
            }
        );
    }
}
