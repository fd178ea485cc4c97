//! Hooks into the consensus pass, used for debug dumps and diagnostics

use std::path::PathBuf;

use tracing::warn;

use plategate_types::{CandidateReading, Error, RecognitionResult};

use crate::crop::PlateCrop;

/// Receives every step of one consensus pass. All methods default to no-ops.
pub trait RecognitionObserver: Send + Sync {
    /// Unprocessed plate crop, before any variant is prepared
    fn crop_received(&self, _crop: &PlateCrop) {}

    fn variant_prepared(&self, _name: &str, _image: &PlateCrop) {}

    fn variant_recognized(&self, _result: &RecognitionResult, _normalized: &str) {}

    fn variant_failed(&self, _name: &str, _error: &Error) {}

    /// Raw-crop pass is about to run; `best_confidence` is the variant best so far
    fn raw_fallback(&self, _best_confidence: f64) {}

    fn candidate_selected(&self, _candidate: &CandidateReading) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RecognitionObserver for NoopObserver {}

/// Writes the unprocessed crop to `<dir>/plate.png` and each preprocessed
/// variant to `<dir>/plate_<variant>.png`
#[derive(Debug, Clone)]
pub struct DebugDumpObserver {
    dir: PathBuf,
}

impl DebugDumpObserver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, variant: &str) -> PathBuf {
        self.dir.join(format!("plate_{}.png", variant))
    }

    pub fn crop_path(&self) -> PathBuf {
        self.dir.join("plate.png")
    }

    fn dump(&self, path: PathBuf, image: &PlateCrop) {
        if image.is_empty() {
            return;
        }
        if let Err(err) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %err, "cannot create debug dump directory");
            return;
        }
        if let Err(err) = image.save_png(&path) {
            warn!(path = %path.display(), error = %err, "failed to write debug image");
        }
    }
}

impl RecognitionObserver for DebugDumpObserver {
    fn crop_received(&self, crop: &PlateCrop) {
        self.dump(self.crop_path(), crop);
    }

    fn variant_prepared(&self, name: &str, image: &PlateCrop) {
        self.dump(self.path_for(name), image);
    }
}
