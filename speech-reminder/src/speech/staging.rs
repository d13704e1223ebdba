use std::io::Write;
use std::path::Path;

use tempfile::{NamedTempFile, TempDir};

/// Directory holding synthesized audio while it plays.
pub struct SpeechStaging {
    dir: TempDir,
}

impl SpeechStaging {
    pub fn create() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("speech-reminder-").tempdir()?;
        tracing::debug!("Staging speech audio in {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `audio` to a fresh MP3 file in `dir`, removed when the handle drops.
    pub fn stage_in(dir: &Path, audio: &[u8]) -> std::io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("speech-")
            .suffix(".mp3")
            .tempfile_in(dir)?;
        file.write_all(audio)?;
        file.flush()?;
        Ok(file)
    }

    /// Remove the staging directory and everything left in it.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => tracing::debug!("Removed speech staging directory {}", path.display()),
            Err(e) => tracing::warn!(
                "Failed to remove speech staging directory {}: {}",
                path.display(),
                e
            ),
        }
    }
}
