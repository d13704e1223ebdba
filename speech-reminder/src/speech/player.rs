use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::NotifyError;

/// External command-line audio player.
///
/// `ffplay` is run windowless and exits when playback ends; any other
/// program is invoked with the file path as its only argument.
#[derive(Debug, Clone)]
pub struct AudioPlayer {
    program: String,
}

impl AudioPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(&self) -> &'static [&'static str] {
        let name = Path::new(&self.program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        match name {
            "ffplay" => &["-nodisp", "-autoexit", "-hide_banner", "-loglevel", "quiet"],
            "mpv" => &["--no-video", "--really-quiet"],
            _ => &[],
        }
    }

    /// Play `file` to completion with the player's output suppressed.
    pub async fn play(&self, file: &Path) -> Result<(), NotifyError> {
        let status = Command::new(&self.program)
            .args(self.args())
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| NotifyError::Playback(format!("failed to run {}: {}", self.program, e)))?;

        if !status.success() {
            return Err(NotifyError::Playback(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        Ok(())
    }
}
