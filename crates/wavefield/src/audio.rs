use std::fmt;
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::state::AppState;

/// Whether audio may start without asking the user first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStatus {
    PermissionRequired,
    Ready,
}

impl AudioStatus {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Ready
        } else {
            Self::PermissionRequired
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PermissionRequired => "permission-required",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for AudioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status derived from the persisted flag. A state file that cannot be read
/// never blocks startup.
pub fn startup_status(state_file: &Path) -> AudioStatus {
    match AppState::load_or_default(state_file) {
        Ok(state) => AudioStatus::from_enabled(state.audio_enabled),
        Err(err) => {
            warn!(
                path = %state_file.display(),
                error = ?err,
                "could not read audio preference; asking for permission"
            );
            AudioStatus::PermissionRequired
        }
    }
}

/// Persists the flag and returns the new status. An unreadable state file is
/// replaced rather than treated as fatal.
pub fn set_enabled(state_file: &Path, enabled: bool) -> Result<AudioStatus> {
    let mut state = AppState::load_or_default(state_file).unwrap_or_else(|err| {
        warn!(
            path = %state_file.display(),
            error = ?err,
            "discarding unreadable state file"
        );
        AppState::default()
    });
    state.audio_enabled = enabled;
    state.persist(state_file)?;
    let status = AudioStatus::from_enabled(enabled);
    info!(%status, "audio preference updated");
    Ok(status)
}
