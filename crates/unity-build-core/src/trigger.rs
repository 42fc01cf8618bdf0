//! Request side of the editor handshake.
//!
//! A running editor with the watcher script installed polls the project root
//! for `build_trigger.json`. Writing the file is the whole signal; there is no
//! acknowledgement other than the eventual result file (see [`crate::poll`]).

use crate::error::Result;
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Payload of `build_trigger.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub output_path: PathBuf,
    pub scenes: Vec<String>,
    pub build_target: String,
}

/// Write the build request into `project` and nudge the editor window.
///
/// Any stale request is replaced. Focusing the window is best-effort and can
/// never fail the call.
pub fn write_trigger(
    project: &Path,
    output_path: &Path,
    scenes: &[String],
    build_target: &str,
) -> Result<TriggerRequest> {
    let request = TriggerRequest {
        output_path: output_path.to_path_buf(),
        scenes: scenes.to_vec(),
        build_target: build_target.to_string(),
    };
    let path = paths::trigger_path(project);
    let data = serde_json::to_string_pretty(&request)?;
    io::atomic_write(&path, data.as_bytes())?;
    tracing::info!(path = %path.display(), target = %build_target, "wrote build trigger");

    focus_editor();
    Ok(request)
}

/// Window class of the Unity editor's main frame.
pub const EDITOR_WINDOW_CLASS: &str = "UnityContainerWndClass";

/// Bring the Unity editor to the foreground so whoever is watching it sees
/// the build start. No-op when the window is not found or off Windows.
#[cfg(windows)]
pub fn focus_editor() {
    use windows_sys::Win32::UI::WindowsAndMessaging::{FindWindowW, SetForegroundWindow};

    let class: Vec<u16> = EDITOR_WINDOW_CLASS
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    // SAFETY: `class` is a NUL-terminated UTF-16 buffer that outlives the call.
    let hwnd = unsafe { FindWindowW(class.as_ptr(), std::ptr::null()) };
    if hwnd.is_null() {
        tracing::debug!("no Unity editor window found to focus");
        return;
    }
    // SAFETY: `hwnd` was just returned by FindWindowW.
    let focused = unsafe { SetForegroundWindow(hwnd) };
    tracing::debug!(focused = focused != 0, "focused Unity editor window");
}

#[cfg(not(windows))]
pub fn focus_editor() {
    tracing::debug!("editor window focusing is only supported on Windows");
}
