use crate::paths;
use std::path::Path;

/// Whether an editor session currently holds `project` open.
///
/// Unity creates `Temp/UnityLockfile` while the project is open. Only its
/// existence matters. Any failure to stat the path counts as "not running".
pub fn is_editor_running(project: &Path) -> bool {
    paths::lock_path(project).try_exists().unwrap_or(false)
}
