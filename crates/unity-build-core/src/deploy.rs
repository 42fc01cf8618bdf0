//! Install and remove the bundled editor scripts.
//!
//! Scripts are compiled into the binary from `assets/` and written into the
//! project's `Assets/Editor/` folder only for the duration of a build. Unity
//! imports them and generates a `.meta` sidecar, which is removed with them.

use crate::error::{BuildError, Result};
use crate::{io, paths};
use rust_embed::Embed;
use std::path::{Path, PathBuf};

#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/assets/"]
struct EditorScripts;

/// Names of every script bundled with this build.
pub fn bundled_scripts() -> Vec<String> {
    let mut names: Vec<String> = EditorScripts::iter().map(|n| n.into_owned()).collect();
    names.sort();
    names
}

/// A script written into a project. Dropping the handle removes the script;
/// call [`DeployedScript::cleanup`] to observe removal errors instead.
#[derive(Debug)]
pub struct DeployedScript {
    path: PathBuf,
    removed: bool,
}

impl DeployedScript {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the script and its `.meta` sidecar. Removing what is already
    /// gone is not an error.
    pub fn cleanup(mut self) -> Result<()> {
        self.removed = true;
        remove_script(&self.path)
    }
}

impl Drop for DeployedScript {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove_script(&self.path) {
            tracing::warn!(error = %e, "failed to remove deployed editor script");
        }
    }
}

/// Both removals are attempted; the first failure is returned.
fn remove_script(path: &Path) -> Result<()> {
    let script = io::remove_if_present(path);
    let meta = io::remove_if_present(&paths::meta_path(path));
    tracing::debug!(
        path = %path.display(),
        script = ?script.as_ref().ok(),
        meta = ?meta.as_ref().ok(),
        "removed editor script"
    );
    script?;
    meta?;
    Ok(())
}

/// Write the bundled script `name` into `<project>/Assets/Editor/`,
/// replacing any previous copy.
pub fn deploy_script(project: &Path, name: &str) -> Result<DeployedScript> {
    let asset = EditorScripts::get(name).ok_or_else(|| BuildError::AssetMissing(name.to_string()))?;
    let dir = paths::editor_scripts_dir(project);
    io::ensure_dir(&dir)?;

    let path = dir.join(name);
    io::atomic_write(&path, &asset.data)?;
    tracing::info!(path = %path.display(), "deployed editor script");
    Ok(DeployedScript {
        path,
        removed: false,
    })
}

/// Install the watcher that lets a running editor answer trigger requests.
pub fn deploy_watcher(project: &Path) -> Result<DeployedScript> {
    deploy_script(project, paths::WATCHER_SCRIPT)
}

/// Install the entry point invoked by `-executeMethod` in batchmode.
pub fn deploy_build_script(project: &Path) -> Result<DeployedScript> {
    deploy_script(project, paths::BUILD_SCRIPT)
}
