use crate::error::{BuildError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// The editor polls for these files, so it must never observe a half-written one.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let wrap = |source: std::io::Error| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(wrap)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    tmp.write_all(data).map_err(wrap)?;
    tmp.persist(path).map_err(|e| wrap(e.error))?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Delete a file if it exists. Returns true if something was removed.
pub fn remove_if_present(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(BuildError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Return the last `n` lines of a text file, replacing invalid UTF-8.
pub fn tail_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build_trigger.json");
        atomic_write(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Assets/Editor/BuildScript.cs");
        atomic_write(&path, b"data").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn atomic_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.json");
        atomic_write(&path, b"old").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn remove_if_present_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.cs");
        std::fs::write(&path, "x").unwrap();
        assert!(remove_if_present(&path).unwrap());
        assert!(!remove_if_present(&path).unwrap());
    }

    #[test]
    fn tail_lines_returns_last_n() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.log");
        let body: String = (1..=30).map(|i| format!("line {i}\n")).collect();
        std::fs::write(&path, body).unwrap();

        let tail = tail_lines(&path, 20).unwrap();
        assert_eq!(tail.len(), 20);
        assert_eq!(tail[0], "line 11");
        assert_eq!(tail[19], "line 30");
    }

    #[test]
    fn tail_lines_short_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.log");
        std::fs::write(&path, "only\n").unwrap();
        assert_eq!(tail_lines(&path, 20).unwrap(), vec!["only".to_string()]);
    }
}
