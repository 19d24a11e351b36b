//! Locating the protoc executable.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CompilerError, CompilerResult};

/// Environment variable conventionally naming the protoc executable.
pub const PROTOC_ENV: &str = "PROTOC";

/// Finds the protoc executable.
///
/// Search order:
///
/// 1. `configured`, when it exists
/// 2. The `PROTOC` environment variable
/// 3. `protoc` on `PATH`
/// 4. Common installation locations (platform-specific)
///
/// The returned path is absolute. The compiler later runs with a workspace
/// as its working directory, where a relative path would no longer resolve.
pub fn find_protoc(configured: Option<&Path>) -> CompilerResult<PathBuf> {
    // Check config override first
    if let Some(path) = configured {
        if let Some(found) = existing_absolute(path) {
            return Ok(found);
        }
        warn!(path = %path.display(), "configured protoc path does not exist; searching");
    }

    // Check PROTOC environment variable
    if let Some(path) = std::env::var_os(PROTOC_ENV).map(PathBuf::from) {
        if let Some(found) = existing_absolute(&path) {
            debug!(path = %found.display(), "using protoc from {}", PROTOC_ENV);
            return Ok(found);
        }
    }

    // Try to find protoc in PATH
    if let Ok(path) = which::which("protoc") {
        debug!(path = %path.display(), "using protoc from PATH");
        return Ok(path);
    }

    common_install_paths()
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
        .ok_or(CompilerError::CompilerNotFound)
}

/// Resolves `path` against the current directory, if it exists.
fn existing_absolute(path: &Path) -> Option<PathBuf> {
    path.canonicalize().ok()
}

fn common_install_paths() -> Vec<&'static str> {
    if cfg!(windows) {
        vec![
            "C:\\Program Files\\protoc\\bin\\protoc.exe",
            "C:\\protoc\\bin\\protoc.exe",
        ]
    } else if cfg!(target_os = "macos") {
        vec!["/opt/homebrew/bin/protoc", "/usr/local/bin/protoc"]
    } else {
        vec!["/usr/bin/protoc", "/usr/local/bin/protoc", "/snap/bin/protoc"]
    }
}
