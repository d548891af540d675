//! Data directory layout.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RAGDESK_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `RAGDESK_DATA_DIR` environment variable
/// 2. `~/.ragdesk`
/// 3. `./.ragdesk`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".ragdesk");
    }

    PathBuf::from(".ragdesk")
}

/// Directory holding the persisted session entries.
pub fn profile_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("profile")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_dir() {
        assert_eq!(
            profile_dir(Path::new("/home/user/.ragdesk")),
            PathBuf::from("/home/user/.ragdesk/profile")
        );
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/tmp/test-ragdesk");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-ragdesk"));
        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
        }
    }
}
