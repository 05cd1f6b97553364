use log::LevelFilter;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "suggest";
const LOG_FILE_NAME: &str = "suggest.log";

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// `$XDG_CACHE_HOME/suggest`, falling back to the platform cache directory.
fn cache_dir() -> Option<PathBuf> {
    match std::env::var("XDG_CACHE_HOME") {
        Ok(xdg_cache_home) if !xdg_cache_home.is_empty() => {
            Some(PathBuf::from(xdg_cache_home).join(APP_NAME))
        }
        _ => dirs::cache_dir().map(|cache| cache.join(APP_NAME)),
    }
}

pub fn log_file(file_override: Option<&Path>) -> Option<PathBuf> {
    file_override
        .map(Path::to_path_buf)
        .or_else(|| cache_dir().map(|dir| dir.join(LOG_FILE_NAME)))
}

/// Install the file logger. Logs go to a file so they never interleave with
/// the terminal UI; `off` installs nothing.
pub fn setup_logging(level: LevelFilter, file_override: Option<&Path>) -> anyhow::Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    let path = log_file(file_override)
        .ok_or_else(|| anyhow::anyhow!("Unable to determine a log file location"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // 10MB per file, 5 rolled files
    simple_log::file(path.to_string_lossy().into_owned(), level, 10, 5)
        .map_err(|e| anyhow::anyhow!(e))?;
    log::info!("logging to {} (level={level})", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_prefers_override() {
        let path = Path::new("/tmp/suggest-test.log");
        assert_eq!(log_file(Some(path)), Some(path.to_path_buf()));
    }

    #[test]
    fn log_file_under_xdg_cache() {
        let dir = tempfile::tempdir().unwrap();
        unsafe { std::env::set_var("XDG_CACHE_HOME", dir.path()) };
        let result = log_file(None);
        unsafe { std::env::remove_var("XDG_CACHE_HOME") };

        assert_eq!(result, Some(dir.path().join(APP_NAME).join(LOG_FILE_NAME)));
    }

    #[test]
    fn off_installs_nothing() {
        assert!(setup_logging(LevelFilter::Off, None).is_ok());
    }
}
