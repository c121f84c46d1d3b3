use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_DIR_VAR: &str = "CHATBOT_LOG_DIR";
const LOG_FILE_NAME: &str = "chatbot.log";
const DEFAULT_FILTER: &str = "chatbot=info,chatbot_core=info";

/// `$CHATBOT_LOG_DIR`, else the platform's local data dir
pub fn log_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(LOG_DIR_VAR) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_local_dir()
        .map(|p| p.join("chatbot"))
        .ok_or_else(|| anyhow!("Could not determine data directory"))
}

pub fn open_log_file(dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Route `tracing` output to the log file. The terminal belongs to the UI,
/// so nothing is written to stdout or stderr.
pub fn init(dir: &Path) -> Result<PathBuf> {
    let (path, file) = open_log_file(dir)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn creates_nested_dir_and_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("b");

        let (path, mut file) = open_log_file(&dir).unwrap();
        writeln!(file, "first").unwrap();
        drop(file);

        let (_, mut file) = open_log_file(&dir).unwrap();
        writeln!(file, "second").unwrap();
        drop(file);

        assert_eq!(path, dir.join(LOG_FILE_NAME));
        assert_eq!(fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }
}
