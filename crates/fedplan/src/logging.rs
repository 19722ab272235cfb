use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file name inside the data directory
pub const LOG_FILE_NAME: &str = "fedplan.log";
const ROTATED_MARKER: &[u8] = b"--- earlier entries trimmed ---\n";

/// Size limits for the log file
#[derive(Debug, Clone, Copy)]
struct Rotation {
    /// Trim once the file grows past this many bytes
    max_bytes: u64,
    /// Bytes of recent history kept after trimming
    keep_bytes: u64,
}

impl Default for Rotation {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            keep_bytes: 1024 * 1024,
        }
    }
}

impl Rotation {
    /// Trim `path` to its newest whole lines when it is over the limit. Returns whether the
    /// file was rewritten.
    fn apply(self, path: &Path) -> std::io::Result<bool> {
        let len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        if len <= self.max_bytes {
            return Ok(false);
        }

        let mut tail = Vec::new();
        {
            let mut file = File::open(path)?;
            file.seek(SeekFrom::Start(len.saturating_sub(self.keep_bytes)))?;
            file.read_to_end(&mut tail)?;
        }
        let first_whole_line = tail
            .iter()
            .position(|&b| b == b'\n')
            .map_or(0, |newline| newline + 1);

        let mut file = File::create(path)?;
        file.write_all(ROTATED_MARKER)?;
        file.write_all(&tail[first_whole_line..])?;
        Ok(true)
    }
}

/// Produces writers that share one open log file
#[derive(Clone)]
struct LogWriterFactory {
    file: Arc<Mutex<File>>,
}

struct LogWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.file.lock() {
            Ok(mut file) => file.write(buf),
            // A panicked writer leaves the file usable; keep logging
            Err(poisoned) => poisoned.into_inner().write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.file.lock() {
            Ok(mut file) => file.flush(),
            Err(poisoned) => poisoned.into_inner().flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            file: self.file.clone(),
        }
    }
}

/// Default filter when `RUST_LOG` is unset
fn default_filter(level: &str) -> String {
    format!("fedplan={level},fedplan_core=warn")
}

/// Open (rotating first if needed) the log file under `data_dir`.
fn open_log_file(data_dir: &Path) -> std::io::Result<(PathBuf, File)> {
    fs::create_dir_all(data_dir)?;
    let log_path = data_dir.join(LOG_FILE_NAME);

    if let Err(e) = Rotation::default().apply(&log_path) {
        eprintln!("Warning: could not trim {}: {e}", log_path.display());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    Ok((log_path, file))
}

/// Initialize logging to write to a file in the data directory.
///
/// Logs are written to `{data_dir}/fedplan.log` with size-based rotation.
/// When the log exceeds 5MB, older entries are removed keeping only the last 1MB.
/// The log level can be controlled via the `level` parameter or the `RUST_LOG` environment variable.
pub fn init_logging(data_dir: &Path, level: &str) -> color_eyre::Result<()> {
    let (log_path, file) = open_log_file(data_dir)?;
    let writer_factory = LogWriterFactory {
        file: Arc::new(Mutex::new(file)),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer_factory)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    tracing::info!(
        pid = std::process::id(),
        "FedPlan logging initialized (log_path={})",
        log_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rotation_keeps_recent_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(LOG_FILE_NAME);
        let content: String = (0..100).map(|i| format!("line {i:03}\n")).collect();
        fs::write(&path, &content).unwrap();

        let small = Rotation {
            max_bytes: 500,
            keep_bytes: 100,
        };
        assert!(small.apply(&path).unwrap());

        let rotated = fs::read_to_string(&path).unwrap();
        assert!(rotated.starts_with("--- earlier entries trimmed"));
        assert!(rotated.ends_with("line 099\n"));
        assert!(!rotated.contains("line 000"));
        // Partial first line is dropped
        for line in rotated.lines().skip(1) {
            assert!(line.starts_with("line "), "unexpected line {line:?}");
        }
    }

    #[test]
    fn test_small_log_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(LOG_FILE_NAME);
        fs::write(&path, "short\n").unwrap();

        let small = Rotation {
            max_bytes: 500,
            keep_bytes: 100,
        };
        assert!(!small.apply(&path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "short\n");
        assert!(!small.apply(&temp_dir.path().join("missing.log")).unwrap());
    }

    #[test]
    fn test_open_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("nested").join(".fedplan");
        let (path, _file) = open_log_file(&data_dir).unwrap();
        assert!(path.exists());
        assert_eq!(path, data_dir.join(LOG_FILE_NAME));
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter("debug"), "fedplan=debug,fedplan_core=warn");
    }
}
