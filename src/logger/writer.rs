//! Log sinks
//!
//! Access and error lines go to stdout/stderr or to append-mode files. The
//! writer is process-global and set once by [`init`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

enum Sink {
    Stdout,
    Stderr,
    /// Line-buffered so concurrent writers never interleave within a line
    File(Mutex<LineWriter<File>>),
}

impl Sink {
    fn from_path(path: Option<&str>, console: Self) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(console);
        };
        let path = Path::new(path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::File(Mutex::new(LineWriter::new(file))))
    }

    fn line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                // A poisoned lock or a full disk must not take a request down
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

pub struct LogWriter {
    access: Sink,
    error: Sink,
    debug: bool,
}

impl LogWriter {
    fn open(access_file: Option<&str>, error_file: Option<&str>, level: &str) -> io::Result<Self> {
        Ok(Self {
            access: Sink::from_path(access_file, Sink::Stdout)?,
            error: Sink::from_path(error_file, Sink::Stderr)?,
            debug: matches!(level.to_ascii_lowercase().as_str(), "debug" | "trace"),
        })
    }

    pub fn write_access(&self, message: &str) {
        self.access.line(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.line(message);
    }

    /// Lifecycle and debug lines share the access sink
    pub fn write_info(&self, message: &str) {
        self.access.line(message);
    }

    pub const fn debug_enabled(&self) -> bool {
        self.debug
    }
}

/// Open the configured sinks; fails if a log file cannot be opened or the
/// writer was already set.
pub fn init(access_file: Option<&str>, error_file: Option<&str>, level: &str) -> io::Result<()> {
    let writer = LogWriter::open(access_file, error_file, level)?;
    LOG_WRITER
        .set(writer)
        .map_err(|_| io::Error::new(io::ErrorKind::AlreadyExists, "logger already initialized"))
}

/// The global writer, if [`init`] has run
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
