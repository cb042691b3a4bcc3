//! Trace input for policy simulation
//!
//! Reads cache request traces from CSV files with the columns
//! `timestamp,key,size,cost`. The header row is optional and the `cost`
//! column may be omitted, in which case every request costs 1.0. Requests are
//! streamed one at a time so memory stays proportional to the cache, not the
//! trace.

use crate::models::Request;
use coconut_policy::attributes::DEFAULT_COST;
use coconut_policy::ConfigError;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised while setting up a simulation or reading its trace
#[derive(Debug)]
pub enum TraceError {
    Io(io::Error),
    Csv(csv::Error),
    Config(ConfigError),
    Parse {
        file: PathBuf,
        line: u64,
        message: String,
    },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Io(err) => write!(f, "I/O error: {err}"),
            TraceError::Csv(err) => write!(f, "CSV error: {err}"),
            TraceError::Config(err) => write!(f, "configuration error: {err}"),
            TraceError::Parse {
                file,
                line,
                message,
            } => write!(f, "{}:{line}: {message}", file.display()),
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Io(err) => Some(err),
            TraceError::Csv(err) => Some(err),
            TraceError::Config(err) => Some(err),
            TraceError::Parse { .. } => None,
        }
    }
}

impl From<io::Error> for TraceError {
    fn from(err: io::Error) -> Self {
        TraceError::Io(err)
    }
}

impl From<ConfigError> for TraceError {
    fn from(err: ConfigError) -> Self {
        TraceError::Config(err)
    }
}

impl From<csv::Error> for TraceError {
    fn from(err: csv::Error) -> Self {
        TraceError::Csv(err)
    }
}

/// Reader for request traces stored in a directory
pub struct TraceReader {
    input_dir: PathBuf,
}

impl TraceReader {
    /// Create a new reader for the given input directory
    pub fn new<P: AsRef<Path>>(input_dir: P) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
        }
    }

    /// Get all trace files in the input directory, sorted by name
    pub fn trace_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.input_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(ext) = path.extension() {
                if ext == "csv" || ext == "log" || ext == "txt" {
                    files.push(path);
                }
            }
        }

        // Sort files by name for consistent ordering
        files.sort();
        Ok(files)
    }

    /// Create a streaming iterator over all requests in all trace files.
    pub fn stream_requests(&self) -> Result<RequestIterator, TraceError> {
        Ok(RequestIterator::new(self.trace_files()?))
    }
}

/// Iterator that streams requests from multiple trace files
pub struct RequestIterator {
    files: Vec<PathBuf>,
    next_file: usize,
    current: Option<(PathBuf, csv::Reader<File>)>,
    record: csv::StringRecord,
}

impl RequestIterator {
    fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            next_file: 0,
            current: None,
            record: csv::StringRecord::new(),
        }
    }

    fn open(path: &Path) -> Result<csv::Reader<File>, csv::Error> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)
    }
}

/// Parses one record. Returns `Ok(None)` for a header row.
pub fn parse_record(record: &csv::StringRecord) -> Result<Option<Request>, String> {
    let field = |i: usize, name: &str| {
        record
            .get(i)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("missing {name}"))
    };

    let timestamp = field(0, "timestamp")?;
    if timestamp.eq_ignore_ascii_case("timestamp") {
        return Ok(None);
    }
    let timestamp = timestamp
        .parse::<u64>()
        .map_err(|_| format!("invalid timestamp: {timestamp}"))?;

    let key = field(1, "key")?;

    let size = field(2, "size")?;
    let size = size
        .parse::<u64>()
        .map_err(|_| format!("invalid size: {size}"))?;

    let cost = match record.get(3).filter(|s| !s.is_empty()) {
        Some(cost) => cost
            .parse::<f64>()
            .map_err(|_| format!("invalid cost: {cost}"))?,
        None => DEFAULT_COST,
    };

    Ok(Some(Request::new(timestamp, key, size, cost)))
}

impl Iterator for RequestIterator {
    type Item = Result<Request, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let path = self.files.get(self.next_file)?.clone();
                self.next_file += 1;
                match Self::open(&path) {
                    Ok(reader) => self.current = Some((path, reader)),
                    Err(err) => return Some(Err(err.into())),
                }
            }

            let (path, reader) = self.current.as_mut()?;
            match reader.read_record(&mut self.record) {
                Ok(false) => {
                    // EOF on current file, move to next
                    self.current = None;
                }
                Ok(true) => match parse_record(&self.record) {
                    Ok(Some(request)) => return Some(Ok(request)),
                    Ok(None) => continue,
                    Err(message) => {
                        let line = self.record.position().map_or(0, |p| p.line());
                        return Some(Err(TraceError::Parse {
                            file: path.clone(),
                            line,
                            message,
                        }));
                    }
                },
                Err(err) => return Some(Err(err.into())),
            }
        }
    }
}
