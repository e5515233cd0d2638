//! The append-only CSV log a run writes into.
//!
//! Layout: a `# meta` line echoing the session, a header row, then one row per
//! sample. Every row is flushed as soon as it is written so an interrupted run
//! leaves a readable file behind.

use std::{
    fs::{self, File},
    io::{self, Write},
    iter,
    path::{Path, PathBuf},
};

use log::warn;

use crate::{channel::ChannelSet, error::Error, sample::Sample, session::Session};

/// Name of the time column.
pub const TIME_COLUMN: &str = "t_s";

const META_PREFIX: &str = "# meta,";

/// Open output log owned by a single run.
pub struct OutputLog {
    path: PathBuf,
    channels: ChannelSet,
    writer: csv::Writer<File>,
    rows: u64,
}

impl OutputLog {
    /// Create the log and write its meta line and header.
    ///
    /// An existing file at the session's path is replaced. If the preamble cannot be
    /// written the half-created file is removed again.
    /// # Errors
    /// will return `Err` if the file cannot be created or written
    pub fn create(session: &Session, channels: ChannelSet) -> Result<Self, Error> {
        let path = session.output_path().to_path_buf();
        let file = File::create(&path).map_err(|source| Error::OutputOpen {
            path: path.clone(),
            source,
        })?;

        match preamble(file, &path, session, channels) {
            Ok(writer) => Ok(Self {
                path,
                channels,
                writer,
                rows: 0,
            }),
            Err(e) => {
                if let Err(rm) = fs::remove_file(&path) {
                    warn!("could not remove partial log {}: {rm}", path.display());
                }
                Err(e)
            }
        }
    }

    /// Append one sample and flush it to disk.
    /// # Errors
    /// will return `Err` if the row cannot be written
    pub fn append(&mut self, sample: &Sample) -> Result<(), Error> {
        let record = iter::once(sample.t_s()).chain(sample.cells(self.channels));
        self.writer
            .write_record(record)
            .map_err(|source| Error::OutputWrite {
                path: self.path.clone(),
                source,
            })?;
        self.writer.flush().map_err(|source| self.io_error(source))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows appended so far.
    #[must_use]
    pub const fn rows(&self) -> u64 {
        self.rows
    }

    /// Path of the log.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, sync and close the log.
    /// # Errors
    /// will return `Err` if the final flush or sync fails
    pub fn finish(mut self) -> Result<u64, Error> {
        self.writer.flush().map_err(|source| self.io_error(source))?;
        let path = self.path;
        let file = self.writer.into_inner().map_err(|e| Error::OutputIo {
            source: io::Error::new(e.error().kind(), e.to_string()),
            path: path.clone(),
        })?;
        file.sync_all()
            .map_err(|source| Error::OutputIo { path, source })?;
        Ok(self.rows)
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::OutputIo {
            path: self.path.clone(),
            source,
        }
    }
}

fn preamble(
    mut file: File,
    path: &Path,
    session: &Session,
    channels: ChannelSet,
) -> Result<csv::Writer<File>, Error> {
    let io_error = |source: io::Error| Error::OutputIo {
        path: path.to_path_buf(),
        source,
    };

    writeln!(file, "{}", session.meta_line()).map_err(io_error)?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(header(channels))
        .map_err(|source| Error::OutputWrite {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(io_error)?;
    Ok(writer)
}

/// Header row for a log of `channels`.
#[must_use]
pub fn header(channels: ChannelSet) -> Vec<&'static str> {
    iter::once(TIME_COLUMN)
        .chain(channels.channels().map(|c| c.name()))
        .collect()
}

/// A log read back from disk.
#[derive(Debug, Clone)]
pub struct LoggedRun {
    /// `key=value` pairs from the meta line, in order.
    pub meta: Vec<(String, String)>,
    /// Header row.
    pub columns: Vec<String>,
    /// Data rows.
    pub rows: Vec<csv::StringRecord>,
}

impl LoggedRun {
    /// Meta value for `key`.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Values of column `name`, one per row. Empty or unparsable cells are `None`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).and_then(|cell| cell.parse().ok()))
                .collect(),
        )
    }

    /// The `t_s` column.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        self.column(TIME_COLUMN)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Read a log written by [`OutputLog`].
/// # Errors
/// will return `Err` if the file cannot be read or lacks the meta line or header
pub fn read_log(path: impl AsRef<Path>) -> Result<LoggedRun, Error> {
    let path = path.as_ref();
    let malformed = |reason: String| Error::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let text = fs::read_to_string(path).map_err(|source| Error::OutputIo {
        path: path.to_path_buf(),
        source,
    })?;
    let (first, rest) = text.split_once('\n').unwrap_or((text.as_str(), ""));
    let meta = first
        .strip_prefix(META_PREFIX)
        .ok_or_else(|| malformed("missing `# meta` line".to_string()))?
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut reader = csv::Reader::from_reader(rest.as_bytes());
    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(e.to_string()))?
        .iter()
        .map(String::from)
        .collect();
    if columns.first().map(String::as_str) != Some(TIME_COLUMN) {
        return Err(malformed(format!("header must start with `{TIME_COLUMN}`")));
    }
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| malformed(e.to_string()))?;

    Ok(LoggedRun {
        meta,
        columns,
        rows,
    })
}
