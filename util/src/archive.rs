//! Struct archiving functionality
//!
//! Cyclic data is archived as timestamped CSV files inside the session's
//! archive directory, one file per archived item.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
pub struct Archiver<W: io::Write = File> {
    writer: Writer<W>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CreateError(io::Error),

    #[error("Cannot write the archive record: {0}")]
    WriteError(#[from] csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(io::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived.
///
/// Implementors own one `Archiver` per archived item and write the current
/// value of each item when `write` is called, normally once per cycle.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver<File> {
    /// Create an archive file at `path`, relative to the session's archive
    /// root, truncating any existing file.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        let session_path = session.arch_path(path);

        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent).map_err(ArchiveError::CreateError)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(session_path)
            .map_err(ArchiveError::CreateError)?;

        Ok(Self::from_writer(file))
    }
}

impl<W: io::Write> Archiver<W> {
    /// Create an archiver over any writer.
    pub fn from_writer(inner: W) -> Self {
        Self {
            writer: WriterBuilder::new().has_headers(true).from_writer(inner),
        }
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        self.writer.serialize(record)?;
        self.writer.flush().map_err(ArchiveError::FlushError)
    }

    /// Consume the archiver and return the underlying writer.
    pub fn into_inner(self) -> Result<W, ArchiveError> {
        self.writer.into_inner().map_err(|e| {
            ArchiveError::FlushError(io::Error::new(e.error().kind(), e.error().to_string()))
        })
    }
}
