//! Histogram output: an SQLite file with named directories.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use s8core::data::histogram::Histogram2D;
use s8core::plots::plot_group::HistogramSink;
use tracing::debug;

use crate::error::{DfError, Result};

pub const OUTPUT_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS directories (
    name TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS histograms (
    directory TEXT NOT NULL,
    name TEXT NOT NULL,
    title TEXT NOT NULL,
    x_edges TEXT NOT NULL,
    y_edges TEXT NOT NULL,
    contents TEXT NOT NULL,
    entries INTEGER NOT NULL,
    PRIMARY KEY (directory, name)
);
"#;

#[derive(Debug)]
pub struct OutputFile {
    pub connection: Connection,
    pub path: PathBuf,
}

impl OutputFile {
    /// Creates a fresh output file, replacing any existing one.
    pub fn recreate(path: &Path) -> Result<Self> {
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| {
                DfError::Output(format!("failed to replace output file {}: {}", path.display(), e))
            })?;
        }

        let connection = Connection::open(path)
            .and_then(|connection| {
                connection.execute_batch(OUTPUT_SCHEMA_SQL)?;
                Ok(connection)
            })
            .map_err(|e| {
                DfError::Output(format!("failed to open output file {}: {}", path.display(), e))
            })?;

        debug!(path = %path.display(), "output file created");
        Ok(Self { connection, path: path.to_path_buf() })
    }

    /// Creates (or reuses) a named directory and returns a sink writing into it.
    pub fn mkdir(&self, name: &str) -> Result<OutputDirectory<'_>> {
        if name.is_empty() {
            return Err(DfError::Output("failed to create subfolder: empty name".to_string()));
        }
        self.connection
            .execute("INSERT OR IGNORE INTO directories (name) VALUES (?1)", params![name])
            .map_err(|e| DfError::Output(format!("failed to create subfolder {}: {}", name, e)))?;

        Ok(OutputDirectory { connection: &self.connection, name: name.to_string() })
    }
}

/// A directory of an output file. Writing a histogram twice replaces it.
pub struct OutputDirectory<'a> {
    connection: &'a Connection,
    name: String,
}

impl<'a> OutputDirectory<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, histogram: &Histogram2D) -> Result<()> {
        self.connection.execute(
            "INSERT OR REPLACE INTO histograms
             (directory, name, title, x_edges, y_edges, contents, entries)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                self.name,
                histogram.name,
                histogram.title,
                serde_json::to_string(&histogram.x_edges)?,
                serde_json::to_string(&histogram.y_edges)?,
                serde_json::to_string(&histogram.contents)?,
                histogram.entries as i64,
            ],
        )?;
        Ok(())
    }
}

impl<'a> HistogramSink for OutputDirectory<'a> {
    fn write(&mut self, histogram: &Histogram2D) -> s8core::Result<()> {
        debug!(directory = %self.name, histogram = %histogram.name, "writing histogram");
        self.insert(histogram).map_err(|e| s8core::Error::Output(Box::new(e)))
    }
}

fn json_column<T: serde::de::DeserializeOwned>(text: &str, column: usize) -> rusqlite::Result<T> {
    serde_json::from_str(text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

// readback never creates a missing file
fn open_read_only(path: &Path) -> Result<Connection> {
    Ok(Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?)
}

/// Reads one histogram back from an output file.
pub fn read_histogram(path: &Path, directory: &str, name: &str) -> Result<Option<Histogram2D>> {
    let connection = open_read_only(path)?;
    let histogram = connection
        .query_row(
            "SELECT name, title, x_edges, y_edges, contents, entries
             FROM histograms WHERE directory = ?1 AND name = ?2",
            params![directory, name],
            |row| {
                let x_edges: String = row.get(2)?;
                let y_edges: String = row.get(3)?;
                let contents: String = row.get(4)?;
                let entries: i64 = row.get(5)?;
                Ok(Histogram2D {
                    name: row.get(0)?,
                    title: row.get(1)?,
                    x_edges: json_column(&x_edges, 2)?,
                    y_edges: json_column(&y_edges, 3)?,
                    contents: json_column(&contents, 4)?,
                    entries: entries as u64,
                })
            },
        )
        .optional()?;
    Ok(histogram)
}

/// Names of the histograms stored in a directory, in write order.
pub fn list_histograms(path: &Path, directory: &str) -> Result<Vec<String>> {
    let connection = open_read_only(path)?;
    let mut stmt = connection
        .prepare("SELECT name FROM histograms WHERE directory = ?1 ORDER BY rowid")?;
    let names_iter = stmt.query_map(params![directory], |row| row.get::<_, String>(0))?;
    let mut names = Vec::new();
    for name in names_iter {
        names.push(name?);
    }
    Ok(names)
}

/// Names of the directories of an output file.
pub fn list_directories(path: &Path) -> Result<Vec<String>> {
    let connection = open_read_only(path)?;
    let mut stmt = connection.prepare("SELECT name FROM directories ORDER BY name")?;
    let names_iter = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut names = Vec::new();
    for name in names_iter {
        names.push(name?);
    }
    Ok(names)
}
