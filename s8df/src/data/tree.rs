//! Event input: SQLite event files and JSON-lines records.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use rusqlite::{params, Connection};
use s8core::data::event::{Event, FourMomentum, Jet, Muon, PrimaryVertex, Vertex};
use tracing::debug;

use crate::error::{DfError, Result};

pub const EVENT_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS jets (
    event_id INTEGER NOT NULL,
    idx INTEGER NOT NULL,
    px REAL NOT NULL,
    py REAL NOT NULL,
    pz REAL NOT NULL,
    e REAL NOT NULL,
    tche REAL NOT NULL,
    tchp REAL NOT NULL,
    flavour INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (event_id, idx)
);

CREATE TABLE IF NOT EXISTS muons (
    event_id INTEGER NOT NULL,
    idx INTEGER NOT NULL,
    px REAL NOT NULL,
    py REAL NOT NULL,
    pz REAL NOT NULL,
    e REAL NOT NULL,
    vx REAL NOT NULL,
    vy REAL NOT NULL,
    vz REAL NOT NULL,
    PRIMARY KEY (event_id, idx)
);

CREATE TABLE IF NOT EXISTS primary_vertices (
    event_id INTEGER NOT NULL,
    idx INTEGER NOT NULL,
    x REAL NOT NULL,
    y REAL NOT NULL,
    z REAL NOT NULL,
    PRIMARY KEY (event_id, idx)
);
"#;

/// Sequential source of events, in input order.
pub trait EventSource {
    // Total number of events in the input
    fn entries(&self) -> usize;
    // Next event, None once the input is exhausted
    fn next_event(&mut self) -> Option<Result<Event>>;
}

/// Events stored in an SQLite file, one row per event in `events` and one
/// row per object in `jets`, `muons` and `primary_vertices`.
#[derive(Debug)]
pub struct SqliteEventSource {
    pub connection: Connection,
    event_ids: Vec<i64>,
    position: usize,
}

impl SqliteEventSource {
    pub fn new(path: &Path) -> Result<Self> {
        let connection = Connection::open(path)?;

        let mut stmt = connection.prepare("SELECT id FROM events ORDER BY id")?;
        let ids_iter = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        let mut event_ids: Vec<i64> = Vec::new();
        for id in ids_iter {
            event_ids.push(id?);
        }
        drop(stmt);

        debug!(path = %path.display(), entries = event_ids.len(), "opened SQLite event file");
        Ok(Self { connection, event_ids, position: 0 })
    }

    pub fn read_jets(&self, event_id: i64) -> rusqlite::Result<Vec<Jet>> {
        let mut stmt = self.connection.prepare_cached(
            "SELECT px, py, pz, e, tche, tchp, flavour FROM jets WHERE event_id = ?1 ORDER BY idx",
        )?;
        let jets_iter = stmt.query_map(params![event_id], |row| {
            Ok(Jet::new(
                FourMomentum::new(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?),
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?;
        let mut jets = Vec::new();
        for jet in jets_iter {
            jets.push(jet?);
        }
        Ok(jets)
    }

    pub fn read_muons(&self, event_id: i64) -> rusqlite::Result<Vec<Muon>> {
        let mut stmt = self.connection.prepare_cached(
            "SELECT px, py, pz, e, vx, vy, vz FROM muons WHERE event_id = ?1 ORDER BY idx",
        )?;
        let muons_iter = stmt.query_map(params![event_id], |row| {
            Ok(Muon::new(
                FourMomentum::new(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?),
                Vertex::new(row.get(4)?, row.get(5)?, row.get(6)?),
            ))
        })?;
        let mut muons = Vec::new();
        for muon in muons_iter {
            muons.push(muon?);
        }
        Ok(muons)
    }

    pub fn read_primary_vertices(&self, event_id: i64) -> rusqlite::Result<Vec<PrimaryVertex>> {
        let mut stmt = self.connection.prepare_cached(
            "SELECT x, y, z FROM primary_vertices WHERE event_id = ?1 ORDER BY idx",
        )?;
        let vertices_iter = stmt.query_map(params![event_id], |row| {
            Ok(PrimaryVertex::new(Vertex::new(row.get(0)?, row.get(1)?, row.get(2)?)))
        })?;
        let mut vertices = Vec::new();
        for vertex in vertices_iter {
            vertices.push(vertex?);
        }
        Ok(vertices)
    }

    pub fn read_event(&self, event_id: i64) -> rusqlite::Result<Event> {
        Ok(Event::new(
            self.read_jets(event_id)?,
            self.read_muons(event_id)?,
            self.read_primary_vertices(event_id)?,
        ))
    }
}

impl EventSource for SqliteEventSource {
    fn entries(&self) -> usize {
        self.event_ids.len()
    }

    fn next_event(&mut self) -> Option<Result<Event>> {
        let event_id = *self.event_ids.get(self.position)?;
        self.position += 1;
        Some(self.read_event(event_id).map_err(DfError::from))
    }
}

/// One JSON encoded event per line; blank lines are ignored.
pub struct JsonLinesEventSource {
    lines: Lines<BufReader<File>>,
    entries: usize,
    line_number: usize,
}

impl JsonLinesEventSource {
    pub fn new(path: &Path) -> Result<Self> {
        let mut entries = 0;
        for line in BufReader::new(File::open(path)?).lines() {
            if !line?.trim().is_empty() {
                entries += 1;
            }
        }

        let lines = BufReader::new(File::open(path)?).lines();
        debug!(path = %path.display(), entries, "opened JSON-lines event file");
        Ok(Self { lines, entries, line_number: 0 })
    }
}

impl EventSource for JsonLinesEventSource {
    fn entries(&self) -> usize {
        self.entries
    }

    fn next_event(&mut self) -> Option<Result<Event>> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(DfError::from(e))),
            };
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let line_number = self.line_number;
            return Some(
                serde_json::from_str(&line)
                    .map_err(|e| DfError::Input(format!("line {}: {}", line_number, e))),
            );
        }
    }
}

/// Opens an event file, choosing the reader from the extension:
/// `.jsonl` and `.json` are JSON lines, anything else is SQLite.
pub fn open_event_source(path: &Path) -> Result<Box<dyn EventSource>> {
    if !path.is_file() {
        return Err(DfError::Input(format!("input file {} does not exist", path.display())));
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("jsonl") | Some("json") => Ok(Box::new(JsonLinesEventSource::new(path)?)),
        _ => Ok(Box::new(SqliteEventSource::new(path)?)),
    }
}

/// Writes events into a new SQLite event file; ids follow the slice order.
pub fn write_events(path: &Path, events: &[Event]) -> Result<()> {
    let mut connection = Connection::open(path)?;
    connection.execute_batch(EVENT_SCHEMA_SQL)?;

    let tx = connection.transaction()?;
    for (event_id, event) in events.iter().enumerate() {
        let event_id = event_id as i64;
        tx.execute("INSERT INTO events (id) VALUES (?1)", params![event_id])?;
        for (idx, jet) in event.jets.iter().enumerate() {
            tx.execute(
                "INSERT INTO jets (event_id, idx, px, py, pz, e, tche, tchp, flavour)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![event_id, idx as i64, jet.p4.px, jet.p4.py, jet.p4.pz, jet.p4.e, jet.tche, jet.tchp, jet.flavour],
            )?;
        }
        for (idx, muon) in event.muons.iter().enumerate() {
            tx.execute(
                "INSERT INTO muons (event_id, idx, px, py, pz, e, vx, vy, vz)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![event_id, idx as i64, muon.p4.px, muon.p4.py, muon.p4.pz, muon.p4.e, muon.vertex.x, muon.vertex.y, muon.vertex.z],
            )?;
        }
        for (idx, pv) in event.primary_vertices.iter().enumerate() {
            tx.execute(
                "INSERT INTO primary_vertices (event_id, idx, x, y, z) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![event_id, idx as i64, pv.vertex.x, pv.vertex.y, pv.vertex.z],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_events() -> Vec<Event> {
        let jet = |px: f64, py: f64, flavour: i32| {
            Jet::new(FourMomentum::new(px, py, 0.5, 120.0), 2.25, 1.5, flavour)
        };
        vec![
            Event::new(
                vec![jet(100.0, 0.0, 5), jet(-40.0, 8.0, 21)],
                vec![Muon::new(FourMomentum::new(10.0, 1.0, 1.0, 10.5), Vertex::new(0.0, 0.0, 0.25))],
                vec![PrimaryVertex::new(Vertex::new(0.0, 0.0, 0.125)), PrimaryVertex::new(Vertex::new(0.0, 0.0, 4.0))],
            ),
            Event::default(),
            Event::new(vec![jet(30.0, 1.0, 0)], Vec::new(), Vec::new()),
        ]
    }

    fn drain(source: &mut dyn EventSource) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = source.next_event() {
            events.push(event.unwrap());
        }
        events
    }

    #[test]
    fn test_sqlite_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.db");
        let events = sample_events();
        write_events(&path, &events).unwrap();

        let mut source = open_event_source(&path).unwrap();
        assert_eq!(source.entries(), 3);
        assert_eq!(drain(source.as_mut()), events);
        assert!(source.next_event().is_none());
    }

    #[test]
    fn test_json_lines_skip_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let events = sample_events();
        let mut file = File::create(&path).unwrap();
        for event in &events {
            writeln!(file, "{}", serde_json::to_string(event).unwrap()).unwrap();
            writeln!(file).unwrap();
        }
        drop(file);

        let mut source = open_event_source(&path).unwrap();
        assert_eq!(source.entries(), 3);
        assert_eq!(drain(source.as_mut()), events);
    }

    #[test]
    fn test_json_lines_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jsonl");
        std::fs::write(&path, "{}\nnot json\n").unwrap();

        let mut source = open_event_source(&path).unwrap();
        assert!(source.next_event().unwrap().is_ok());
        match source.next_event() {
            Some(Err(DfError::Input(message))) => assert!(message.starts_with("line 2")),
            other => panic!("expected input error, got {:?}", other.map(|r| r.is_ok())),
        }
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_event_source(&dir.path().join("missing.db"));
        assert!(matches!(result, Err(DfError::Input(_))));
    }
}
