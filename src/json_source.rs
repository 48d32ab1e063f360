//! NDJSON-backed trace source
//!
//! Reference [`TraceSource`] implementation: reads events that a CTF decoder
//! has already flattened to one JSON object per line, stored as
//! `events.json` next to the trace's `metadata` marker. Binary CTF decoding
//! stays outside this crate; this source covers decoder dumps and tests.
//!
//! Events from every discovered trace directory are merged into a single
//! time-ordered sequence, and the declared catalogue is derived from the
//! first occurrence of each event name.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::source::{
    find_trace_dirs, EventDecl, FieldValue, SourceStep, TraceEvent, TraceSource,
};

/// File holding the decoded event stream inside a trace directory
pub const EVENTS_FILE: &str = "events.json";

/// On-disk shape of one decoded event
#[derive(Debug, Deserialize)]
struct WireEvent {
    name: String,
    #[serde(default)]
    cpu_id: u32,
    #[serde(default)]
    packet_begin: u64,
    #[serde(default)]
    packet_end: u64,
    timestamp: u64,
    #[serde(default)]
    id: u64,
    #[serde(default)]
    extended_id: Option<u64>,
    #[serde(default)]
    fields: HashMap<String, serde_json::Value>,
    #[serde(default)]
    lost_events: u64,
}

fn field_from_json(value: serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(FieldValue::Unsigned(u))
            } else {
                n.as_i64().map(FieldValue::Signed)
            }
        }
        serde_json::Value::String(s) => Some(FieldValue::Text(s)),
        _ => None,
    }
}

impl WireEvent {
    fn into_event(self) -> TraceEvent {
        let mut fields = HashMap::with_capacity(self.fields.len());
        for (name, value) in self.fields {
            match field_from_json(value) {
                Some(v) => {
                    fields.insert(name, v);
                }
                None => warn!(event = %self.name, field = %name, "unsupported field type, dropped"),
            }
        }
        TraceEvent {
            name: self.name,
            cpu_id: self.cpu_id,
            packet_begin_ns: self.packet_begin,
            packet_end_ns: self.packet_end,
            timestamp_ns: self.timestamp,
            raw_id: self.id,
            extended_id: self.extended_id,
            fields,
            lost_events: self.lost_events,
        }
    }
}

/// In-memory, restartable event sequence loaded from NDJSON dumps
#[derive(Debug, Default)]
pub struct JsonTraceSource {
    events: Vec<TraceEvent>,
    decls: Vec<EventDecl>,
    pos: usize,
}

impl JsonTraceSource {
    /// Load the event stream of a single trace directory
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(EVENTS_FILE);
        let file = File::open(&path)
            .with_context(|| format!("cannot open event stream `{}`", path.display()))?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line
                .with_context(|| format!("read error in `{}` line {}", path.display(), lineno + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let wire: WireEvent = serde_json::from_str(&line).with_context(|| {
                format!("malformed event in `{}` line {}", path.display(), lineno + 1)
            })?;
            events.push(wire.into_event());
        }
        debug!(trace = %dir.display(), count = events.len(), "loaded event stream");
        Ok(Self::from_events(events))
    }

    /// Discover every trace directory under `root` (metadata-marker gated)
    /// and merge their streams into one time-ordered sequence. A directory
    /// that fails to open is warned about and skipped; it is an error only
    /// when no trace opens at all.
    pub fn open_tree(root: &Path) -> Result<Self> {
        let dirs = find_trace_dirs(root)?;
        let mut merged: Vec<TraceEvent> = Vec::new();
        let mut opened = 0usize;
        for dir in &dirs {
            match Self::open(dir) {
                Ok(source) => {
                    merged.extend(source.events);
                    opened += 1;
                }
                Err(err) => {
                    warn!(trace = %dir.display(), %err, "cannot open trace, skipping");
                }
            }
        }
        if opened == 0 {
            bail!("no readable trace found under `{}`", root.display());
        }
        merged.sort_by_key(|event| event.timestamp_ns);
        Ok(Self::from_events(merged))
    }

    /// Build a source from already-decoded events. The declared catalogue is
    /// derived from the first occurrence of each event name.
    pub fn from_events(events: Vec<TraceEvent>) -> Self {
        let mut decls: Vec<EventDecl> = Vec::new();
        for event in &events {
            if !decls.iter().any(|d| d.name == event.name) {
                decls.push(EventDecl {
                    id: event.extended_id.unwrap_or(event.raw_id),
                    name: event.name.clone(),
                });
            }
        }
        Self {
            events,
            decls,
            pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl TraceSource for JsonTraceSource {
    fn restart(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn next_event(&mut self) -> SourceStep {
        match self.events.get(self.pos) {
            Some(event) => {
                self.pos += 1;
                SourceStep::Event(event.clone())
            }
            None => SourceStep::End,
        }
    }

    fn declared_events(&self) -> &[EventDecl] {
        &self.decls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::METADATA_MARKER;
    use std::fs;
    use tempfile::TempDir;

    fn write_trace(dir: &Path, lines: &[&str]) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(METADATA_MARKER), "").unwrap();
        fs::write(dir.join(EVENTS_FILE), lines.join("\n")).unwrap();
    }

    #[test]
    fn test_open_parses_fields_and_order() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("kernel");
        write_trace(
            &dir,
            &[
                r#"{"name":"sched_switch","cpu_id":0,"timestamp":100,"id":3,"fields":{"_next_tid":42,"_next_comm":"worker","_prev_tid":0}}"#,
                r#"{"name":"softirq_entry","cpu_id":1,"timestamp":200,"id":7,"fields":{"_vec":2}}"#,
            ],
        );

        let mut source = JsonTraceSource::open(&dir).unwrap();
        assert_eq!(source.len(), 2);
        let first = match source.next_event() {
            SourceStep::Event(event) => event,
            other => panic!("expected event, got {:?}", other),
        };
        assert_eq!(first.name, "sched_switch");
        assert_eq!(first.field_i64("_next_tid"), Some(42));
        assert_eq!(first.field_str("_next_comm"), Some("worker"));
    }

    #[test]
    fn test_restart_rewinds_to_first_event() {
        let mut source = JsonTraceSource::from_events(vec![
            TraceEvent {
                name: "a".to_string(),
                timestamp_ns: 1,
                ..Default::default()
            },
            TraceEvent {
                name: "b".to_string(),
                timestamp_ns: 2,
                ..Default::default()
            },
        ]);
        while !matches!(source.next_event(), SourceStep::End) {}
        source.restart().unwrap();
        match source.next_event() {
            SourceStep::Event(event) => assert_eq!(event.name, "a"),
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn test_open_tree_merges_and_sorts_by_timestamp() {
        let tmp = TempDir::new().unwrap();
        write_trace(
            &tmp.path().join("cpu0"),
            &[r#"{"name":"late","timestamp":300}"#],
        );
        write_trace(
            &tmp.path().join("cpu1"),
            &[r#"{"name":"early","timestamp":100}"#],
        );

        let mut source = JsonTraceSource::open_tree(tmp.path()).unwrap();
        match source.next_event() {
            SourceStep::Event(event) => assert_eq!(event.name, "early"),
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn test_open_tree_skips_broken_trace_but_keeps_good_one() {
        let tmp = TempDir::new().unwrap();
        // candidate with a metadata marker but no event stream
        let broken = tmp.path().join("broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(METADATA_MARKER), "").unwrap();
        write_trace(
            &tmp.path().join("good"),
            &[r#"{"name":"ev","timestamp":10}"#],
        );

        let source = JsonTraceSource::open_tree(tmp.path()).unwrap();
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_open_tree_fails_when_nothing_opens() {
        let tmp = TempDir::new().unwrap();
        let broken = tmp.path().join("broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(METADATA_MARKER), "").unwrap();
        assert!(JsonTraceSource::open_tree(tmp.path()).is_err());
    }

    #[test]
    fn test_catalogue_keeps_first_occurrence_per_name() {
        let source = JsonTraceSource::from_events(vec![
            TraceEvent {
                name: "syscall_entry_read".to_string(),
                raw_id: 5,
                ..Default::default()
            },
            TraceEvent {
                name: "syscall_entry_read".to_string(),
                raw_id: 9,
                ..Default::default()
            },
        ]);
        assert_eq!(source.declared_events().len(), 1);
        assert_eq!(source.declared_events()[0].id, 5);
    }
}
