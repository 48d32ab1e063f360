//! Trace Event Source boundary and trace-directory discovery
//!
//! The converter never decodes a binary trace encoding itself: it consumes
//! already-decoded events through the [`TraceSource`] trait. A source hands
//! back one [`TraceEvent`] at a time, supports restarting from the beginning
//! (the converter performs two full traversals), and exposes the declared
//! event catalogue for the `.pcf` dictionary.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::warn;

/// A typed field value carried by an event
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

impl FieldValue {
    /// Interpret the field as a signed integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Signed(v) => Some(*v),
            FieldValue::Unsigned(v) => i64::try_from(*v).ok(),
            FieldValue::Text(_) => None,
        }
    }

    /// Interpret the field as an unsigned integer
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Signed(v) => u64::try_from(*v).ok(),
            FieldValue::Unsigned(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Interpret the field as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Signed(v) => write!(f, "{}", v),
            FieldValue::Unsigned(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One decoded trace event with its packet context and field set
#[derive(Debug, Clone, Default)]
pub struct TraceEvent {
    /// Event class name (e.g. `sched_switch`, `syscall_entry_read`)
    pub name: String,
    /// Packet-context CPU the event was recorded on (numbered from 0)
    pub cpu_id: u32,
    /// Packet-context start timestamp, nanoseconds
    pub packet_begin_ns: u64,
    /// Packet-context end timestamp, nanoseconds
    pub packet_end_ns: u64,
    /// Event timestamp, nanoseconds
    pub timestamp_ns: u64,
    /// Raw event-header enum id
    pub raw_id: u64,
    /// Extended id from the header's nested `v` struct, when the raw id
    /// overflowed its 16-bit encoding
    pub extended_id: Option<u64>,
    /// Named event-scope fields
    pub fields: HashMap<String, FieldValue>,
    /// Events the tracer dropped just before this one (0 = none)
    pub lost_events: u64,
}

impl TraceEvent {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn field_i64(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(FieldValue::as_i64)
    }

    pub fn field_u64(&self, name: &str) -> Option<u64> {
        self.fields.get(name).and_then(FieldValue::as_u64)
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_str)
    }
}

/// One entry of the declared event catalogue (metadata, not trace content)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDecl {
    pub id: u64,
    pub name: String,
}

/// Outcome of advancing a source by one event
#[derive(Debug)]
pub enum SourceStep {
    /// The next event in sequence
    Event(TraceEvent),
    /// Normal end of the sequence
    End,
    /// The source cannot continue; the current traversal ends early and
    /// whatever was accumulated so far is used as-is
    Abort,
}

/// A restartable, ordered, finite sequence of decoded trace events
pub trait TraceSource {
    /// Reposition at the first event. Both conversion passes begin here.
    fn restart(&mut self) -> Result<()>;

    /// Advance by one event
    fn next_event(&mut self) -> SourceStep;

    /// The full declared event catalogue, independent of trace content
    fn declared_events(&self) -> &[EventDecl];
}

/// Marker file that makes a directory a trace candidate
pub const METADATA_MARKER: &str = "metadata";

/// Recursively collect every sub-directory of `root` that carries a CTF
/// metadata marker. Unreadable directories are warned about and skipped;
/// the walk itself only fails when `root` does not exist.
pub fn find_trace_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("trace path `{}` is not a directory", root.display());
    }
    let mut found = Vec::new();
    walk(root, &mut found);
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) {
    if dir.join(METADATA_MARKER).is_file() {
        found.push(dir.to_path_buf());
    }
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), %err, "cannot read trace directory, skipping");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, found);
        }
    }
}
