//! Pipeline orchestration
//!
//! Strictly sequential, single-threaded: pass 1 (topology discovery) runs to
//! completion, the header artifacts are rendered from the frozen topology,
//! then pass 2 re-traverses the source and streams event records, and the
//! event-type dictionary closes the `.pcf`. The three output streams are
//! write-once and flushed exactly once at the end.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::arg_types::ArgTypes;
use crate::catalogue;
use crate::headers;
use crate::hooks::ExitSyscallHook;
use crate::record;
use crate::source::TraceSource;
use crate::topology;

/// The three Paraver output streams
pub struct Outputs<W: Write> {
    pub prv: W,
    pub pcf: W,
    pub row: W,
}

impl Outputs<BufWriter<File>> {
    /// Create `<basename>.prv`, `<basename>.pcf`, and `<basename>.row`.
    /// Fails before any record is produced when a path is unwritable.
    pub fn create(basename: &str) -> Result<Self> {
        let open = |ext: &str| -> Result<BufWriter<File>> {
            let path = format!("{}.{}", basename, ext);
            let file =
                File::create(&path).with_context(|| format!("cannot create `{}`", path))?;
            Ok(BufWriter::new(file))
        };
        Ok(Self {
            prv: open("prv")?,
            pcf: open("pcf")?,
            row: open("row")?,
        })
    }
}

/// Counts reported after a completed conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    pub records: u64,
    pub nresources: u32,
    pub napps: usize,
}

/// Run the full two-pass conversion against an opened source
pub fn run<W: Write>(
    source: &mut dyn TraceSource,
    args: &ArgTypes,
    out: &mut Outputs<W>,
) -> Result<ConvertSummary> {
    let mut hook = ExitSyscallHook::new();

    source.restart().context("cannot start topology pass")?;
    let topo = topology::discover(source, &mut hook);

    headers::write_prv_header(&mut out.prv, &topo)?;
    headers::write_pcf_preamble(&mut out.pcf)?;
    headers::write_row(&mut out.row, &topo)?;

    source.restart().context("cannot start record pass")?;
    let records = record::emit_records(source, &topo, args, &mut out.prv, &mut hook)?;
    catalogue::write_event_types(&mut out.pcf, source.declared_events())?;

    out.prv.flush()?;
    out.pcf.flush()?;
    out.row.flush()?;

    let summary = ConvertSummary {
        records,
        nresources: topo.nresources(),
        napps: topo.threads.len(),
    };
    info!(
        records = summary.records,
        nresources = summary.nresources,
        napps = summary.napps,
        "conversion complete"
    );
    Ok(summary)
}
