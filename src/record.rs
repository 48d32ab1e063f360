//! Pass 2: event classification and record emission
//!
//! Re-scans the trace with the pass-1 topology frozen, classifies every
//! event, remaps identifiers, and writes one `2:` record line per
//! non-suppressed event:
//!
//! `2:<row+1>:<appl>:<task>:<thread>:<time>:<type>:<value><extras>`
//!
//! `task` and `thread` are the constant 1 in every record the source
//! produces; that is reproduced as-is.

use std::io::Write;

use anyhow::Result;
use tracing::warn;

use crate::arg_types::ArgTypes;
use crate::classify::{classify, Category, EXTENDED_ID_SENTINEL};
use crate::hooks::ExitSyscallHook;
use crate::source::{SourceStep, TraceEvent, TraceSource};
use crate::topology::Topology;

const TASK_ID: u64 = 1;
const THREAD_ID: u64 = 1;

/// Tracks which application (Paraver thread slot) events are attributed to.
///
/// Two slots: `sched` follows the thread most recently scheduled in or
/// woken, and only scheduling events move it. `current` is what records
/// carry: scheduling events align it with `sched`, IRQ and softirq events
/// pin it to the fixed pseudo-application 1, and the bare
/// `syscall_entry`/`syscall_exit` names restore it to `sched`. Everything
/// else inherits the last attribution.
struct ApplTracker {
    current: u64,
    sched: u64,
    swapper: u64,
}

impl ApplTracker {
    fn new(topo: &Topology) -> Self {
        Self {
            current: 0,
            sched: 0,
            // tid 0 always maps to the swapper slot instead of failing
            swapper: topo.threads.paraver_id(0).map(u64::from).unwrap_or(0),
        }
    }

    fn observe(&mut self, topo: &Topology, event: &TraceEvent) {
        let tid = if event.name.contains("sched_switch") {
            event.field_i64("_next_tid")
        } else if event.name.contains("sched_wakeup") {
            event.field_i64("_tid")
        } else {
            if event.name == "syscall_entry" || event.name == "syscall_exit" {
                self.current = self.sched;
            }
            return;
        };
        match tid {
            Some(0) => self.sched = self.swapper,
            Some(tid) => {
                self.sched = topo.threads.paraver_id(tid).map(u64::from).unwrap_or(0);
            }
            None => {
                warn!(event = %event.name, "missing tid field, attribution unchanged");
                return;
            }
        }
        self.current = self.sched;
    }
}

/// Second full traversal: classify and emit. Returns the number of record
/// lines written. An early abort from the source ends the pass; records
/// emitted so far stand.
pub fn emit_records<W: Write>(
    source: &mut dyn TraceSource,
    topo: &Topology,
    args: &ArgTypes,
    out: &mut W,
    hook: &mut ExitSyscallHook,
) -> Result<u64> {
    let ncpus = u64::from(topo.resources.ncpus);
    let nsoftirqs = u64::from(topo.resources.nsoftirqs);
    let mut appl = ApplTracker::new(topo);
    let mut emitted: u64 = 0;

    loop {
        let event = match source.next_event() {
            SourceStep::Event(event) => event,
            SourceStep::End => break,
            SourceStep::Abort => {
                warn!(emitted, "trace source aborted during record pass, output truncated");
                break;
            }
        };
        hook.observe(&event);
        appl.observe(topo, &event);

        let category = classify(&event.name);
        let mut row = u64::from(event.cpu_id);
        let mut appl_id = appl.current;
        let mut value = if category.forces_zero_value() {
            0
        } else {
            event.raw_id
        };

        match category {
            Category::IrqHandler { .. } => {
                // attributed to the fixed pseudo-application row, and the
                // attribution sticks until the next scheduling event
                appl.current = 1;
                appl_id = 1;
                match event.field_i64("_irq") {
                    Some(irq) => {
                        let prv = topo.irqs.paraver_id(irq).map(u64::from).unwrap_or(0);
                        row = ncpus + nsoftirqs + prv - 1;
                    }
                    None => warn!(event = %event.name, "missing `_irq`, row not remapped"),
                }
            }
            Category::Softirq(_) => {
                appl.current = 1;
                appl_id = 1;
                match event.field_u64("_vec") {
                    Some(vec) => row = ncpus - 1 + vec,
                    None => warn!(event = %event.name, "missing `_vec`, row not remapped"),
                }
            }
            _ => {}
        }

        if value == EXTENDED_ID_SENTINEL {
            match event.extended_id {
                Some(ext) => value = ext,
                None => warn!(event = %event.name, "id sentinel without extended value"),
            }
        }

        if !category.suppressed() {
            let time = topo.window.relative_ns(event.timestamp_ns)?;
            let extras = args.suffix_for(&event);
            writeln!(
                out,
                "2:{}:{}:{}:{}:{}:{}:{}{}",
                row + 1,
                appl_id,
                TASK_ID,
                THREAD_ID,
                time,
                category.type_code(),
                value,
                extras
            )?;
            emitted += 1;
        }

        if event.lost_events > 0 {
            warn!(lost = event.lost_events, "lost events");
        }
    }

    Ok(emitted)
}
