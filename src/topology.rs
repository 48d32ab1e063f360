//! Pass 1: topology and identity discovery
//!
//! One linear scan over the trace that discovers the CPU count, softirq
//! vector count, IRQ line set, thread identity set, and the trace time
//! window. Runs to completion before any output is written, because header
//! emission needs the final counts. No output side effects.

use tracing::{debug, warn};

use crate::error::ConvertError;
use crate::hooks::ExitSyscallHook;
use crate::registry::{IrqRegistry, ThreadRegistry};
use crate::source::{SourceStep, TraceEvent, TraceSource};

/// Event-name markers driving pass-1 registration
pub const STATEDUMP_MARKER: &str = "lttng_statedump_process_state";
pub const SCHED_SWITCH_MARKER: &str = "sched_switch";
pub const SOFTIRQ_ENTRY: &str = "softirq_entry";
pub const IRQ_HANDLER_ENTRY: &str = "irq_handler_entry";

/// Physical/virtual resource-row counts discovered in pass 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceTopology {
    /// CPU count: max observed packet-context cpu id, plus one (the trace
    /// numbers CPUs from 0)
    pub ncpus: u32,
    /// Highest observed softirq vector
    pub nsoftirqs: u32,
}

impl ResourceTopology {
    /// Total resource rows: CPUs, then softirq vectors, then IRQ lines,
    /// laid out contiguously in that order
    pub fn nresources(&self, nirqs: usize) -> u32 {
        self.ncpus + self.nsoftirqs + nirqs as u32
    }
}

/// Trace time window and event-clock origin
///
/// `first_packet_ns`/`last_packet_ns` bound the packet stream and give the
/// header duration; `offset_ns` is the earliest *event* timestamp and is the
/// origin of the per-record relative clock. The two origins are distinct and
/// kept separately. Zero acts as the "not yet set" sentinel, so the first
/// observed value always wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceTimeWindow {
    pub first_packet_ns: u64,
    pub last_packet_ns: u64,
    pub offset_ns: u64,
}

impl TraceTimeWindow {
    fn observe_packet(&mut self, begin_ns: u64, end_ns: u64) {
        if self.first_packet_ns > begin_ns || self.first_packet_ns == 0 {
            self.first_packet_ns = begin_ns;
        }
        if self.last_packet_ns < end_ns || self.last_packet_ns == 0 {
            self.last_packet_ns = end_ns;
        }
    }

    fn observe_event(&mut self, timestamp_ns: u64) {
        if self.offset_ns > timestamp_ns || self.offset_ns == 0 {
            self.offset_ns = timestamp_ns;
        }
    }

    /// Total trace duration for the `.prv` header line
    pub fn duration_ns(&self) -> u64 {
        self.last_packet_ns.saturating_sub(self.first_packet_ns)
    }

    /// Trace-relative timestamp of an event: the raw timestamp corrected by
    /// the packet-stream start and by the (itself stream-corrected) event
    /// offset. A negative result is a data-integrity defect, never a wrap.
    pub fn relative_ns(&self, timestamp_ns: u64) -> Result<u64, ConvertError> {
        let corrected_offset = self.offset_ns.saturating_sub(self.first_packet_ns);
        timestamp_ns
            .checked_sub(corrected_offset)
            .and_then(|t| t.checked_sub(self.first_packet_ns))
            .ok_or(ConvertError::NegativeTimestamp {
                timestamp_ns,
                origin_ns: corrected_offset + self.first_packet_ns,
            })
    }
}

/// Everything pass 1 discovers; read-only for the remainder of the run
#[derive(Debug, Default)]
pub struct Topology {
    pub resources: ResourceTopology,
    pub threads: ThreadRegistry,
    pub irqs: IrqRegistry,
    pub window: TraceTimeWindow,
}

impl Topology {
    pub fn nresources(&self) -> u32 {
        self.resources.nresources(self.irqs.len())
    }
}

/// Consume every event of `source` once and build the [`Topology`].
///
/// An early abort from the source ends the scan without error; the partial
/// topology is used as-is.
pub fn discover(source: &mut dyn TraceSource, hook: &mut ExitSyscallHook) -> Topology {
    let mut topo = Topology::default();
    let mut max_cpu: u32 = 0;
    let mut scanned: u64 = 0;

    loop {
        let event = match source.next_event() {
            SourceStep::Event(event) => event,
            SourceStep::End => break,
            SourceStep::Abort => {
                warn!(scanned, "trace source aborted during topology scan, using partial results");
                break;
            }
        };
        scanned += 1;
        hook.observe(&event);

        max_cpu = max_cpu.max(event.cpu_id);
        topo.window
            .observe_packet(event.packet_begin_ns, event.packet_end_ns);
        topo.window.observe_event(event.timestamp_ns);

        if event.name.contains(STATEDUMP_MARKER) {
            register_thread(&mut topo.threads, &event, "_tid", "_name");
        }
        if event.name.contains(SCHED_SWITCH_MARKER) {
            register_thread(&mut topo.threads, &event, "_next_tid", "_next_comm");
        }
        if event.name == SOFTIRQ_ENTRY {
            match event.field_u64("_vec") {
                Some(vec) => {
                    topo.resources.nsoftirqs = topo.resources.nsoftirqs.max(vec as u32);
                }
                None => warn!(event = %event.name, "missing `_vec`, softirq count not updated"),
            }
        }
        if event.name == IRQ_HANDLER_ENTRY {
            match (event.field_i64("_irq"), event.field_str("_name")) {
                (Some(irq), Some(name)) => {
                    if topo.irqs.insert_if_absent(irq, name) {
                        debug!(irq, name, "registered irq line");
                    }
                }
                _ => warn!(event = %event.name, "missing `_irq`/`_name`, irq not registered"),
            }
        }
    }

    topo.resources.ncpus = max_cpu + 1;
    debug!(
        scanned,
        ncpus = topo.resources.ncpus,
        nsoftirqs = topo.resources.nsoftirqs,
        nirqs = topo.irqs.len(),
        nthreads = topo.threads.len(),
        "topology scan complete"
    );
    topo
}

fn register_thread(threads: &mut ThreadRegistry, event: &TraceEvent, tid_field: &str, name_field: &str) {
    match (event.field_i64(tid_field), event.field_str(name_field)) {
        (Some(tid), Some(name)) => {
            if threads.insert_if_absent(tid, name) {
                debug!(tid, name, "registered thread");
            }
        }
        _ => warn!(
            event = %event.name,
            tid_field,
            name_field,
            "missing thread identity fields, thread not registered"
        ),
    }
}
