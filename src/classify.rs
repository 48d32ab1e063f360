//! Event-name classification
//!
//! Every trace event falls into one of five mutually exclusive categories,
//! decided purely from the event name by a prioritized rule table. The
//! classifier is a pure function, unit-testable without any trace source.

/// Paraver event-type code for system calls
pub const TYPE_SYSCALL: u64 = 10_000_000;
/// Paraver event-type code for softirq activity
pub const TYPE_SOFTIRQ: u64 = 11_000_000;
/// Paraver event-type code for IRQ handlers
pub const TYPE_IRQ_HANDLER: u64 = 12_000_000;
/// Paraver event-type code for every other kernel event
pub const TYPE_KERNEL: u64 = 19_000_000;

/// Raw header id signalling that the real id lives in the extended `v`
/// struct. The trace format documents the escape around the 16-bit id
/// overflow; the effective check is against 65535, not 65536.
pub const EXTENDED_ID_SENTINEL: u64 = 65535;

/// Softirq event variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftirqKind {
    Entry,
    Exit,
    /// Pre-notification that a vector was raised; suppressed from output
    Raise,
}

/// The five-way event taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    SyscallEntry,
    SyscallExit,
    IrqHandler { exit: bool },
    Softirq(SoftirqKind),
    Kernel,
}

impl Category {
    /// Paraver event-type code of the category
    pub fn type_code(&self) -> u64 {
        match self {
            Category::SyscallEntry | Category::SyscallExit => TYPE_SYSCALL,
            Category::IrqHandler { .. } => TYPE_IRQ_HANDLER,
            Category::Softirq(_) => TYPE_SOFTIRQ,
            Category::Kernel => TYPE_KERNEL,
        }
    }

    /// Whether the decoded value is forced to 0 (exit variants close the
    /// interval opened by their entry)
    pub fn forces_zero_value(&self) -> bool {
        matches!(
            self,
            Category::SyscallExit
                | Category::IrqHandler { exit: true }
                | Category::Softirq(SoftirqKind::Exit)
        )
    }

    /// Whether no record is emitted at all
    pub fn suppressed(&self) -> bool {
        matches!(self, Category::Softirq(SoftirqKind::Raise))
    }
}

/// Classify an event by name. Rules are checked in priority order; the name
/// spaces are disjoint so at most one rule matches.
pub fn classify(name: &str) -> Category {
    if name.starts_with("syscall_entry_") {
        Category::SyscallEntry
    } else if name.starts_with("syscall_exit_") {
        Category::SyscallExit
    } else if name.starts_with("irq_handler_") {
        Category::IrqHandler {
            exit: name == "irq_handler_exit",
        }
    } else if name.starts_with("softirq_") {
        Category::Softirq(if name == "softirq_raise" {
            SoftirqKind::Raise
        } else if name == "softirq_exit" {
            SoftirqKind::Exit
        } else {
            SoftirqKind::Entry
        })
    } else {
        Category::Kernel
    }
}
