//! `.pcf` event-type dictionary
//!
//! Classifies the *declared* event catalogue (not the trace content) into
//! four ordered buckets with the same name rules as the record pass, strips
//! the entry-marker prefixes, and renders the `EVENT_TYPE`/`VALUES` blocks.
//! Stripping always operates on a private copy of each name; the catalogue
//! itself is never mutated, so dictionary emission can run in any order
//! relative to the record pass.

use std::io::{self, Write};

use crate::arg_types::ARG_LABELS;
use crate::classify::{TYPE_IRQ_HANDLER, TYPE_KERNEL, TYPE_SOFTIRQ, TYPE_SYSCALL};
use crate::source::EventDecl;

/// Declared catalogue split into the four dictionary buckets, each entry a
/// `(id, stripped name)` pair in catalogue order
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CatalogueBuckets {
    pub syscalls: Vec<(u64, String)>,
    pub softirqs: Vec<(u64, String)>,
    pub irq_handlers: Vec<(u64, String)>,
    pub kernel: Vec<(u64, String)>,
}

/// One pass over the declared catalogue. Exit variants of the first three
/// buckets are excluded everywhere (their values fold into the synthetic
/// `0 exit` sentinel of each block).
pub fn bucket_declarations(decls: &[EventDecl]) -> CatalogueBuckets {
    let mut buckets = CatalogueBuckets::default();
    for decl in decls {
        let name = decl.name.as_str();
        if name.contains("syscall_entry") {
            buckets
                .syscalls
                .push((decl.id, name.replace("syscall_entry_", "")));
        } else if name.contains("softirq_raise") || name.contains("softirq_entry") {
            buckets.softirqs.push((decl.id, name.replace("_entry", "")));
        } else if name.contains("irq_handler_entry") {
            buckets
                .irq_handlers
                .push((decl.id, name.replace("_entry", "")));
        } else if !name.contains("syscall_exit")
            && !name.contains("softirq_exit")
            && !name.contains("irq_handler_exit")
        {
            buckets.kernel.push((decl.id, name.to_string()));
        }
    }
    buckets
}

fn write_block<W: Write>(
    out: &mut W,
    type_code: u64,
    label: &str,
    values: &[(u64, String)],
    exit_sentinel: bool,
) -> io::Result<()> {
    writeln!(out, "EVENT_TYPE")?;
    writeln!(out, "0\t{}\t{}", type_code, label)?;
    writeln!(out, "VALUES")?;
    for (id, name) in values {
        writeln!(out, "{}\t{}", id, name)?;
    }
    if exit_sentinel {
        writeln!(out, "0\texit")?;
    }
    writeln!(out)?;
    writeln!(out)?;
    Ok(())
}

/// Render the full event-type dictionary: the four value blocks, then the
/// fixed argument-code block
pub fn write_event_types<W: Write>(out: &mut W, decls: &[EventDecl]) -> io::Result<()> {
    let buckets = bucket_declarations(decls);
    write_block(out, TYPE_SYSCALL, "System Call", &buckets.syscalls, true)?;
    write_block(out, TYPE_SOFTIRQ, "SOFTIRQ", &buckets.softirqs, true)?;
    write_block(out, TYPE_IRQ_HANDLER, "IRQ HANDLER", &buckets.irq_handlers, true)?;
    write_block(out, TYPE_KERNEL, "Others", &buckets.kernel, false)?;
    writeln!(out)?;

    writeln!(out, "EVENT_TYPE")?;
    for (code, label) in ARG_LABELS {
        writeln!(out, "0\t{}\t{}", code, label)?;
    }
    Ok(())
}
