//! Argument-type dictionary
//!
//! Some events carry call arguments worth surfacing in the record stream.
//! The dictionary maps an event name to the argument codes it contributes;
//! `suffix_for` renders the matching fields as a `:code:value` tail appended
//! verbatim to the record line. Events with no registered arguments yield an
//! empty suffix.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::source::TraceEvent;

/// Generic argument-field codes listed in the `.pcf` dictionary
pub const ARG_RET: u64 = 20_000_000;
pub const ARG_FD: u64 = 20_000_001;
pub const ARG_SIZE: u64 = 20_000_002;
pub const ARG_CMD: u64 = 20_000_003;
pub const ARG_ARG: u64 = 20_000_004;
pub const ARG_COUNT: u64 = 20_000_005;
pub const ARG_BUF: u64 = 20_000_006;

/// Static labels for the final `.pcf` block, in code order
pub const ARG_LABELS: [(u64, &str); 7] = [
    (ARG_RET, "ret"),
    (ARG_FD, "fd"),
    (ARG_SIZE, "size"),
    (ARG_CMD, "cmd"),
    (ARG_ARG, "arg"),
    (ARG_COUNT, "count"),
    (ARG_BUF, "buf"),
];

/// Event-name keyed table of `(code, field)` argument specs
#[derive(Debug, Default)]
pub struct ArgTypes {
    by_event: HashMap<String, Vec<(u64, &'static str)>>,
}

impl ArgTypes {
    /// Empty dictionary: every lookup yields no extra fields
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table covering the common file-descriptor syscalls
    pub fn with_defaults() -> Self {
        let mut args = Self::new();
        args.register("syscall_entry_read", &[(ARG_FD, "_fd"), (ARG_COUNT, "_count")]);
        args.register("syscall_entry_write", &[(ARG_FD, "_fd"), (ARG_COUNT, "_count")]);
        args.register("syscall_entry_pread64", &[(ARG_FD, "_fd"), (ARG_COUNT, "_count")]);
        args.register("syscall_entry_pwrite64", &[(ARG_FD, "_fd"), (ARG_COUNT, "_count")]);
        args.register("syscall_entry_close", &[(ARG_FD, "_fd")]);
        args.register("syscall_entry_lseek", &[(ARG_FD, "_fd")]);
        args.register("syscall_entry_ioctl", &[
            (ARG_FD, "_fd"),
            (ARG_CMD, "_cmd"),
            (ARG_ARG, "_arg"),
        ]);
        args.register("syscall_entry_fcntl", &[(ARG_FD, "_fd"), (ARG_CMD, "_cmd")]);
        args.register("syscall_exit_read", &[(ARG_RET, "_ret")]);
        args.register("syscall_exit_write", &[(ARG_RET, "_ret")]);
        args.register("syscall_exit_close", &[(ARG_RET, "_ret")]);
        args.register("syscall_exit_ioctl", &[(ARG_RET, "_ret")]);
        args.register("exit_syscall", &[(ARG_RET, "_ret")]);
        args
    }

    /// Register the argument specs of one event name
    pub fn register(&mut self, event_name: &str, specs: &[(u64, &'static str)]) {
        self.by_event
            .insert(event_name.to_string(), specs.to_vec());
    }

    /// Render the `:code:value` suffix for `event`. Registered fields absent
    /// from the event are silently skipped.
    pub fn suffix_for(&self, event: &TraceEvent) -> String {
        let mut suffix = String::new();
        if let Some(specs) = self.by_event.get(&event.name) {
            for (code, field) in specs {
                if let Some(value) = event.field(field) {
                    // infallible on String
                    let _ = write!(suffix, ":{}:{}", code, value);
                }
            }
        }
        suffix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FieldValue;

    fn event(name: &str, fields: &[(&str, FieldValue)]) -> TraceEvent {
        let mut event = TraceEvent {
            name: name.to_string(),
            ..Default::default()
        };
        for (k, v) in fields {
            event.fields.insert((*k).to_string(), v.clone());
        }
        event
    }

    #[test]
    fn test_suffix_for_registered_event() {
        let args = ArgTypes::with_defaults();
        let ev = event(
            "syscall_entry_read",
            &[
                ("_fd", FieldValue::Unsigned(3)),
                ("_count", FieldValue::Unsigned(4096)),
            ],
        );
        assert_eq!(args.suffix_for(&ev), ":20000001:3:20000005:4096");
    }

    #[test]
    fn test_suffix_empty_for_unregistered_event() {
        let args = ArgTypes::with_defaults();
        assert_eq!(args.suffix_for(&event("sched_switch", &[])), "");
    }

    #[test]
    fn test_missing_field_is_skipped() {
        let args = ArgTypes::with_defaults();
        let ev = event("syscall_entry_read", &[("_fd", FieldValue::Unsigned(3))]);
        assert_eq!(args.suffix_for(&ev), ":20000001:3");
    }

    #[test]
    fn test_negative_return_value_renders_signed() {
        let args = ArgTypes::with_defaults();
        let ev = event("exit_syscall", &[("_ret", FieldValue::Signed(-9))]);
        assert_eq!(args.suffix_for(&ev), ":20000000:-9");
    }
}
