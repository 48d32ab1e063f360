//! Scan-time diagnostic hooks
//!
//! Independent of the conversion itself: a hook inspects events as either
//! pass reads them and reports to the diagnostic stream. Hooks never touch
//! registries or the emitted record stream.

use tracing::{debug, warn};

use crate::error::ConvertError;
use crate::source::TraceEvent;

/// Reports the return value of `exit_syscall` events.
///
/// A decode failure is fatal to the hook (it disables itself) but never
/// aborts the surrounding scan.
#[derive(Debug)]
pub struct ExitSyscallHook {
    enabled: bool,
}

impl ExitSyscallHook {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn observe(&mut self, event: &TraceEvent) {
        if !self.enabled || event.name != "exit_syscall" {
            return;
        }
        match Self::decode_ret(event) {
            Ok(ret) => debug!(ret, "exit_syscall"),
            Err(err) => {
                warn!(%err, "exit_syscall hook disabled");
                self.enabled = false;
            }
        }
    }

    fn decode_ret(event: &TraceEvent) -> Result<i64, ConvertError> {
        let value = event.field("_ret").ok_or_else(|| ConvertError::MissingField {
            event: event.name.clone(),
            field: "_ret".to_string(),
        })?;
        value.as_i64().ok_or_else(|| ConvertError::FieldType {
            event: event.name.clone(),
            field: "_ret".to_string(),
        })
    }
}

impl Default for ExitSyscallHook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FieldValue;

    fn exit_syscall(with_ret: bool) -> TraceEvent {
        let mut event = TraceEvent {
            name: "exit_syscall".to_string(),
            ..Default::default()
        };
        if with_ret {
            event
                .fields
                .insert("_ret".to_string(), FieldValue::Signed(-2));
        }
        event
    }

    #[test]
    fn test_hook_stays_enabled_on_good_events() {
        let mut hook = ExitSyscallHook::new();
        hook.observe(&exit_syscall(true));
        assert!(hook.is_enabled());
    }

    #[test]
    fn test_hook_disables_itself_on_decode_failure() {
        let mut hook = ExitSyscallHook::new();
        hook.observe(&exit_syscall(false));
        assert!(!hook.is_enabled());
    }

    #[test]
    fn test_hook_disables_itself_on_wrong_field_type() {
        let mut event = exit_syscall(false);
        event
            .fields
            .insert("_ret".to_string(), FieldValue::Text("EINTR".to_string()));
        assert!(matches!(
            ExitSyscallHook::decode_ret(&event),
            Err(ConvertError::FieldType { .. })
        ));
        let mut hook = ExitSyscallHook::new();
        hook.observe(&event);
        assert!(!hook.is_enabled());
    }

    #[test]
    fn test_hook_ignores_other_events() {
        let mut hook = ExitSyscallHook::new();
        hook.observe(&TraceEvent {
            name: "sched_switch".to_string(),
            ..Default::default()
        });
        assert!(hook.is_enabled());
    }
}
