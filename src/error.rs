//! Converter error taxonomy
//!
//! Sharp, typed errors for the conversion core. Orchestration and the CLI
//! wrap these in `anyhow` context; tolerated anomalies (early source abort,
//! skipped trace sub-directories, missing fields on the main classification
//! path) are logged instead of raised.

use thiserror::Error;

/// Errors raised by the two-pass conversion core
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A required field is absent from an event's field set
    #[error("event `{event}` is missing field `{field}`")]
    MissingField { event: String, field: String },

    /// A field was present but held an incompatible value type
    #[error("field `{field}` on event `{event}` has an unexpected type")]
    FieldType { event: String, field: String },

    /// An event timestamp precedes the trace time origin; emitting it would
    /// require a negative relative time, which the record format forbids
    #[error("event timestamp {timestamp_ns}ns precedes trace origin {origin_ns}ns")]
    NegativeTimestamp { timestamp_ns: u64, origin_ns: u64 },

    /// Output stream failure while writing records or headers
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_names_event_and_field() {
        let err = ConvertError::MissingField {
            event: "irq_handler_entry".to_string(),
            field: "_irq".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("irq_handler_entry"));
        assert!(msg.contains("_irq"));
    }

    #[test]
    fn test_field_type_message_names_event_and_field() {
        let err = ConvertError::FieldType {
            event: "exit_syscall".to_string(),
            field: "_ret".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit_syscall"));
        assert!(msg.contains("_ret"));
    }

    #[test]
    fn test_negative_timestamp_message() {
        let err = ConvertError::NegativeTimestamp {
            timestamp_ns: 50,
            origin_ns: 100,
        };
        assert!(err.to_string().contains("50"));
        assert!(err.to_string().contains("100"));
    }
}
