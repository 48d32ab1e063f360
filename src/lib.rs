//! ctf2prv - Kernel CTF trace to Paraver converter
//!
//! This library converts a decoded kernel execution trace into the Paraver
//! visualization format: a `.prv` event stream, a `.pcf` semantic and
//! event-type dictionary, and a `.row` resource legend. The conversion is a
//! strict two-pass pipeline: topology discovery first, then record emission
//! against the frozen topology.

pub mod arg_types;
pub mod catalogue;
pub mod classify;
pub mod cli;
pub mod convert;
pub mod error;
pub mod headers;
pub mod hooks;
pub mod json_source;
pub mod record;
pub mod registry;
pub mod source;
pub mod topology;
