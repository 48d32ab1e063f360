// Property-based coverage of the registry and time-window invariants

use proptest::prelude::*;

use ctf2prv::hooks::ExitSyscallHook;
use ctf2prv::json_source::JsonTraceSource;
use ctf2prv::registry::ThreadRegistry;
use ctf2prv::source::{TraceEvent, TraceSource};
use ctf2prv::topology;

proptest! {
    /// Paraver ids form a dense, gapless 1..=N range in strict
    /// first-occurrence order, for any key sequence with repeats
    #[test]
    fn registry_ids_dense_and_ordered(keys in proptest::collection::vec(-100i64..100, 0..200)) {
        let mut registry = ThreadRegistry::new();
        let mut first_seen = Vec::new();
        for key in &keys {
            let created = registry.insert_if_absent(*key, "t");
            if created {
                first_seen.push(*key);
            }
        }
        prop_assert_eq!(registry.len(), first_seen.len());
        for (index, key) in first_seen.iter().enumerate() {
            prop_assert_eq!(registry.paraver_id(*key), Some(index as u32 + 1));
        }
        let iter_keys: Vec<i64> = registry.iter().map(|(k, _)| *k).collect();
        prop_assert_eq!(iter_keys, first_seen);
    }

    /// Every event timestamp maps to a non-negative relative time once the
    /// trace time window has been discovered from the same events
    #[test]
    fn relative_times_never_negative(timestamps in proptest::collection::vec(1u64..1_000_000, 1..100)) {
        let events: Vec<TraceEvent> = timestamps
            .iter()
            .map(|ts| TraceEvent {
                name: "ev".to_string(),
                timestamp_ns: *ts,
                ..Default::default()
            })
            .collect();
        let mut source = JsonTraceSource::from_events(events);
        let mut hook = ExitSyscallHook::new();
        source.restart().unwrap();
        let topo = topology::discover(&mut source, &mut hook);
        for ts in &timestamps {
            let rel = topo.window.relative_ns(*ts);
            prop_assert!(rel.is_ok());
        }
    }
}
