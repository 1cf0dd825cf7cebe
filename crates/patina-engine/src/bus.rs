//! Tear-free parameter hand-off between the control and audio threads.
//!
//! Single producer, single consumer, one slot. The publisher stores a
//! complete [`ProcessorParams`] value and bumps a version counter with
//! release ordering; the receiver, once per block at the block boundary,
//! acquire-loads the version and copies the slot only when it changed.
//!
//! The receiver never blocks: the slot is guarded by a mutex the audio
//! thread only ever `try_lock`s. A contended attempt (the publisher is
//! mid-store) simply keeps the previous snapshot for one more block and
//! retries at the next boundary. Either way the snapshot the audio thread
//! works with is always a complete, never partially-updated value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use patina_core::ProcessorParams;

struct Shared {
    version: AtomicU64,
    slot: Mutex<ProcessorParams>,
}

/// Create a connected publisher/receiver pair seeded with `initial`.
#[must_use]
pub fn channel(initial: ProcessorParams) -> (ParamPublisher, ParamReceiver) {
    let shared = Arc::new(Shared {
        version: AtomicU64::new(0),
        slot: Mutex::new(initial.clamped()),
    });
    (
        ParamPublisher {
            shared: Arc::clone(&shared),
        },
        ParamReceiver { shared, seen: 0 },
    )
}

/// Control-thread handle: publishes complete parameter sets.
pub struct ParamPublisher {
    shared: Arc<Shared>,
}

impl ParamPublisher {
    /// Publish a new parameter set (clamped at this boundary).
    ///
    /// May block briefly against the audio thread's `try_lock`, which is
    /// fine on the control thread.
    pub fn publish(&self, params: ProcessorParams) {
        if let Ok(mut slot) = self.shared.slot.lock() {
            *slot = params.clamped();
            self.shared.version.fetch_add(1, Ordering::Release);
        }
    }

    /// The most recently published parameter set.
    #[must_use]
    pub fn latest(&self) -> ProcessorParams {
        self.shared
            .slot
            .lock()
            .map(|slot| *slot)
            .unwrap_or_default()
    }
}

/// Audio-thread handle: polls for the latest snapshot.
pub struct ParamReceiver {
    shared: Arc<Shared>,
    seen: u64,
}

impl ParamReceiver {
    /// Fetch the latest snapshot if one was published since the last
    /// poll. Never blocks; call exactly once per block.
    pub fn poll(&mut self) -> Option<ProcessorParams> {
        let version = self.shared.version.load(Ordering::Acquire);
        if version == self.seen {
            return None;
        }
        let Ok(slot) = self.shared.slot.try_lock() else {
            // Publisher holds the lock right now; pick the value up at
            // the next block boundary.
            return None;
        };
        self.seen = version;
        Some(*slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_returns_once_per_publish() {
        let (publisher, mut receiver) = channel(ProcessorParams::default());

        // Nothing published yet.
        assert!(receiver.poll().is_none());

        let mut params = ProcessorParams::default();
        params.drive = 0.9;
        publisher.publish(params);

        let snapshot = receiver.poll().expect("snapshot after publish");
        assert!((snapshot.drive - 0.9).abs() < 1e-6);

        // Same version: no new snapshot.
        assert!(receiver.poll().is_none());
    }

    #[test]
    fn test_publish_clamps_at_boundary() {
        let (publisher, mut receiver) = channel(ProcessorParams::default());
        let mut params = ProcessorParams::default();
        params.drive = 42.0;
        params.output_gain_db = 1000.0;
        publisher.publish(params);

        let snapshot = receiver.poll().expect("snapshot");
        assert_eq!(snapshot.drive, 1.0);
        assert_eq!(snapshot.output_gain_db, 24.0);
    }

    #[test]
    fn test_latest_reflects_last_publish() {
        let (publisher, _receiver) = channel(ProcessorParams::default());
        let mut params = ProcessorParams::default();
        params.mix = 0.25;
        publisher.publish(params);
        assert!((publisher.latest().mix - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_rapid_publishes_yield_newest() {
        let (publisher, mut receiver) = channel(ProcessorParams::default());
        for i in 0..100 {
            let mut params = ProcessorParams::default();
            params.drive = i as f32 / 100.0;
            publisher.publish(params);
        }
        let snapshot = receiver.poll().expect("snapshot");
        assert!((snapshot.drive - 0.99).abs() < 1e-6, "most recent wins");
        assert!(receiver.poll().is_none());
    }

    #[test]
    fn test_cross_thread_snapshots_are_complete() {
        // Hammer the bus from a writer thread while the reader polls.
        // Every snapshot must be one of the published value pairs, never
        // a mix of two (drive and mix are published in lockstep).
        let (publisher, mut receiver) = channel(ProcessorParams::default());
        let writer = std::thread::spawn(move || {
            for i in 0..10_000u32 {
                let v = (i % 100) as f32 / 100.0;
                let mut params = ProcessorParams::default();
                params.drive = v;
                params.mix = v;
                publisher.publish(params);
            }
        });

        for _ in 0..10_000 {
            if let Some(snapshot) = receiver.poll() {
                assert_eq!(
                    snapshot.drive, snapshot.mix,
                    "torn snapshot observed: {} vs {}",
                    snapshot.drive, snapshot.mix
                );
            }
        }
        writer.join().expect("writer thread");
    }
}
