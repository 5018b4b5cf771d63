use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::warn;

use super::payload::{Bounds, LiveState, MemoryState};
use crate::render::Vec2;

static STORE_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_store_lock_poison_once(operation: &'static str) {
    if STORE_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "store_lock_poisoned");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveSnapshot {
    pub timestamp: f64,
    pub state: LiveState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemorySnapshot {
    pub timestamp: f64,
    pub state: MemoryState,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum StatusLine {
    #[default]
    Waiting,
    Connected {
        tick: f64,
        latency_secs: f64,
    },
    BackendError(String),
}

/// One shared value. Writers swap the `Arc`, readers clone it, so a reader
/// always holds a complete value from a single write.
#[derive(Debug)]
struct Slot<T> {
    value: RwLock<Option<Arc<T>>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }
}

impl<T> Slot<T> {
    fn load(&self) -> Option<Arc<T>> {
        match self.value.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                warn_store_lock_poison_once("read");
                poisoned.into_inner().clone()
            }
        }
    }

    fn replace(&self, next: T) {
        let next = Some(Arc::new(next));
        match self.value.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => {
                warn_store_lock_poison_once("write");
                *poisoned.into_inner() = next;
            }
        }
    }
}

#[derive(Debug, Default)]
struct Slots {
    live: Slot<LiveSnapshot>,
    memory: Slot<MemorySnapshot>,
    status: Slot<StatusLine>,
}

/// Latest accepted snapshot halves plus the status line. There is no way to
/// clear a half once it has been set.
pub struct SnapshotStore;

impl SnapshotStore {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (StoreWriter, StoreReader) {
        let slots = Arc::new(Slots::default());
        (
            StoreWriter {
                slots: Arc::clone(&slots),
            },
            StoreReader { slots },
        )
    }
}

/// Sole writer, owned by the poll task. Not `Clone`.
#[derive(Debug)]
pub struct StoreWriter {
    slots: Arc<Slots>,
}

impl StoreWriter {
    pub fn set_live(&self, snapshot: LiveSnapshot) {
        self.slots.live.replace(snapshot);
    }

    pub fn set_memory(&self, snapshot: MemorySnapshot) {
        self.slots.memory.replace(snapshot);
    }

    pub fn set_status(&self, status: StatusLine) {
        self.slots.status.replace(status);
    }

    pub fn reader(&self) -> StoreReader {
        StoreReader {
            slots: Arc::clone(&self.slots),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreReader {
    slots: Arc<Slots>,
}

impl StoreReader {
    pub fn view(&self) -> StoreView {
        StoreView {
            live: self.slots.live.load(),
            memory: self.slots.memory.load(),
            status: self
                .slots
                .status
                .load()
                .map(|status| (*status).clone())
                .unwrap_or_default(),
        }
    }
}

/// What a consumer sees for one frame or one panel refresh.
#[derive(Debug, Clone, Default)]
pub struct StoreView {
    pub live: Option<Arc<LiveSnapshot>>,
    pub memory: Option<Arc<MemorySnapshot>>,
    pub status: StatusLine,
}

impl StoreView {
    pub fn has_any_snapshot(&self) -> bool {
        self.live.is_some() || self.memory.is_some()
    }

    pub fn live_state(&self) -> Option<&LiveState> {
        self.live.as_deref().map(|snapshot| &snapshot.state)
    }

    pub fn memory_state(&self) -> Option<&MemoryState> {
        self.memory.as_deref().map(|snapshot| &snapshot.state)
    }

    pub fn agent_position(&self) -> Option<Vec2> {
        self.live_state()?.agent_position()
    }

    pub fn memory_region_bounds(&self) -> Option<Bounds> {
        self.memory_state()?.region_bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(tick: f64) -> LiveSnapshot {
        LiveSnapshot {
            timestamp: tick,
            state: LiveState {
                tick: Some(tick),
                ..LiveState::default()
            },
        }
    }

    #[test]
    fn fresh_store_is_waiting_and_empty() {
        let (_writer, reader) = SnapshotStore::new();
        let view = reader.view();
        assert!(!view.has_any_snapshot());
        assert_eq!(view.status, StatusLine::Waiting);
        assert_eq!(view.agent_position(), None);
    }

    #[test]
    fn halves_are_replaced_independently() {
        let (writer, reader) = SnapshotStore::new();
        writer.set_live(live(1.0));
        writer.set_memory(MemorySnapshot {
            timestamp: 1.0,
            state: MemoryState::default(),
        });
        writer.set_live(live(2.0));

        let view = reader.view();
        assert_eq!(view.live_state().and_then(|state| state.tick), Some(2.0));
        assert!(view.memory.is_some());
    }

    #[test]
    fn held_view_is_not_affected_by_later_writes() {
        let (writer, reader) = SnapshotStore::new();
        writer.set_live(live(1.0));
        let before = reader.view();
        writer.set_live(live(5.0));
        assert_eq!(before.live_state().and_then(|state| state.tick), Some(1.0));
        assert_eq!(
            reader.view().live_state().and_then(|state| state.tick),
            Some(5.0)
        );
    }

    #[test]
    fn readers_share_one_store() {
        let (writer, reader) = SnapshotStore::new();
        let other = writer.reader();
        writer.set_status(StatusLine::BackendError("x".to_string()));
        assert_eq!(reader.view().status, other.view().status);
    }

    #[test]
    fn concurrent_reader_sees_whole_values() {
        let (writer, reader) = SnapshotStore::new();
        let handle = std::thread::spawn(move || {
            for tick in 0..500 {
                writer.set_live(live(f64::from(tick)));
            }
        });
        for _ in 0..500 {
            if let Some(snapshot) = reader.view().live {
                assert_eq!(Some(snapshot.timestamp), snapshot.state.tick);
            }
        }
        handle.join().expect("writer thread");
    }

    #[test]
    fn poisoned_slot_is_recovered() {
        let slot = Arc::new(Slot::<u32>::default());
        slot.replace(3);
        let poisoner = Arc::clone(&slot);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.value.write().expect("lock");
            panic!("poison the slot");
        })
        .join();
        assert!(slot.value.is_poisoned());
        assert_eq!(slot.load().as_deref(), Some(&3));
        slot.replace(4);
        assert_eq!(slot.load().as_deref(), Some(&4));
    }
}
