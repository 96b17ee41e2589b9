//! Typed settlement events with pre-allocated ring buffers.
//!
//! The power grid and the settlement emit events while a tick runs; the
//! settlement delivers them in one batch at the end of the tick. Each event
//! kind has its own [`EventBuffer`] with a configurable capacity. Owners size
//! the bus with [`EventBus::reserve`] so one step's events fit; an event that
//! still overflows a buffer drops the oldest one and logs a warning.
//!
//! Listeners are passive (read-only) and exist for UI panels, monitoring and
//! logging layers outside the simulation core.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`], which prevents
//! any allocation or recording for that kind.

use crate::fixed::{Fixed64, Ticks};
use crate::id::{BuildingId, SettlementId};
use crate::mode::{GridMode, PowerMode};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A settlement event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Power grid --
    PowerModeChanged {
        settlement: SettlementId,
        mode: GridMode,
        tick: Ticks,
    },
    GeneratedPowerChanged {
        settlement: SettlementId,
        power: Fixed64,
        tick: Ticks,
    },
    RequiredPowerChanged {
        settlement: SettlementId,
        power: Fixed64,
        tick: Ticks,
    },
    /// The grid moved from sufficient to insufficient power.
    PowerShortage {
        settlement: SettlementId,
        deficit: Fixed64,
        tick: Ticks,
    },
    /// The grid moved from insufficient back to sufficient power.
    PowerRestored {
        settlement: SettlementId,
        tick: Ticks,
    },

    // -- Buildings --
    BuildingPowerModeChanged {
        building: BuildingId,
        from: PowerMode,
        to: PowerMode,
        tick: Ticks,
    },
    BuildingAdded {
        settlement: SettlementId,
        building: BuildingId,
        tick: Ticks,
    },
    BuildingRemoved {
        settlement: SettlementId,
        building: BuildingId,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PowerModeChanged,
    GeneratedPowerChanged,
    RequiredPowerChanged,
    PowerShortage,
    PowerRestored,
    BuildingPowerModeChanged,
    BuildingAdded,
    BuildingRemoved,
}

const EVENT_KIND_COUNT: usize = 8;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PowerModeChanged { .. } => EventKind::PowerModeChanged,
            Event::GeneratedPowerChanged { .. } => EventKind::GeneratedPowerChanged,
            Event::RequiredPowerChanged { .. } => EventKind::RequiredPowerChanged,
            Event::PowerShortage { .. } => EventKind::PowerShortage,
            Event::PowerRestored { .. } => EventKind::PowerRestored,
            Event::BuildingPowerModeChanged { .. } => EventKind::BuildingPowerModeChanged,
            Event::BuildingAdded { .. } => EventKind::BuildingAdded,
            Event::BuildingRemoved { .. } => EventKind::BuildingRemoved,
        }
    }

    pub fn tick(&self) -> Ticks {
        match self {
            Event::PowerModeChanged { tick, .. }
            | Event::GeneratedPowerChanged { tick, .. }
            | Event::RequiredPowerChanged { tick, .. }
            | Event::PowerShortage { tick, .. }
            | Event::PowerRestored { tick, .. }
            | Event::BuildingPowerModeChanged { tick, .. }
            | Event::BuildingAdded { tick, .. }
            | Event::BuildingRemoved { tick, .. } => *tick,
        }
    }
}

impl EventKind {
    pub const ALL: [EventKind; EVENT_KIND_COUNT] = [
        EventKind::PowerModeChanged,
        EventKind::GeneratedPowerChanged,
        EventKind::RequiredPowerChanged,
        EventKind::PowerShortage,
        EventKind::PowerRestored,
        EventKind::BuildingPowerModeChanged,
        EventKind::BuildingAdded,
        EventKind::BuildingRemoved,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Next write position.
    head: usize,
    len: usize,
    /// Including dropped events.
    total_written: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        let capacity = self.capacity();
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        let capacity = self.capacity();
        // head is the oldest entry once the buffer has wrapped
        let start = if self.len < capacity { 0 } else { self.head };
        (0..self.len).filter_map(move |i| self.events[(start + i) % capacity].as_ref())
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Grow to `capacity`, keeping buffered events in order. Never shrinks.
    pub fn grow(&mut self, capacity: usize) {
        let old_capacity = self.capacity();
        if capacity <= old_capacity {
            return;
        }
        let start = if self.len < old_capacity { 0 } else { self.head };
        let mut old = std::mem::take(&mut self.events);
        let mut events: Vec<Option<Event>> = (0..self.len)
            .map(|i| old[(start + i) % old_capacity].take())
            .collect();
        events.resize_with(capacity, || None);
        self.events = events;
        self.head = self.len;
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type Listener = Box<dyn FnMut(&Event) + Send>;

/// Optional predicate that filters events for a listener.
pub type EventFilter = Box<dyn Fn(&Event) -> bool + Send>;

/// Priority level for listeners. Lower priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    Pre = 0,
    Normal = 1,
    Post = 2,
}

struct ListenerEntry {
    listener: Listener,
    priority: ListenerPriority,
    filter: Option<EventFilter>,
    insertion_order: u64,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// One ring buffer per event kind, listener lists, and suppression flags.
pub struct EventBus {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: [Vec<ListenerEntry>; EVENT_KIND_COUNT],
    default_capacity: usize,
    next_insertion_order: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listener_counts: Vec<usize> = self.listeners.iter().map(Vec::len).collect();
        f.debug_struct("EventBus")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("listeners", &listener_counts)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Create a bus with the given buffer capacity per event kind.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Default::default(),
            default_capacity,
            next_insertion_order: 0,
        }
    }

    /// Per-kind capacity used for new buffers.
    pub fn capacity(&self) -> usize {
        self.default_capacity
    }

    /// Make every buffer, present and future, hold at least `capacity`
    /// events. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity <= self.default_capacity {
            return;
        }
        self.default_capacity = capacity;
        for buffer in self.buffers.iter_mut().flatten() {
            buffer.grow(capacity);
        }
    }

    /// Suppressed kinds are never buffered; any pending events are dropped.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Buffer an event for the next delivery. No-op if its kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.default_capacity;
        let buffer = self.buffers[idx].get_or_insert_with(|| EventBuffer::new(capacity));
        if buffer.is_full() {
            log::warn!(
                "{:?} buffer full at {} events, dropping the oldest",
                event.kind(),
                buffer.capacity()
            );
        }
        buffer.push(event);
    }

    /// Events of `kind` waiting for delivery, oldest first.
    pub fn buffered(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.buffers[kind.index()]
            .as_ref()
            .into_iter()
            .flat_map(|buffer| buffer.iter())
    }

    /// Number of events of `kind` waiting for delivery.
    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffers[kind.index()]
            .as_ref()
            .map_or(0, EventBuffer::len)
    }

    /// Register a listener with Normal priority and no filter.
    pub fn on(&mut self, kind: EventKind, listener: Listener) {
        self.on_filtered(kind, ListenerPriority::Normal, None, listener);
    }

    /// Register a listener with explicit priority and optional filter.
    pub fn on_filtered(
        &mut self,
        kind: EventKind,
        priority: ListenerPriority,
        filter: Option<EventFilter>,
        listener: Listener,
    ) {
        let insertion_order = self.next_insertion_order;
        self.next_insertion_order += 1;
        let list = &mut self.listeners[kind.index()];
        list.push(ListenerEntry {
            listener,
            priority,
            filter,
            insertion_order,
        });
        list.sort_by_key(|e| (e.priority, e.insertion_order));
    }

    /// Deliver all buffered events to listeners, then clear the buffers.
    ///
    /// Kinds are delivered in [`EventKind::ALL`] order; within a kind, events
    /// go oldest to newest and listeners run by `(priority, registration)`.
    /// Emission order across kinds is not kept: a listener on several kinds
    /// sees every `PowerModeChanged` of the batch before any `BuildingAdded`,
    /// whichever happened first. Use [`Event::tick`] to relate them.
    pub fn deliver(&mut self) {
        for idx in 0..EVENT_KIND_COUNT {
            let Some(buffer) = self.buffers[idx].as_mut() else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }
            let events: Vec<Event> = buffer.iter().cloned().collect();
            buffer.clear();

            for entry in &mut self.listeners[idx] {
                for event in &events {
                    if entry.filter.as_ref().is_some_and(|f| !f(event)) {
                        continue;
                    }
                    (entry.listener)(event);
                }
            }
        }
    }

    /// Drop every buffered event without delivering it.
    pub fn clear(&mut self) {
        for buffer in self.buffers.iter_mut().flatten() {
            buffer.clear();
        }
    }
}
