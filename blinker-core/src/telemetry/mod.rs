//! Telemetry event catalog and ring buffer shared by firmware and host targets.
//!
//! Events carry compact numeric codes so they can be mirrored over a
//! diagnostics link, and the [`TelemetryRecorder`] keeps the most recent ones
//! in a fixed-capacity history without allocating.

use core::fmt;

use heapless::HistoryBuf;

use crate::pin::Level;
use crate::timing::Millis;

/// Number of telemetry records retained.
pub const TELEMETRY_RING_CAPACITY: usize = 32;

/// Identifier assigned to each recorded event.
pub type EventId = u32;

/// Discriminated telemetry events emitted by the LED controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryEventKind {
    PinAssigned,
    SequenceStarted,
    LevelChanged(Level),
    SequenceCompleted,
    SequenceStopped,
    Custom(u16),
}

impl fmt::Display for TelemetryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEventKind::PinAssigned => f.write_str("pin-assigned"),
            TelemetryEventKind::SequenceStarted => f.write_str("sequence-started"),
            TelemetryEventKind::LevelChanged(level) => write!(f, "level-changed {level}"),
            TelemetryEventKind::SequenceCompleted => f.write_str("sequence-completed"),
            TelemetryEventKind::SequenceStopped => f.write_str("sequence-stopped"),
            TelemetryEventKind::Custom(code) => write!(f, "custom({code})"),
        }
    }
}

impl TelemetryEventKind {
    const PIN_ASSIGNED_CODE: u16 = 0x0001;
    const SEQUENCE_STARTED_CODE: u16 = 0x0002;
    const LEVEL_LOW_CODE: u16 = 0x0010;
    const LEVEL_HIGH_CODE: u16 = 0x0011;
    const SEQUENCE_COMPLETED_CODE: u16 = 0x0020;
    const SEQUENCE_STOPPED_CODE: u16 = 0x0021;

    /// Encodes the event into a compact transport-friendly discriminant.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            TelemetryEventKind::PinAssigned => Self::PIN_ASSIGNED_CODE,
            TelemetryEventKind::SequenceStarted => Self::SEQUENCE_STARTED_CODE,
            TelemetryEventKind::LevelChanged(Level::Low) => Self::LEVEL_LOW_CODE,
            TelemetryEventKind::LevelChanged(Level::High) => Self::LEVEL_HIGH_CODE,
            TelemetryEventKind::SequenceCompleted => Self::SEQUENCE_COMPLETED_CODE,
            TelemetryEventKind::SequenceStopped => Self::SEQUENCE_STOPPED_CODE,
            TelemetryEventKind::Custom(code) => code,
        }
    }

    /// Decodes a raw discriminant, falling back to [`TelemetryEventKind::Custom`].
    #[must_use]
    pub const fn from_raw(code: u16) -> Self {
        match code {
            Self::PIN_ASSIGNED_CODE => TelemetryEventKind::PinAssigned,
            Self::SEQUENCE_STARTED_CODE => TelemetryEventKind::SequenceStarted,
            Self::LEVEL_LOW_CODE => TelemetryEventKind::LevelChanged(Level::Low),
            Self::LEVEL_HIGH_CODE => TelemetryEventKind::LevelChanged(Level::High),
            Self::SEQUENCE_COMPLETED_CODE => TelemetryEventKind::SequenceCompleted,
            Self::SEQUENCE_STOPPED_CODE => TelemetryEventKind::SequenceStopped,
            other => TelemetryEventKind::Custom(other),
        }
    }
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TelemetryRecord {
    pub id: EventId,
    pub timestamp_ms: Millis,
    pub event: TelemetryEventKind,
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} t={}ms {}", self.id, self.timestamp_ms, self.event)
    }
}

/// Records telemetry events into a fixed-size ring buffer.
pub struct TelemetryRecorder {
    ring: HistoryBuf<TelemetryRecord, TELEMETRY_RING_CAPACITY>,
    next_event_id: EventId,
}

impl TelemetryRecorder {
    /// Creates a recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_event_id: 0,
        }
    }

    /// Records an event and returns its identifier.
    pub fn record(&mut self, event: TelemetryEventKind, timestamp_ms: Millis) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);
        self.ring.write(TelemetryRecord {
            id,
            timestamp_ms,
            event,
        });
        id
    }

    /// Most recent record, if any.
    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.ring.recent()
    }

    /// Retained records in chronological order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &TelemetryRecord> + '_ {
        self.ring.oldest_ordered()
    }

    /// Records newer than `id`, oldest first. Lets a consumer drain only what
    /// it has not seen yet.
    pub fn since(&self, id: Option<EventId>) -> impl Iterator<Item = &TelemetryRecord> + '_ {
        self.ring
            .oldest_ordered()
            .filter(move |record| {
                id.is_none_or(|seen| record.id.wrapping_sub(seen).cast_signed() > 0)
            })
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}
