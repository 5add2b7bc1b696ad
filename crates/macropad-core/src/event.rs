// Macropad Event Classification
// Event type codes and key transitions from <linux/input-event-codes.h>

use crate::codec::InputEvent;
use crate::key::Key;

/// EV_KEY event type code
pub const EV_KEY: u16 = 0x01;

/// SYN_REPORT event code. A record with type EV_SYN, code SYN_REPORT and
/// value 0 marks that all events since the previous marker occurred as one
/// atomic input frame. It is forwarded to handlers like any other record;
/// grouping is the handler's concern.
pub const SYN_REPORT: u16 = 0;

/// Kernel event type code space.
///
/// Only `Key` is semantically interpreted by the dispatch layer; all other
/// types pass through uninterpreted. Codes the kernel adds in the future
/// decode to `Unknown` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Syn,
    Key,
    Rel,
    Abs,
    Msc,
    Sw,
    Led,
    Snd,
    Rep,
    Ff,
    Pwr,
    FfStatus,
    Unknown(u16),
}

impl EventType {
    /// Classify a raw event type code
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x00 => EventType::Syn,
            0x01 => EventType::Key,
            0x02 => EventType::Rel,
            0x03 => EventType::Abs,
            0x04 => EventType::Msc,
            0x05 => EventType::Sw,
            0x11 => EventType::Led,
            0x12 => EventType::Snd,
            0x14 => EventType::Rep,
            0x15 => EventType::Ff,
            0x16 => EventType::Pwr,
            0x17 => EventType::FfStatus,
            other => EventType::Unknown(other),
        }
    }

    /// The raw numeric code for this event type
    pub fn raw(self) -> u16 {
        match self {
            EventType::Syn => 0x00,
            EventType::Key => 0x01,
            EventType::Rel => 0x02,
            EventType::Abs => 0x03,
            EventType::Msc => 0x04,
            EventType::Sw => 0x05,
            EventType::Led => 0x11,
            EventType::Snd => 0x12,
            EventType::Rep => 0x14,
            EventType::Ff => 0x15,
            EventType::Pwr => 0x16,
            EventType::FfStatus => 0x17,
            EventType::Unknown(raw) => raw,
        }
    }
}

/// Key transition carried in the `value` field of an EV_KEY record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum KeyState {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl KeyState {
    /// Classify an EV_KEY value. Anything outside 0..=2 yields `None`.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Release),
            1 => Some(KeyState::Press),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }

    /// Returns true if this is a RELEASE transition
    pub fn is_released(self) -> bool {
        matches!(self, KeyState::Release)
    }

    /// Returns true if the key is down (PRESS or REPEAT)
    pub fn is_pressed(self) -> bool {
        matches!(self, KeyState::Press | KeyState::Repeat)
    }
}

/// Check if a record is a key event
pub fn is_key_event(event: &InputEvent) -> bool {
    event.event_type == EV_KEY
}

/// Check if a record is the SYN/REPORT frame marker
pub fn is_syn_report(event: &InputEvent) -> bool {
    EventType::from_raw(event.event_type) == EventType::Syn
        && event.code == SYN_REPORT
        && event.value == 0
}

/// Classify a record as an actionable key release.
///
/// Returns the released key for an EV_KEY record with a RELEASE value.
/// Press and repeat transitions, and every non-key record, yield `None`;
/// repeats while a key is held are deliberately not dispatched.
pub fn key_release(event: &InputEvent) -> Option<Key> {
    if !is_key_event(event) {
        return None;
    }
    match KeyState::from_value(event.value) {
        Some(state) if state.is_released() => Some(Key::from(event.code)),
        _ => None,
    }
}
