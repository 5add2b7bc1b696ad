// Macropad Core Library
// Kernel event codec, device session and key dispatch primitives

pub mod codec;
pub mod device;
pub mod event;
pub mod key;
pub mod mapping;

pub use codec::{decode, encode, CodecError, CodecResult, InputEvent, EVENT_SIZE, EVIOCGRAB};
pub use device::{read_records, DeviceError, DeviceResult, InputDevice};
pub use event::{is_key_event, is_syn_report, key_release, EventType, KeyState, EV_KEY, SYN_REPORT};
pub use key::{key_from_name, key_name, Key};
pub use mapping::{ActionMap, MappingError, MappingResult};
