// Macropad Device Session
// Exclusive access and blocking read-decode-dispatch over one evdev node

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use crate::codec::{self, CodecError, InputEvent, EVENT_SIZE, EVIOCGRAB};

/// Result type for device session operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors surfaced by a device session. Nothing is retried or swallowed
/// internally; every failure propagates to the immediate caller.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device path cannot be opened (missing, permission denied,
    /// not a character device). Fatal to the session.
    #[error("cannot open device {path}: {source}")]
    DeviceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An ioctl against the open handle reported an error
    #[error("control request failed: {0}")]
    ControlRequestFailed(#[source] std::io::Error),

    /// A read returned a byte count other than zero or the record width.
    /// Unrecoverable: the stream has no delimiter to realign on.
    #[error(transparent)]
    Malformed(#[from] CodecError),

    /// Operation invoked on a handle that has already been closed
    #[error("device is closed")]
    InvalidState,

    /// Read failure on the device file
    #[error("device read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Fixed capacity for the EVIOCGNAME reply. 255 bytes covers every name
/// string the kernel reports.
const NAME_BUF_LEN: usize = 255;

/// One open input device under /dev/input/.
///
/// Owns the handle exclusively; it is never shared or duplicated. The
/// lifecycle is Closed -> Open -> Grabbed, and the release path (ungrab
/// then close) runs on every exit, including panics, via `Drop`.
#[derive(Debug)]
pub struct InputDevice {
    file: Option<File>,
    path: PathBuf,
    name: Option<String>,
    grabbed: bool,
}

impl InputDevice {
    /// Open a device file for read-only binary access.
    pub fn open<P: AsRef<Path>>(path: P) -> DeviceResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| DeviceError::DeviceUnavailable {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            file: Some(file),
            path,
            name: None,
            grabbed: false,
        })
    }

    /// The path this device was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fd(&self) -> DeviceResult<i32> {
        self.file
            .as_ref()
            .map(|f| f.as_raw_fd())
            .ok_or(DeviceError::InvalidState)
    }

    /// Name of the device as reported by EVIOCGNAME.
    ///
    /// Queried once and cached; repeat calls return the cached value
    /// without issuing another control request.
    pub fn name(&mut self) -> DeviceResult<&str> {
        if self.name.is_none() {
            let fd = self.fd()?;
            let mut buf = [0u8; NAME_BUF_LEN];
            let len = unsafe {
                libc::ioctl(
                    fd,
                    codec::eviocgname(buf.len()) as libc::c_ulong,
                    buf.as_mut_ptr(),
                )
            };
            // A negative length signals failure and must never index the buffer
            if len < 0 {
                return Err(DeviceError::ControlRequestFailed(
                    std::io::Error::last_os_error(),
                ));
            }

            let name = trim_device_name(&buf, len as usize);
            log::debug!("device {} reports name '{}'", self.path.display(), name);
            self.name = Some(name);
        }

        Ok(self.name.as_deref().unwrap_or_default())
    }

    /// Grab or release the device for exclusive use.
    ///
    /// While grabbed, the kernel stops delivering this device's events to
    /// every other listener; events arrive only on this handle.
    pub fn grab(&mut self, enabled: bool) -> DeviceResult<()> {
        let fd = self.fd()?;
        let payload: libc::c_ulong = if enabled { 1 } else { 0 };
        let res = unsafe { libc::ioctl(fd, EVIOCGRAB as libc::c_ulong, payload) };
        if res < 0 {
            return Err(DeviceError::ControlRequestFailed(
                std::io::Error::last_os_error(),
            ));
        }
        self.grabbed = enabled;
        Ok(())
    }

    /// Block on the device and hand every record to `handler`, in device
    /// order, until the stream ends.
    ///
    /// Each iteration reads exactly one fixed-width record, decodes it and
    /// invokes the handler synchronously before the next read: a slow
    /// handler throttles consumption while the kernel buffers pending
    /// events. A zero-length read (device closed) or an interrupting
    /// signal ends the loop cleanly; a short read is a framing violation.
    pub fn read_events<F>(&self, handler: F) -> DeviceResult<()>
    where
        F: FnMut(InputEvent),
    {
        let mut file = self.file.as_ref().ok_or(DeviceError::InvalidState)?;
        read_records(&mut file, handler)
    }

    /// Release the grab (if held) and close the handle. Further operations
    /// on this session fail with `InvalidState`.
    pub fn close(&mut self) {
        if self.grabbed {
            if let Some(ref file) = self.file {
                // Errors on release are ignored; the fd is going away anyway
                unsafe {
                    libc::ioctl(file.as_raw_fd(), EVIOCGRAB as libc::c_ulong, 0 as libc::c_ulong)
                };
            }
            self.grabbed = false;
        }
        self.file = None;
    }
}

/// When a session ends, the device MUST be ungrabbed and closed, otherwise
/// the keyboard stays captured and unusable for the rest of the system.
/// `Drop` guarantees the release path runs even during panic unwinding.
impl Drop for InputDevice {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read-decode-dispatch over any record stream.
///
/// This is the loop behind [`InputDevice::read_events`], generic over the
/// reader so synthetic byte streams and captures can drive it. No
/// buffering beyond one record, no coalescing, no reordering; SYN/REPORT
/// markers pass through like any other record.
pub fn read_records<R, F>(reader: &mut R, mut handler: F) -> DeviceResult<()>
where
    R: Read,
    F: FnMut(InputEvent),
{
    let mut buf = [0u8; EVENT_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(n) => n,
            // A signal arrived during the blocking read; unwind so the
            // session's release path runs before the process exits.
            Err(ref e) if e.kind() == ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(DeviceError::Io(e)),
        };

        match n {
            // End of stream: the device went away. Not an error.
            0 => return Ok(()),
            n if n == EVENT_SIZE => handler(codec::decode(&buf)?),
            n => {
                return Err(CodecError::MalformedRecord {
                    expected: EVENT_SIZE,
                    actual: n,
                }
                .into())
            }
        }
    }
}

/// Strip a single trailing NUL from an EVIOCGNAME reply and decode the
/// remaining bytes as text.
fn trim_device_name(buf: &[u8], len: usize) -> String {
    let mut end = len.min(buf.len());
    if end > 0 && buf[end - 1] == 0 {
        end -= 1;
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
