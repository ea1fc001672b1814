use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::Bus;

/// `ioctl` request selecting the slave address for subsequent transfers
/// (from `<linux/i2c-dev.h>`).
const I2C_SLAVE: libc::c_ulong = 0x0703;

/// Linux i2c-dev character device transport.
///
/// Wraps `/dev/i2c-N`. Plain `read(2)`/`write(2)` calls on the device node
/// become single I2C transfers against the currently selected address, which
/// is switched with `I2C_SLAVE` whenever a transfer targets a new device.
pub struct I2cDev {
    file: File,
    path: PathBuf,
    selected: Option<u8>,
    epoch: Instant,
}

impl I2cDev {
    /// Conventional bus on most single-board computers.
    pub const DEFAULT_PATH: &'static str = "/dev/i2c-1";

    /// Open an i2c-dev device node for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        debug!(?path, "opened i2c bus");

        Ok(Self {
            file,
            path,
            selected: None,
            epoch: Instant::now(),
        })
    }

    /// Path of the device node this bus was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn select(&mut self, address: u8) -> Result<()> {
        if self.selected == Some(address) {
            return Ok(());
        }

        // SAFETY: `file` owns an open descriptor for the lifetime of this call and
        // I2C_SLAVE takes its argument by value, so no pointers are passed.
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(address),
            )
        };
        if rc < 0 {
            self.selected = None;
            return Err(TransportError::SelectAddress {
                address,
                source: std::io::Error::last_os_error(),
            });
        }

        trace!(address, "selected i2c target");
        self.selected = Some(address);
        Ok(())
    }
}

impl Bus for I2cDev {
    fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        self.select(address)?;
        loop {
            match self.file.write(bytes) {
                Ok(n) if n == bytes.len() => return Ok(()),
                Ok(n) => {
                    return Err(TransportError::Io(std::io::Error::new(
                        ErrorKind::WriteZero,
                        format!("short i2c write ({n} of {} bytes)", bytes.len()),
                    )))
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn read_byte(&mut self, address: u8) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_bytes(address, &mut byte)?;
        Ok(byte[0])
    }

    fn read_bytes(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        self.select(address)?;
        // A single read(2) is a single bus transfer; a short read cannot be resumed.
        loop {
            match self.file.read(buf) {
                Ok(n) if n == buf.len() => return Ok(()),
                Ok(n) => {
                    return Err(TransportError::Io(std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        format!("short i2c read ({n} of {} bytes)", buf.len()),
                    )))
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl std::fmt::Debug for I2cDev {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I2cDev")
            .field("path", &self.path)
            .field("selected", &self.selected)
            .finish()
    }
}
