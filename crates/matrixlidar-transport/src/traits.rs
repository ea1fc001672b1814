use std::time::Duration;

use crate::error::Result;

/// A shared two-wire bus carrying one request/response exchange at a time.
///
/// Every transfer names the 7-bit target address. Implementations are not
/// expected to arbitrate: callers serialize all exchanges against a device.
pub trait Bus {
    /// Write `bytes` to the device at `address` in one transfer.
    fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<()>;

    /// Read a single byte from the device at `address`.
    fn read_byte(&mut self, address: u8) -> Result<u8>;

    /// Read exactly `buf.len()` bytes from the device at `address` in one transfer.
    fn read_bytes(&mut self, address: u8, buf: &mut [u8]) -> Result<()>;

    /// Monotonic clock in milliseconds. Only differences are meaningful.
    fn now_ms(&self) -> u64;

    /// Block the calling thread for `duration`.
    fn sleep(&mut self, duration: Duration);
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(address, bytes)
    }

    fn read_byte(&mut self, address: u8) -> Result<u8> {
        (**self).read_byte(address)
    }

    fn read_bytes(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read_bytes(address, buf)
    }

    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<B: Bus + ?Sized> Bus for Box<B> {
    fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(address, bytes)
    }

    fn read_byte(&mut self, address: u8) -> Result<u8> {
        (**self).read_byte(address)
    }

    fn read_bytes(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read_bytes(address, buf)
    }

    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}
