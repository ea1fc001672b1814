//! Deterministic in-memory bus for tests.
//!
//! Reads are served from a byte queue; once the queue is empty every read
//! yields `0xFF`, which is what an idle device returns while it has nothing
//! to say. Time is virtual: the clock advances by a fixed tick on every read
//! and by the full amount of every sleep, so timeout behaviour can be tested
//! without waiting on the wall clock.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::traits::Bus;

/// Byte returned once the scripted queue is exhausted.
pub const IDLE_BYTE: u8 = 0xFF;

/// A bus that replays scripted bytes and records everything written to it.
#[derive(Debug, Clone)]
pub struct ScriptedBus {
    rx: VecDeque<u8>,
    writes: Vec<(u8, Vec<u8>)>,
    sleeps: Vec<Duration>,
    now_ms: u64,
    tick_ms: u64,
    byte_reads: usize,
    block_reads: usize,
    fail_reads: Option<ErrorKind>,
}

impl Default for ScriptedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBus {
    /// Create an idle bus whose clock advances 1 ms per read.
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            writes: Vec::new(),
            sleeps: Vec::new(),
            now_ms: 0,
            tick_ms: 1,
            byte_reads: 0,
            block_reads: 0,
            fail_reads: None,
        }
    }

    /// Create a bus preloaded with `bytes`.
    pub fn with_script(bytes: impl AsRef<[u8]>) -> Self {
        let mut bus = Self::new();
        bus.push(bytes);
        bus
    }

    /// Set how far the clock advances on each read call.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick_ms = tick.as_millis() as u64;
        self
    }

    /// Append bytes to the read queue.
    pub fn push(&mut self, bytes: impl AsRef<[u8]>) {
        self.rx.extend(bytes.as_ref().iter().copied());
    }

    /// Make every subsequent read fail with `kind`.
    pub fn fail_reads(&mut self, kind: ErrorKind) {
        self.fail_reads = Some(kind);
    }

    /// Bytes still waiting in the read queue.
    pub fn remaining(&self) -> usize {
        self.rx.len()
    }

    /// Every write so far, as `(address, bytes)`.
    pub fn writes(&self) -> &[(u8, Vec<u8>)] {
        &self.writes
    }

    /// Every sleep requested so far.
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    /// Number of single-byte reads performed.
    pub fn byte_reads(&self) -> usize {
        self.byte_reads
    }

    /// Number of multi-byte reads performed.
    pub fn block_reads(&self) -> usize {
        self.block_reads
    }

    fn check_read(&mut self) -> Result<()> {
        self.now_ms += self.tick_ms;
        match self.fail_reads {
            Some(kind) => Err(TransportError::Io(std::io::Error::from(kind))),
            None => Ok(()),
        }
    }
}

impl Bus for ScriptedBus {
    fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        self.writes.push((address, bytes.to_vec()));
        Ok(())
    }

    fn read_byte(&mut self, _address: u8) -> Result<u8> {
        self.byte_reads += 1;
        self.check_read()?;
        Ok(self.rx.pop_front().unwrap_or(IDLE_BYTE))
    }

    fn read_bytes(&mut self, _address: u8, buf: &mut [u8]) -> Result<()> {
        self.block_reads += 1;
        self.check_read()?;
        for slot in buf.iter_mut() {
            *slot = self.rx.pop_front().unwrap_or(IDLE_BYTE);
        }
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn sleep(&mut self, duration: Duration) {
        self.now_ms += duration.as_millis() as u64;
        self.sleeps.push(duration);
    }
}
