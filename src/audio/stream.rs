//! Single-producer / single-consumer sample ring between the producer loop
//! and the audio callback.
//!
//! Everything is atomics: `pull` never waits, so it is safe to call from a
//! real-time callback. Cursors grow monotonically; a slot index is the cursor
//! modulo capacity. The producer may advance the read cursor itself (evicting
//! under [`OverrunPolicy::DropOldest`], or in [`SampleStream::flush`]), so the
//! consumer commits its read with a compare-exchange and retries if the
//! samples it copied were invalidated underneath it.

use crossbeam_utils::{Backoff, CachePadded};
use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use super::parameters::AtomicF32;
use crate::types::sample_rate::SampleRate;

/// Shortest buffer the stream will allocate
pub const MIN_BUFFER_DURATION: Duration = Duration::from_millis(100);

/// Number of recent output samples kept for the scope view
pub const SCOPE_LEN: usize = 512;

/// What a full buffer does with new samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrunPolicy {
    /// Wait for the consumer, dropping the new sample once `timeout` expires
    Block { timeout: Duration },
    /// Overwrite the oldest unread sample
    DropOldest,
}

impl Default for OverrunPolicy {
    fn default() -> Self {
        OverrunPolicy::Block {
            timeout: Duration::from_millis(20),
        }
    }
}

/// Buffer sizing and overrun behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSettings {
    pub capacity: Duration,
    pub policy: OverrunPolicy,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            capacity: Duration::from_millis(200),
            policy: OverrunPolicy::default(),
        }
    }
}

/// Result of a single push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Written,
    /// Written after evicting the oldest sample
    DroppedOldest,
    /// Buffer stayed full for the whole block timeout; sample discarded
    TimedOut,
}

/// Non-fatal buffer conditions, surfaced only as counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCondition {
    /// The consumer asked for more than was buffered and got silence
    Underrun,
    /// The producer found the buffer full
    Overrun,
}

/// Counter snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamStats {
    pub underruns: u64,
    pub overruns: u64,
    pub samples_written: u64,
    pub samples_read: u64,
}

impl StreamStats {
    pub fn count(&self, condition: StreamCondition) -> u64 {
        match condition {
            StreamCondition::Underrun => self.underruns,
            StreamCondition::Overrun => self.overruns,
        }
    }
}

pub struct SampleStream {
    slots: Box<[AtomicI16]>,
    read: CachePadded<AtomicUsize>,
    write: CachePadded<AtomicUsize>,
    policy: OverrunPolicy,
    gain: AtomicF32,
    idle: AtomicBool,
    underruns: AtomicU64,
    overruns: AtomicU64,
    samples_written: AtomicU64,
    samples_read: AtomicU64,
    scope: Box<[AtomicI16]>,
    scope_pos: AtomicUsize,
}

impl SampleStream {
    /// Stream holding `settings.capacity` of audio, never less than 100 ms
    pub fn new(sample_rate: SampleRate, settings: BufferSettings) -> Self {
        let duration = settings.capacity.max(MIN_BUFFER_DURATION);
        Self::with_capacity(sample_rate.samples_for(duration), settings.policy)
    }

    /// Stream holding exactly `capacity` samples (at least one)
    pub fn with_capacity(capacity: usize, policy: OverrunPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| AtomicI16::new(0)).collect(),
            read: CachePadded::new(AtomicUsize::new(0)),
            write: CachePadded::new(AtomicUsize::new(0)),
            policy,
            gain: AtomicF32::new(1.0),
            idle: AtomicBool::new(false),
            underruns: AtomicU64::new(0),
            overruns: AtomicU64::new(0),
            samples_written: AtomicU64::new(0),
            samples_read: AtomicU64::new(0),
            scope: (0..SCOPE_LEN).map(|_| AtomicI16::new(0)).collect(),
            scope_pos: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Unread samples
    pub fn len(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        write.wrapping_sub(read).min(self.capacity())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free slots
    pub fn free_len(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Append one sample. Producer side only.
    pub fn push(&self, sample: i16) -> PushOutcome {
        let capacity = self.capacity();
        let write = self.write.load(Ordering::Relaxed);
        let mut outcome = PushOutcome::Written;
        let mut deadline: Option<Instant> = None;
        let backoff = Backoff::new();

        loop {
            let read = self.read.load(Ordering::Acquire);
            if write.wrapping_sub(read) < capacity {
                break;
            }

            match self.policy {
                OverrunPolicy::DropOldest => {
                    let evicted = read.wrapping_add(1);
                    if self
                        .read
                        .compare_exchange(read, evicted, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.overruns.fetch_add(1, Ordering::Relaxed);
                        outcome = PushOutcome::DroppedOldest;
                        break;
                    }
                }
                OverrunPolicy::Block { timeout } => {
                    let deadline = *deadline.get_or_insert_with(|| Instant::now() + timeout);
                    if Instant::now() >= deadline {
                        self.overruns.fetch_add(1, Ordering::Relaxed);
                        return PushOutcome::TimedOut;
                    }
                    if backoff.is_completed() {
                        thread::sleep(Duration::from_micros(50));
                    } else {
                        backoff.snooze();
                    }
                }
            }
        }

        self.slots[write % capacity].store(sample, Ordering::Relaxed);
        self.write.store(write.wrapping_add(1), Ordering::Release);
        self.samples_written.fetch_add(1, Ordering::Relaxed);
        outcome
    }

    /// Push a run of samples, returning how many were actually written
    pub fn push_slice(&self, samples: &[i16]) -> usize {
        samples
            .iter()
            .filter(|&&sample| self.push(sample) != PushOutcome::TimedOut)
            .count()
    }

    /// Fill `out`, padding with silence. Consumer side only; never blocks.
    ///
    /// Returns the number of buffered samples delivered.
    pub fn pull(&self, out: &mut [i16]) -> usize {
        let capacity = self.capacity();

        let delivered = loop {
            let read = self.read.load(Ordering::Acquire);
            let write = self.write.load(Ordering::Acquire);
            let available = write.wrapping_sub(read).min(capacity);
            let n = available.min(out.len());

            for (i, slot) in out[..n].iter_mut().enumerate() {
                *slot = self.slots[read.wrapping_add(i) % capacity].load(Ordering::Relaxed);
            }

            if self
                .read
                .compare_exchange(read, read.wrapping_add(n), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                break n;
            }
        };

        let gain = self.gain.load(Ordering::Relaxed);
        if gain < 1.0 {
            for sample in out[..delivered].iter_mut() {
                *sample = (*sample as f32 * gain).round() as i16;
            }
        }
        out[delivered..].fill(0);

        if delivered < out.len() && !self.idle.load(Ordering::Relaxed) {
            self.underruns.fetch_add(1, Ordering::Relaxed);
        }
        self.samples_read.fetch_add(delivered as u64, Ordering::Relaxed);
        self.record_scope(out);

        delivered
    }

    /// Drop every unread sample. Producer side only.
    pub fn flush(&self) {
        let write = self.write.load(Ordering::Acquire);
        self.read.fetch_max(write, Ordering::AcqRel);
    }

    /// Output gain applied in `pull`, clamped to `[0, 1]`
    pub fn set_gain(&self, gain: f32) {
        self.gain.store(gain.clamp(0.0, 1.0), Ordering::Relaxed);
    }

    #[cfg(test)]
    pub fn gain(&self) -> f32 {
        self.gain.load(Ordering::Relaxed)
    }

    /// Mark the stream as intentionally silent; short reads stop counting as underruns
    pub fn set_idle(&self, idle: bool) {
        self.idle.store(idle, Ordering::Relaxed);
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.idle.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            underruns: self.underruns.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            samples_written: self.samples_written.load(Ordering::Relaxed),
            samples_read: self.samples_read.load(Ordering::Relaxed),
        }
    }

    /// Most recent output samples, oldest first
    pub fn scope(&self) -> Vec<i16> {
        let pos = self.scope_pos.load(Ordering::Relaxed);
        (0..SCOPE_LEN)
            .map(|i| self.scope[(pos + i) % SCOPE_LEN].load(Ordering::Relaxed))
            .collect()
    }

    fn record_scope(&self, out: &[i16]) {
        let mut pos = self.scope_pos.load(Ordering::Relaxed);
        let skip = out.len().saturating_sub(SCOPE_LEN);
        for &sample in &out[skip..] {
            self.scope[pos].store(sample, Ordering::Relaxed);
            pos = (pos + 1) % SCOPE_LEN;
        }
        self.scope_pos.store(pos, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for SampleStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleStream")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("policy", &self.policy)
            .field("stats", &self.stats())
            .finish()
    }
}
