use std::sync::atomic::{AtomicU32, Ordering};

/// Highest accepted volume step
pub const MAX_VOLUME: u8 = 100;

/// Map a 0..=100 volume step onto a linear gain
pub fn volume_to_gain(volume: u8) -> f32 {
    volume.min(MAX_VOLUME) as f32 / MAX_VOLUME as f32
}

/// Atomic f32 wrapper for lock-free parameter updates
pub struct AtomicF32 {
    storage: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            storage: AtomicU32::new(value.to_bits()),
        }
    }

    pub fn load(&self, ordering: Ordering) -> f32 {
        f32::from_bits(self.storage.load(ordering))
    }

    pub fn store(&self, value: f32, ordering: Ordering) {
        self.storage.store(value.to_bits(), ordering);
    }
}

impl std::fmt::Debug for AtomicF32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AtomicF32").field(&self.load(Ordering::Relaxed)).finish()
    }
}
