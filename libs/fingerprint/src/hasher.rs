//! Resettable 32-bit hash state.

/// A streaming hash that can be reset and finalized to 32 bits.
pub trait HashState {
    /// Returns the state to its initial value.
    fn reset(&mut self);

    /// Feeds bytes into the hash.
    fn write(&mut self, bytes: &[u8]);

    /// Returns the current 32-bit sum without consuming the state.
    fn sum32(&self) -> u32;
}

const FNV32_OFFSET: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv32a {
    state: u32,
}

impl Fnv32a {
    pub fn new() -> Self {
        Self {
            state: FNV32_OFFSET,
        }
    }
}

impl Default for Fnv32a {
    fn default() -> Self {
        Self::new()
    }
}

impl HashState for Fnv32a {
    fn reset(&mut self) {
        self.state = FNV32_OFFSET;
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u32::from(b);
            self.state = self.state.wrapping_mul(FNV32_PRIME);
        }
    }

    fn sum32(&self) -> u32 {
        self.state
    }
}
