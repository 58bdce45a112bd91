use rand::RngCore;

/// Multiply-with-carry generator used for the heuristic restarts.
///
/// Deterministic for a given seed, so runs are reproducible across
/// platforms. Implements [`rand::RngCore`] so the `rand` shuffling
/// adaptors work on it directly.
#[derive(Clone, Debug)]
pub struct Mwc {
    w: u32,
    z: u32,
}

impl Mwc {
    const DEFAULT_W: u32 = 521_288_629;
    const DEFAULT_Z: u32 = 362_436_069;

    /// Construct a generator from a 64-bit seed. The two halves seed the
    /// two lag words; a zero half falls back to the default constant so
    /// the generator never degenerates.
    pub fn new(seed: u64) -> Self {
        let w = (seed & 0xffff_ffff) as u32;
        let z = (seed >> 32) as u32;
        Self {
            w: if w != 0 { w } else { Self::DEFAULT_W },
            z: if z != 0 { z } else { Self::DEFAULT_Z },
        }
    }
}

impl Default for Mwc {
    fn default() -> Self {
        Self { w: Self::DEFAULT_W, z: Self::DEFAULT_Z }
    }
}

impl RngCore for Mwc {
    fn next_u32(&mut self) -> u32 {
        self.z = 36969u32
            .wrapping_mul(self.z & 65535)
            .wrapping_add(self.z >> 16);
        self.w = 18000u32
            .wrapping_mul(self.w & 65535)
            .wrapping_add(self.w >> 16);
        (self.z << 16).wrapping_add(self.w)
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
