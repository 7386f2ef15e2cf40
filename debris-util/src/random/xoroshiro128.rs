use super::RandomImpl;

const SILVER_RATIO_64: u64 = 0x6A09E667F3BCC909;
const GOLDEN_RATIO_64: u64 = 0x9E3779B97F4A7C15;

fn mix_stafford_13(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// xoroshiro128++ generator.
pub struct Xoroshiro {
    lo: u64,
    hi: u64,
}

impl Xoroshiro {
    pub fn from_seed(seed: u64) -> Self {
        let lo = seed ^ SILVER_RATIO_64;
        let hi = lo.wrapping_add(GOLDEN_RATIO_64);
        Self::new(mix_stafford_13(lo), mix_stafford_13(hi))
    }

    fn new(lo: u64, hi: u64) -> Self {
        if lo | hi == 0 {
            // The all-zero state is a fixed point of the shift/rotate step.
            return Self {
                lo: GOLDEN_RATIO_64,
                hi: SILVER_RATIO_64,
            };
        }
        Self { lo, hi }
    }

    fn next_u64(&mut self) -> u64 {
        let l = self.lo;
        let mut h = self.hi;
        let value = l.wrapping_add(h).rotate_left(17).wrapping_add(l);

        h ^= l;
        self.lo = l.rotate_left(49) ^ h ^ (h << 21);
        self.hi = h.rotate_left(28);

        value
    }

    fn next_bits(&mut self, bits: u32) -> u64 {
        self.next_u64() >> (64 - bits)
    }
}

impl RandomImpl for Xoroshiro {
    fn next_i32(&mut self) -> i32 {
        self.next_u64() as i32
    }

    fn next_bounded_i32(&mut self, bound: i32) -> i32 {
        assert!(bound > 0);
        let bound = bound as u64;
        loop {
            let bits = self.next_u64() >> 33;
            let product = bits.wrapping_mul(bound);
            let low = product & 0x7FFF_FFFF;
            if low >= bound || low >= (1u64 << 31).wrapping_sub(bound) % bound {
                return (product >> 31) as i32;
            }
        }
    }

    fn next_i64(&mut self) -> i64 {
        self.next_u64() as i64
    }

    fn next_bool(&mut self) -> bool {
        self.next_u64() & 1 != 0
    }

    fn next_f32(&mut self) -> f32 {
        self.next_bits(24) as f32 * 5.960_464_5E-8
    }

    fn next_f64(&mut self) -> f64 {
        self.next_bits(53) as f64 * 1.110_223_024_625_156_5E-16
    }
}
