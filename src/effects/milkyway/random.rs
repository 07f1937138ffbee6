pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

const MODULUS: u64 = 2_147_483_647;
const MULTIPLIER: u64 = 16_807;

/// Park-Miller minimal standard generator. The same seed always yields the same sky.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        // Zero is a fixed point of the recurrence.
        let state = match seed as u64 % MODULUS {
            0 => 1,
            s => s,
        };
        Self { state }
    }
}

impl RandomSource for Lcg {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.state = self.state * MULTIPLIER % MODULUS;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }
}

pub struct HostRandom {
    rng: fastrand::Rng,
}

impl HostRandom {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }
}

impl Default for HostRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for HostRandom {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.rng.f64()
    }
}

#[cfg(test)]
pub struct Sequence {
    values: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl Sequence {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty());
        Self { values, next: 0 }
    }
}

#[cfg(test)]
impl RandomSource for Sequence {
    fn next_f64(&mut self) -> f64 {
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_roll_for_seed_1337() {
        let mut rng = Lcg::new(1337);
        // 1337 * 16807 = 22_470_959, below the modulus.
        assert_eq!(rng.next_f64(), 22_470_958.0 / 2_147_483_646.0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Lcg::new(99);
        let mut b = Lcg::new(99);
        for _ in 0..1000 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn test_rolls_stay_in_unit_interval() {
        for seed in [0, 1, 1337, u32::MAX, MODULUS as u32] {
            let mut rng = Lcg::new(seed);
            for _ in 0..10_000 {
                let v = rng.next_f64();
                assert!((0.0..1.0).contains(&v), "seed {seed} produced {v}");
            }
        }
    }

    #[test]
    fn test_host_random_in_unit_interval() {
        let mut rng = HostRandom::new();
        for _ in 0..1000 {
            assert!((0.0..1.0).contains(&rng.next_f64()));
        }
    }

    #[test]
    fn test_sequence_wraps() {
        let mut seq = Sequence::new(vec![0.1, 0.2]);
        let rolls: Vec<f64> = (0..3).map(|_| seq.next_f64()).collect();
        assert_eq!(rolls, vec![0.1, 0.2, 0.1]);
    }
}
