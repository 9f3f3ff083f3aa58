/// xorshift64* generator used wherever the upstream JS reaches for
/// `Math.random`.
///
/// Seeding is explicit so a chart laid out twice with the same seed produces
/// the same scene.
#[derive(Debug, Clone)]
pub struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    pub fn new(seed: u64) -> Self {
        // State must never be zero.
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D_u64)
    }

    /// Map to `[0, 1)` with 53 bits of precision.
    pub fn next_f64_unit(&mut self) -> f64 {
        let u = self.next_u64() >> 11;
        (u as f64) / ((1u64 << 53) as f64)
    }

    /// Matches JS `Math.floor(Math.random() * upper)`.
    pub fn next_usize(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        let v = (self.next_f64_unit() * upper as f64).floor() as usize;
        v.min(upper - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::XorShift64Star;

    #[test]
    fn next_f64_unit_matches_seeded_baseline() {
        // First draws for seed 1; pinned so seeded layouts stay stable across
        // refactors of the callers.
        let mut rng = XorShift64Star::new(1);
        let expected = [
            0.28083505005035947,
            0.6711372530266764,
            0.7258461452833668,
        ];
        for (i, &e) in expected.iter().enumerate() {
            let v = rng.next_f64_unit();
            assert!(
                (v - e).abs() < 1e-15,
                "unexpected rng value at {i}: got {v}, expected {e}"
            );
        }
    }

    #[test]
    fn next_usize_floors_like_js_math_random_scaling() {
        // For seed 1 the first unit draw is ~0.2808, so floor(r * 3) == 0.
        let mut rng = XorShift64Star::new(1);
        assert_eq!(rng.next_usize(3), 0);
    }

    #[test]
    fn next_usize_stays_below_upper_bound() {
        let mut rng = XorShift64Star::new(7);
        for _ in 0..1000 {
            assert!(rng.next_usize(5) < 5);
        }
    }

    #[test]
    fn zero_seed_is_remapped_and_still_deterministic() {
        let mut a = XorShift64Star::new(0);
        let mut b = XorShift64Star::new(0);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn cloned_generator_continues_the_same_sequence() {
        let mut a = XorShift64Star::new(42);
        for _ in 0..5 {
            a.next_u64();
        }
        let mut b = a.clone();
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }
}
