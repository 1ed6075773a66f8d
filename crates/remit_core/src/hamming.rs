//! Hamming ball enumeration
//!
//! Gantree: L1_Truncation → HammingBall
//!
//! Enumerates every bitstring within a given Hamming distance of a center,
//! ordered by distance and then by lexicographic flip positions. The order
//! is deterministic; correctness of the solvers does not depend on it.

use crate::types::Bitstring;

/// Iterator over the Hamming ball of radius `r` around a bitstring
/// Gantree: HammingBall // 해밍 볼
#[derive(Debug, Clone)]
pub struct HammingBall {
    center: Bitstring,
    radius: usize,
    /// Flip positions of the next element, strictly increasing
    positions: Vec<usize>,
    done: bool,
}

impl HammingBall {
    /// Create the ball of `radius` around `center`
    /// Gantree: new(center,radius) -> Self // 생성자
    pub fn new(center: Bitstring, radius: usize) -> Self {
        let radius = radius.min(center.len());
        Self {
            center,
            radius,
            positions: Vec::new(),
            done: false,
        }
    }

    /// Effective radius (clamped to the bitstring length)
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Number of elements in the full ball
    pub fn size(&self) -> u64 {
        ball_size(self.center.len(), self.radius)
    }

    fn advance(&mut self) {
        let n = self.center.len();
        let k = self.positions.len();

        // Next combination of the same weight
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.positions[i] < n - k + i {
                self.positions[i] += 1;
                for j in i + 1..k {
                    self.positions[j] = self.positions[j - 1] + 1;
                }
                return;
            }
        }

        if k + 1 > self.radius {
            self.done = true;
        } else {
            self.positions = (0..=k).collect();
        }
    }
}

impl Iterator for HammingBall {
    type Item = Bitstring;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut item = self.center.clone();
        for &p in &self.positions {
            item.flip(p);
        }
        self.advance();
        Some(item)
    }
}

/// Enumerate all bitstrings within `radius` of `center`
/// Gantree: hamming_ball(center,radius) -> Iterator // 해밍 볼 열거
pub fn hamming_ball(center: &Bitstring, radius: usize) -> HammingBall {
    HammingBall::new(center.clone(), radius)
}

/// Binomial coefficient C(n, k), `None` on overflow
pub fn binomial(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 1..=k as u128 {
        // Exact at every step: acc * (n - k + i) is divisible by i
        acc = acc.checked_mul(n as u128 - k as u128 + i)? / i;
    }
    u64::try_from(acc).ok()
}

/// Number of bitstrings of length `n` within distance `radius`, saturating
/// Gantree: ball_size(n,r) -> u64 // Σ C(n,k)
pub fn ball_size(n: usize, radius: usize) -> u64 {
    let mut total: u64 = 0;
    for k in 0..=radius.min(n) {
        match binomial(n, k).and_then(|c| total.checked_add(c)) {
            Some(t) => total = t,
            None => return u64::MAX,
        }
    }
    total
}

/// Number of terms within distance `distance`, capped at `num_elems`
/// Gantree: hamming_terms(n,d,m) -> usize // min(ball,m)
pub fn hamming_terms(n: usize, distance: usize, num_elems: usize) -> usize {
    let size = ball_size(n, distance);
    if size >= num_elems as u64 {
        num_elems
    } else {
        size as usize
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_radius_zero_is_center() {
        let center = Bitstring::parse("1011").unwrap();
        let ball: Vec<_> = hamming_ball(&center, 0).collect();
        assert_eq!(ball, vec![center]);
    }

    #[test]
    fn test_radius_one_order() {
        let center = Bitstring::parse("000").unwrap();
        let ball: Vec<String> = hamming_ball(&center, 1).map(|b| b.to_string()).collect();
        assert_eq!(ball, vec!["000", "001", "010", "100"]);
    }

    #[test]
    fn test_ball_sizes_and_distances() {
        let center = Bitstring::parse("10110").unwrap();
        for r in 0..=5 {
            let ball: Vec<_> = hamming_ball(&center, r).collect();
            assert_eq!(ball.len() as u64, ball_size(5, r));
            let unique: HashSet<_> = ball.iter().cloned().collect();
            assert_eq!(unique.len(), ball.len());
            assert!(ball.iter().all(|b| b.hamming_distance(&center) <= r));
        }
    }

    #[test]
    fn test_full_radius_covers_space() {
        let center = Bitstring::parse("0101").unwrap();
        let ball: HashSet<String> = hamming_ball(&center, 10).map(|b| b.to_string()).collect();
        assert_eq!(ball.len(), 16);
    }

    #[test]
    fn test_deterministic() {
        let center = Bitstring::parse("110010").unwrap();
        let a: Vec<_> = hamming_ball(&center, 3).collect();
        let b: Vec<_> = hamming_ball(&center, 3).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_bitstring() {
        let center = Bitstring::zeros(0);
        assert_eq!(hamming_ball(&center, 2).count(), 1);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 0), Some(1));
        assert_eq!(binomial(5, 2), Some(10));
        assert_eq!(binomial(5, 6), Some(0));
        assert_eq!(binomial(127, 3), Some(333_375));
        assert_eq!(binomial(1000, 500), None);
    }

    #[test]
    fn test_hamming_terms() {
        assert_eq!(hamming_terms(8, 1, 100), 9);
        assert_eq!(hamming_terms(8, 8, 100), 100);
        assert_eq!(ball_size(2000, 1000), u64::MAX);
        assert_eq!(hamming_terms(2000, 1000, 42), 42);
    }
}
