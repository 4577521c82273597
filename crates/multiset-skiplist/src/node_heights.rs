use oorandom::Rand32;


/// The maximum height of a node in a [`MultisetSkiplist`].
///
/// With the [`random_node_height`] function, a node reaches this height about once per
/// two billion insertions, so the cap is never a practical limit on the expected `O(log n)` height.
///
/// [`MultisetSkiplist`]: crate::MultisetSkiplist
pub const MAX_HEIGHT: usize = 32;


/// The source of coin flips for [`random_node_height`].
///
/// Lists always use their own [`Rand32`]; tests substitute fixed sequences to force heights.
pub(crate) trait Prng32 {
    #[must_use]
    fn rand_u32(&mut self) -> u32;
}

impl Prng32 for Rand32 {
    #[inline]
    fn rand_u32(&mut self) -> u32 {
        // Resolves to the inherent method, not to this trait method.
        Self::rand_u32(self)
    }
}

/// Pick the height of a new node from a single draw: one level, plus one more for each trailing
/// zero bit.
///
/// The result is in `1..=MAX_HEIGHT`, and a node reaches height `h` with probability `2^(1-h)`.
pub(crate) fn random_node_height<P: Prng32>(prng: &mut P) -> usize {
    let flips = prng.rand_u32();
    usize::try_from(flips.trailing_zeros())
        .map_or(MAX_HEIGHT, |extra_levels| (extra_levels + 1).min(MAX_HEIGHT))
}


#[cfg(test)]
mod tests {
    use super::*;


    /// Always produces the same value.
    struct Constant(u32);

    impl Prng32 for Constant {
        fn rand_u32(&mut self) -> u32 {
            self.0
        }
    }

    #[test]
    fn heights_are_capped() {
        assert_eq!(random_node_height(&mut Constant(0)), MAX_HEIGHT);
        assert_eq!(random_node_height(&mut Constant(1)), 1);
        assert_eq!(random_node_height(&mut Constant(0b1100)), 3);
        assert_eq!(random_node_height(&mut Constant(1 << 31)), MAX_HEIGHT);
    }

    #[test]
    fn heights_are_roughly_geometric() {
        let mut prng = Rand32::new(0x5eed);
        let mut counts = [0_u32; MAX_HEIGHT + 1];

        for _ in 0..100_000 {
            let height = random_node_height(&mut prng);
            assert!((1..=MAX_HEIGHT).contains(&height));
            counts[height] += 1;
        }

        // About half of the nodes have height 1, a quarter have height 2, and so on.
        assert!((45_000..55_000).contains(&counts[1]), "height 1: {}", counts[1]);
        assert!((20_000..30_000).contains(&counts[2]), "height 2: {}", counts[2]);
        assert!((9_000..16_000).contains(&counts[3]), "height 3: {}", counts[3]);
        assert!(counts[20..].iter().sum::<u32>() < 10);
    }
}
