//! Subset keys: packed, sortable identifiers for order combinations.
//!
//! A key packs up to [`MAX_LEVEL`] strictly increasing order indices into a
//! `u64`, one byte per index with the first index in the most significant
//! byte. Every index after the first is non-zero, so the first zero byte after
//! the leading one ends the key. Numeric order equals depth-first order of the
//! combination tree, which lets workers claim contiguous ranges of the sorted
//! key array.

use std::fmt;

/// Deepest subset the enumerator produces.
pub const MAX_LEVEL: usize = 8;

/// Largest order pool a key can index.
pub const MAX_ORDERS: usize = 256;

/// A packed combination of order indices.
///
/// # Examples
///
/// ```
/// use courier_solver::SubsetKey;
///
/// let key = SubsetKey::from_indices(&[0, 3, 7]).expect("valid subset");
/// assert_eq!(key.indices().collect::<Vec<_>>(), vec![0, 3, 7]);
/// assert_eq!(key.len(), 3);
/// assert!(SubsetKey::from_indices(&[3, 3]).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubsetKey(u64);

#[expect(
    clippy::len_without_is_empty,
    reason = "a subset key always names at least one order"
)]
impl SubsetKey {
    /// Pack `indices`, which must be strictly increasing, below
    /// [`MAX_ORDERS`] and at most [`MAX_LEVEL`] long.
    #[must_use]
    pub fn from_indices(indices: &[usize]) -> Option<Self> {
        if indices.is_empty() || indices.len() > MAX_LEVEL {
            return None;
        }
        if indices.iter().any(|&index| index >= MAX_ORDERS) {
            return None;
        }
        if indices.windows(2).any(|pair| pair.first() >= pair.last()) {
            return None;
        }
        Some(Self::pack(indices))
    }

    fn pack(indices: &[usize]) -> Self {
        let packed = indices.iter().fold(0_u64, |acc, &index| {
            let byte = u8::try_from(index).map_or(0, u64::from);
            (acc << 8) | byte
        });
        let padding = MAX_LEVEL.saturating_sub(indices.len());
        let shift = u32::try_from(padding.saturating_mul(8)).unwrap_or(0);
        Self(packed.checked_shl(shift).unwrap_or(0))
    }

    /// The raw packed value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    fn byte(self, position: u32) -> usize {
        let shift = 56_u32.saturating_sub(position.saturating_mul(8));
        u8::try_from((self.0 >> shift) & 0xFF).map_or(0, usize::from)
    }

    /// Order indices in increasing order.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        std::iter::once(self.byte(0)).chain(
            (1..8_u32)
                .map(move |position| self.byte(position))
                .take_while(|&index| index != 0),
        )
    }

    /// Number of orders in the subset.
    #[must_use]
    pub fn len(self) -> usize {
        self.indices().count()
    }
}

impl fmt::Display for SubsetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.indices()).finish()
    }
}

/// Binomial coefficient `C(n, k)`, saturating at `u64::MAX`.
#[must_use]
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n.saturating_sub(k));
    let mut value = 1_u128;
    for step in 1..=k {
        let factor = u128::try_from(n.saturating_sub(k).saturating_add(step)).unwrap_or(u128::MAX);
        let divisor = u128::try_from(step).unwrap_or(1);
        value = value.saturating_mul(factor).checked_div(divisor).unwrap_or(0);
    }
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Number of keys produced for `order_count` orders at depth `level`:
/// the sum of `C(n, m)` for `m` in `1..=level`, with `level` clamped to
/// `order_count` and [`MAX_LEVEL`].
#[must_use]
pub fn key_count(order_count: usize, level: usize) -> u64 {
    let depth = level.min(order_count).min(MAX_LEVEL);
    (1..=depth).fold(0_u64, |total, size| {
        total.saturating_add(binomial(order_count, size))
    })
}

/// Deepest level whose key count for `order_count` orders fits `budget`.
///
/// Returns 0 for an empty pool, a pool larger than [`MAX_ORDERS`], or when
/// even single-order subsets exceed the budget.
#[must_use]
pub fn level_for(order_count: usize, budget: u64) -> usize {
    if order_count == 0 || order_count > MAX_ORDERS {
        return 0;
    }
    (1..=order_count.min(MAX_LEVEL))
        .take_while(|&level| key_count(order_count, level) <= budget)
        .last()
        .unwrap_or(0)
}

/// Largest pool that can be searched exhaustively at `level` within `budget`.
#[must_use]
pub fn max_orders_for_level(level: usize, budget: u64) -> usize {
    if level == 0 {
        return 0;
    }
    (1..=MAX_ORDERS)
        .take_while(|&count| key_count(count, level) <= budget)
        .last()
        .unwrap_or(0)
}

/// Every combination of `1..=level` indices out of `order_count`, sorted
/// ascending.
///
/// Returns an empty vector for an empty pool, a pool larger than
/// [`MAX_ORDERS`], or a zero level. The output is allocated once at its exact
/// final size.
#[must_use]
pub fn enumerate_keys(order_count: usize, level: usize) -> Vec<SubsetKey> {
    let depth = level.min(order_count).min(MAX_LEVEL);
    if order_count == 0 || order_count > MAX_ORDERS || depth == 0 {
        return Vec::new();
    }
    let expected = usize::try_from(key_count(order_count, depth)).unwrap_or(0);
    let mut keys = Vec::with_capacity(expected);
    let mut prefix = Vec::with_capacity(depth);
    descend(&mut keys, &mut prefix, 0, order_count, depth);
    debug_assert_eq!(keys.len(), expected);
    keys
}

fn descend(
    keys: &mut Vec<SubsetKey>,
    prefix: &mut Vec<usize>,
    first: usize,
    order_count: usize,
    depth: usize,
) {
    for index in first..order_count {
        prefix.push(index);
        keys.push(SubsetKey::pack(prefix));
        if prefix.len() < depth {
            descend(keys, prefix, index.saturating_add(1), order_count, depth);
        }
        prefix.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn packs_first_index_into_high_byte() {
        let key = SubsetKey::from_indices(&[1, 2]).expect("valid subset");
        assert_eq!(key.get(), 0x0102_0000_0000_0000);
    }

    #[rstest]
    fn full_depth_key_round_trips() {
        let indices = [0, 31, 64, 100, 128, 200, 254, 255];
        let key = SubsetKey::from_indices(&indices).expect("valid subset");
        assert_eq!(key.indices().collect::<Vec<_>>(), indices);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[256])]
    #[case(&[2, 1])]
    #[case(&[0, 1, 2, 3, 4, 5, 6, 7, 8])]
    fn rejects_invalid_subsets(#[case] indices: &[usize]) {
        assert!(SubsetKey::from_indices(indices).is_none());
    }

    #[rstest]
    fn enumerates_five_orders_at_depth_three() {
        let keys = enumerate_keys(5, 3);
        assert_eq!(keys.len(), 25);
        assert_eq!(key_count(5, 3), 25);
        assert!(keys.windows(2).all(|pair| pair.first() < pair.last()));
        let first: Vec<_> = keys.iter().take(4).map(ToString::to_string).collect();
        assert_eq!(first, ["[0]", "[0, 1]", "[0, 1, 2]", "[0, 1, 3]"]);
    }

    #[rstest]
    fn level_is_clamped_to_pool_size() {
        assert_eq!(enumerate_keys(3, 8).len(), 7);
        assert_eq!(key_count(3, 8), 7);
    }

    #[rstest]
    #[case(0, 4)]
    #[case(257, 1)]
    #[case(5, 0)]
    fn invalid_enumerations_are_empty(#[case] order_count: usize, #[case] level: usize) {
        assert!(enumerate_keys(order_count, level).is_empty());
    }

    #[rstest]
    #[case(55, 4)]
    #[case(30, 5)]
    #[case(8, 8)]
    #[case(0, 0)]
    #[case(300, 0)]
    fn level_fits_default_budget(#[case] order_count: usize, #[case] expected: usize) {
        assert_eq!(level_for(order_count, 400_000), expected);
    }

    #[rstest]
    fn max_orders_inverts_level() {
        let orders = max_orders_for_level(4, 400_000);
        assert_eq!(orders, 56);
        assert_eq!(level_for(orders, 400_000), 4);
        assert!(key_count(orders.saturating_add(1), 4) > 400_000);
        assert_eq!(max_orders_for_level(1, 400_000), MAX_ORDERS);
    }

    #[rstest]
    fn binomial_matches_known_values() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(256, 8), 409_663_695_276_000);
        assert_eq!(binomial(3, 4), 0);
    }
}
