/// Iterated logarithm: how many times log2 can be applied to `n` before the
/// result drops below 1. Determines the number of insertion rounds.
pub(crate) fn logstar(n: usize) -> usize {
    let mut v = n as f64;
    let mut i = 0;
    while v >= 1.0 {
        v = v.log2();
        i += 1;
    }
    i - 1
}

/// Batching bound `N(n, h) = ceil(n / log^(h) n)`: the number of segments
/// that must be inserted by the end of round `h`. Grows doubly-exponentially
/// in `h`, which is what caps the total re-rooting work at O(n log* n).
pub(crate) fn batch_bound(n: usize, h: usize) -> usize {
    let mut v = n as f64;
    for _ in 0..h {
        v = v.log2();
    }
    (n as f64 / v).ceil() as usize
}
