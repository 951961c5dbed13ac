/// Ratio of `part` to `total` as a fraction. `None` when the denominator is
/// zero; the undefined marker is carried through instead of NaN or infinity.
pub fn fraction(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(part as f64 / total as f64)
    }
}

/// Ratio of `part` to `total` as a percentage, `None` on a zero denominator.
pub fn percent(part: u64, total: u64) -> Option<f64> {
    fraction(part, total).map(|f| f * 100.0)
}
