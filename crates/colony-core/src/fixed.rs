use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// All power quantities (kW) and elapsed time (millisols) use this type so
/// grid balancing is bit-for-bit reproducible across runs and platforms.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in the tick loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and logging.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Sum an iterator of Fixed64 values, saturating at the type bounds.
#[inline]
pub fn saturating_sum<I: IntoIterator<Item = Fixed64>>(values: I) -> Fixed64 {
    values
        .into_iter()
        .fold(Fixed64::ZERO, |acc, v| acc.saturating_add(v))
}
