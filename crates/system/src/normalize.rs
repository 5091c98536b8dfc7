//! Unit and sign normalisation for raw platform counters.
//!
//! Every helper returns watts.  Products of current and voltage are always
//! reported as magnitudes: the sign of a battery current says which way
//! energy flows, and that is carried separately on the reading.

/// Parse a decimal counter that may be a 32-bit two's-complement value
/// printed as unsigned.
///
/// Values in `(i32::MAX, u32::MAX]` are reinterpreted as their signed 32-bit
/// counterpart; anything else is returned unchanged.  `None` only when the
/// input is not an unsigned decimal.
pub fn parse_signed(raw: &str) -> Option<i64> {
    let v: u64 = raw.trim().parse().ok()?;
    if v > i32::MAX as u64 && v <= u32::MAX as u64 {
        Some(i64::from(v as u32 as i32))
    } else {
        Some(v as i64)
    }
}

pub fn milliwatts(mw: f64) -> f64 {
    mw / 1_000.0
}

pub fn microwatts(uw: f64) -> f64 {
    uw / 1_000_000.0
}

/// mA × mV = µW.
pub fn milliamp_millivolts(ma: f64, mv: f64) -> f64 {
    (ma * mv).abs() / 1_000_000.0
}

/// µA × µV = pW.
pub fn microamp_microvolts(ua: f64, uv: f64) -> f64 {
    (ua * uv).abs() / 1_000_000_000_000.0
}

/// A directly reported power figure beats one derived from current × voltage.
pub fn prefer_direct(direct: Option<f64>, derived: Option<f64>) -> f64 {
    direct.or(derived).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_signed_reinterprets_twos_complement() {
        assert_eq!(parse_signed("4294967176"), Some(-120));
        assert_eq!(parse_signed("4294967295"), Some(-1));
        assert_eq!(parse_signed("2147483648"), Some(i64::from(i32::MIN)));
    }

    #[test]
    fn parse_signed_passes_through_small_and_large_values() {
        assert_eq!(parse_signed("1000"), Some(1000));
        assert_eq!(parse_signed("0"), Some(0));
        assert_eq!(parse_signed("2147483647"), Some(i64::from(i32::MAX)));
        assert_eq!(parse_signed("4294967296"), Some(4_294_967_296));
        assert_eq!(parse_signed(" 42\n"), Some(42));
    }

    #[test]
    fn parse_signed_rejects_non_numeric() {
        assert_eq!(parse_signed("abc"), None);
        assert_eq!(parse_signed("-5"), None);
        assert_eq!(parse_signed(""), None);
        assert_eq!(parse_signed("12.5"), None);
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(milliwatts(5432.0), 5.432);
        assert_eq!(microwatts(12_500_000.0), 12.5);
        assert_eq!(milliamp_millivolts(-1500.0, 12_000.0), 18.0);
        assert_eq!(microamp_microvolts(1_000_000.0, -11_000_000.0), 11.0);
    }

    #[test]
    fn direct_power_is_preferred() {
        assert_eq!(prefer_direct(Some(3.0), Some(9.0)), 3.0);
        assert_eq!(prefer_direct(None, Some(9.0)), 9.0);
        assert_eq!(prefer_direct(None, None), 0.0);
    }
}
