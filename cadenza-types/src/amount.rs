//! Atomic amount handling for the EMB coin.
//!
//! All protocol arithmetic happens in atomic units (`u64`); coin-unit
//! strings exist only at the UI boundary.

use crate::error::{TypeError, TypeResult};

/// Atomic units per whole EMB coin.
pub const ATOMIC_PER_COIN: u64 = 1_000_000;

/// Formats an atomic amount as a coin-unit string with six decimals.
#[must_use]
pub fn format_coins(atomic: u64) -> String {
    format!(
        "{}.{:06}",
        atomic / ATOMIC_PER_COIN,
        atomic % ATOMIC_PER_COIN
    )
}

/// Parses a coin-unit string (e.g. `"1.5"`) into atomic units,
/// truncating beyond six decimal places.
pub fn parse_coins(s: &str) -> TypeResult<u64> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TypeError::InvalidAmount("empty amount".into()));
    }
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| TypeError::InvalidAmount(format!("bad whole part in {s:?}")))?
    };
    let mut frac = frac.to_string();
    if frac.len() > 6 {
        frac.truncate(6);
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(TypeError::InvalidAmount(format!("bad fraction in {s:?}")));
    }
    while frac.len() < 6 {
        frac.push('0');
    }
    let frac: u64 = frac.parse().unwrap_or(0);
    let atomic = whole
        .checked_mul(ATOMIC_PER_COIN)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| TypeError::InvalidAmount(format!("amount overflow in {s:?}")))?;
    if atomic == 0 {
        return Err(TypeError::InvalidAmount("amount must be positive".into()));
    }
    Ok(atomic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_six_decimals() {
        assert_eq!(format_coins(8_000), "0.008000");
        assert_eq!(format_coins(1_500_000), "1.500000");
        assert_eq!(format_coins(0), "0.000000");
    }

    #[test]
    fn parse_whole_and_fraction() {
        assert_eq!(parse_coins("1.5").unwrap(), 1_500_000);
        assert_eq!(parse_coins("0.008").unwrap(), 8_000);
        assert_eq!(parse_coins("42").unwrap(), 42_000_000);
    }

    #[test]
    fn parse_truncates_past_six_decimals() {
        assert_eq!(parse_coins("0.1234567").unwrap(), 123_456);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_coins("").is_err());
        assert!(parse_coins("abc").is_err());
        assert!(parse_coins("1.2x").is_err());
        assert!(parse_coins("0").is_err());
        assert!(parse_coins("0.0").is_err());
    }

    #[test]
    fn format_parse_round_trip() {
        for atomic in [1u64, 8_000, 123_456, 1_000_000, 987_654_321] {
            assert_eq!(parse_coins(&format_coins(atomic)).unwrap(), atomic);
        }
    }
}
