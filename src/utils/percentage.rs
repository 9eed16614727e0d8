use std::{fmt::Display, ops::Deref, str::FromStr};

use anyhow::anyhow;
use rust_decimal::{prelude::ToPrimitive, Decimal};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0.round())
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    pub fn zero() -> Percentage {
        Percentage(0.)
    }
}

impl FromStr for Percentage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_end_matches("%");
        let v = s.parse::<f64>()?;
        Percentage::new_opt(v).ok_or_else(|| anyhow!("Can't parse {s} into percentage"))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `part` in `whole`. An empty whole yields 0%.
pub fn count_percentage(part: usize, whole: usize) -> Percentage {
    if whole == 0 {
        return Percentage::zero();
    }
    Percentage(part as f64 / whole as f64 * 100.)
}

/// Share of `part` in `whole` for money amounts. Negative or empty wholes yield 0%.
pub fn amount_percentage(part: Decimal, whole: Decimal) -> Percentage {
    if whole <= Decimal::ZERO {
        return Percentage::zero();
    }
    (part / whole * Decimal::ONE_HUNDRED)
        .to_f64()
        .and_then(Percentage::new_opt)
        .unwrap_or_else(Percentage::zero)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{amount_percentage, count_percentage, Percentage};

    #[test]
    fn test_count_percentage() {
        assert_eq!(*count_percentage(1, 4), 25.);
        assert_eq!(*count_percentage(3, 0), 0.);
    }

    #[test]
    fn test_amount_percentage() {
        assert_eq!(
            *amount_percentage(Decimal::new(50, 0), Decimal::new(200, 0)),
            25.
        );
        assert_eq!(*amount_percentage(Decimal::ONE, Decimal::ZERO), 0.);
    }

    #[test]
    fn test_parse_and_display() {
        let p: Percentage = "12.5%".parse().unwrap();
        assert_eq!(*p, 12.5);
        assert_eq!(count_percentage(2, 3).to_string(), "67%");
        assert!("-3".parse::<Percentage>().is_err());
    }
}
