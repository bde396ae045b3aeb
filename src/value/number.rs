//! Exact decimal numbers as written in configuration files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DocError;

/// Largest decimal exponent accepted when expanding a literal.
const MAX_EXPONENT: i64 = 4096;

/// An arbitrary-precision decimal: `digits * 10^exponent`.
///
/// Values are normalized on construction (no leading zeros in `digits`, no
/// trailing zeros left in `digits`, zero is never negative), so derived
/// equality compares numeric values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Number {
    negative: bool,
    digits: String,
    exponent: i64,
}

impl Number {
    fn normalized(negative: bool, digits: &str, exponent: i64) -> Result<Self, DocError> {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            return Ok(Self::zero());
        }

        let significant = trimmed.trim_end_matches('0');
        let exponent = exponent + (trimmed.len() - significant.len()) as i64;

        let magnitude = exponent.abs().max(exponent + significant.len() as i64);
        if magnitude > MAX_EXPONENT {
            return Err(DocError::UnrepresentableValue(format!(
                "number out of range: {}e{}",
                significant, exponent
            )));
        }

        Ok(Self {
            negative,
            digits: significant.to_string(),
            exponent,
        })
    }

    pub fn zero() -> Self {
        Self {
            negative: false,
            digits: "0".to_string(),
            exponent: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.digits == "0"
    }

    pub fn negate(&self) -> Self {
        Self {
            negative: !self.negative && !self.is_zero(),
            ..self.clone()
        }
    }
}

impl FromStr for Number {
    type Err = DocError;

    /// Parses a decimal literal such as `10`, `-3.14`, `.5` or `1.5e3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DocError::UnrepresentableValue(format!("invalid number literal: {}", s));

        let text = s.trim();
        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (mantissa, exp_part) = match text.find(['e', 'E']) {
            Some(pos) => (&text[..pos], Some(&text[pos + 1..])),
            None => (text, None),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let exponent = match exp_part {
            Some(exp) => {
                let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) || digits.len() > 9 {
                    return Err(invalid());
                }
                exp.parse::<i64>().map_err(|_| invalid())?
            }
            None => 0,
        };

        let digits = format!("{}{}", int_part, frac_part);
        let number = Self::normalized(false, &digits, exponent - frac_part.len() as i64)?;
        Ok(if negative { number.negate() } else { number })
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }

        if self.exponent >= 0 {
            f.write_str(&self.digits)?;
            for _ in 0..self.exponent {
                f.write_str("0")?;
            }
            return Ok(());
        }

        let point = self.digits.len() as i64 + self.exponent;
        if point > 0 {
            let (int_part, frac_part) = self.digits.split_at(point as usize);
            write!(f, "{}.{}", int_part, frac_part)
        } else {
            f.write_str("0.")?;
            for _ in 0..(-point) {
                f.write_str("0")?;
            }
            f.write_str(&self.digits)
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self {
            negative: value < 0,
            ..Self::from(value.unsigned_abs())
        }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        let digits = value.to_string();
        let significant = digits.trim_end_matches('0');
        if significant.is_empty() {
            return Self::zero();
        }
        Self {
            negative: false,
            exponent: (digits.len() - significant.len()) as i64,
            digits: significant.to_string(),
        }
    }
}

impl TryFrom<f64> for Number {
    type Error = DocError;

    /// Uses the shortest decimal form that round-trips to `value`.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(DocError::UnrepresentableValue(format!(
                "non-finite number: {}",
                value
            )));
        }
        value.to_string().parse()
    }
}

impl TryFrom<String> for Number {
    type Error = DocError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Number> for String {
    fn from(value: Number) -> Self {
        value.to_string()
    }
}
