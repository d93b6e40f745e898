use arrow::{
    array::{Array, ArrayRef, AsArray},
    datatypes::{DataType, Float64Type, Int64Type},
};
use std::{cmp::Ordering, fmt};

/// A monetary value in the precision the source column was stored in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Int(i64),
    Float(f64),
}

impl Amount {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Amount::Int(v) => v as f64,
            Amount::Float(v) => v,
        }
    }

    /// Reads row `idx` of an Int64 or Float64 array. Nulls and NaN read as `None`.
    pub fn at(array: &ArrayRef, idx: usize) -> Option<Amount> {
        if array.is_null(idx) {
            return None;
        }
        match array.data_type() {
            DataType::Int64 => Some(Amount::Int(array.as_primitive::<Int64Type>().value(idx))),
            DataType::Float64 => {
                let v = array.as_primitive::<Float64Type>().value(idx);
                (!v.is_nan()).then_some(Amount::Float(v))
            }
            _ => None,
        }
    }

    /// Total order used for extremum searches; ints compare exactly.
    pub fn compare(&self, other: &Amount) -> Ordering {
        match (self, other) {
            (Amount::Int(a), Amount::Int(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

/// Groups the digits of an unsigned integer string in threes.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = match *self {
            Amount::Int(v) => v.to_string(),
            Amount::Float(v) if !v.is_finite() => return write!(f, "{}", v),
            Amount::Float(v) => {
                let s = v.to_string();
                if s.contains('.') {
                    s
                } else {
                    format!("{}.0", s)
                }
            }
        };
        let (sign, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", raw.as_str()),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, fr)) => (i, Some(fr)),
            None => (unsigned, None),
        };
        write!(f, "{}{}", sign, group_thousands(int_part))?;
        if let Some(fr) = frac_part {
            write!(f, ".{}", fr)?;
        }
        Ok(())
    }
}
