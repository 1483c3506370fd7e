use crate::hog::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of bytes the fixture holds before it starts idling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ceiling(i64);

impl Ceiling {
    /// Ceiling used when no argument is given.
    pub fn unbounded() -> Self {
        Ceiling(i64::MAX)
    }

    /// Resolve ceiling from an optional command line argument.
    pub fn from_arg(arg: Option<&str>) -> Result<Self, Error> {
        match arg {
            None => Ok(Self::unbounded()),
            Some(raw) => Self::parse(raw),
        }
    }

    /// Parse ceiling the way `strtol(raw, NULL, 10)` does: leading whitespace and an
    /// optional sign are skipped, then the longest run of decimal digits is taken and
    /// everything after it ignored. Out of range values saturate.
    ///
    /// Zero (including "no digits at all") is rejected, negative values are accepted as is.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let value = leading_integer(raw);
        if value == 0 {
            return Err(Error::InvalidCeiling(raw.to_string()));
        }
        Ok(Ceiling(value))
    }

    pub fn bytes(&self) -> i64 {
        self.0
    }

    /// Return true if `hogged` bytes is over this ceiling.
    pub fn exceeded_by(&self, hogged: i64) -> bool {
        hogged > self.0
    }
}

impl Display for Ceiling {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn leading_integer(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut acc: i64 = 0;
    for d in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(d - b'0');
        // accumulate towards the sign so i64::MIN stays representable
        let next = acc.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(d)
            } else {
                v.checked_add(d)
            }
        });
        match next {
            Some(v) => acc = v,
            None => return if negative { i64::MIN } else { i64::MAX },
        }
    }
    acc
}
