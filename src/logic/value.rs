use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumIter, EnumString};

/// Four-valued signal model.
///
/// Only [LogicValue::Zero] and [LogicValue::One] take part in edge detection and clock
/// semantics, [LogicValue::X] and [LogicValue::Z] propagate conservatively through
/// [BooleanFunction](super::BooleanFunction) evaluation.
///
/// # Example
/// ```
/// # use netsim::LogicValue;
/// assert_eq!(LogicValue::Zero.toggle(), LogicValue::One);
/// assert_eq!(LogicValue::X.toggle(), LogicValue::X);
/// assert_eq!("1".parse::<LogicValue>().unwrap(), LogicValue::One);
/// assert_eq!(LogicValue::Z.to_string(), "Z");
/// ```
#[repr(u8)]
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    IntoPrimitive,
    TryFromPrimitive,
    Display,
    EnumString,
    EnumIter,
)]
pub enum LogicValue {
    #[strum(to_string = "0")]
    Zero = 0,
    #[strum(to_string = "1")]
    One = 1,
    #[strum(to_string = "X", serialize = "x")]
    X = 2,
    #[strum(to_string = "Z", serialize = "z")]
    Z = 3,
}
use LogicValue::*;

impl LogicValue {
    /// Returns [One] for true and [Zero] for false.
    #[inline(always)]
    pub fn from_bool(b: bool) -> Self {
        if b {
            One
        } else {
            Zero
        }
    }

    /// Swaps [Zero] and [One], is the identity on [X] and [Z].
    #[inline(always)]
    pub fn toggle(self) -> Self {
        match self {
            Zero => One,
            One => Zero,
            X | Z => self,
        }
    }

    /// Returns true if `self` is [Zero] or [One].
    #[inline(always)]
    pub fn is_known(self) -> bool {
        matches!(self, Zero | One)
    }

    /// Returns Some(bool) if `self` [is known](LogicValue::is_known).
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Zero => Some(false),
            One => Some(true),
            X | Z => None,
        }
    }
}

impl Default for LogicValue {
    fn default() -> Self {
        X
    }
}

impl From<bool> for LogicValue {
    fn from(b: bool) -> Self {
        Self::from_bool(b)
    }
}

/// Returns the integer encoded by `values`, least significant bit first.
///
/// Returns None if any of the values is not [known](LogicValue::is_known) or
/// if there are more than 32 values.
pub fn values_to_int(values: &[LogicValue]) -> Option<u32> {
    if values.len() > 32 {
        return None;
    }
    let mut result = 0;
    for (i, value) in values.iter().enumerate() {
        if value.as_bool()? {
            result |= 1 << i;
        }
    }
    Some(result)
}

/// Returns the `width` least significant bits of `value` as [LogicValues](LogicValue),
/// least significant bit first.
pub fn int_to_values(value: u32, width: usize) -> Vec<LogicValue> {
    (0..width)
        .map(|i| LogicValue::from_bool(i < 32 && value & (1 << i) != 0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn test_toggle() {
        assert_eq!(Zero.toggle(), One);
        assert_eq!(One.toggle(), Zero);
        assert_eq!(X.toggle(), X);
        assert_eq!(Z.toggle(), Z);
    }

    #[test]
    fn test_primitive_conversions() {
        assert_eq!(u8::from(Z), 3);
        assert_eq!(LogicValue::try_from(1u8).unwrap(), One);
        assert!(LogicValue::try_from(4u8).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("x".parse::<LogicValue>().unwrap(), X);
        assert_eq!("Z".parse::<LogicValue>().unwrap(), Z);
        assert!("2".parse::<LogicValue>().is_err());
    }

    #[test]
    fn test_values_to_int() {
        assert_eq!(values_to_int(&[One, Zero, One]), Some(5));
        assert_eq!(values_to_int(&[]), Some(0));
        assert_eq!(values_to_int(&[One, X]), None);
        assert_eq!(values_to_int(&[Zero; 33]), None);
    }

    #[test]
    fn test_int_to_values() {
        assert_eq!(int_to_values(6, 4), vec![Zero, One, One, Zero]);
        assert_eq!(int_to_values(0xFF, 2), vec![One, One]);
    }
}
