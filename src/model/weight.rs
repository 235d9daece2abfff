//! Weights are a magnitude tagged with the unit it was written in.
//!
//! All arithmetic between two weights normalises the right-hand side to the
//! left-hand side's unit first, so `100lb + 10kg` stays in pounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact legal definition of the pound.
pub const KG_PER_LB: f64 = 0.45359237;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Lb,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Kg => write!(f, "kg"),
            Unit::Lb => write!(f, "lb"),
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Unit::Kg),
            "lb" => Ok(Unit::Lb),
            _ => Err(format!("unknown unit: {s}")),
        }
    }
}

/// A weight as the program author wrote it: `{value, unit}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub unit: Unit,
}

impl Weight {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn kg(value: f64) -> Self {
        Self::new(value, Unit::Kg)
    }

    pub fn lb(value: f64) -> Self {
        Self::new(value, Unit::Lb)
    }

    pub fn convert_to(self, unit: Unit) -> Weight {
        let value = match (self.unit, unit) {
            (Unit::Kg, Unit::Lb) => self.value / KG_PER_LB,
            (Unit::Lb, Unit::Kg) => self.value * KG_PER_LB,
            _ => self.value,
        };
        Weight { value, unit }
    }

    /// Round to the nearest multiple of `increment` (the smallest jump the
    /// lifter can load), staying in this weight's unit.
    pub fn round_to(self, increment: Weight) -> Weight {
        let step = increment.convert_to(self.unit).value;
        if step <= 0.0 {
            return self;
        }
        Weight {
            value: (self.value / step).round() * step,
            unit: self.unit,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// What a program's state dictionary stores per key: either a plain number
/// (reps, counters) or a weight. Serialises untagged so persisted state
/// stays a flat `key -> number | {value, unit}` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Number(f64),
    Weight(Weight),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_round_trip() {
        let cases = vec![
            Weight::lb(180.0),
            Weight::kg(100.0),
            Weight::lb(2.5),
            Weight::kg(0.0),
        ];
        for w in cases {
            let other = match w.unit {
                Unit::Kg => Unit::Lb,
                Unit::Lb => Unit::Kg,
            };
            let back = w.convert_to(other).convert_to(w.unit);
            assert!((back.value - w.value).abs() < 1e-9, "{w} -> {back}");
        }
    }

    #[test]
    fn test_round_to_increment() {
        let cases = vec![
            (Weight::lb(102.0), Weight::lb(5.0), 100.0),
            (Weight::lb(103.0), Weight::lb(5.0), 105.0),
            (Weight::kg(61.3), Weight::kg(2.5), 62.5),
        ];
        for (w, inc, expected) in cases {
            assert_eq!(w.round_to(inc).value, expected);
        }
    }

    #[test]
    fn test_state_value_round_trips_through_json() {
        let cases = vec![
            (StateValue::Number(12.0), "12.0"),
            (
                StateValue::Weight(Weight::lb(45.0)),
                r#"{"value":45.0,"unit":"lb"}"#,
            ),
        ];
        for (value, json) in cases {
            assert_eq!(serde_json::to_string(&value).unwrap(), json);
            let parsed: StateValue = serde_json::from_str(json).unwrap();
            assert_eq!(parsed, value);
        }
    }
}
