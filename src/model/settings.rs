//! User-level settings consumed by planning and by the script function table.

use serde::{Deserialize, Serialize};

use super::weight::{Unit, Weight};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Unit every planned weight is reported in.
    pub units: Unit,
    /// Smallest loadable jump; `roundWeight` rounds to multiples of this.
    pub increment: Weight,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            units: Unit::Lb,
            increment: Weight::lb(5.0),
        }
    }
}

impl Settings {
    pub fn metric() -> Self {
        Self {
            units: Unit::Kg,
            increment: Weight::kg(2.5),
        }
    }

    /// Settings with the conventional plate increment for a unit.
    pub fn for_units(units: Unit) -> Self {
        match units {
            Unit::Lb => Self::default(),
            Unit::Kg => Self::metric(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_units_picks_matching_increment() {
        let cases = vec![
            (Unit::Lb, Weight::lb(5.0)),
            (Unit::Kg, Weight::kg(2.5)),
        ];
        for (units, increment) in cases {
            let s = Settings::for_units(units);
            assert_eq!(s.units, units);
            assert_eq!(s.increment, increment);
        }
    }
}
