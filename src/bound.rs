//! Auxiliary bounds are extra per-year constraints on production, used to model external quota
//! commitments such as a ceiling on a legacy product or a fixed total demand across two variants.
use crate::id::define_id_type;
use crate::product::ProductID;
use indexmap::IndexMap;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::collections::HashMap;
use std::ops::RangeInclusive;

define_id_type! {BoundID}

/// A map of [`AuxiliaryBound`]s, keyed by bound ID. Bounds are applied in map order.
pub type AuxiliaryBoundMap = IndexMap<BoundID, AuxiliaryBound>;

/// The relation between the left- and right-hand sides of a bound
#[derive(PartialEq, Debug, Clone, Copy, DeserializeLabeledStringEnum, strum::Display)]
pub enum Relation {
    /// Expression must not exceed the value
    #[string = "<="]
    #[strum(to_string = "<=")]
    LessOrEqual,
    /// Expression must equal the value
    #[string = "="]
    #[strum(to_string = "=")]
    Equal,
    /// Expression must be at least the value
    #[string = ">="]
    #[strum(to_string = ">=")]
    GreaterOrEqual,
}

impl Relation {
    /// The range of values the constrained expression may take for a given right-hand side
    pub fn to_range(self, value: f64) -> RangeInclusive<f64> {
        match self {
            Self::LessOrEqual => f64::NEG_INFINITY..=value,
            Self::Equal => value..=value,
            Self::GreaterOrEqual => value..=f64::INFINITY,
        }
    }
}

/// A linear constraint over product quantities whose right-hand side depends on the year:
///
/// `Σ coefficient[p] * x[p]  (relation)  value(year)`
#[derive(PartialEq, Debug, Clone)]
pub struct AuxiliaryBound {
    /// A unique identifier for the bound
    pub id: BoundID,
    /// The coefficient of each product in the constrained expression
    pub terms: IndexMap<ProductID, f64>,
    /// The relation between the expression and the value
    pub relation: Relation,
    /// The right-hand side for each year. The bound is not applied in years without a value.
    pub values: HashMap<u32, f64>,
}

impl AuxiliaryBound {
    /// The right-hand side of the bound in the given year, if it applies in that year
    pub fn value_for_year(&self, year: u32) -> Option<f64> {
        self.values.get(&year).copied()
    }

    /// The permitted range of the expression in the given year, if the bound applies
    pub fn range_for_year(&self, year: u32) -> Option<RangeInclusive<f64>> {
        self.value_for_year(year)
            .map(|value| self.relation.to_range(value))
    }
}
