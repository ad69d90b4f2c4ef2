//! Resources are the shared capacity limits (labour hours, machine time, energy etc.) which are
//! consumed by production.
use crate::id::define_id_type;
use indexmap::IndexMap;
use std::rc::Rc;

define_id_type! {ResourceID}

/// A map of [`Resource`]s, keyed by resource ID
pub type ResourceMap = IndexMap<ResourceID, Rc<Resource>>;

/// A shared capacity limit on production
#[derive(PartialEq, Debug, Clone)]
pub struct Resource {
    /// A unique identifier for the resource (e.g. Labour)
    pub id: ResourceID,
    /// A human-readable description for the resource
    pub description: String,
    /// Capacity in year 0, before any growth or investment is applied
    pub base_capacity: f64,
    /// How the base capacity changes from year to year
    pub growth: GrowthRule,
}

impl Resource {
    /// The capacity of this resource in the given year from growth alone
    pub fn grown_capacity(&self, year: u32) -> f64 {
        self.growth.apply(self.base_capacity, year)
    }
}

/// A rule for how a resource's base capacity develops over the model horizon.
///
/// Any resource can carry any rule; resources without growth use [`GrowthRule::None`].
#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub enum GrowthRule {
    /// Capacity stays at its base value
    #[default]
    None,
    /// Capacity grows by a fixed proportion each year: `base * (1 + rate)^(year - 1)`
    Compound {
        /// Proportional increase per year (e.g. 0.05 for 5%)
        rate: f64,
    },
    /// Capacity grows by a fixed amount each year: `base + rate * year`
    Linear {
        /// Absolute increase per year
        rate: f64,
    },
}

impl GrowthRule {
    /// Apply the growth rule to a base capacity for the given (1-based) year
    pub fn apply(&self, base: f64, year: u32) -> f64 {
        match *self {
            Self::None => base,
            Self::Compound { rate } => {
                let exponent = i32::try_from(year.saturating_sub(1)).unwrap_or(i32::MAX);
                base * (1.0 + rate).powi(exponent)
            }
            Self::Linear { rate } => base + rate * f64::from(year),
        }
    }
}
