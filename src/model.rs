//! The model represents the static input data provided by the user.
use crate::bound::AuxiliaryBoundMap;
use crate::investment::{Investment, InvestmentMap, iter_active};
use crate::product::{ProductMap, UsageMap, ValuationScenarioMap};
use crate::resource::ResourceMap;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Resources which limit production
    pub resources: ResourceMap,
    /// Products whose mix is optimised
    pub products: ProductMap,
    /// Resource usage per unit of each product
    pub usage: UsageMap,
    /// Capital investments, both active and inactive
    pub investments: InvestmentMap,
    /// Alternative valuations of the products, for reporting
    pub scenarios: ValuationScenarioMap,
    /// Extra per-year constraints on production
    pub auxiliary_bounds: AuxiliaryBoundMap,
}

impl Model {
    /// Iterate over the investments included in this run
    pub fn iter_active_investments(&self) -> impl Iterator<Item = &Investment> {
        iter_active(&self.investments)
    }

    /// Whether every product has a primary revenue value, in which case revenue is reported
    pub fn has_primary_revenue(&self) -> bool {
        !self.products.is_empty()
            && self
                .products
                .values()
                .all(|product| product.revenue_per_unit.is_some())
    }
}
