//! Fixtures for tests

use crate::bound::AuxiliaryBoundMap;
use crate::investment::{Investment, InvestmentMap};
use crate::model::parameters::DEFAULT_BINDING_TOLERANCE;
use crate::model::{Model, ModelParameters};
use crate::product::{Product, ProductMap, UsageMap, ValuationScenarioMap};
use crate::resource::{GrowthRule, Resource, ResourceMap};
use rstest::fixture;
use std::path::PathBuf;
use std::rc::Rc;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Build a [`ResourceMap`] from `(id, base_capacity, growth)` tuples
pub fn resource_map(resources: &[(&str, f64, GrowthRule)]) -> ResourceMap {
    resources
        .iter()
        .map(|(id, base_capacity, growth)| {
            let resource = Resource {
                id: (*id).into(),
                description: String::new(),
                base_capacity: *base_capacity,
                growth: *growth,
            };
            (resource.id.clone(), Rc::new(resource))
        })
        .collect()
}

/// Build a [`ProductMap`] from `(id, profit_per_unit)` tuples
pub fn product_map(products: &[(&str, f64)]) -> ProductMap {
    products
        .iter()
        .map(|(id, profit_per_unit)| {
            let product = Product {
                id: (*id).into(),
                description: String::new(),
                profit_per_unit: *profit_per_unit,
                revenue_per_unit: None,
            };
            (product.id.clone(), Rc::new(product))
        })
        .collect()
}

/// Build a single-year [`Model`] with no investments, scenarios or bounds
pub fn model_from_parts(resources: ResourceMap, products: ProductMap, usage: UsageMap) -> Model {
    Model {
        model_path: PathBuf::new(),
        parameters: ModelParameters {
            years: 1,
            binding_tolerance: DEFAULT_BINDING_TOLERANCE,
        },
        resources,
        products,
        usage,
        investments: InvestmentMap::new(),
        scenarios: ValuationScenarioMap::new(),
        auxiliary_bounds: AuxiliaryBoundMap::new(),
    }
}

#[fixture]
pub fn resources() -> ResourceMap {
    resource_map(&[
        ("Labour", 1000.0, GrowthRule::Compound { rate: 0.05 }),
        ("Wafer_Cutting", 800.0, GrowthRule::None),
        ("Assembly", 600.0, GrowthRule::None),
        ("Packaging", 500.0, GrowthRule::None),
    ])
}

#[fixture]
pub fn products() -> ProductMap {
    product_map(&[("Product_A", 20.0), ("Product_B", 30.0), ("Product_C", 25.0)])
}

#[fixture]
pub fn investment() -> Investment {
    Investment {
        id: "investment1".into(),
        resource_id: "Assembly".into(),
        install_months: 3.0,
        full_capacity: 200.0,
        downtime_months: 0.0,
        active: true,
    }
}
