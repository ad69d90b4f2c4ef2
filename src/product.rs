//! Products are the sellable outputs whose mix is optimised each year. The data structures in this
//! module describe what each product is worth and which resources it consumes.
use crate::id::define_id_type;
use crate::resource::ResourceID;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;

define_id_type! {ProductID}
define_id_type! {ScenarioID}

/// A map of [`Product`]s, keyed by product ID
pub type ProductMap = IndexMap<ProductID, Rc<Product>>;

/// A map of [`ValuationScenario`]s, keyed by scenario ID
pub type ValuationScenarioMap = IndexMap<ScenarioID, ValuationScenario>;

/// Represents a sellable product
#[derive(PartialEq, Debug, Clone)]
pub struct Product {
    /// A unique identifier for the product
    pub id: ProductID,
    /// A human-readable description for the product
    pub description: String,
    /// Profit per unit produced. This is the coefficient in the primary objective.
    pub profit_per_unit: f64,
    /// Revenue per unit produced, used for reporting only
    pub revenue_per_unit: Option<f64>,
}

/// How much of each resource one unit of each product consumes.
///
/// Missing entries mean the product does not use the resource at all.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct UsageMap(HashMap<(ResourceID, ProductID), f64>);

impl UsageMap {
    /// Create an empty [`UsageMap`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the usage of a resource by a product, returning the previous value if there was one
    pub fn insert(
        &mut self,
        resource_id: ResourceID,
        product_id: ProductID,
        usage: f64,
    ) -> Option<f64> {
        self.0.insert((resource_id, product_id), usage)
    }

    /// Units of resource consumed per unit of product (zero if not specified)
    pub fn get(&self, resource_id: &ResourceID, product_id: &ProductID) -> f64 {
        self.0
            .get(&(resource_id.clone(), product_id.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Iterate over the non-zero usage of a resource by the given products
    pub fn iter_for_resource<'a>(
        &'a self,
        resource_id: &'a ResourceID,
        products: &'a ProductMap,
    ) -> impl Iterator<Item = (&'a ProductID, f64)> + 'a {
        products
            .keys()
            .map(move |product_id| (product_id, self.get(resource_id, product_id)))
            .filter(|(_, usage)| *usage != 0.0)
    }
}

/// An alternative per-unit valuation of the products, used for reporting.
///
/// Scenarios do not change which production mix is optimal; they only change how the mix found
/// under the primary objective is valued.
#[derive(PartialEq, Debug, Clone)]
pub struct ValuationScenario {
    /// A unique identifier for the scenario (e.g. pessimistic)
    pub id: ScenarioID,
    /// Profit per unit for each product
    pub profit_per_unit: IndexMap<ProductID, f64>,
    /// Revenue per unit for each product
    pub revenue_per_unit: IndexMap<ProductID, f64>,
}

/// Value a production mix using the given per-unit values.
///
/// Products missing from `values` are valued at zero.
pub fn value_quantities(
    quantities: &IndexMap<ProductID, f64>,
    values: &IndexMap<ProductID, f64>,
) -> f64 {
    quantities
        .iter()
        .map(|(product_id, quantity)| values.get(product_id).copied().unwrap_or(0.0) * quantity)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::products;
    use float_cmp::assert_approx_eq;
    use indexmap::indexmap;
    use rstest::rstest;

    #[test]
    fn test_usage_map_get() {
        let mut usage = UsageMap::new();
        assert!(usage.insert("Labour".into(), "A".into(), 2.0).is_none());
        assert_eq!(usage.get(&"Labour".into(), &"A".into()), 2.0);
        assert_eq!(usage.get(&"Labour".into(), &"B".into()), 0.0);
        assert_eq!(usage.insert("Labour".into(), "A".into(), 3.0), Some(2.0));
    }

    #[rstest]
    fn test_usage_map_iter_for_resource(products: ProductMap) {
        let mut usage = UsageMap::new();
        usage.insert("Labour".into(), "Product_A".into(), 2.0);
        usage.insert("Labour".into(), "Product_B".into(), 0.0);
        let resource_id = ResourceID::new("Labour");
        let entries: Vec<_> = usage.iter_for_resource(&resource_id, &products).collect();
        assert_eq!(entries, [(&ProductID::new("Product_A"), 2.0)]);
    }

    #[test]
    fn test_value_quantities() {
        let quantities = indexmap! {
            ProductID::new("A") => 10.0,
            ProductID::new("B") => 5.0,
        };
        let values = indexmap! { ProductID::new("A") => 3.0 };
        assert_approx_eq!(f64, value_quantities(&quantities, &values), 30.0);
    }
}
