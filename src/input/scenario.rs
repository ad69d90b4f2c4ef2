//! Code for reading the valuation scenarios CSV file
use super::{input_err_msg, read_csv_optional};
use crate::id::IDCollection;
use crate::product::{ProductMap, ScenarioID, ValuationScenario, ValuationScenarioMap};
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::Deserialize;
use std::path::Path;

const VALUATION_SCENARIOS_FILE_NAME: &str = "valuation_scenarios.csv";

/// Represents a row of the valuation scenarios CSV file
#[derive(Deserialize, PartialEq, Debug)]
struct ValuationScenarioRaw {
    scenario_id: String,
    product_id: String,
    profit_per_unit: f64,
    revenue_per_unit: f64,
}

/// Read the valuation scenarios CSV file.
///
/// Each scenario is an alternative set of per-unit profits and revenues. The file is optional.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `products` - All products in the model
pub fn read_valuation_scenarios(
    model_dir: &Path,
    products: &ProductMap,
) -> Result<ValuationScenarioMap> {
    let file_path = model_dir.join(VALUATION_SCENARIOS_FILE_NAME);
    let scenarios_csv = read_csv_optional(&file_path)?;
    read_valuation_scenarios_from_iter(scenarios_csv, products)
        .with_context(|| input_err_msg(&file_path))
}

fn read_valuation_scenarios_from_iter<I>(
    iter: I,
    products: &ProductMap,
) -> Result<ValuationScenarioMap>
where
    I: Iterator<Item = ValuationScenarioRaw>,
{
    let mut map = ValuationScenarioMap::new();
    for record in iter {
        ensure!(
            !record.scenario_id.trim().is_empty(),
            "Empty scenario ID found"
        );
        let product_id = products.get_id(&record.product_id)?;
        ensure!(
            record.profit_per_unit.is_finite() && record.revenue_per_unit.is_finite(),
            "Values for product {product_id} in scenario {} must be finite numbers",
            record.scenario_id
        );

        let scenario_id = ScenarioID::from(record.scenario_id);
        let scenario = map
            .entry(scenario_id.clone())
            .or_insert_with(|| ValuationScenario {
                id: scenario_id.clone(),
                profit_per_unit: Default::default(),
                revenue_per_unit: Default::default(),
            });
        ensure!(
            !scenario.profit_per_unit.contains_key(&product_id),
            "Duplicate entry for product {product_id} in scenario {scenario_id}"
        );
        scenario
            .profit_per_unit
            .insert(product_id.clone(), record.profit_per_unit);
        scenario
            .revenue_per_unit
            .insert(product_id, record.revenue_per_unit);
    }

    // Every scenario must value every product, otherwise the totals are meaningless
    for scenario in map.values() {
        let missing = products
            .keys()
            .filter(|id| !scenario.profit_per_unit.contains_key(*id))
            .join(", ");
        ensure!(
            missing.is_empty(),
            "Scenario {} is missing values for products: {missing}",
            scenario.id
        );
    }

    Ok(map)
}
