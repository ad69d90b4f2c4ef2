//! Code for reading the investments CSV file
use super::{input_err_msg, read_csv_optional};
use crate::id::{IDCollection, collect_unique};
use crate::investment::{Investment, InvestmentID, InvestmentMap};
use crate::resource::ResourceMap;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const INVESTMENTS_FILE_NAME: &str = "investments.csv";

/// Represents a row of the investments CSV file
#[derive(Deserialize, PartialEq, Debug)]
struct InvestmentRaw {
    id: String,
    resource_id: String,
    install_months: f64,
    full_capacity: f64,
    downtime_months: Option<f64>,
    #[serde(default = "default_active")]
    active: bool,
}

/// Investments are active unless the user says otherwise
fn default_active() -> bool {
    true
}

/// Read the investments CSV file.
///
/// The file is optional; a model without it has no investments.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `resources` - All resources in the model
///
/// # Returns
///
/// A map of all investments (active or not) keyed by ID, in file order.
pub fn read_investments(model_dir: &Path, resources: &ResourceMap) -> Result<InvestmentMap> {
    let file_path = model_dir.join(INVESTMENTS_FILE_NAME);
    let investments_csv = read_csv_optional(&file_path)?;
    read_investments_from_iter(investments_csv, resources)
        .with_context(|| input_err_msg(&file_path))
}

fn read_investments_from_iter<I>(iter: I, resources: &ResourceMap) -> Result<InvestmentMap>
where
    I: Iterator<Item = InvestmentRaw>,
{
    let investments: Vec<(InvestmentID, Investment)> = iter
        .map(|raw| {
            let resource_id = resources
                .get_id(&raw.resource_id)
                .with_context(|| format!("Invalid resource for investment {}", raw.id))?;
            let investment = Investment::new(
                raw.id.into(),
                resource_id,
                raw.install_months,
                raw.full_capacity,
                raw.downtime_months,
                raw.active,
            )?;
            Ok((investment.id.clone(), investment))
        })
        .collect::<Result<_>>()?;

    collect_unique(investments, "investment")
}
