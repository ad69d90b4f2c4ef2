//! Code for reading the resources CSV file
use super::{input_err_msg, read_csv};
use crate::id::collect_unique;
use crate::resource::{GrowthRule, Resource, ResourceID, ResourceMap};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;
use std::rc::Rc;

const RESOURCES_FILE_NAME: &str = "resources.csv";

/// Represents a row of the resources CSV file
#[derive(Deserialize, PartialEq, Debug)]
struct ResourceRaw {
    id: String,
    #[serde(default)]
    description: String,
    base_capacity: f64,
    growth_rule: Option<GrowthRuleType>,
    growth_rate: Option<f64>,
}

/// The kind of growth rule given in the input file
#[derive(DeserializeLabeledStringEnum, PartialEq, Debug, Clone, Copy)]
enum GrowthRuleType {
    #[string = "none"]
    None,
    #[string = "compound"]
    Compound,
    #[string = "linear"]
    Linear,
}

impl ResourceRaw {
    /// Convert the raw record into a [`Resource`], validating it in the process
    fn into_resource(self) -> Result<Resource> {
        ensure!(
            self.base_capacity.is_finite() && self.base_capacity >= 0.0,
            "Resource {}: base_capacity must be a finite, non-negative number",
            self.id
        );

        let growth = match self.growth_rule.unwrap_or(GrowthRuleType::None) {
            GrowthRuleType::None => {
                ensure!(
                    self.growth_rate.is_none_or(|rate| rate == 0.0),
                    "Resource {}: growth_rate given without a growth_rule",
                    self.id
                );
                GrowthRule::None
            }
            GrowthRuleType::Compound => {
                let rate = self.checked_growth_rate()?;
                ensure!(
                    rate > -1.0,
                    "Resource {}: compound growth_rate must be greater than -1",
                    self.id
                );
                GrowthRule::Compound { rate }
            }
            GrowthRuleType::Linear => GrowthRule::Linear {
                rate: self.checked_growth_rate()?,
            },
        };

        Ok(Resource {
            id: self.id.into(),
            description: self.description,
            base_capacity: self.base_capacity,
            growth,
        })
    }

    /// Get the growth rate, which must be provided for rules other than `none`
    fn checked_growth_rate(&self) -> Result<f64> {
        let rate = self
            .growth_rate
            .with_context(|| format!("Resource {}: growth_rate is required", self.id))?;
        ensure!(
            rate.is_finite(),
            "Resource {}: growth_rate must be a finite number",
            self.id
        );

        Ok(rate)
    }
}

/// Read the resources CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A map of resources keyed by ID, in file order, or an error.
pub fn read_resources(model_dir: &Path) -> Result<ResourceMap> {
    let file_path = model_dir.join(RESOURCES_FILE_NAME);
    let resources_csv = read_csv(&file_path)?;
    read_resources_from_iter(resources_csv).with_context(|| input_err_msg(&file_path))
}

fn read_resources_from_iter<I>(iter: I) -> Result<ResourceMap>
where
    I: Iterator<Item = ResourceRaw>,
{
    let resources: Vec<(ResourceID, Rc<Resource>)> = iter
        .map(|raw| {
            let resource = raw.into_resource()?;
            Ok((resource.id.clone(), Rc::new(resource)))
        })
        .collect::<Result<_>>()?;

    collect_unique(resources, "resource")
}
