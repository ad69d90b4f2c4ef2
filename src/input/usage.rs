//! Code for reading the resource usage CSV file
use super::{input_err_msg, read_csv};
use crate::id::IDCollection;
use crate::product::{ProductMap, UsageMap};
use crate::resource::ResourceMap;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const USAGE_FILE_NAME: &str = "usage.csv";

/// Represents a row of the usage CSV file
#[derive(Deserialize, PartialEq, Debug)]
struct UsageRaw {
    resource_id: String,
    product_id: String,
    usage: f64,
}

/// Read the usage CSV file.
///
/// Each row gives the units of a resource consumed per unit of a product. Combinations which are
/// not listed are treated as zero.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `resources` - All resources in the model
/// * `products` - All products in the model
pub fn read_usage(
    model_dir: &Path,
    resources: &ResourceMap,
    products: &ProductMap,
) -> Result<UsageMap> {
    let file_path = model_dir.join(USAGE_FILE_NAME);
    let usage_csv = read_csv(&file_path)?;
    read_usage_from_iter(usage_csv, resources, products)
        .with_context(|| input_err_msg(&file_path))
}

fn read_usage_from_iter<I>(
    iter: I,
    resources: &ResourceMap,
    products: &ProductMap,
) -> Result<UsageMap>
where
    I: Iterator<Item = UsageRaw>,
{
    let mut map = UsageMap::new();
    for record in iter {
        let resource_id = resources.get_id(&record.resource_id)?;
        let product_id = products.get_id(&record.product_id)?;
        ensure!(
            record.usage.is_finite() && record.usage >= 0.0,
            "Usage of {resource_id} by {product_id} must be a finite, non-negative number"
        );

        let existing = map
            .insert(resource_id.clone(), product_id.clone(), record.usage)
            .is_some();
        ensure!(
            !existing,
            "Duplicate usage entry for resource {resource_id} and product {product_id}"
        );
    }

    Ok(map)
}
