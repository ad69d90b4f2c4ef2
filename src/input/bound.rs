//! Code for reading the auxiliary bounds CSV files
use super::{input_err_msg, read_csv_optional};
use crate::bound::{AuxiliaryBound, AuxiliaryBoundMap, BoundID, Relation};
use crate::id::IDCollection;
use crate::product::ProductMap;
use crate::year::parse_year_str;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const AUXILIARY_BOUNDS_FILE_NAME: &str = "auxiliary_bounds.csv";
const AUXILIARY_BOUND_TERMS_FILE_NAME: &str = "auxiliary_bound_terms.csv";

/// Represents a row of the auxiliary bounds CSV file
#[derive(Deserialize, PartialEq, Debug)]
struct AuxiliaryBoundRaw {
    bound_id: String,
    relation: Relation,
    years: String,
    value: f64,
}

/// Represents a row of the auxiliary bound terms CSV file
#[derive(Deserialize, PartialEq, Debug)]
struct AuxiliaryBoundTermRaw {
    bound_id: String,
    product_id: String,
    coefficient: f64,
}

/// Read the auxiliary bounds and their terms.
///
/// Both files are optional, but every bound must have at least one term and every term must belong
/// to a bound.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `products` - All products in the model
/// * `num_years` - The number of years in the model horizon
pub fn read_auxiliary_bounds(
    model_dir: &Path,
    products: &ProductMap,
    num_years: u32,
) -> Result<AuxiliaryBoundMap> {
    let file_path = model_dir.join(AUXILIARY_BOUNDS_FILE_NAME);
    let bounds_csv = read_csv_optional(&file_path)?;
    let mut bounds =
        read_bounds_from_iter(bounds_csv, num_years).with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(AUXILIARY_BOUND_TERMS_FILE_NAME);
    let terms_csv = read_csv_optional(&file_path)?;
    read_bound_terms_from_iter(terms_csv, &mut bounds, products)
        .with_context(|| input_err_msg(&file_path))?;

    Ok(bounds)
}

fn read_bounds_from_iter<I>(iter: I, num_years: u32) -> Result<AuxiliaryBoundMap>
where
    I: Iterator<Item = AuxiliaryBoundRaw>,
{
    let mut map = AuxiliaryBoundMap::new();
    for record in iter {
        ensure!(!record.bound_id.trim().is_empty(), "Empty bound ID found");
        ensure!(
            record.value.is_finite(),
            "Value for bound {} must be a finite number",
            record.bound_id
        );
        let years = parse_year_str(&record.years, num_years)
            .with_context(|| format!("Invalid years for bound {}", record.bound_id))?;

        let id = BoundID::from(record.bound_id);
        let bound = map.entry(id.clone()).or_insert_with(|| AuxiliaryBound {
            id: id.clone(),
            terms: IndexMap::new(),
            relation: record.relation,
            values: HashMap::new(),
        });
        ensure!(
            bound.relation == record.relation,
            "Bound {id} has inconsistent relations"
        );

        for year in years {
            ensure!(
                bound.values.insert(year, record.value).is_none(),
                "Bound {id} has more than one value for year {year}"
            );
        }
    }

    Ok(map)
}

fn read_bound_terms_from_iter<I>(
    iter: I,
    bounds: &mut AuxiliaryBoundMap,
    products: &ProductMap,
) -> Result<()>
where
    I: Iterator<Item = AuxiliaryBoundTermRaw>,
{
    for record in iter {
        let bound = bounds
            .get_mut(record.bound_id.as_str())
            .with_context(|| format!("Terms given for unknown bound {}", record.bound_id))?;
        let product_id = products.get_id(&record.product_id)?;
        ensure!(
            record.coefficient.is_finite(),
            "Coefficient for product {product_id} in bound {} must be a finite number",
            bound.id
        );
        ensure!(
            bound
                .terms
                .insert(product_id.clone(), record.coefficient)
                .is_none(),
            "Duplicate term for product {product_id} in bound {}",
            bound.id
        );
    }

    for bound in bounds.values() {
        ensure!(!bound.terms.is_empty(), "Bound {} has no terms", bound.id);
    }

    Ok(())
}
