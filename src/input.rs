//! Common routines for handling input data.
use crate::model::{Model, ModelParameters};
use anyhow::{Context, Result, bail};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

mod bound;
use bound::read_auxiliary_bounds;
mod investment;
use investment::read_investments;
mod product;
use product::read_products;
mod resource;
use resource::read_resources;
mod scenario;
use scenario::read_valuation_scenarios;
mod usage;
use usage::read_usage;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file which may not exist.
///
/// If the file is missing, an empty iterator is returned.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    if !file_path.exists() {
        return Ok(Vec::new().into_iter());
    }

    Ok(read_csv_internal(file_path)?.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Check whether a slice of values is sorted and contains no duplicates
pub fn is_sorted_and_unique<T: PartialOrd>(values: &[T]) -> bool {
    values.iter().tuple_windows().all(|(a, b)| a < b)
}

/// Read a model from the specified directory.
///
/// All validation happens here, so a successfully loaded model can be projected and optimised
/// without further configuration checks.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The static model data or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let resources = read_resources(model_dir)?;
    let products = read_products(model_dir)?;
    let usage = read_usage(model_dir, &resources, &products)?;
    let investments = read_investments(model_dir, &resources)?;
    let scenarios = read_valuation_scenarios(model_dir, &products)?;
    let auxiliary_bounds = read_auxiliary_bounds(model_dir, &products, parameters.years)?;

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        resources,
        products,
        usage,
        investments,
        scenarios,
        auxiliary_bounds,
    })
}
