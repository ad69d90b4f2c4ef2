//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// The default tolerance used to decide whether a resource constraint is binding
pub const DEFAULT_BINDING_TOLERANCE: f64 = 1e-6;

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_binding_tolerance, f64, DEFAULT_BINDING_TOLERANCE);

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Number of years in the planning horizon
    pub years: u32,
    /// Resources whose absolute slack is below this value are reported as binding
    #[serde(default = "default_binding_tolerance")]
    pub binding_tolerance: f64,
}

/// Check that the `years` parameter is valid
fn check_years(years: u32) -> Result<()> {
    ensure!(years > 0, "years must be at least 1");

    Ok(())
}

/// Check that the `binding_tolerance` parameter is valid
fn check_binding_tolerance(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "binding_tolerance must be a finite number greater than zero"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_years(self.years)?;
        check_binding_tolerance(self.binding_tolerance)?;

        Ok(())
    }
}
