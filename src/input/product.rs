//! Code for reading the products CSV file
use super::{input_err_msg, read_csv};
use crate::id::collect_unique;
use crate::product::{Product, ProductID, ProductMap};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;
use std::rc::Rc;

const PRODUCTS_FILE_NAME: &str = "products.csv";

/// Represents a row of the products CSV file
#[derive(Deserialize, PartialEq, Debug)]
struct ProductRaw {
    id: String,
    #[serde(default)]
    description: String,
    profit_per_unit: f64,
    revenue_per_unit: Option<f64>,
}

impl ProductRaw {
    fn into_product(self) -> Result<Product> {
        ensure!(
            self.profit_per_unit.is_finite(),
            "Product {}: profit_per_unit must be a finite number",
            self.id
        );
        ensure!(
            self.revenue_per_unit.is_none_or(f64::is_finite),
            "Product {}: revenue_per_unit must be a finite number",
            self.id
        );

        Ok(Product {
            id: self.id.into(),
            description: self.description,
            profit_per_unit: self.profit_per_unit,
            revenue_per_unit: self.revenue_per_unit,
        })
    }
}

/// Read the products CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A map of products keyed by ID, in file order, or an error.
pub fn read_products(model_dir: &Path) -> Result<ProductMap> {
    let file_path = model_dir.join(PRODUCTS_FILE_NAME);
    let products_csv = read_csv(&file_path)?;
    read_products_from_iter(products_csv).with_context(|| input_err_msg(&file_path))
}

fn read_products_from_iter<I>(iter: I) -> Result<ProductMap>
where
    I: Iterator<Item = ProductRaw>,
{
    let products: Vec<(ProductID, Rc<Product>)> = iter
        .map(|raw| {
            let product = raw.into_product()?;
            Ok((product.id.clone(), Rc::new(product)))
        })
        .collect::<Result<_>>()?;

    collect_unique(products, "product")
}
