//! The module responsible for writing output data to disk.
use crate::investment::{Investment, InvestmentID};
use crate::model::Model;
use crate::product::{ProductID, ScenarioID};
use crate::resource::ResourceID;
use crate::simulation::optimisation::{YearResult, YearSolution};
use crate::simulation::schedule::CapacitySchedule;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "prodplan_results";

/// The output file name for the capacity schedule
const CAPACITY_SCHEDULE_FILE_NAME: &str = "capacity_schedule.csv";

/// The output file name for the per-year results table
const RESULTS_FILE_NAME: &str = "results.csv";

/// The output file name for derived investment quantities
const INVESTMENTS_FILE_NAME: &str = "debug_investments.csv";

/// The output file name for resource slack and shadow prices
const SLACK_FILE_NAME: &str = "debug_slack.csv";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory, or prepare an existing one for reuse.
///
/// A non-empty directory is only reused if `allow_overwrite` is set, in which case its contents
/// are removed.
///
/// # Returns
///
/// Whether an existing non-empty directory was overwritten.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let mut overwrite = false;
    if output_dir.is_dir() {
        if fs::read_dir(output_dir)?.next().is_none() {
            // Empty folder: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );

        fs::remove_dir_all(output_dir)?;
        overwrite = true;
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the capacity schedule CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CapacityScheduleRow {
    year: u32,
    resource_id: ResourceID,
    capacity: f64,
}

/// Represents a row in the debug investments CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct InvestmentRow {
    investment_id: InvestmentID,
    resource_id: ResourceID,
    finish_year: u32,
    months_active_in_finish_year: f64,
    downtime_factor: f64,
}

impl InvestmentRow {
    /// Create a new [`InvestmentRow`]
    fn new(investment: &Investment) -> Self {
        Self {
            investment_id: investment.id.clone(),
            resource_id: investment.resource_id.clone(),
            finish_year: investment.finish_year(),
            months_active_in_finish_year: investment.months_active_in_finish_year(),
            downtime_factor: investment.downtime_factor(),
        }
    }
}

/// Represents a row in the debug slack CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SlackRow {
    year: u32,
    resource_id: ResourceID,
    slack: f64,
    shadow_price: f64,
}

/// The columns of the results table.
///
/// The table has one column per product, scenario and resource, so its layout depends on the
/// model. Resource columns come in groups of four.
#[derive(Debug, PartialEq)]
struct ResultsLayout {
    scenarios: Vec<ScenarioID>,
    include_revenue: bool,
    products: Vec<ProductID>,
    resources: Vec<ResourceID>,
}

impl ResultsLayout {
    /// Work out the results columns for a model
    fn new(model: &Model) -> Self {
        Self {
            scenarios: model.scenarios.keys().cloned().collect(),
            include_revenue: model.has_primary_revenue(),
            products: model.products.keys().cloned().collect(),
            resources: model.resources.keys().cloned().collect(),
        }
    }

    /// The header row of the results table
    fn header(&self) -> Vec<String> {
        let mut header = vec!["Year".to_string(), "Status".to_string(), "Profit".to_string()];
        header.extend(self.scenarios.iter().map(|id| format!("Profit_{id}")));
        if self.include_revenue {
            header.push("Revenue".to_string());
        }
        header.extend(self.scenarios.iter().map(|id| format!("Revenue_{id}")));
        header.extend(self.products.iter().map(ToString::to_string));
        for id in &self.resources {
            header.push(format!("{id}_Capacity"));
            header.push(format!("{id}_Used"));
            header.push(format!("{id}_Utilisation_%"));
            header.push(format!("{id}_Binding"));
        }

        header
    }

    /// The number of columns following `Year` and `Status`
    fn num_value_columns(&self) -> usize {
        1 + 2 * self.scenarios.len()
            + usize::from(self.include_revenue)
            + self.products.len()
            + 4 * self.resources.len()
    }

    /// Convert a year's result into a row of the results table.
    ///
    /// Numeric cells are left empty if the year was not solved to optimality.
    fn record(&self, result: &YearResult) -> Vec<String> {
        let mut record = vec![result.year.to_string(), result.status.to_string()];
        match &result.solution {
            Some(solution) => self.extend_with_solution(&mut record, solution),
            None => record.extend(std::iter::repeat_n(String::new(), self.num_value_columns())),
        }

        record
    }

    /// Append the numeric cells for a solved year
    fn extend_with_solution(&self, record: &mut Vec<String>, solution: &YearSolution) {
        let scenario_value = |id: &ScenarioID| solution.scenario_values.get(id);

        record.push(format_value(solution.profit));
        record.extend(self.scenarios.iter().map(|id| {
            scenario_value(id).map_or_else(String::new, |value| format_value(value.profit))
        }));
        if self.include_revenue {
            record.push(solution.revenue.map_or_else(String::new, format_value));
        }
        record.extend(self.scenarios.iter().map(|id| {
            scenario_value(id).map_or_else(String::new, |value| format_value(value.revenue))
        }));
        record.extend(self.products.iter().map(|id| {
            solution
                .quantities
                .get(id)
                .map_or_else(String::new, |quantity| format_value(*quantity))
        }));
        for id in &self.resources {
            if let Some(usage) = solution.resources.get(id) {
                record.push(format_value(usage.capacity));
                record.push(format_value(usage.used));
                record.push(format!("{:.1}", usage.utilisation_percent));
                record.push(usage.binding.to_string());
            } else {
                record.extend(std::iter::repeat_n(String::new(), 4));
            }
        }
    }
}

/// Format a value for the results table, to two decimal places
fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

/// For writing extra debug information about the model
struct DebugDataWriter {
    investments_writer: csv::Writer<File>,
    slack_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            investments_writer: new_writer(INVESTMENTS_FILE_NAME)?,
            slack_writer: new_writer(SLACK_FILE_NAME)?,
        })
    }

    /// Write derived quantities for each investment
    fn write_investments<'a, I>(&mut self, investments: I) -> Result<()>
    where
        I: Iterator<Item = &'a Investment>,
    {
        for investment in investments {
            self.investments_writer
                .serialize(InvestmentRow::new(investment))?;
        }

        Ok(())
    }

    /// Write the slack and shadow price of each resource for a solved year
    fn write_slack(&mut self, result: &YearResult) -> Result<()> {
        let Some(solution) = &result.solution else {
            return Ok(());
        };

        for (resource_id, usage) in &solution.resources {
            let row = SlackRow {
                year: result.year,
                resource_id: resource_id.clone(),
                slack: usage.slack,
                shadow_price: usage.shadow_price,
            };
            self.slack_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    fn flush(&mut self) -> Result<()> {
        self.investments_writer.flush()?;
        self.slack_writer.flush()?;

        Ok(())
    }
}

/// An object for writing the capacity schedule and per-year results to file
pub struct DataWriter {
    schedule_writer: csv::Writer<File>,
    results_writer: csv::Writer<File>,
    layout: ResultsLayout,
    debug_writer: Option<DebugDataWriter>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `model` - The model being run (determines the results columns)
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, model: &Model, save_debug_info: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let debug_writer = if save_debug_info {
            // Create debug CSV files
            Some(DebugDataWriter::create(output_path)?)
        } else {
            None
        };

        let layout = ResultsLayout::new(model);
        let mut results_writer = new_writer(RESULTS_FILE_NAME)?;
        results_writer.write_record(layout.header())?;

        Ok(Self {
            schedule_writer: new_writer(CAPACITY_SCHEDULE_FILE_NAME)?,
            results_writer,
            layout,
            debug_writer,
        })
    }

    /// Write the capacity schedule to a CSV file
    pub fn write_capacity_schedule(&mut self, schedule: &CapacitySchedule) -> Result<()> {
        for (year, row) in schedule.iter() {
            for (resource_id, capacity) in row {
                let row = CapacityScheduleRow {
                    year,
                    resource_id: resource_id.clone(),
                    capacity: *capacity,
                };
                self.schedule_writer.serialize(row)?;
            }
        }

        Ok(())
    }

    /// Write a row of the results table, plus debug info if enabled
    pub fn write_year_result(&mut self, result: &YearResult) -> Result<()> {
        self.results_writer
            .write_record(self.layout.record(result))?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.write_slack(result)?;
        }

        Ok(())
    }

    /// Write derived investment quantities to a CSV file, if debug info is enabled
    pub fn write_debug_investments<'a, I>(&mut self, investments: I) -> Result<()>
    where
        I: Iterator<Item = &'a Investment>,
    {
        if let Some(wtr) = &mut self.debug_writer {
            wtr.write_investments(investments)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.schedule_writer.flush()?;
        self.results_writer.flush()?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, investment, model_from_parts, product_map, resource_map};
    use crate::product::{UsageMap, ValuationScenario};
    use crate::resource::GrowthRule;
    use crate::simulation::optimisation::{ResourceUsage, ScenarioValue, SolveStatus};
    use crate::simulation::schedule::project_capacity_schedule;
    use indexmap::indexmap;
    use itertools::{Itertools, assert_equal};
    use rstest::{fixture, rstest};
    use std::iter;
    use tempfile::tempdir;

    #[fixture]
    fn model() -> Model {
        let resources = resource_map(&[("Labour", 100.0, GrowthRule::None)]);
        let products = product_map(&[("A", 2.0)]);
        let mut usage = UsageMap::new();
        usage.insert("Labour".into(), "A".into(), 1.0);
        let mut model = model_from_parts(resources, products, usage);
        let scenario = ValuationScenario {
            id: "low".into(),
            profit_per_unit: indexmap! { ProductID::new("A") => 1.0 },
            revenue_per_unit: indexmap! { ProductID::new("A") => 3.0 },
        };
        model.scenarios.insert(scenario.id.clone(), scenario);
        model
    }

    fn optimal_result() -> YearResult {
        let capacities = indexmap! { ResourceID::new("Labour") => 100.0 };
        let usage = ResourceUsage {
            capacity: 100.0,
            used: 100.0,
            slack: 0.0,
            utilisation_percent: 100.0,
            binding: true,
            shadow_price: 2.0,
        };
        let solution = YearSolution {
            quantities: indexmap! { ProductID::new("A") => 100.0 },
            profit: 200.0,
            revenue: None,
            scenario_values: indexmap! {
                ScenarioID::new("low") => ScenarioValue { profit: 100.0, revenue: 300.0 }
            },
            resources: indexmap! { ResourceID::new("Labour") => usage },
        };
        YearResult {
            year: 1,
            status: SolveStatus::Optimal,
            capacities,
            solution: Some(solution),
        }
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_create_output_directory_new() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results").join("model");
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty() {
        let dir = tempdir().unwrap();
        assert!(!create_output_directory(dir.path(), false).unwrap());
    }

    #[test]
    fn test_create_output_directory_existing_not_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("results.csv"), "old").unwrap();

        assert_error!(
            create_output_directory(dir.path(), false),
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );

        assert!(create_output_directory(dir.path(), true).unwrap());
        assert!(dir.path().is_dir());
        assert!(!dir.path().join("results.csv").exists());
    }

    #[rstest]
    fn test_results_header(model: Model) {
        let layout = ResultsLayout::new(&model);
        assert_eq!(
            layout.header(),
            [
                "Year",
                "Status",
                "Profit",
                "Profit_low",
                "Revenue_low",
                "A",
                "Labour_Capacity",
                "Labour_Used",
                "Labour_Utilisation_%",
                "Labour_Binding"
            ]
        );
        assert_eq!(layout.num_value_columns(), layout.header().len() - 2);
    }

    #[rstest]
    fn test_results_record_not_optimal(model: Model) {
        let layout = ResultsLayout::new(&model);
        let result = YearResult {
            status: SolveStatus::Infeasible,
            solution: None,
            ..optimal_result()
        };
        let record = layout.record(&result);
        assert_eq!(record.len(), layout.header().len());
        assert_eq!(record[..2], ["1", "Infeasible"]);
        assert!(record[2..].iter().all(String::is_empty));
    }

    #[rstest]
    fn test_write_year_result(model: Model) {
        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path(), &model, false).unwrap();
            writer.write_year_result(&optimal_result()).unwrap();
            writer.flush().unwrap();
        }

        let lines = read_lines(&dir.path().join(RESULTS_FILE_NAME));
        assert_eq!(
            lines,
            [
                "Year,Status,Profit,Profit_low,Revenue_low,A,Labour_Capacity,Labour_Used,\
                Labour_Utilisation_%,Labour_Binding",
                "1,Optimal,200.00,100.00,300.00,100.00,100.00,100.00,100.0,true"
            ]
        );
        assert!(!dir.path().join(SLACK_FILE_NAME).exists());
    }

    #[rstest]
    fn test_write_capacity_schedule(investment: Investment) {
        let resources = resource_map(&[("Assembly", 10.0, GrowthRule::None)]);
        let schedule = project_capacity_schedule(2, &resources, iter::once(&investment)).unwrap();
        let model = model_from_parts(resources, product_map(&[("A", 1.0)]), UsageMap::new());

        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path(), &model, false).unwrap();
            writer.write_capacity_schedule(&schedule).unwrap();
            writer.flush().unwrap();
        }

        let records: Vec<CapacityScheduleRow> =
            csv::Reader::from_path(dir.path().join(CAPACITY_SCHEDULE_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        let expected = schedule.iter().map(|(year, row)| CapacityScheduleRow {
            year,
            resource_id: "Assembly".into(),
            capacity: row["Assembly"],
        });
        assert_equal(records, expected);
    }

    #[rstest]
    fn test_write_debug_info(model: Model, investment: Investment) {
        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path(), &model, true).unwrap();
            writer
                .write_debug_investments(iter::once(&investment))
                .unwrap();
            writer.write_year_result(&optimal_result()).unwrap();
            writer.flush().unwrap();
        }

        let records: Vec<InvestmentRow> =
            csv::Reader::from_path(dir.path().join(INVESTMENTS_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_equal(records, iter::once(InvestmentRow::new(&investment)));

        let records: Vec<SlackRow> = csv::Reader::from_path(dir.path().join(SLACK_FILE_NAME))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap();
        let expected = SlackRow {
            year: 1,
            resource_id: "Labour".into(),
            slack: 0.0,
            shadow_price: 2.0,
        };
        assert_equal(records, iter::once(expected));
    }
}
