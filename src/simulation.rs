//! Functionality for running the production planning simulation.
use crate::model::Model;
use crate::output::DataWriter;
use anyhow::Result;
use itertools::Itertools;
use log::{debug, info, warn};
use std::path::Path;

pub mod optimisation;
use optimisation::{YearResult, perform_year_optimisation};
pub mod schedule;
use schedule::{CapacitySchedule, format_schedule};

/// Run the simulation.
///
/// The capacity schedule is projected once for the whole horizon, after which each year is
/// optimised independently.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information (e.g. slack values) to file
///
/// # Returns:
///
/// The result for every year, in order.
pub fn run(model: &Model, output_path: &Path, debug_model: bool) -> Result<Vec<YearResult>> {
    let mut writer = DataWriter::create(output_path, model, debug_model)?;

    log_active_investments(model);
    writer.write_debug_investments(model.iter_active_investments())?;

    let schedule = CapacitySchedule::from_model(model)?;
    info!(
        "Projected capacities of {} resources over {} years",
        model.resources.len(),
        schedule.num_years()
    );
    debug!("Capacity schedule:\n{}", format_schedule(&schedule)?);
    writer.write_capacity_schedule(&schedule)?;

    let results = optimise_years(model, &schedule)?;
    for result in &results {
        writer.write_year_result(result)?;
    }
    writer.flush()?;

    info!("Bottlenecks:\n{}", format_bottlenecks(&results));

    Ok(results)
}

/// Optimise every year of the schedule in turn.
///
/// Years which cannot be solved to optimality are logged and skipped; only solver failures are
/// errors.
pub fn optimise_years(model: &Model, schedule: &CapacitySchedule) -> Result<Vec<YearResult>> {
    schedule
        .iter()
        .map(|(year, capacities)| {
            info!("Year: {year}");
            let result = perform_year_optimisation(model, year, capacities)?;
            match &result.solution {
                Some(solution) => info!("Year {year}: profit {:.2}", solution.profit),
                None => warn!(
                    "Year {year}: no optimal solution found (status: {})",
                    result.status
                ),
            }

            Ok(result)
        })
        .collect()
}

/// Log the investments which are included in this run
fn log_active_investments(model: &Model) {
    let active = model
        .iter_active_investments()
        .map(|investment| {
            format!(
                "{} ({}, finish year {})",
                investment.id,
                investment.resource_id,
                investment.finish_year()
            )
        })
        .collect_vec();

    if active.is_empty() {
        info!("Active investments: None");
    } else {
        info!("Active investments: {}", active.join(", "));
    }
}

/// Summarise the binding resources in each year, one line per year
pub fn format_bottlenecks(results: &[YearResult]) -> String {
    results
        .iter()
        .map(|result| {
            let summary = match &result.solution {
                Some(solution) => {
                    let binding = solution.iter_binding().join(", ");
                    if binding.is_empty() {
                        "None".to_string()
                    } else {
                        binding
                    }
                }
                None => format!("N/A ({})", result.status),
            };
            format!("Year {}: {summary}", result.year)
        })
        .join("\n")
}
