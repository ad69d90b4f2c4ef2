//! Code for performing the production optimisation for a single year.
//!
//! Each year is a linear program which maximises total profit subject to the capacity of every
//! resource and any auxiliary bounds which apply in that year. Years are independent of one
//! another: the only input which changes from year to year is the row of the capacity schedule.
use crate::model::Model;
use crate::product::{ProductID, ProductMap, ScenarioID, UsageMap, value_quantities};
use crate::resource::ResourceID;
use crate::simulation::schedule::CapacityRow;
use anyhow::{Result, bail};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use indexmap::IndexMap;
use log::debug;

pub mod constraints;
use constraints::{ConstraintKeys, add_constraints};

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
type Variable = highs::Col;

/// A map for easy lookup of the production variable for each product.
///
/// The entries are in the same order as the columns of the problem.
#[derive(Default)]
pub struct VariableMap(IndexMap<ProductID, Variable>);

impl VariableMap {
    /// Get the [`Variable`] corresponding to the given product
    fn get(&self, product_id: &ProductID) -> Variable {
        *self
            .0
            .get(product_id)
            .expect("No variable found for given product")
    }
}

/// The outcome of solving a year's optimisation problem
#[derive(PartialEq, Eq, Debug, Clone, Copy, strum::Display)]
pub enum SolveStatus {
    /// An optimal production mix was found
    Optimal,
    /// No production mix satisfies every constraint
    Infeasible,
    /// Profit can be increased without limit
    Unbounded,
    /// The solver could not tell whether the problem is infeasible or unbounded
    InfeasibleOrUnbounded,
}

impl SolveStatus {
    /// Whether the status indicates an optimal solution was found
    pub fn is_optimal(self) -> bool {
        self == Self::Optimal
    }
}

/// How a single resource is used by the optimal production mix
#[derive(PartialEq, Debug, Clone)]
pub struct ResourceUsage {
    /// Capacity available this year
    pub capacity: f64,
    /// Capacity consumed by production
    pub used: f64,
    /// Capacity left over
    pub slack: f64,
    /// Percentage of capacity used (zero if there is no capacity)
    pub utilisation_percent: f64,
    /// Whether all the capacity is used up
    pub binding: bool,
    /// The dual value of the resource's capacity constraint
    pub shadow_price: f64,
}

/// Total profit and revenue under one valuation scenario
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ScenarioValue {
    /// Total profit
    pub profit: f64,
    /// Total revenue
    pub revenue: f64,
}

/// The numeric results for a year which was solved to optimality
#[derive(PartialEq, Debug, Clone)]
pub struct YearSolution {
    /// Units produced of each product
    pub quantities: IndexMap<ProductID, f64>,
    /// Total profit under the primary objective
    pub profit: f64,
    /// Total revenue under the primary values, if every product has one
    pub revenue: Option<f64>,
    /// Profit and revenue of the same production mix under each valuation scenario
    pub scenario_values: IndexMap<ScenarioID, ScenarioValue>,
    /// How each resource is used
    pub resources: IndexMap<ResourceID, ResourceUsage>,
}

impl YearSolution {
    /// Iterate over the IDs of resources which are binding
    pub fn iter_binding(&self) -> impl Iterator<Item = &ResourceID> {
        self.resources
            .iter()
            .filter(|(_, usage)| usage.binding)
            .map(|(id, _)| id)
    }
}

/// The result of optimising a single year
#[derive(PartialEq, Debug, Clone)]
pub struct YearResult {
    /// The year which was optimised
    pub year: u32,
    /// The solver outcome
    pub status: SolveStatus,
    /// Capacity of each resource this year
    pub capacities: CapacityRow,
    /// Numeric results. Only present if the status is [`SolveStatus::Optimal`].
    pub solution: Option<YearSolution>,
}

/// Find the most profitable production mix for a single year.
///
/// An infeasible or unbounded problem is not an error; the returned result carries the status and
/// no solution. Any other failure of the solver is an error.
///
/// # Arguments
///
/// * `model` - The model
/// * `year` - The year to optimise (used to select auxiliary bounds)
/// * `capacities` - The capacity of each resource in this year
pub fn perform_year_optimisation(
    model: &Model,
    year: u32,
    capacities: &CapacityRow,
) -> Result<YearResult> {
    // Set up problem
    let mut problem = Problem::default();
    let variables = add_variables(&mut problem, &model.products);
    let keys = add_constraints(&mut problem, &variables, model, capacities, year);

    // Solve problem
    let mut highs_model = problem.optimise(Sense::Maximise);
    highs_model.set_option("output_flag", false);
    let solved = highs_model.solve();

    let status = match solved.status() {
        HighsModelStatus::Optimal => SolveStatus::Optimal,
        HighsModelStatus::Infeasible => SolveStatus::Infeasible,
        HighsModelStatus::Unbounded => SolveStatus::Unbounded,
        HighsModelStatus::UnboundedOrInfeasible => SolveStatus::InfeasibleOrUnbounded,
        status => bail!("Could not solve optimisation problem for year {year}: {status:?}"),
    };
    debug!("Year {year}: solver status {status}");

    let solution = if status.is_optimal() {
        let solution = solved.get_solution();
        Some(build_year_solution(
            model,
            capacities,
            &variables,
            &keys,
            solution.columns(),
            solution.dual_rows(),
        ))
    } else {
        None
    };

    Ok(YearResult {
        year,
        status,
        capacities: capacities.clone(),
        solution,
    })
}

/// Add one production variable per product, with its profit as the objective coefficient
fn add_variables(problem: &mut Problem, products: &ProductMap) -> VariableMap {
    let mut variables = VariableMap::default();
    for (id, product) in products {
        let var = problem.add_column(product.profit_per_unit, 0.0..);
        let existing = variables.0.insert(id.clone(), var).is_some();
        assert!(!existing, "Duplicate entry for var");
    }

    variables
}

/// Assemble the numeric results for a solved year
fn build_year_solution(
    model: &Model,
    capacities: &CapacityRow,
    variables: &VariableMap,
    keys: &ConstraintKeys,
    columns: &[f64],
    duals: &[f64],
) -> YearSolution {
    let quantities: IndexMap<ProductID, f64> = variables
        .0
        .keys()
        .cloned()
        .zip(columns.iter().copied())
        .collect();

    let primary_profit = model
        .products
        .iter()
        .map(|(id, product)| (id.clone(), product.profit_per_unit))
        .collect();
    let profit = value_quantities(&quantities, &primary_profit);

    let revenue = model.has_primary_revenue().then(|| {
        let primary_revenue = model
            .products
            .iter()
            .map(|(id, product)| (id.clone(), product.revenue_per_unit.unwrap_or(0.0)))
            .collect();
        value_quantities(&quantities, &primary_revenue)
    });

    let scenario_values = model
        .scenarios
        .iter()
        .map(|(id, scenario)| {
            let value = ScenarioValue {
                profit: value_quantities(&quantities, &scenario.profit_per_unit),
                revenue: value_quantities(&quantities, &scenario.revenue_per_unit),
            };
            (id.clone(), value)
        })
        .collect();

    let shadow_prices: IndexMap<ResourceID, f64> = keys
        .resource_keys
        .zip_rows(duals)
        .map(|(id, dual)| (id.clone(), dual))
        .collect();
    let resources = calculate_resource_usage(
        &model.usage,
        capacities,
        &quantities,
        &shadow_prices,
        model.parameters.binding_tolerance,
    );

    YearSolution {
        quantities,
        profit,
        revenue,
        scenario_values,
        resources,
    }
}

/// Work out how much of each resource a production mix uses.
///
/// # Arguments
///
/// * `usage` - Resource usage per unit of each product
/// * `capacities` - Capacity of each resource
/// * `quantities` - Units produced of each product
/// * `shadow_prices` - Dual values of the capacity constraints (missing values are taken as zero)
/// * `tolerance` - Resources whose absolute slack is below this value are binding
pub fn calculate_resource_usage(
    usage: &UsageMap,
    capacities: &CapacityRow,
    quantities: &IndexMap<ProductID, f64>,
    shadow_prices: &IndexMap<ResourceID, f64>,
    tolerance: f64,
) -> IndexMap<ResourceID, ResourceUsage> {
    capacities
        .iter()
        .map(|(resource_id, &capacity)| {
            let used: f64 = quantities
                .iter()
                .map(|(product_id, quantity)| usage.get(resource_id, product_id) * quantity)
                .sum();
            let slack = capacity - used;
            let utilisation_percent = if capacity > 0.0 {
                used / capacity * 100.0
            } else {
                0.0
            };

            let resource_usage = ResourceUsage {
                capacity,
                used,
                slack,
                utilisation_percent,
                binding: slack.abs() < tolerance,
                shadow_price: shadow_prices.get(resource_id).copied().unwrap_or(0.0),
            };
            (resource_id.clone(), resource_usage)
        })
        .collect()
}
