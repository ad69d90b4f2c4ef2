//! Code for adding constraints to the production optimisation problem.
use super::VariableMap;
use crate::bound::{AuxiliaryBoundMap, BoundID};
use crate::model::Model;
use crate::resource::ResourceID;
use crate::simulation::schedule::CapacityRow;
use highs::RowProblem as Problem;

/// Corresponding keys for a group of constraints along with the row offset in the solution
pub struct KeysWithOffset<T> {
    offset: usize,
    keys: Vec<T>,
}

impl<T> KeysWithOffset<T> {
    /// Zip the keys with the corresponding row values in the solution, accounting for the offset
    pub fn zip_rows<'a>(&'a self, rows: &'a [f64]) -> impl Iterator<Item = (&'a T, f64)> {
        assert!(
            self.offset + self.keys.len() <= rows.len(),
            "Bad constraint keys: rows out of range"
        );

        self.keys.iter().zip(rows[self.offset..].iter().copied())
    }
}

/// Indicates the resource covered by each capacity constraint
pub type ResourceKeys = KeysWithOffset<ResourceID>;

/// Indicates the auxiliary bound covered by each bound constraint
pub type BoundKeys = KeysWithOffset<BoundID>;

/// The keys for different constraints
pub struct ConstraintKeys {
    /// Keys for resource capacity constraints
    pub resource_keys: ResourceKeys,
    /// Keys for the auxiliary bounds applied this year
    pub bound_keys: BoundKeys,
}

/// Add all constraints for a single year to the problem
///
/// # Arguments:
///
/// * `problem` - The optimisation problem
/// * `variables` - The variables in the problem
/// * `model` - The model
/// * `capacities` - Capacity of each resource this year
/// * `year` - The year being optimised
///
/// # Returns:
///
/// Keys identifying the rows of the problem
pub fn add_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    capacities: &CapacityRow,
    year: u32,
) -> ConstraintKeys {
    let resource_keys = add_resource_constraints(problem, variables, model, capacities);
    let bound_keys =
        add_auxiliary_bound_constraints(problem, variables, &model.auxiliary_bounds, year);

    ConstraintKeys {
        resource_keys,
        bound_keys,
    }
}

/// Add resource capacity constraints.
///
/// For every resource, total usage by all products must not exceed that year's capacity:
///
/// `Σ usage[r][p] * x[p] <= capacity[r]`
fn add_resource_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    capacities: &CapacityRow,
) -> ResourceKeys {
    // Row offset in problem. This line **must** come before we add more constraints.
    let offset = problem.num_rows();

    let mut keys = Vec::new();
    let mut terms = Vec::new();
    for (resource_id, capacity) in capacities {
        terms.extend(
            model
                .usage
                .iter_for_resource(resource_id, &model.products)
                .map(|(product_id, usage)| (variables.get(product_id), usage)),
        );

        problem.add_row(..=*capacity, terms.drain(..));
        keys.push(resource_id.clone());
    }

    ResourceKeys { offset, keys }
}

/// Add constraints for those auxiliary bounds which apply in the given year
fn add_auxiliary_bound_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    bounds: &AuxiliaryBoundMap,
    year: u32,
) -> BoundKeys {
    // Row offset in problem. This line **must** come before we add more constraints.
    let offset = problem.num_rows();

    let mut keys = Vec::new();
    for bound in bounds.values() {
        let Some(range) = bound.range_for_year(year) else {
            continue;
        };

        let terms = bound
            .terms
            .iter()
            .map(|(product_id, coefficient)| (variables.get(product_id), *coefficient));
        problem.add_row(range, terms);
        keys.push(bound.id.clone());
    }

    BoundKeys { offset, keys }
}
