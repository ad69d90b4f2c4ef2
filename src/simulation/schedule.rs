//! Code for projecting resource capacities over the model horizon.
//!
//! The capacity of each resource in each year is built up in stages:
//!
//! 1. The resource's base capacity, developed by its growth rule
//! 2. Plus the contribution of every active investment targeting the resource
//! 3. Multiplied by the downtime factor of every active investment finishing in that year
//!
//! The last stage applies to **all** resources, as installation disrupts the whole facility.
use crate::investment::Investment;
use crate::model::Model;
use crate::resource::{ResourceID, ResourceMap};
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use log::{debug, warn};

/// The capacity of each resource in a single year
pub type CapacityRow = IndexMap<ResourceID, f64>;

/// The capacity of every resource in every year of the model horizon.
///
/// Years are numbered from 1.
#[derive(PartialEq, Debug, Clone)]
pub struct CapacitySchedule(Vec<CapacityRow>);

impl CapacitySchedule {
    /// Project the capacity schedule for a model, using its active investments
    pub fn from_model(model: &Model) -> Result<Self> {
        project_capacity_schedule(
            model.parameters.years,
            &model.resources,
            model.iter_active_investments(),
        )
    }

    /// The number of years in the schedule
    pub fn num_years(&self) -> u32 {
        u32::try_from(self.0.len()).expect("Too many years in schedule")
    }

    /// The capacities of all resources for the given year, if it is within the horizon
    pub fn row(&self, year: u32) -> Option<&CapacityRow> {
        let index = usize::try_from(year.checked_sub(1)?).ok()?;
        self.0.get(index)
    }

    /// The capacity of a resource in a given year
    pub fn get(&self, year: u32, resource_id: &ResourceID) -> Option<f64> {
        self.row(year)?.get(resource_id).copied()
    }

    /// Iterate over the years of the schedule along with their capacities
    pub fn iter(&self) -> impl Iterator<Item = (u32, &CapacityRow)> {
        (1..).zip(self.0.iter())
    }
}

/// Project the capacity of every resource over the model horizon.
///
/// The projection depends only on its inputs, so calling this repeatedly with the same arguments
/// gives identical schedules.
///
/// # Arguments
///
/// * `num_years` - The number of years in the horizon
/// * `resources` - The resources, with their base capacities and growth rules
/// * `investments` - The investments to include (normally only the active ones)
///
/// # Returns
///
/// The capacity schedule, or an error if an investment refers to an unknown resource or any
/// capacity would be negative.
pub fn project_capacity_schedule<'a, I>(
    num_years: u32,
    resources: &ResourceMap,
    investments: I,
) -> Result<CapacitySchedule>
where
    I: IntoIterator<Item = &'a Investment>,
{
    let investments: Vec<&Investment> = investments.into_iter().collect();
    check_investments(num_years, resources, &investments)?;

    let rows = (1..=num_years)
        .map(|year| project_year(year, resources, &investments))
        .collect::<Result<_>>()?;

    Ok(CapacitySchedule(rows))
}

/// Check that investments refer to known resources and warn about those which will have no effect
fn check_investments(
    num_years: u32,
    resources: &ResourceMap,
    investments: &[&Investment],
) -> Result<()> {
    for investment in investments {
        ensure!(
            resources.contains_key(&investment.resource_id),
            "Investment {} refers to unknown resource {}",
            investment.id,
            investment.resource_id
        );

        let finish_year = investment.finish_year();
        if finish_year > num_years {
            warn!(
                "Investment {} finishes in year {finish_year}, after the end of the model horizon \
                (year {num_years}), so it will have no effect",
                investment.id
            );
        }
    }

    Ok(())
}

/// Calculate the capacity of every resource for a single year
fn project_year(
    year: u32,
    resources: &ResourceMap,
    investments: &[&Investment],
) -> Result<CapacityRow> {
    // First pass: growth plus investment additions, resource by resource
    let mut row: CapacityRow = resources
        .iter()
        .map(|(id, resource)| {
            let added: f64 = investments
                .iter()
                .filter(|investment| investment.resource_id == *id)
                .map(|investment| investment.contribution(year))
                .sum();

            (id.clone(), resource.grown_capacity(year) + added)
        })
        .collect();

    // Second pass: downtime from investments being commissioned this year affects every resource
    for investment in investments
        .iter()
        .filter(|investment| investment.has_downtime() && investment.finish_year() == year)
    {
        let factor = investment.downtime_factor();
        debug!(
            "Year {year}: applying downtime factor {factor} for investment {}",
            investment.id
        );
        for capacity in row.values_mut() {
            *capacity *= factor;
        }
    }

    for (id, capacity) in &row {
        check_capacity(year, id, *capacity)?;
    }

    Ok(row)
}

/// Check that a projected capacity is a finite, non-negative number
fn check_capacity(year: u32, resource_id: &ResourceID, capacity: f64) -> Result<()> {
    ensure!(
        capacity.is_finite() && capacity >= 0.0,
        "Capacity of resource {resource_id} in year {year} would be {capacity}; capacities \
        cannot be negative"
    );

    Ok(())
}

/// Format a capacity schedule as a table, for logging
pub fn format_schedule(schedule: &CapacitySchedule) -> Result<String> {
    use std::fmt::Write;

    let mut out = String::new();
    let Some(first_row) = schedule.row(1) else {
        return Ok(out);
    };

    write!(&mut out, "{:<6}", "Year")?;
    for id in first_row.keys() {
        write!(&mut out, "{:>16}", id.to_string())?;
    }
    for (year, row) in schedule.iter() {
        write!(&mut out, "\n{year:<6}")?;
        for capacity in row.values() {
            write!(&mut out, "{capacity:>16.2}")?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, investment, resource_map};
    use crate::resource::{GrowthRule, Resource};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn project(resources: &ResourceMap, investments: &[Investment]) -> CapacitySchedule {
        project_capacity_schedule(5, resources, investments).unwrap()
    }

    fn assert_capacities(schedule: &CapacitySchedule, resource_id: &str, expected: &[f64]) {
        let resource_id = ResourceID::new(resource_id);
        for (year, expected) in (1..).zip(expected) {
            assert_approx_eq!(
                f64,
                schedule.get(year, &resource_id).unwrap(),
                *expected,
                epsilon = 1e-9
            );
        }
    }

    #[rstest]
    fn test_project_base_capacity_only() {
        let resources = resource_map(&[("Assembly", 600.0, GrowthRule::None)]);
        let schedule = project(&resources, &[]);
        assert_eq!(schedule.num_years(), 5);
        assert_capacities(&schedule, "Assembly", &[600.0; 5]);
    }

    #[rstest]
    fn test_project_growth() {
        let resources = resource_map(&[
            ("Labour", 1000.0, GrowthRule::Compound { rate: 0.05 }),
            ("Energy", 100.0, GrowthRule::Linear { rate: 10.0 }),
        ]);
        let schedule = project(&resources, &[]);
        assert_capacities(
            &schedule,
            "Labour",
            &[1000.0, 1050.0, 1102.5, 1157.625, 1215.50625],
        );
        assert_capacities(&schedule, "Energy", &[110.0, 120.0, 130.0, 140.0, 150.0]);
    }

    #[rstest]
    fn test_project_partial_year(investment: Investment) {
        let resources = resource_map(&[("Assembly", 0.0, GrowthRule::None)]);
        let investment = Investment {
            install_months: 6.0,
            full_capacity: 120.0,
            ..investment
        };
        let schedule = project(&resources, &[investment]);
        assert_capacities(&schedule, "Assembly", &[60.0, 120.0, 120.0, 120.0, 120.0]);
    }

    #[rstest]
    fn test_project_exact_year(investment: Investment) {
        let resources = resource_map(&[("Assembly", 0.0, GrowthRule::None)]);
        let investment = Investment {
            install_months: 12.0,
            full_capacity: 150.0,
            ..investment
        };
        let schedule = project(&resources, &[investment]);
        assert_capacities(&schedule, "Assembly", &[0.0, 150.0, 150.0, 150.0, 150.0]);
    }

    #[rstest]
    fn test_project_multi_year(investment: Investment) {
        let resources = resource_map(&[("Assembly", 0.0, GrowthRule::None)]);
        let investment = Investment {
            install_months: 14.0,
            full_capacity: 120.0,
            ..investment
        };
        let schedule = project(&resources, &[investment]);
        assert_capacities(&schedule, "Assembly", &[0.0, 100.0, 120.0, 120.0, 120.0]);
    }

    #[rstest]
    fn test_project_fractional_install(investment: Investment) {
        let resources = resource_map(&[("Assembly", 0.0, GrowthRule::None)]);
        let investment = Investment {
            install_months: 3.5,
            full_capacity: 120.0,
            ..investment
        };
        let schedule = project(&resources, &[investment]);
        assert_capacities(&schedule, "Assembly", &[85.0, 120.0, 120.0, 120.0, 120.0]);
    }

    #[rstest]
    fn test_project_investments_sum(investment: Investment) {
        let resources = resource_map(&[("Assembly", 100.0, GrowthRule::None)]);
        let first = Investment {
            install_months: 6.0,
            full_capacity: 120.0,
            ..investment.clone()
        };
        let second = Investment {
            id: "investment2".into(),
            install_months: 12.0,
            full_capacity: 30.0,
            ..investment
        };
        let schedule = project(&resources, &[first, second]);
        assert_capacities(&schedule, "Assembly", &[160.0, 250.0, 250.0, 250.0, 250.0]);
    }

    #[rstest]
    fn test_project_downtime_affects_all_resources(investment: Investment) {
        let resources = resource_map(&[
            ("Labour", 1200.0, GrowthRule::None),
            ("Assembly", 0.0, GrowthRule::None),
        ]);
        let investment = Investment {
            install_months: 5.0,
            full_capacity: 120.0,
            downtime_months: 1.0,
            ..investment
        };
        let schedule = project(&resources, &[investment]);

        // Year 1: (0 + 120 * 7/12) * 11/12 for the target resource, 1200 * 11/12 for the other
        assert_capacities(&schedule, "Assembly", &[70.0 * 11.0 / 12.0, 120.0, 120.0]);
        assert_capacities(&schedule, "Labour", &[1100.0, 1200.0, 1200.0]);
    }

    #[rstest]
    fn test_project_downtime_compounds(investment: Investment) {
        let resources = resource_map(&[("Labour", 1440.0, GrowthRule::None)]);
        let first = Investment {
            resource_id: "Labour".into(),
            install_months: 12.0,
            full_capacity: 0.0,
            downtime_months: 2.0,
            ..investment.clone()
        };
        let second = Investment {
            id: "investment2".into(),
            resource_id: "Labour".into(),
            install_months: 18.0,
            full_capacity: 0.0,
            downtime_months: 3.0,
            ..investment
        };
        let schedule = project(&resources, &[first, second]);

        // Both finish in year 2
        assert_capacities(
            &schedule,
            "Labour",
            &[1440.0, 1440.0 * 10.0 / 12.0 * 9.0 / 12.0, 1440.0],
        );
    }

    #[rstest]
    fn test_project_unknown_resource(investment: Investment) {
        let resources = resource_map(&[("Labour", 1.0, GrowthRule::None)]);
        assert_error!(
            project_capacity_schedule(3, &resources, &[investment]),
            "Investment investment1 refers to unknown resource Assembly"
        );
    }

    #[rstest]
    fn test_project_negative_capacity(investment: Investment) {
        let resources = resource_map(&[("Assembly", 100.0, GrowthRule::None)]);
        let investment = Investment {
            install_months: 12.0,
            full_capacity: -150.0,
            ..investment
        };
        assert_error!(
            project_capacity_schedule(3, &resources, &[investment]),
            "Capacity of resource Assembly in year 2 would be -50; capacities cannot be negative"
        );
    }

    #[test]
    fn test_project_negative_growth() {
        let resources = resource_map(&[("Labour", 10.0, GrowthRule::Linear { rate: -4.0 })]);
        assert!(project_capacity_schedule(2, &resources, []).is_ok());
        assert!(project_capacity_schedule(3, &resources, []).is_err());
    }

    #[rstest]
    fn test_project_finish_after_horizon(investment: Investment) {
        let resources = resource_map(&[("Assembly", 10.0, GrowthRule::None)]);
        let investment = Investment {
            install_months: 60.0,
            ..investment
        };
        let schedule = project_capacity_schedule(3, &resources, &[investment]).unwrap();
        assert_capacities(&schedule, "Assembly", &[10.0, 10.0, 10.0]);
    }

    #[rstest]
    fn test_project_idempotent(investment: Investment) {
        let resources = resource_map(&[
            ("Labour", 1000.0, GrowthRule::Compound { rate: 0.05 }),
            ("Assembly", 600.0, GrowthRule::None),
        ]);
        let investment = Investment {
            install_months: 3.5,
            downtime_months: 0.5,
            ..investment
        };
        let investments = [investment];
        let first = project(&resources, &investments);
        let second = project(&resources, &investments);
        assert_eq!(first, second);
    }

    #[test]
    fn test_schedule_row_out_of_range() {
        let resources = resource_map(&[("Assembly", 600.0, GrowthRule::None)]);
        let schedule = project(&resources, &[]);
        assert!(schedule.row(0).is_none());
        assert!(schedule.row(6).is_none());
        assert!(schedule.get(1, &"Labour".into()).is_none());
    }

    #[test]
    fn test_format_schedule() {
        let resources: ResourceMap = [(
            ResourceID::new("Assembly"),
            Resource {
                id: "Assembly".into(),
                description: String::new(),
                base_capacity: 600.0,
                growth: GrowthRule::None,
            }
            .into(),
        )]
        .into_iter()
        .collect();
        let schedule = project_capacity_schedule(2, &resources, []).unwrap();
        let table = format_schedule(&schedule).unwrap();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Assembly"));
        assert!(lines[2].starts_with('2'));
        assert!(lines[2].ends_with("600.00"));
    }
}
