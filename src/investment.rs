//! Investments are scheduled capital projects which add capacity to a single resource once they
//! have been installed.
//!
//! An investment comes online in its *finish year*. In that year it only contributes capacity for
//! the months after installation completes; in later years it contributes its full capacity.
//! Installation can also cause downtime, which reduces the capacity of **every** resource in the
//! finish year.
use crate::id::define_id_type;
use crate::resource::ResourceID;
use anyhow::{Result, ensure};
use indexmap::IndexMap;

define_id_type! {InvestmentID}

/// A map of [`Investment`]s, keyed by investment ID
pub type InvestmentMap = IndexMap<InvestmentID, Investment>;

/// The number of months in a year
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// A capital investment in additional capacity for a resource
#[derive(PartialEq, Debug, Clone)]
pub struct Investment {
    /// A unique identifier for the investment
    pub id: InvestmentID,
    /// The resource whose capacity the investment increases
    pub resource_id: ResourceID,
    /// Months required to bring the investment online (may be fractional or exceed 12)
    pub install_months: f64,
    /// Capacity added per year once the investment is fully operational
    pub full_capacity: f64,
    /// Months of whole-facility downtime in the finish year
    pub downtime_months: f64,
    /// Whether the investment is included in the model run
    pub active: bool,
}

impl Investment {
    /// Create a new [`Investment`], checking that its parameters are valid
    pub fn new(
        id: InvestmentID,
        resource_id: ResourceID,
        install_months: f64,
        full_capacity: f64,
        downtime_months: Option<f64>,
        active: bool,
    ) -> Result<Self> {
        let investment = Self {
            id,
            resource_id,
            install_months,
            full_capacity,
            downtime_months: downtime_months.unwrap_or(0.0),
            active,
        };
        investment.validate()?;

        Ok(investment)
    }

    /// Check that the investment's parameters are valid
    fn validate(&self) -> Result<()> {
        ensure!(
            self.install_months.is_finite() && self.install_months > 0.0,
            "Investment {}: install_months must be a finite number greater than zero",
            self.id
        );
        ensure!(
            self.full_capacity.is_finite(),
            "Investment {}: full_capacity must be a finite number",
            self.id
        );
        ensure!(
            (0.0..=MONTHS_PER_YEAR).contains(&self.downtime_months),
            "Investment {}: downtime_months must be between 0 and 12",
            self.id
        );

        Ok(())
    }

    /// The months of installation which fall into the finish year
    fn remainder_months(&self) -> f64 {
        self.install_months % MONTHS_PER_YEAR
    }

    /// The (1-based) year in which the investment comes online.
    ///
    /// Fractional install times are divided exactly, so 3.5 months finishes in year 1 and 14.5
    /// months in year 2.
    pub fn finish_year(&self) -> u32 {
        let years_elapsed = (self.install_months / MONTHS_PER_YEAR).floor();

        // Saturate for absurdly long installs rather than wrapping
        if years_elapsed >= f64::from(u32::MAX - 1) {
            return u32::MAX;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let years_elapsed = years_elapsed as u32;
        years_elapsed + 1
    }

    /// The number of months the investment operates for in its finish year.
    ///
    /// Installs lasting an exact multiple of 12 months complete at the start of the finish year, so
    /// the investment operates for the whole of that year.
    pub fn months_active_in_finish_year(&self) -> f64 {
        let remainder = self.remainder_months();
        if remainder > 0.0 {
            MONTHS_PER_YEAR - remainder
        } else {
            MONTHS_PER_YEAR
        }
    }

    /// The capacity this investment adds to its resource in the given year
    pub fn contribution(&self, year: u32) -> f64 {
        let finish_year = self.finish_year();
        match year.cmp(&finish_year) {
            std::cmp::Ordering::Less => 0.0,
            std::cmp::Ordering::Equal => {
                self.full_capacity * (self.months_active_in_finish_year() / MONTHS_PER_YEAR)
            }
            std::cmp::Ordering::Greater => self.full_capacity,
        }
    }

    /// Whether installing this investment causes any downtime
    pub fn has_downtime(&self) -> bool {
        self.downtime_months > 0.0
    }

    /// The factor by which every resource's capacity is multiplied in the finish year
    pub fn downtime_factor(&self) -> f64 {
        (MONTHS_PER_YEAR - self.downtime_months) / MONTHS_PER_YEAR
    }
}

/// Iterate over the active investments in the map
pub fn iter_active(investments: &InvestmentMap) -> impl Iterator<Item = &Investment> {
    investments.values().filter(|investment| investment.active)
}
