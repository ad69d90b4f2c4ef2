//! Code for working with years.
use crate::input::is_sorted_and_unique;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;

/// Parse a string describing a selection of model years.
///
/// The string can be "all" (case-insensitive), a single year, an inclusive range (e.g. "2..4") or a
/// semicolon-separated list of years and ranges (e.g. "1;3..5").
///
/// # Arguments
///
/// - `s` - Input string to parse
/// - `num_years` - The number of years in the model horizon; valid years are `1..=num_years`
///
/// # Returns
///
/// A sorted [`Vec`] of years or an error.
pub fn parse_year_str(s: &str, num_years: u32) -> Result<Vec<u32>> {
    let s = s.trim();
    ensure!(!s.is_empty(), "No years provided");

    if s.eq_ignore_ascii_case("all") {
        return Ok((1..=num_years).collect());
    }

    let parse_year = |s: &str| {
        let year = s.trim().parse::<u32>().ok()?;
        (1..=num_years).contains(&year).then_some(year)
    };
    let parse_item = |item: &str| -> Result<Vec<u32>> {
        if let Some((start, end)) = item.split_once("..") {
            let start = parse_year(start).with_context(|| format!("Invalid year: {start}"))?;
            let end = parse_year(end).with_context(|| format!("Invalid year: {end}"))?;
            ensure!(start <= end, "Invalid year range: {item}");
            Ok((start..=end).collect())
        } else {
            let year = parse_year(item).with_context(|| format!("Invalid year: {item}"))?;
            Ok(vec![year])
        }
    };

    let years: Vec<u32> = s
        .split(';')
        .map(parse_item)
        .flatten_ok()
        .try_collect()?;

    ensure!(
        is_sorted_and_unique(&years),
        "Years must be in order and unique"
    );

    Ok(years)
}
