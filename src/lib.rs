//! Multi-year production planning.
//!
//! Resource capacities are projected over a horizon of years, taking account of growth and of
//! scheduled capital investments, and the most profitable product mix is then found for each year.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod bound;
pub mod cli;
pub mod id;
pub mod input;
pub mod investment;
pub mod log;
pub mod model;
pub mod output;
pub mod product;
pub mod resource;
pub mod settings;
pub mod simulation;
pub mod year;

#[cfg(test)]
mod fixture;

/// Get the config folder for the program.
///
/// This will be somewhere like `~/.config/prodplan` on Linux.
pub fn get_prodplan_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config dir on this platform: fall back to the current folder
        return PathBuf::from(".prodplan");
    };
    config_dir.push("prodplan");

    config_dir
}
