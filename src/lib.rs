#![warn(clippy::print_stdout)]

use clap::{Parser, ValueEnum};
use serde::Serialize;

pub use driver::{Driver, Error, Result};

pub use color::Color;

pub mod assumptions;
mod color;
mod driver;
mod info;
mod labeling;
pub mod logger;
pub mod partition;
pub mod proof;
pub mod simplify;
pub mod stats;
pub mod term;
pub mod theory;

/// Configuration of one interpolation run.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct TernOptions {
    /// Labeling system used to color shared variables at proof leaves.
    #[arg(short, long, value_enum)]
    pub system: Option<ItpSystem>,

    /// Use the alternative form for shared pivots when it is smaller.
    #[arg(short, long, default_value_t = false)]
    pub alternative_interpolant: bool,

    /// Check that the interpolant mentions only shared variables.
    #[arg(long, default_value_t = false)]
    pub pedantic_verification: bool,

    /// Run the rewrite-based simplifier over the final interpolant.
    #[arg(long, default_value_t = false)]
    pub simplify: bool,
}

impl Default for TernOptions {
    fn default() -> Self {
        TernOptions {
            system: None,
            alternative_interpolant: false,
            pedantic_verification: false,
            simplify: false,
        }
    }
}

impl TernOptions {
    pub fn from_system(system: ItpSystem) -> Self {
        TernOptions {
            system: Some(system),
            ..Default::default()
        }
    }
}

/// Describes the recognized labeling systems.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[clap(rename_all = "kebab_case")]
#[serde(rename_all = "kebab-case")]
pub enum ItpSystem {
    Pudlak,
    McMillan,
    McMillanPrime,
    Ps,
    Psw,
    Pss,
}

impl ItpSystem {
    /// The proof-sensitive variants need the occurrence-counting pass
    /// over the original leaves.
    pub fn needs_proof_statistics(self) -> bool {
        matches!(self, ItpSystem::Ps | ItpSystem::Psw | ItpSystem::Pss)
    }
}

impl std::fmt::Display for ItpSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ItpSystem::Pudlak => "Pudlak",
            ItpSystem::McMillan => "McMillan",
            ItpSystem::McMillanPrime => "McMillan'",
            ItpSystem::Ps => "Proof-Sensitive",
            ItpSystem::Psw => "Weak Proof-Sensitive",
            ItpSystem::Pss => "Strong Proof-Sensitive",
        };
        f.write_str(name)
    }
}
