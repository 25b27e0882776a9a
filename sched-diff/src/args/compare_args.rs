// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Arguments that control how the scheduler is invoked and how its runs are compared.

use crate::args::ValidateArgs;
use crate::summary_parser::SummaryContract;
use clap::ValueEnum;
use clap::error::{Error, ErrorKind};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Scheduling algorithm selector passed to the scheduler with `-a`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// First come, first served
    Ff,
    /// Round robin
    Rr,
    /// The scheduler's customised algorithm
    Cs,
}

/// Memory management mode passed to the scheduler with `-m`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemoryMode {
    /// Unlimited memory
    U,
    /// Swapping
    P,
    /// Virtual memory
    V,
    /// Customised memory management
    Cm,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ReportFormat {
    /// Human readable summary lines
    #[default]
    Pretty,
    /// A JSON document on stdout
    Json,
}

/// Wall-clock limit for one scheduler run: `90`, `90s`, `5m` or `1h`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timeout(Duration);

impl Timeout {
    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl FromStr for Timeout {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let (digits, scale) = match value.char_indices().last() {
            Some((idx, 's')) => (&value[..idx], 1),
            Some((idx, 'm')) => (&value[..idx], 60),
            Some((idx, 'h')) => (&value[..idx], 3600),
            _ => (value, 1),
        };
        let amount: u64 =
            digits.parse().map_err(|_| format!("`{value}` is not a valid timeout"))?;
        if amount == 0 {
            return Err("timeout must be positive; use --no-timeout to disable it".to_string());
        }
        Ok(Timeout(Duration::from_secs(amount.saturating_mul(scale))))
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs())
    }
}

/// Options for the two scheduler runs. Both runs share everything except the memory mode.
#[derive(Debug, clap::Args)]
pub struct ComparisonArgs {
    /// Path of the scheduler executable. Bare names are looked up in PATH
    #[arg(long, default_value = "./scheduler")]
    pub scheduler: PathBuf,

    /// Scheduling algorithm for both runs
    #[arg(long, default_value = "rr", ignore_case = true, value_enum)]
    pub algorithm: Algorithm,

    /// Simulated memory size for both runs
    #[arg(long, default_value_t = 100)]
    pub memory_size: u32,

    /// Time quantum for both runs
    #[arg(long, default_value_t = 10)]
    pub quantum: u32,

    /// Memory mode of the first run
    #[arg(long, default_value = "v", ignore_case = true, value_enum)]
    pub baseline_mode: MemoryMode,

    /// Memory mode of the second run
    #[arg(long, default_value = "cm", ignore_case = true, value_enum)]
    pub candidate_mode: MemoryMode,

    /// Kill a scheduler run that takes longer than this
    #[arg(long, default_value = "60s", value_name = "DURATION", overrides_with = "no_timeout")]
    pub timeout: Timeout,

    /// Let scheduler runs take as long as they need
    #[arg(long, overrides_with = "timeout")]
    pub no_timeout: bool,

    /// Fail when the two summaries differ instead of only reporting it
    #[arg(long, overrides_with = "no_strict")]
    pub strict: bool,

    /// Only report a divergence (the default)
    #[arg(long, overrides_with = "strict", hide_short_help = true)]
    pub no_strict: bool,

    /// How the summary line is located in the scheduler output
    #[arg(long, default_value = "auto", ignore_case = true, value_enum)]
    pub summary_contract: SummaryContract,

    /// Toggle between different styles of output
    #[arg(long, default_value = "pretty", ignore_case = true, value_enum)]
    pub format: ReportFormat,

    /// Also print the statistics block of both runs side by side
    #[arg(long, overrides_with = "no_statistics")]
    pub statistics: bool,

    /// Do not print the statistics block (the default)
    #[arg(long, overrides_with = "statistics", hide_short_help = true)]
    pub no_statistics: bool,
}

impl ComparisonArgs {
    /// The limit for one run, if any.
    pub fn run_timeout(&self) -> Option<Duration> {
        if self.no_timeout { None } else { Some(self.timeout.duration()) }
    }
}

impl ValidateArgs for ComparisonArgs {
    fn validate(&self) -> Result<(), Error> {
        if self.baseline_mode == self.candidate_mode {
            return Err(Error::raw(
                ErrorKind::ArgumentConflict,
                format!(
                    "Conflicting options: `--baseline-mode` and `--candidate-mode` are both `{}`",
                    self.baseline_mode
                ),
            ));
        }
        if self.quantum == 0 {
            return Err(Error::raw(
                ErrorKind::ValueValidation,
                "Invalid argument: `--quantum` must be positive",
            ));
        }
        if self.memory_size == 0 {
            return Err(Error::raw(
                ErrorKind::ValueValidation,
                "Invalid argument: `--memory-size` must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_timeout_parsing() {
        let secs = |s: &str| Timeout::from_str(s).unwrap().duration().as_secs();
        assert_eq!(secs("90"), 90);
        assert_eq!(secs("90s"), 90);
        assert_eq!(secs("5m"), 300);
        assert_eq!(secs("2h"), 7200);
        assert_eq!(secs(" 3s "), 3);
        assert!(Timeout::from_str("0s").is_err());
        assert!(Timeout::from_str("s").is_err());
        assert!(Timeout::from_str("ten").is_err());
        assert!(Timeout::from_str("-1").is_err());
        assert_eq!(Timeout::from_str("1m").unwrap().to_string(), "60s");
    }

    #[test]
    fn check_mode_names() {
        assert_eq!(MemoryMode::Cm.to_string(), "cm");
        assert_eq!(MemoryMode::from_str("V", true).unwrap(), MemoryMode::V);
        assert_eq!(Algorithm::Rr.to_string(), "rr");
    }
}
