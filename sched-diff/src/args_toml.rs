// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Default flags read from a `sched-diff.toml` file.
//!
//! The file holds one table per subcommand:
//!
//! ```toml
//! [compare]
//! scheduler = "../build/scheduler"
//! quantum = 5
//! strict = true
//! ```
//!
//! The entries of the table matching the invoked subcommand are turned into flags and inserted
//! right after the subcommand name, so flags given on the command line take precedence.

use crate::args::SchedDiffCommand;
use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use toml::Table;
use toml::Value;
use tracing::debug;

/// Config file picked up from the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "sched-diff.toml";

/// Merge the flags from the config file (if any) into the command line arguments.
pub fn join_args(input_args: Vec<OsString>) -> Result<Vec<OsString>> {
    let Some(position) = subcommand_position(&input_args) else {
        return Ok(input_args);
    };
    let config_path = match explicit_config(&input_args) {
        // A missing explicit file is reported by argument validation.
        Some(path) if !path.is_file() => return Ok(input_args),
        Some(path) => path,
        None if Path::new(CONFIG_FILE).is_file() => PathBuf::from(CONFIG_FILE),
        None => return Ok(input_args),
    };
    let subcommand = input_args[position].to_string_lossy().into_owned();
    let file = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file `{}`", config_path.display()))?;
    let config_args = toml_to_args(&file, &subcommand)
        .with_context(|| format!("Invalid config file `{}`", config_path.display()))?;
    debug!(config = %config_path.display(), ?config_args, "join_args");

    let mut args = input_args;
    let tail = args.split_off(position + 1);
    args.extend(config_args);
    args.extend(tail);
    Ok(args)
}

/// Index of the subcommand name, skipping the value of `--config`.
fn subcommand_position(args: &[OsString]) -> Option<usize> {
    let mut skip_next = false;
    for (idx, arg) in args.iter().enumerate().skip(1) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--config" {
            skip_next = true;
        } else if SchedDiffCommand::NAMES.iter().any(|name| arg == name) {
            return Some(idx);
        }
    }
    None
}

/// The value of `--config PATH` or `--config=PATH`, if present.
fn explicit_config(args: &[OsString]) -> Option<PathBuf> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            return iter.next().map(PathBuf::from);
        }
        if let Some(path) = arg.to_str().and_then(|a| a.strip_prefix("--config=")) {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// Parse a config toml string and extract the arguments for `subcommand`.
fn toml_to_args(tomldata: &str, subcommand: &str) -> Result<Vec<OsString>> {
    let config: Table = toml::from_str(tomldata)?;
    let mut args = Vec::new();
    let Some(value) = config.get(subcommand) else {
        return Ok(args);
    };
    let Some(table) = value.as_table() else {
        bail!("`{subcommand}` must be a table");
    };
    // Produce a stable ordering of flags for a given input.
    let mut entries: Vec<(&String, &Value)> = table.iter().collect();
    entries.sort_by_key(|(flag, _)| *flag);
    for (flag, value) in entries {
        insert_arg_from_toml(flag, value, &mut args)?;
    }
    Ok(args)
}

/// Translates one toml entry (flag, value) into arguments and inserts it into `args`
fn insert_arg_from_toml(flag: &str, value: &Value, args: &mut Vec<OsString>) -> Result<()> {
    match value {
        // Every boolean flag is off by default, so `false` needs no flag at all.
        Value::Boolean(b) => {
            if *b {
                args.push(format!("--{flag}").into());
            }
        }
        Value::Array(a) => {
            for arg in a {
                args.push(format!("--{flag}").into());
                args.push(scalar(flag, arg)?);
            }
        }
        Value::String(_) | Value::Integer(_) => {
            args.push(format!("--{flag}").into());
            args.push(scalar(flag, value)?);
        }
        _ => {
            bail!("Unknown key type {flag}");
        }
    }
    Ok(())
}

fn scalar(flag: &str, value: &Value) -> Result<OsString> {
    match value {
        Value::String(s) => Ok(s.into()),
        Value::Integer(i) => Ok(i.to_string().into()),
        _ => bail!("flag {flag} contains non-scalar values"),
    }
}
