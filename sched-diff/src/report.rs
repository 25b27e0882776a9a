// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Print the outcome of a comparison.

use anyhow::Result;
use comfy_table::Table;
use serde::Serialize;
use serde::ser::Serializer;
use std::path::Path;
use std::time::Duration;

use crate::args::ReportFormat;
use crate::call_scheduler::SchedulerRun;
use crate::diff_runner::Comparison;
use crate::summary_parser::SchedulerStatistics;
use crate::util::{info_operation, warning};

#[derive(Serialize)]
struct JsonRun<'a> {
    mode: String,
    command: &'a str,
    summary: &'a str,
    #[serde(rename = "runtime_ms", serialize_with = "as_millis")]
    runtime: Duration,
    statistics: &'a SchedulerStatistics,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    workload: &'a Path,
    seed: Option<u64>,
    baseline: JsonRun<'a>,
    candidate: JsonRun<'a>,
    diverged: bool,
}

fn as_millis<S: Serializer>(runtime: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(runtime.as_millis().try_into().unwrap_or(u64::MAX))
}

impl<'a> From<&'a SchedulerRun> for JsonRun<'a> {
    fn from(run: &'a SchedulerRun) -> Self {
        JsonRun {
            mode: run.mode.to_string(),
            command: &run.command,
            summary: &run.summary,
            runtime: run.runtime,
            statistics: &run.statistics,
        }
    }
}

/// Render the comparison as a JSON document.
pub(crate) fn to_json(comparison: &Comparison) -> Result<String> {
    let report = JsonReport {
        workload: &comparison.workload,
        seed: comparison.seed,
        baseline: (&comparison.baseline).into(),
        candidate: (&comparison.candidate).into(),
        diverged: comparison.diverged(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Print both summaries. Quiet mode suppresses everything except requested JSON.
pub(crate) fn print_report(
    comparison: &Comparison,
    format: ReportFormat,
    with_statistics: bool,
    quiet: bool,
) -> Result<()> {
    match format {
        ReportFormat::Json => println!("{}", to_json(comparison)?),
        ReportFormat::Pretty if quiet => {}
        ReportFormat::Pretty => {
            for run in [&comparison.baseline, &comparison.candidate] {
                info_operation(&format!("{}:", run.mode), &run.summary);
            }
            if with_statistics {
                if comparison.baseline.statistics.is_empty()
                    && comparison.candidate.statistics.is_empty()
                {
                    warning("no statistics lines found in the scheduler output");
                } else {
                    println!("{}", statistics_table(comparison));
                }
            }
            if comparison.diverged() {
                warning(&format!(
                    "summaries differ between modes {} and {}",
                    comparison.baseline.mode, comparison.candidate.mode
                ));
            } else {
                println!("Summaries match.");
            }
        }
    }
    Ok(())
}

/// Set some defaults for how we format tables
fn table_new() -> Table {
    use comfy_table::*;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
        .load_preset(comfy_table::presets::NOTHING)
        .set_style(TableComponent::BottomBorder, '=')
        .set_style(TableComponent::BottomBorderIntersections, '=')
        .set_style(TableComponent::TopBorder, '=')
        .set_style(TableComponent::TopBorderIntersections, '=')
        .set_style(TableComponent::HeaderLines, '-')
        .set_style(TableComponent::MiddleHeaderIntersections, '+')
        .set_style(TableComponent::VerticalLines, '|');
    table
}

/// The rows of the statistics table for one run, in display order.
fn statistics_column(stats: &SchedulerStatistics) -> [String; 7] {
    fn show<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    }
    [
        show(stats.throughput.map(|t| t.average)),
        show(stats.throughput.map(|t| t.min)),
        show(stats.throughput.map(|t| t.max)),
        show(stats.turnaround),
        show(stats.overhead.map(|o| format!("{:.2}", o.max))),
        show(stats.overhead.map(|o| format!("{:.2}", o.average))),
        show(stats.makespan),
    ]
}

pub(crate) fn statistics_table(comparison: &Comparison) -> Table {
    use comfy_table::*;

    const LABELS: [&str; 7] = [
        "Throughput (avg)",
        "Throughput (min)",
        "Throughput (max)",
        "Turnaround time",
        "Time overhead (max)",
        "Time overhead (avg)",
        "Makespan",
    ];

    let mut table = table_new();
    table.set_header(vec![
        "Statistic".to_string(),
        comparison.baseline.mode.to_string(),
        comparison.candidate.mode.to_string(),
    ]);
    let baseline = statistics_column(&comparison.baseline.statistics);
    let candidate = statistics_column(&comparison.candidate.statistics);
    for ((label, b), c) in LABELS.iter().zip(baseline).zip(candidate) {
        table.add_row(vec![label.to_string(), b, c]);
    }
    for idx in 1..3 {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::MemoryMode;
    use crate::summary_parser::{Overhead, Throughput};
    use std::path::PathBuf;

    fn run(mode: MemoryMode, summary: &str, statistics: SchedulerStatistics) -> SchedulerRun {
        SchedulerRun {
            mode,
            command: format!("./scheduler -f w.txt -a rr -s 100 -m {mode} -q 10"),
            summary: summary.to_string(),
            statistics,
            runtime: Duration::from_millis(12),
        }
    }

    fn comparison(a: &str, b: &str) -> Comparison {
        let stats = SchedulerStatistics {
            throughput: Some(Throughput { average: 2, min: 1, max: 3 }),
            turnaround: Some(62),
            overhead: Some(Overhead { max: 2.93, average: 1.84 }),
            makespan: Some(145),
        };
        Comparison {
            workload: PathBuf::from("benchmark-cm.txt"),
            seed: Some(42),
            baseline: run(MemoryMode::V, a, stats),
            candidate: run(MemoryMode::Cm, b, SchedulerStatistics::default()),
        }
    }

    #[test]
    fn check_json_report() {
        let json = to_json(&comparison("overheadA", "overheadB")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["workload"], "benchmark-cm.txt");
        assert_eq!(value["seed"], 42);
        assert_eq!(value["baseline"]["mode"], "v");
        assert_eq!(value["baseline"]["summary"], "overheadA");
        assert_eq!(value["baseline"]["runtime_ms"], 12);
        assert_eq!(value["baseline"]["statistics"]["makespan"], 145);
        assert_eq!(value["candidate"]["mode"], "cm");
        assert_eq!(value["candidate"]["statistics"]["makespan"], serde_json::Value::Null);
        assert_eq!(value["diverged"], true);
    }

    #[test]
    fn check_statistics_table() {
        let rendered = statistics_table(&comparison("x", "x")).to_string();
        assert!(rendered.contains("Makespan"), "{rendered}");
        assert!(rendered.contains("145"), "{rendered}");
        assert!(rendered.contains("2.93"), "{rendered}");
        assert!(rendered.contains('-'), "{rendered}");
    }
}
