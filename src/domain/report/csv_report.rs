use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::report::path_result::{PathResult, PlanningReport};
use crate::domain::routing::computed_path::ComputedPath;
use crate::error::Result;

/// Column order of the result export.
pub fn headers() -> Vec<&'static str> {
    vec!["RequestId", "Source", "Destination", "Status", "N", "M", "FreqStart", "FreqStop", "Path", "ReversedPath", "Reason"]
}

fn path_column(path: &Option<ComputedPath>) -> String {
    match path {
        Some(path) => path.elements.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(" | "),
        None => "NA".to_string(),
    }
}

fn row(result: &PathResult) -> Vec<String> {
    let (n, m, freq_start, freq_stop) = match &result.assignment {
        Some(assignment) => {
            (assignment.n.to_string(), assignment.m.to_string(), assignment.freq_start.to_string(), assignment.freq_stop.to_string())
        }
        None => ("NA".to_string(), "NA".to_string(), "NA".to_string(), "NA".to_string()),
    };

    vec![
        result.request_id.to_string(),
        result.source.to_string(),
        result.destination.to_string(),
        result.status().to_string(),
        n,
        m,
        freq_start,
        freq_stop,
        path_column(&result.path),
        path_column(&result.reversed_path),
        result.blocking.as_ref().map(|reason| reason.to_string()).unwrap_or_default(),
    ]
}

/// Writes one `;` separated row per request result, header first.
pub fn write_results_csv<W: Write>(report: &PlanningReport, writer: W) -> Result<()> {
    let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

    csv_wtr.write_record(headers())?;
    for result in &report.results {
        csv_wtr.write_record(row(result))?;
    }

    csv_wtr.flush()?;
    Ok(())
}

pub fn write_results_csv_file<P: AsRef<Path>>(report: &PlanningReport, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_results_csv(report, file)?;

    log::info!("Planning report {} written to {}.", report.run_id, path.as_ref().display());
    Ok(())
}
