//! Station delay-log ingest.
//!
//! Turns a directory of per-station delay logs into indexed observations.
//!
//! Layout handled here:
//! - a station log is a file whose name has exactly seven `.`-separated parts
//!   (e.g. `XA.ST01.stdmean.of.stddelay.20240101.txt`); the station name is
//!   the first two parts (`XA.ST01`)
//! - an observation line has 3 or 4 whitespace-separated tokens: the event
//!   name is the first token (or the first two joined by a space when there
//!   are 4), the delay is the third token
//! - the column header line (last token `delay_times`) and any other line
//!   shape are ignored
//!
//! Design goals:
//! - **Deterministic**: files are visited in sorted name order
//! - **Row-level validation**: bad values are skipped and reported, not fatal
//! - **No solving here**: output feeds `inversion::invert`

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::inversion::{IndexAssigner, IndexedObservations};

/// Number of `.`-separated parts in a station log file name.
const STATION_FILE_PARTS: usize = 7;

/// Header token that marks the column-name line.
const HEADER_TOKEN: &str = "delay_times";

/// A line that looked like an observation but could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub file: PathBuf,
    pub line: usize,
    pub message: String,
}

/// Ingest output: indexed observations plus bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: IndexedObservations,
    pub row_errors: Vec<RowError>,
    /// Station logs read.
    pub files_read: usize,
    /// Directory entries that were not station logs.
    pub files_skipped: usize,
}

/// Directory holding the station logs for an extension tag.
pub fn stations_dir_for_ext(ext: &str) -> PathBuf {
    PathBuf::from(format!("{ext}_stations_data"))
}

/// Station name encoded in a log file name, if the name matches the layout.
pub fn station_name_from_file(file_name: &str) -> Option<String> {
    let parts: Vec<&str> = file_name.split('.').collect();
    if parts.len() != STATION_FILE_PARTS {
        return None;
    }
    Some(parts[..2].join("."))
}

/// Load every station log in `dir`.
pub fn load_station_logs(dir: &Path) -> Result<IngestedData, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::io(format!("Failed to read station directory '{}': {e}", dir.display())))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| AppError::io(format!("Failed to list station directory '{}': {e}", dir.display())))?;
        paths.push(entry.path());
    }
    paths.sort();

    let mut assigner = IndexAssigner::new();
    let mut row_errors = Vec::new();
    let mut files_read = 0usize;
    let mut files_skipped = 0usize;

    for path in paths {
        let station = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(station_name_from_file);
        let Some(station) = station.filter(|_| path.is_file()) else {
            tracing::debug!(path = %path.display(), "skipping non-station entry");
            files_skipped += 1;
            continue;
        };

        // Logs may carry Latin-1 headers; undecodable bytes become U+FFFD.
        let bytes = fs::read(&path)
            .map_err(|e| AppError::io(format!("Failed to read station log '{}': {e}", path.display())))?;
        let content = String::from_utf8_lossy(&bytes);
        let used = read_station_log(&station, &content, &path, &mut assigner, &mut row_errors);
        tracing::debug!(station = %station, observations = used, "read station log");
        files_read += 1;
    }

    for err in &row_errors {
        tracing::warn!(file = %err.file.display(), line = err.line, "{}", err.message);
    }

    Ok(IngestedData {
        observations: assigner.finish(),
        row_errors,
        files_read,
        files_skipped,
    })
}

/// Feed one station log into the assigner; returns the number of observations used.
///
/// The station is registered even when no line is usable.
pub fn read_station_log(
    station: &str,
    content: &str,
    source: &Path,
    assigner: &mut IndexAssigner,
    row_errors: &mut Vec<RowError>,
) -> usize {
    assigner.station(station);

    let mut used = 0usize;
    for (idx, line) in content.lines().enumerate() {
        match parse_line(line) {
            Ok(Some((event, value))) => {
                assigner.record(station, &event, value);
                used += 1;
            }
            Ok(None) => {}
            Err(message) => row_errors.push(RowError {
                file: source.to_path_buf(),
                line: idx + 1,
                message,
            }),
        }
    }
    used
}

fn parse_line(line: &str) -> Result<Option<(String, f64)>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if !matches!(tokens.len(), 3 | 4) || tokens.last() == Some(&HEADER_TOKEN) {
        return Ok(None);
    }

    let event = if tokens.len() == 3 {
        tokens[0].to_string()
    } else {
        format!("{} {}", tokens[0], tokens[1])
    };

    let raw = tokens[2];
    let value = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid delay value '{raw}' for event '{event}'."))?;
    if !value.is_finite() {
        return Err(format!("Non-finite delay value '{raw}' for event '{event}'."));
    }
    Ok(Some((event, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_name_uses_first_two_parts() {
        assert_eq!(
            station_name_from_file("XA.ST01.stdmean.of.stddelay.20240101.txt").as_deref(),
            Some("XA.ST01")
        );
        assert_eq!(station_name_from_file("notes.txt"), None);
        assert_eq!(station_name_from_file("a.b.c.d.e.f.g.h"), None);
    }

    #[test]
    fn line_shapes() {
        assert_eq!(parse_line("ev1.BHZ 0.12 -0.35").unwrap(), Some(("ev1.BHZ".to_string(), -0.35)));
        assert_eq!(
            parse_line("2024-01-01 12:00 0.2 0.7").unwrap(),
            Some(("2024-01-01 12:00".to_string(), 0.7))
        );
        assert_eq!(parse_line("filename,\tstd,\tdelay_times").unwrap(), None);
        assert_eq!(parse_line("Created on Jan 01, 2024 10:00").unwrap(), None);
        assert_eq!(parse_line("STD_of_std: 0.1000").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert!(parse_line("ev1 0.1 abc").is_err());
        assert!(parse_line("ev1 0.1 NaN").is_err());
    }

    #[test]
    fn loads_directory_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("XB.S2.stdmean.of.stddelay.20240101.txt"),
            "Created on Jan 01, 2024 10:00\nfilename,\tstd,\tdelay_times\nevA 0.1 1.5\nevC 0.1 2.5\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("XA.S1.stdmean.of.stddelay.20240101.txt"),
            "evA 0.1 1.0\nevB 0.1 bad\nevB 0.1 2.0\nMean_delay_times: 1.5000\n",
        )
        .unwrap();
        fs::write(dir.path().join("README.txt"), "ignored 1 2\n").unwrap();

        let data = load_station_logs(dir.path()).unwrap();
        let obs = &data.observations;

        assert_eq!(data.files_read, 2);
        assert_eq!(data.files_skipped, 1);
        assert_eq!(obs.stations, vec!["XA.S1", "XB.S2"]);
        assert_eq!(obs.events, vec!["evA", "evB", "evC"]);
        assert_eq!(obs.values(), vec![1.0, 2.0, 1.5, 2.5]);
        // evA is shared between stations.
        assert_eq!(obs.observations[0].event, obs.observations[2].event);

        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 2);
    }

    #[test]
    fn station_with_no_valid_lines_is_still_registered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("XA.EMPTY.stdmean.of.stddelay.20240101.txt"), "Created on today\n").unwrap();
        fs::write(dir.path().join("XA.FULL.stdmean.of.stddelay.20240101.txt"), "ev1 0.1 0.5\n").unwrap();

        let data = load_station_logs(dir.path()).unwrap();
        assert_eq!(data.observations.stations, vec!["XA.EMPTY", "XA.FULL"]);
        assert_eq!(data.observations.station_counts(), vec![0, 1]);
    }

    #[test]
    fn non_utf8_bytes_do_not_abort_the_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("XA.LAT1.stdmean.of.stddelay.20240101.txt"),
            b"Created on Jan 01, 2024 caf\xe9 10:00\nev1 0.1 2.0\nev2 0.1 1.\xff5\nev3 0.1 3.0\n",
        )
        .unwrap();
        fs::write(dir.path().join("XA.UTF8.stdmean.of.stddelay.20240101.txt"), "ev1 0.1 1.0\n").unwrap();

        let data = load_station_logs(dir.path()).unwrap();
        assert_eq!(data.files_read, 2);
        assert_eq!(data.observations.stations, vec!["XA.LAT1", "XA.UTF8"]);
        assert_eq!(data.observations.values(), vec![2.0, 3.0, 1.0]);

        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 3);
        assert!(data.row_errors[0].message.contains("ev2"));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let err = load_station_logs(Path::new("/definitely/not/here_stations_data")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn ext_maps_to_directory() {
        assert_eq!(stations_dir_for_ext("ttp"), PathBuf::from("ttp_stations_data"));
    }
}
