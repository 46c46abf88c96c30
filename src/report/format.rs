//! Formatted terminal output for inversion runs.
//!
//! We keep formatting code in one place so:
//! - the engine stays free of presentation concerns
//! - output changes are localized

use chrono::Local;

use crate::domain::NamedTerm;
use crate::inversion::Inversion;
use crate::report::residual_stats;

/// Format the run summary (dimensions, solve path, residuals, warnings).
pub fn format_run_summary(inversion: &Inversion) -> String {
    let data = &inversion.data;
    let diag = &inversion.diagnostics;
    let mut out = String::new();

    out.push_str("=== dt - Delay-Time Inversion ===\n");
    out.push_str(&format!("Created on {}\n", Local::now().format("%b %d, %Y %H:%M")));
    out.push_str(&format!(
        "Observations: k={} | stations: n={} | events: m={}\n",
        data.n_observations(),
        data.n_stations(),
        data.n_events(),
    ));
    out.push_str(&format!(
        "Solve: {} | rank={}/{} | cond={}\n",
        diag.method.display_name(),
        diag.rank,
        data.n_stations() + data.n_events(),
        fmt_cond(diag.condition_number),
    ));

    if let Some(stats) = residual_stats(&inversion.fitted_observations()) {
        out.push_str(&format!(
            "Residuals: mean={:.4} rms={:.4} max|r|={:.4}\n",
            stats.mean, stats.rms, stats.max_abs
        ));
    }

    if !diag.unobserved_stations.is_empty() {
        let names: Vec<&str> = diag
            .unobserved_stations
            .iter()
            .map(|&i| data.stations[i].as_str())
            .collect();
        out.push_str(&format!("Unobserved stations: {}\n", names.join(", ")));
    }
    if !diag.unobserved_events.is_empty() {
        out.push_str(&format!("Unobserved events: {}\n", diag.unobserved_events.len()));
    }

    out
}

/// Format a term table. `top = 0` prints every row.
pub fn format_terms_table(title: &str, terms: &[NamedTerm], top: usize) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push_str(":\n");

    out.push_str(format!("{:>6} {:<28} {:>12} {:>6}\n", "index", "name", "delay", "n_obs").trim_end());
    out.push('\n');
    out.push_str(format!("{:->6} {:-<28} {:->12} {:->6}\n", "", "", "", "").trim_end());
    out.push('\n');

    let shown = if top == 0 { terms.len() } else { top.min(terms.len()) };
    for t in &terms[..shown] {
        out.push_str(
            format!(
                "{:>6} {:<28} {:>12.4} {:>6}\n",
                t.index,
                truncate(&t.name, 28),
                t.delay,
                t.n_obs
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if shown < terms.len() {
        out.push_str(&format!("  ... {} more\n", terms.len() - shown));
    }

    out
}

fn fmt_cond(c: f64) -> String {
    if c.is_finite() { format!("{c:.3e}") } else { "inf".to_string() }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
