//! Result rendering for the terminal.

use std::fmt::Write as _;

use acre_core::OptimizationResult;

/// Human-readable rendering: totals, per-field schedules, diagnostics.
pub fn render_human(result: &OptimizationResult) -> String {
    let mut out = String::new();

    writeln!(out, "{}", result.summary()).unwrap();
    writeln!(out).unwrap();

    for schedule in &result.field_schedules {
        writeln!(
            out,
            "{} ({:.0}% utilized)",
            schedule.field_name,
            schedule.utilization * 100.0
        )
        .unwrap();
        if schedule.entries.is_empty() {
            writeln!(out, "  (idle)").unwrap();
            continue;
        }
        for entry in &schedule.entries {
            writeln!(
                out,
                "  {}  {} .. {}  {:>8.1} m²  profit {:>12.2}",
                entry.crop_name,
                entry.start_date,
                entry.completion_date,
                entry.area_used,
                entry.profit
            )
            .unwrap();
        }
    }

    if !result.crop_areas.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Area by crop:").unwrap();
        for (crop_id, area) in &result.crop_areas {
            writeln!(out, "  {:<16} {:>10.1} m²", crop_id.to_string(), area).unwrap();
        }
    }

    if !result.diagnostics.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Diagnostics:").unwrap();
        for issue in &result.diagnostics.issues {
            writeln!(out, "  {}", issue).unwrap();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use acre_core::{Diagnostics, OptimizationResult, Solution};
    use std::collections::BTreeMap;

    #[test]
    fn renders_empty_result() {
        let result = OptimizationResult {
            success: true,
            solution: Solution::default(),
            total_cost: 0.0,
            total_revenue: 0.0,
            total_profit: 0.0,
            field_schedules: Vec::new(),
            crop_areas: BTreeMap::new(),
            algorithm: "none".into(),
            elapsed_ms: 3,
            is_optimal: false,
            diagnostics: {
                let mut d = Diagnostics::new();
                d.add_warning(
                    acre_core::diagnostics::codes::NO_VIABLE_CANDIDATES,
                    "no candidate completes within the planning horizon",
                );
                d
            },
        };
        let text = render_human(&result);
        assert!(text.contains("0 allocations"));
        assert!(text.contains("no_viable_candidates"));
    }
}
