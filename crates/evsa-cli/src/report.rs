//! Solve-report rendering.
//!
//! The allocation vector is opaque counts as far as reporting is concerned;
//! these helpers only shape it for humans (aligned table with proportional
//! shares) or machines (solution JSON).

use std::io::Write;

use anyhow::anyhow;
use tabwriter::TabWriter;

use evsa_algo::AllocationSolution;
use evsa_core::Scenario;

/// Render the per-zone allocation table plus solve diagnostics.
pub fn text_report(scenario: &Scenario, solution: &AllocationSolution) -> anyhow::Result<String> {
    let total_posts: u32 = solution.allocation.iter().sum();
    let total_evs: u64 = scenario.evs_per_zone.iter().sum();

    let mut tw = TabWriter::new(vec![]);
    writeln!(tw, "Zone\tEVs\tDemand\tContinuous\tPosts\tShare")?;
    for i in 0..scenario.zones {
        let demand = scenario.evs_per_zone[i] as f64 * scenario.charge_station_proportion;
        let share = if total_posts > 0 {
            100.0 * solution.allocation[i] as f64 / total_posts as f64
        } else {
            0.0
        };
        writeln!(
            tw,
            "{}\t{}\t{:.2}\t{:.3}\t{}\t{:.1}%",
            scenario.label(i),
            scenario.evs_per_zone[i],
            demand,
            solution.continuous[i],
            solution.allocation[i],
            share
        )?;
    }
    writeln!(
        tw,
        "Total\t{}\t{:.2}\t{:.3}\t{}\t100.0%",
        total_evs,
        total_evs as f64 * scenario.charge_station_proportion,
        solution.continuous_sum,
        total_posts
    )?;
    tw.flush()?;
    let table = String::from_utf8(
        tw.into_inner()
            .map_err(|_| anyhow!("report table flush failed"))?,
    )?;

    let drift = solution.rounding_drift(scenario.budget);
    let mut out = String::new();
    out.push_str(&format!(
        "Optimal charging-station allocation ({} zones, budget {})\n\n",
        scenario.zones, scenario.budget
    ));
    out.push_str(&table);
    out.push_str(&format!(
        "\nObjective (social cost): {:.4}\n\
         Pre-rounding sum: {:.4} (drift after rounding: {:+})\n\
         Backend: {} ({} iterations, {} ms), rounding: {}\n",
        solution.objective_value,
        solution.continuous_sum,
        drift,
        solution.backend,
        solution.iterations,
        solution.solve_time_ms,
        solution.rounding
    ));
    Ok(out)
}

/// Render the solution as pretty-printed JSON.
pub fn json_report(solution: &AllocationSolution) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(solution)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evsa_algo::RoundingMode;
    use evsa_core::SquareMatrix;

    fn fixtures() -> (Scenario, AllocationSolution) {
        let scenario = Scenario {
            zones: 2,
            budget: 10.0,
            evs_per_zone: vec![100, 100],
            distances: SquareMatrix::from_rows(vec![vec![0.0, 5.0], vec![5.0, 0.0]]).unwrap(),
            congestion: SquareMatrix::from_rows(vec![vec![0.0, 0.5], vec![0.5, 0.0]]).unwrap(),
            charge_station_proportion: 0.1,
            peak_hour_proportion: 0.1,
            serving_rate: 6.0,
            lambda_coef: 0.2,
            zone_names: None,
        };
        let solution = AllocationSolution {
            allocation: vec![5, 5],
            continuous: vec![5.0, 5.0],
            continuous_sum: 10.0,
            objective_value: 1.6667,
            iterations: 12,
            solve_time_ms: 3,
            backend: "penalty-lbfgs".to_string(),
            rounding: RoundingMode::Nearest,
        };
        (scenario, solution)
    }

    #[test]
    fn test_text_report_lists_zones_and_shares() {
        let (scenario, solution) = fixtures();
        let report = text_report(&scenario, &solution).unwrap();
        assert!(report.contains("Zone 1"));
        assert!(report.contains("Zone 2"));
        assert!(report.contains("50.0%"));
        assert!(report.contains("drift after rounding: +0"));
    }

    #[test]
    fn test_text_report_uses_zone_names() {
        let (mut scenario, solution) = fixtures();
        scenario.zone_names = Some(vec!["Harbor".into(), "Uptown".into()]);
        let report = text_report(&scenario, &solution).unwrap();
        assert!(report.contains("Harbor"));
        assert!(report.contains("Uptown"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let (_, solution) = fixtures();
        let json = json_report(&solution).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["allocation"], serde_json::json!([5, 5]));
        assert_eq!(value["backend"], "penalty-lbfgs");
    }
}
