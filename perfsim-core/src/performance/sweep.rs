//! Steady-speed efficiency sweep.

use super::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepOutcome {
    /// $Wh/km$ at each integer kph from `eff_sweep_min_kph` upward
    pub efficiency: Vec<f64>,
    pub cruise_120kph_eff: Option<String>,
    pub top_speed_eff: String,
}

/// Force `sim` to each integer kph from `eff_sweep_min_kph` to
/// `min(eff_sweep_max_kph, floor(top speed))`, settle, and record power over
/// speed. Finishes with the same evaluation at top speed itself.
pub fn run_eff_sweep<S: SimulateVehicle>(
    sim: &mut S,
    top_speed_mps: f64,
    params: &PerfParams,
) -> Result<SweepOutcome, PerformanceError> {
    if !(top_speed_mps > 0.0 && top_speed_mps.is_finite()) {
        return Err(PerformanceError::Simulation(anyhow!(
            "cannot evaluate efficiency at top speed {top_speed_mps} m/s"
        )));
    }
    let props = &params.props;
    // truncation toward zero, `top_speed_mps` is positive here
    let top_kph = (top_speed_mps * KPH_PER_MPS) as u32;
    let max_kph = params.eff_sweep_max_kph.min(top_kph);

    let mut outcome = SweepOutcome::default();
    for kph in params.eff_sweep_min_kph..=max_kph {
        sim.set_speed(kph as f64 / KPH_PER_MPS);
        sim.settle()?;
        let wh_per_km = sim.state().pwr_w / kph as f64;
        if kph == CRUISE_KPH {
            outcome.cruise_120kph_eff =
                Some(fmt_l_per_100km(props.l_per_100km_from_wh_per_km(wh_per_km)));
        }
        outcome.efficiency.push(wh_per_km);
    }

    sim.set_speed(top_speed_mps);
    sim.settle()?;
    let j_per_m = sim.state().pwr_w / top_speed_mps;
    outcome.top_speed_eff = fmt_l_per_100km(props.l_per_100km_from_j_per_m(j_per_m));
    log_debug!(
        "efficiency sweep: {} points up to {} kph",
        outcome.efficiency.len(),
        max_kph
    );
    Ok(outcome)
}
