//! Full-demand acceleration from rest.

use super::*;

/// One acceleration-phase sample
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, HistoryVec)]
pub struct AccelSample {
    /// $m/s$
    pub speed_mps: f64,
    /// $W$
    pub pwr_w: f64,
    /// $m/s^2$
    pub accel_mps2: f64,
}

/// Milestones and samples from the acceleration phase
#[derive(Clone, Debug, PartialEq)]
pub struct AccelOutcome {
    pub time_to_100kph: String,
    pub quarter_mile_time: String,
    pub top_speed: String,
    pub time_to_top_speed: String,
    /// peak acceleration in g
    pub peak_accel: String,
    /// speed at which top speed was declared, $m/s$
    pub top_speed_mps: f64,
    /// number of steps taken
    pub steps: usize,
    /// highest acceleration seen during the phase, $m/s^2$
    pub peak_accel_mps2: f64,
    pub history: AccelSampleHistoryVec,
}

#[derive(Clone, Debug, Default)]
struct Milestones {
    time_to_100kph: Option<String>,
    quarter_mile_time: Option<String>,
    top_speed: Option<(f64, String, String)>,
}

/// Step `sim` at full demand until top speed, 100 kph and the quarter mile
/// have all been observed. Milestones keep the first value observed; only
/// the peak acceleration keeps updating. Samples are taken at step indices
/// 0, `sample_stride`, `2 * sample_stride`, ... until top speed is declared.
pub fn run_accel_phase<S: SimulateVehicle>(
    sim: &mut S,
    params: &PerfParams,
) -> Result<AccelOutcome, PerformanceError> {
    let accel_target_mps = accel_target_mps();
    let mut milestones = Milestones::default();
    let mut history = AccelSampleHistoryVec::new();
    let mut peak_accel_mps2 = 0.0;

    for i in 0..params.max_accel_steps {
        sim.tick(params.floor_it_accel_mps2)?;
        let state = sim.state();

        peak_accel_mps2 = max(peak_accel_mps2, state.accel_mps2);

        if state.speed_mps > accel_target_mps && milestones.time_to_100kph.is_none() {
            log_debug!("100 kph at {:.2} s", state.time_s);
            milestones.time_to_100kph = Some(fmt_secs(state.time_s));
        }

        if state.dist_m > M_PER_QUARTER_MILE && milestones.quarter_mile_time.is_none() {
            log_debug!("quarter mile at {:.2} s", state.time_s);
            milestones.quarter_mile_time = Some(fmt_secs(state.time_s));
        }

        if milestones.top_speed.is_none() {
            if i % params.sample_stride == 0 {
                history.push(AccelSample {
                    speed_mps: state.speed_mps,
                    pwr_w: state.pwr_w,
                    accel_mps2: state.accel_mps2,
                });
            }

            if state.accel_mps2 < params.top_speed_accel_mps2 {
                log_debug!(
                    "top speed {:.1} kph at {:.2} s",
                    state.speed_mps * KPH_PER_MPS,
                    state.time_s
                );
                milestones.top_speed = Some((
                    state.speed_mps,
                    format!("{:.0} kph", state.speed_mps * KPH_PER_MPS),
                    fmt_secs(state.time_s),
                ));
                // complement of the crossing check above
                if state.speed_mps <= accel_target_mps {
                    milestones.time_to_100kph = Some(TOP_SPEED_BELOW_TARGET.to_string());
                }
            }
        }

        if let Milestones {
            time_to_100kph: Some(time_to_100kph),
            quarter_mile_time: Some(quarter_mile_time),
            top_speed: Some((top_speed_mps, top_speed, time_to_top_speed)),
        } = &milestones
        {
            return Ok(AccelOutcome {
                time_to_100kph: time_to_100kph.clone(),
                quarter_mile_time: quarter_mile_time.clone(),
                top_speed: top_speed.clone(),
                time_to_top_speed: time_to_top_speed.clone(),
                peak_accel: format!("{:.2}g", peak_accel_mps2 / STANDARD_GRAVITY_MPS2),
                top_speed_mps: *top_speed_mps,
                steps: i + 1,
                peak_accel_mps2,
                history,
            });
        }
    }

    let state = sim.state();
    log_warn!(
        "acceleration did not converge within {} steps at {:.1} kph",
        params.max_accel_steps,
        state.speed_mps * KPH_PER_MPS
    );
    Err(PerformanceError::AccelNotConverged {
        steps: params.max_accel_steps,
        speed_kph: state.speed_mps * KPH_PER_MPS,
        dist_m: state.dist_m,
    })
}
