//! Performance metrics extraction.
//!
//! A report is built in three phases on top of a [`VehicleModel`]:
//! 1. [`accel`]: full-demand acceleration from rest until top speed, 100 kph
//!    and the quarter mile have all been observed
//! 2. [`sweep`]: steady-speed power draw from 30 kph up to top speed
//! 3. [`cycle_eval`]: replay of the catalog's city and highway cycles

use crate::catalog::CycleCatalog;
use crate::imports::*;
use crate::params::*;
use std::fmt;

pub mod accel;
pub mod cycle_eval;
pub mod report;
pub mod sweep;
#[cfg(test)]
pub(crate) mod test_utils;

pub use accel::{AccelOutcome, AccelSample, AccelSampleHistoryVec};
pub use report::PerformanceReport;
pub use sweep::SweepOutcome;

/// Speed that `Accel100` is timed to, $kph$
pub const ACCEL_TARGET_KPH: f64 = 100.0;
/// Steady speed reported as `Cruise120`, $kph$
pub const CRUISE_KPH: u32 = 120;
/// `Accel100` value for vehicles that never reach [`ACCEL_TARGET_KPH`]
pub const TOP_SPEED_BELOW_TARGET: &str = "Top Speed < 100 kph";

/// Settings for the metrics driver
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ApproxEq)]
#[serde(default)]
pub struct PerfParams {
    /// acceleration requested every step, far above what any vehicle can deliver, $m/s^2$
    pub floor_it_accel_mps2: f64,
    /// record one acceleration sample every this many steps
    pub sample_stride: usize,
    /// top speed is declared at the first step with acceleration below this, $m/s^2$
    pub top_speed_accel_mps2: f64,
    /// step limit for the acceleration phase
    pub max_accel_steps: usize,
    /// first speed of the efficiency sweep, $kph$
    pub eff_sweep_min_kph: u32,
    /// last speed of the efficiency sweep unless top speed is lower, $kph$
    pub eff_sweep_max_kph: u32,
    pub props: PhysicalProperties,
}

impl Default for PerfParams {
    fn default() -> Self {
        Self {
            floor_it_accel_mps2: 10_000.0,
            sample_stride: 100,
            top_speed_accel_mps2: 0.01,
            max_accel_steps: 200_000,
            eff_sweep_min_kph: 30,
            eff_sweep_max_kph: 150,
            props: PhysicalProperties::default(),
        }
    }
}

impl SerdeAPI for PerfParams {
    fn init(&mut self) -> anyhow::Result<()> {
        ensure!(self.sample_stride > 0, format_dbg!(self.sample_stride));
        ensure!(self.max_accel_steps > 0, format_dbg!(self.max_accel_steps));
        ensure!(
            self.floor_it_accel_mps2 > 0.0,
            format_dbg!(self.floor_it_accel_mps2)
        );
        ensure!(
            self.top_speed_accel_mps2 > 0.0 && self.top_speed_accel_mps2.is_finite(),
            format_dbg!(self.top_speed_accel_mps2)
        );
        ensure!(
            self.eff_sweep_min_kph > 0,
            format_dbg!(self.eff_sweep_min_kph)
        );
        ensure!(
            self.eff_sweep_min_kph <= self.eff_sweep_max_kph,
            "eff_sweep_min_kph ({}) exceeds eff_sweep_max_kph ({})",
            self.eff_sweep_min_kph,
            self.eff_sweep_max_kph
        );
        self.props.init()
    }
}

/// Failure to produce a report
#[derive(Debug)]
pub enum PerformanceError {
    /// the vehicle model rejected a command
    Simulation(anyhow::Error),
    /// acceleration never settled below the top-speed threshold, or the
    /// quarter mile was never covered, within the step limit
    AccelNotConverged {
        steps: usize,
        speed_kph: f64,
        dist_m: f64,
    },
}

impl fmt::Display for PerformanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulation(err) => write!(f, "simulation failed: {err:#}"),
            Self::AccelNotConverged {
                steps,
                speed_kph,
                dist_m,
            } => write!(
                f,
                "acceleration did not converge within {steps} steps \
                 (reached {speed_kph:.1} kph after {dist_m:.1} m)"
            ),
        }
    }
}

impl std::error::Error for PerformanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Simulation(err) => Some(err.as_ref()),
            Self::AccelNotConverged { .. } => None,
        }
    }
}

impl From<anyhow::Error> for PerformanceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Simulation(err)
    }
}

/// Run all three phases for one vehicle and assemble the report.
///
/// The acceleration phase and the efficiency sweep share one simulation
/// instance; each cycle replay gets its own. Cycle infeasibility is reported
/// inside the report, any other failure aborts.
pub fn simulate_performance<M>(
    model: &M,
    catalog: &CycleCatalog,
    params: &PerfParams,
) -> Result<PerformanceReport, PerformanceError>
where
    M: VehicleModel + Sync,
{
    let mut sim = model.init_simulation()?;
    let accel = accel::run_accel_phase(&mut sim, params)?;
    let sweep = sweep::run_eff_sweep(&mut sim, accel.top_speed_mps, params)?;
    let cycles = cycle_eval::evaluate_cycles(model, catalog, &params.props);
    Ok(PerformanceReport::assemble(accel, sweep, cycles))
}

/// `"{secs:.2}s"`
pub(crate) fn fmt_secs(time_s: f64) -> String {
    format!("{time_s:.2}s")
}

/// `"{l:.2} L/100km equivalent"`
pub(crate) fn fmt_l_per_100km(l_per_100km: f64) -> String {
    format!("{l_per_100km:.2} L/100km equivalent")
}

pub(crate) fn accel_target_mps() -> f64 {
    ACCEL_TARGET_KPH / KPH_PER_MPS
}
