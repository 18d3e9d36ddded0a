//! Scripted vehicle model for exercising the metrics driver without physics.

use super::*;
use crate::cycle::DriveCycle;
use crate::simdrive::{CycleEnergy, VehicleState};

const DT_S: f64 = 0.01;
const MASS_KG: f64 = 1500.0;

/// Accelerates at a constant rate until it reaches exactly `top_kph`, then holds.
#[derive(Clone, Debug)]
pub struct ScriptedModel {
    top_speed_mps: f64,
    accel_mps2: f64,
    cycle_errors: Vec<(String, String)>,
}

impl ScriptedModel {
    pub fn new(top_kph: f64, accel_mps2: f64) -> Self {
        Self {
            top_speed_mps: top_kph / KPH_PER_MPS,
            accel_mps2,
            cycle_errors: Vec::new(),
        }
    }

    /// Make replay of the cycle named `cycle_name` fail with `msg`
    pub fn with_cycle_error(mut self, cycle_name: &str, msg: &str) -> Self {
        self.cycle_errors
            .push((cycle_name.to_string(), msg.to_string()));
        self
    }

    /// Power draw at steady `speed_mps`, $W$
    pub fn steady_pwr_w(&self, speed_mps: f64) -> f64 {
        500.0 + 150.0 * speed_mps + 0.35 * speed_mps.powi(3)
    }

    /// States after each of the first `steps` full-demand ticks
    pub fn trajectory(&self, steps: usize) -> Vec<VehicleState> {
        let mut sim = ScriptedSim {
            model: self.clone(),
            state: VehicleState::default(),
        };
        (0..steps)
            .map(|_| {
                sim.tick(f64::MAX).unwrap();
                sim.state.clone()
            })
            .collect()
    }
}

pub struct ScriptedSim {
    model: ScriptedModel,
    state: VehicleState,
}

impl SimulateVehicle for ScriptedSim {
    fn state(&self) -> &VehicleState {
        &self.state
    }

    fn tick(&mut self, accel_demand_mps2: f64) -> anyhow::Result<()> {
        let mps_start = self.state.speed_mps;
        let accel_mps2 = min(accel_demand_mps2, self.model.accel_mps2);
        let mps_end = min(mps_start + accel_mps2 * DT_S, self.model.top_speed_mps);
        let mps_avg = 0.5 * (mps_start + mps_end);
        self.state.accel_mps2 = (mps_end - mps_start) / DT_S;
        self.state.pwr_w =
            self.model.steady_pwr_w(mps_avg) + MASS_KG * self.state.accel_mps2 * mps_avg;
        self.state.dist_m += mps_avg * DT_S;
        self.state.speed_mps = mps_end;
        self.state.time_s += DT_S;
        self.state.i += 1;
        Ok(())
    }

    fn settle(&mut self) -> anyhow::Result<()> {
        self.state.accel_mps2 = 0.0;
        self.state.pwr_w = self.model.steady_pwr_w(self.state.speed_mps);
        Ok(())
    }

    fn set_speed(&mut self, speed_mps: f64) {
        self.state.speed_mps = speed_mps;
    }
}

impl VehicleModel for ScriptedModel {
    type Sim = ScriptedSim;

    fn init_simulation(&self) -> anyhow::Result<ScriptedSim> {
        Ok(ScriptedSim {
            model: self.clone(),
            state: VehicleState::default(),
        })
    }

    fn run_cycle(&self, cyc: &DriveCycle) -> anyhow::Result<CycleEnergy> {
        if let Some((_, msg)) = self.cycle_errors.iter().find(|(name, _)| *name == cyc.name) {
            bail!("{msg}");
        }
        let energy_j: f64 = (1..cyc.len())
            .map(|i| self.steady_pwr_w(cyc.mps[i]) * cyc.dt_s_at_i(i))
            .sum();
        Ok(CycleEnergy {
            energy_j,
            dist_m: cyc.dist_total_m(),
        })
    }
}

/// Catalog of two copies of [`DriveCycle::test_cyc`]
pub fn test_catalog() -> CycleCatalog {
    let mut city = DriveCycle::test_cyc();
    city.name = String::from("city");
    let mut highway = DriveCycle::test_cyc();
    highway.name = String::from("highway");
    CycleCatalog { city, highway }
}

/// Parse `"12.34s"` back into seconds
pub fn parse_secs(formatted: &str) -> f64 {
    formatted.trim_end_matches('s').parse().unwrap()
}
