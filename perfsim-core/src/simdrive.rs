//! Module containing the road-load vehicle model used for free acceleration,
//! steady-speed evaluation and drive cycle replay.

use crate::cycle::DriveCycle;
use crate::imports::*;
use crate::params::*;
use crate::vehicle::Vehicle;

/// Struct containing time step and trace tolerance settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ApproxEq)]
#[serde(default)]
pub struct SimParams {
    /// free-acceleration time step, $s$
    pub dt_s: f64,
    /// largest shortfall from the trace speed tolerated during cycle replay, $m/s$
    pub trace_miss_speed_mps_tol: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            dt_s: 0.01,
            trace_miss_speed_mps_tol: 1.0,
        }
    }
}

impl SerdeAPI for SimParams {
    fn init(&mut self) -> anyhow::Result<()> {
        ensure!(
            self.dt_s > 0.0 && self.dt_s.is_finite(),
            format_dbg!(self.dt_s)
        );
        ensure!(
            self.trace_miss_speed_mps_tol >= 0.0,
            format_dbg!(self.trace_miss_speed_mps_tol)
        );
        Ok(())
    }
}

/// Observable state of a simulation instance
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ApproxEq)]
pub struct VehicleState {
    /// number of time steps taken
    pub i: usize,
    /// elapsed time, $s$
    pub time_s: f64,
    /// speed, $m/s$
    pub speed_mps: f64,
    /// acceleration over the last step, $m/s^2$
    pub accel_mps2: f64,
    /// distance traveled, $m$
    pub dist_m: f64,
    /// electrical power draw including accessories, $W$; negative while regenerating
    pub pwr_w: f64,
}

/// Aggregate energy use from a drive cycle replay
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ApproxEq)]
pub struct CycleEnergy {
    /// net electrical energy, $J$
    pub energy_j: f64,
    /// distance actually covered, $m$
    pub dist_m: f64,
}

impl CycleEnergy {
    /// Energy per unit distance, $J/m$
    pub fn j_per_m(&self) -> f64 {
        self.energy_j / self.dist_m
    }
}

/// Resistive force from drag, rolling resistance and grade at `speed_mps`, $N$
pub fn road_load_n(veh: &Vehicle, speed_mps: f64, grade: f64) -> f64 {
    let drag_n = 0.5
        * veh.props.air_density_kg_per_m3
        * veh.drag_coef
        * veh.frontal_area_m2
        * speed_mps.powi(2);
    let rr_n = veh.mass_kg * veh.props.a_grav_mps2 * veh.wheel_rr_coef * grade.atan().cos();
    let ascent_n = veh.mass_kg * veh.props.a_grav_mps2 * grade.atan().sin();
    drag_n + rr_n + ascent_n
}

/// Largest acceleration available at `speed_mps`, limited by traction at low
/// speed and by peak power above that, $m/s^2$
pub fn max_accel_mps2(veh: &Vehicle, speed_mps: f64, grade: f64) -> f64 {
    let trac_n = veh.mass_kg * veh.max_trac_mps2;
    let avail_n = if speed_mps > 0.0 {
        min(trac_n, veh.max_pwr_w() * veh.trans_eff / speed_mps)
    } else {
        trac_n
    };
    (avail_n - road_load_n(veh, speed_mps, grade)) / veh.mass_kg
}

/// Electrical power drawn while going from `mps_start` to `mps_end` over `dt_s`, $W$
///
/// Wheel power follows the step-average form of the road-load equations:
/// kinetic energy change over the step plus road load at the average speed.
/// Positive wheel power is divided through the driveline and motor
/// efficiencies. Negative wheel power is recovered up to `max_regen`.
pub fn pwr_draw_w(veh: &Vehicle, mps_start: f64, mps_end: f64, dt_s: f64, grade: f64) -> f64 {
    let mps_avg = 0.5 * (mps_start + mps_end);
    let accel_w = if dt_s > 0.0 {
        veh.mass_kg / (2.0 * dt_s) * (mps_end.powi(2) - mps_start.powi(2))
    } else {
        0.0
    };
    let whl_w = accel_w + road_load_n(veh, mps_avg, grade) * mps_avg;
    let motor_w = if whl_w >= 0.0 {
        let mech_w = whl_w / veh.trans_eff;
        mech_w / veh.motor_eff(mech_w)
    } else {
        let mech_w = whl_w * veh.trans_eff * veh.max_regen;
        mech_w * veh.motor_eff(mech_w)
    };
    motor_w + veh.aux_kw * 1e3
}

/// Steppable simulation of one vehicle on level ground
#[derive(Clone, Debug, PartialEq)]
pub struct SimDrive {
    pub veh: Vehicle,
    pub sim_params: SimParams,
    state: VehicleState,
}

impl SimDrive {
    pub fn new(veh: Vehicle, sim_params: SimParams) -> Self {
        Self {
            veh,
            sim_params,
            state: VehicleState::default(),
        }
    }
}

impl SimulateVehicle for SimDrive {
    fn state(&self) -> &VehicleState {
        &self.state
    }

    fn tick(&mut self, accel_demand_mps2: f64) -> anyhow::Result<()> {
        ensure!(
            accel_demand_mps2.is_finite(),
            format_dbg!(accel_demand_mps2)
        );
        let dt_s = self.sim_params.dt_s;
        let mps_start = self.state.speed_mps;
        let mut accel_mps2 = min(accel_demand_mps2, max_accel_mps2(&self.veh, mps_start, 0.0));
        let mut mps_end = mps_start + accel_mps2 * dt_s;
        if let Some(max_mps) = self.veh.max_speed_mps() {
            // land on the governed speed exactly
            if mps_end > max_mps {
                accel_mps2 = (max_mps - mps_start) / dt_s;
                mps_end = max_mps;
            }
        }
        if mps_end < 0.0 {
            accel_mps2 = -mps_start / dt_s;
            mps_end = 0.0;
        }

        self.state.pwr_w = pwr_draw_w(&self.veh, mps_start, mps_end, dt_s, 0.0);
        self.state.dist_m += 0.5 * (mps_start + mps_end) * dt_s;
        self.state.time_s += dt_s;
        self.state.speed_mps = mps_end;
        self.state.accel_mps2 = accel_mps2;
        self.state.i += 1;
        Ok(())
    }

    fn settle(&mut self) -> anyhow::Result<()> {
        let speed_mps = self.state.speed_mps;
        ensure!(speed_mps.is_finite(), format_dbg!(speed_mps));
        self.state.accel_mps2 = 0.0;
        self.state.pwr_w = pwr_draw_w(&self.veh, speed_mps, speed_mps, 0.0, 0.0);
        Ok(())
    }

    fn set_speed(&mut self, speed_mps: f64) {
        self.state.speed_mps = max(speed_mps, 0.0);
    }
}

/// [`VehicleModel`] backed by [`SimDrive`]
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsModel {
    pub veh: Vehicle,
    pub sim_params: SimParams,
}

impl PhysicsModel {
    pub fn new(veh: Vehicle, sim_params: SimParams) -> Self {
        Self { veh, sim_params }
    }
}

impl VehicleModel for PhysicsModel {
    type Sim = SimDrive;

    fn init_simulation(&self) -> anyhow::Result<SimDrive> {
        let mut sim_params = self.sim_params.clone();
        sim_params.init()?;
        Ok(SimDrive::new(self.veh.clone(), sim_params))
    }

    fn run_cycle(&self, cyc: &DriveCycle) -> anyhow::Result<CycleEnergy> {
        ensure!(
            cyc.len() >= 2 && cyc.are_fields_equal_length(),
            "cycle `{}` needs at least 2 samples with equal field lengths",
            cyc.name
        );
        let veh = &self.veh;
        let mut mps_prev = cyc.mps[0];
        let mut energy = CycleEnergy::default();

        for i in 1..cyc.len() {
            let dt_s = cyc.dt_s_at_i(i);
            let grade = cyc.grade[i];
            let accel_req_mps2 = (cyc.mps[i] - mps_prev) / dt_s;
            let accel_mps2 = min(accel_req_mps2, max_accel_mps2(veh, mps_prev, grade));
            let mut mps_ach = max(mps_prev + accel_mps2 * dt_s, 0.0);
            if let Some(max_mps) = veh.max_speed_mps() {
                mps_ach = min(mps_ach, max_mps);
            }

            let trace_miss_mps = cyc.mps[i] - mps_ach;
            if trace_miss_mps > self.sim_params.trace_miss_speed_mps_tol {
                log_warn!(
                    "trace miss speed {:.5} m/s exceeds tolerance of {:.5} m/s",
                    trace_miss_mps,
                    self.sim_params.trace_miss_speed_mps_tol
                );
                bail!(
                    "vehicle cannot follow {} cycle: reached {:.1} kph at t={:.1}s, trace requires {:.1} kph",
                    cyc.name,
                    mps_ach * KPH_PER_MPS,
                    cyc.time_s[i],
                    cyc.mps[i] * KPH_PER_MPS
                );
            }

            energy.energy_j += pwr_draw_w(veh, mps_prev, mps_ach, dt_s, grade) * dt_s;
            energy.dist_m += 0.5 * (mps_prev + mps_ach) * dt_s;
            mps_prev = mps_ach;
        }

        ensure!(
            energy.dist_m > 0.0,
            "cycle `{}` covers no distance",
            cyc.name
        );
        log_debug!(
            "{} cycle: {:.0} J over {:.0} m",
            cyc.name,
            energy.energy_j,
            energy.dist_m
        );
        Ok(energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_model() -> PhysicsModel {
        PhysicsModel::new(Vehicle::mock_vehicle(), SimParams::default())
    }

    #[test]
    fn test_tick_from_rest_is_traction_limited() {
        let model = mock_model();
        let mut sd = model.init_simulation().unwrap();
        sd.tick(10_000.0).unwrap();
        let state = sd.state();
        assert_eq!(state.i, 1);
        assert!(state.time_s.approx_eq(&0.01, 1e-12));
        assert!(state.accel_mps2 > 0.0);
        assert!(state.accel_mps2 < model.veh.max_trac_mps2);
        assert!(state.pwr_w > 0.0);
    }

    #[test]
    fn test_tick_honors_small_demand() {
        let mut sd = mock_model().init_simulation().unwrap();
        sd.tick(1.0).unwrap();
        assert!(sd.state().accel_mps2.approx_eq(&1.0, 1e-12));
        assert!(sd.state().speed_mps.approx_eq(&0.01, 1e-12));
    }

    #[test]
    fn test_speed_never_goes_negative() {
        let mut sd = mock_model().init_simulation().unwrap();
        sd.tick(-5.0).unwrap();
        assert_eq!(sd.state().speed_mps, 0.0);
        assert_eq!(sd.state().dist_m, 0.0);
    }

    #[test]
    fn test_governor_caps_speed() {
        let mut sd = mock_model().init_simulation().unwrap();
        let max_mps = sd.veh.max_speed_mps().unwrap();
        sd.set_speed(max_mps - 0.001);
        sd.tick(10_000.0).unwrap();
        assert_eq!(sd.state().speed_mps, max_mps);
        sd.tick(10_000.0).unwrap();
        assert_eq!(sd.state().speed_mps, max_mps);
        assert_eq!(sd.state().accel_mps2, 0.0);
    }

    #[test]
    fn test_settle_keeps_time_and_distance() {
        let mut sd = mock_model().init_simulation().unwrap();
        for _ in 0..50 {
            sd.tick(10_000.0).unwrap();
        }
        let before = sd.state().clone();
        sd.set_speed(100.0 / KPH_PER_MPS);
        sd.settle().unwrap();
        let after = sd.state();
        assert_eq!(after.time_s, before.time_s);
        assert_eq!(after.dist_m, before.dist_m);
        assert_eq!(after.accel_mps2, 0.0);
        assert!(after.pwr_w > sd.veh.aux_kw * 1e3);
    }

    #[test]
    fn test_settled_power_matches_road_load() {
        let mut sd = mock_model().init_simulation().unwrap();
        let speed_mps = 120.0 / KPH_PER_MPS;
        sd.set_speed(speed_mps);
        sd.settle().unwrap();
        let whl_w = road_load_n(&sd.veh, speed_mps, 0.0) * speed_mps;
        let mech_w = whl_w / sd.veh.trans_eff;
        let expected = mech_w / sd.veh.motor_eff(mech_w) + sd.veh.aux_kw * 1e3;
        assert!(sd.state().pwr_w.approx_eq(&expected, 1e-12));
    }

    #[test]
    fn test_run_cycle_feasible() {
        let energy = mock_model().run_cycle(&DriveCycle::test_cyc()).unwrap();
        assert!(energy.dist_m.approx_eq(&40.5, 1e-9));
        assert!(energy.j_per_m() > 0.0);
    }

    #[test]
    fn test_run_cycle_reports_trace_miss() {
        let cyc = DriveCycle {
            time_s: array![0.0, 1.0, 2.0],
            mps: array![0.0, 30.0, 30.0],
            grade: Array::zeros(3),
            name: String::from("launch"),
        };
        let err = mock_model().run_cycle(&cyc).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cannot follow launch cycle"), "{msg}");
    }

    #[test]
    fn test_regen_recovers_energy_while_braking() {
        let veh = Vehicle::mock_vehicle();
        let pwr_w = pwr_draw_w(&veh, 20.0, 18.0, 1.0, 0.0);
        assert!(pwr_w < 0.0);
    }
}
