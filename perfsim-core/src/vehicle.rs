//! Module containing vehicle struct and related functions.

use crate::imports::*;
use crate::params::*;
use validator::Validate;

#[derive(Default, Serialize, Deserialize, Clone, Debug, PartialEq, ApproxEq, Validate)]
/// Struct containing vehicle attributes
pub struct Vehicle {
    #[serde(skip)]
    /// Physical properties, see [PhysicalProperties](PhysicalProperties)
    pub props: PhysicalProperties,
    /// Vehicle name
    #[serde(alias = "name", default)]
    pub scenario_name: String,
    /// Curb mass, $kg$
    #[serde(alias = "vehKg")]
    #[validate(range(min = 1))]
    pub veh_kg: f64,
    /// Cargo mass including passengers, $kg$
    #[serde(alias = "cargoKg", default)]
    #[validate(range(min = 0))]
    pub cargo_kg: f64,
    /// Aerodynamic drag coefficient
    #[serde(alias = "dragCoef")]
    #[validate(range(min = 0))]
    pub drag_coef: f64,
    /// Frontal area, $m^2$
    #[serde(alias = "frontalAreaM2")]
    #[validate(range(min = 0))]
    pub frontal_area_m2: f64,
    /// Rolling resistance coefficient
    #[serde(alias = "wheelRrCoef")]
    #[validate(range(min = 0))]
    pub wheel_rr_coef: f64,
    /// Peak motor output power, $kW$
    #[serde(alias = "maxPwrKw")]
    #[validate(range(min = 0))]
    pub max_pwr_kw: f64,
    /// Motor output fractions of `max_pwr_kw` at which `eff_map` is given
    #[serde(alias = "pwrOutFrac")]
    pub pwr_out_frac: Vec<f64>,
    /// Motor efficiency at each of `pwr_out_frac`
    #[serde(alias = "effMap")]
    pub eff_map: Vec<f64>,
    /// Driveline efficiency from motor to wheels
    #[serde(alias = "transEff")]
    #[validate(range(min = 0, max = 1))]
    pub trans_eff: f64,
    /// Fraction of braking power recovered by the motor
    #[serde(alias = "maxRegen", default)]
    #[validate(range(min = 0, max = 1))]
    pub max_regen: f64,
    /// Constant accessory load, $kW$
    #[serde(alias = "auxKw", default)]
    #[validate(range(min = 0))]
    pub aux_kw: f64,
    /// Tire-road friction coefficient
    #[serde(alias = "wheelCoefOfFric")]
    #[validate(range(min = 0))]
    pub wheel_coef_of_fric: f64,
    /// Fraction of weight on the drive axle while stopped
    #[serde(alias = "driveAxleWeightFrac")]
    #[validate(range(min = 0, max = 1))]
    pub drive_axle_weight_frac: f64,
    /// Vehicle center of mass height, $m$
    /// **NOTE:** positive for FWD, negative for RWD, AWD, 4WD
    #[serde(alias = "vehCgM")]
    pub veh_cg_m: f64,
    /// Wheelbase, $m$
    #[serde(alias = "wheelBaseM")]
    #[validate(range(min = 0))]
    pub wheel_base_m: f64,
    /// Speed governor, $kph$; no limit when absent
    #[serde(alias = "maxSpeedKph", default)]
    #[validate(range(min = 0))]
    pub max_speed_kph: Option<f64>,

    // derived
    #[serde(skip)]
    pub mass_kg: f64,
    #[serde(skip)]
    pub max_trac_mps2: f64,
}

impl SerdeAPI for Vehicle {
    fn init(&mut self) -> anyhow::Result<()> {
        self.set_derived()
    }
}

impl Vehicle {
    /// Validates inputs and sets derived parameters:
    ///     - `mass_kg`
    ///     - `max_trac_mps2`
    pub fn set_derived(&mut self) -> anyhow::Result<()> {
        // Vehicle input validation
        if let Err(e) = self.validate() {
            bail!("invalid vehicle `{}`: {e}", self.scenario_name);
        }
        ensure!(
            self.trans_eff > 0.0,
            "invalid vehicle `{}`: trans_eff must be positive",
            self.scenario_name
        );
        ensure!(
            self.max_pwr_kw > 0.0,
            "invalid vehicle `{}`: max_pwr_kw must be positive",
            self.scenario_name
        );
        ensure!(
            self.wheel_base_m > 0.0,
            "invalid vehicle `{}`: wheel_base_m must be positive",
            self.scenario_name
        );
        self.check_eff_map()?;

        self.mass_kg = self.veh_kg + self.cargo_kg;
        self.set_max_trac();
        ensure!(
            self.max_trac_mps2.is_finite() && self.max_trac_mps2 > 0.0,
            "invalid vehicle `{}`: traction limit {} m/s^2 from wheel_coef_of_fric, \
             drive_axle_weight_frac, veh_cg_m and wheel_base_m must be positive",
            self.scenario_name,
            self.max_trac_mps2
        );
        Ok(())
    }

    fn check_eff_map(&self) -> anyhow::Result<()> {
        ensure!(
            self.pwr_out_frac.len() == self.eff_map.len(),
            "invalid vehicle `{}`: pwr_out_frac has {} entries but eff_map has {}",
            self.scenario_name,
            self.pwr_out_frac.len(),
            self.eff_map.len()
        );
        ensure!(
            self.pwr_out_frac.len() >= 2,
            "invalid vehicle `{}`: eff_map needs at least 2 points",
            self.scenario_name
        );
        ensure!(
            self.pwr_out_frac.windows(2).all(|w| w[0] < w[1]),
            "invalid vehicle `{}`: pwr_out_frac must be strictly increasing",
            self.scenario_name
        );
        ensure!(
            self.pwr_out_frac[0] == 0.0 && self.pwr_out_frac[self.pwr_out_frac.len() - 1] == 1.0,
            "invalid vehicle `{}`: pwr_out_frac must span 0 to 1",
            self.scenario_name
        );
        ensure!(
            self.eff_map.iter().all(|eff| *eff > 0.0 && *eff <= 1.0),
            "invalid vehicle `{}`: eff_map values must be in (0, 1]",
            self.scenario_name
        );
        Ok(())
    }

    /// Traction-limited acceleration on level ground
    fn set_max_trac(&mut self) {
        self.max_trac_mps2 = (self.wheel_coef_of_fric
            * self.drive_axle_weight_frac
            * self.mass_kg
            * self.props.a_grav_mps2
            / (1.0 + self.veh_cg_m * self.wheel_coef_of_fric / self.wheel_base_m))
            / (self.mass_kg * self.props.a_grav_mps2)
            * self.props.a_grav_mps2;
    }

    /// Peak motor output, $W$
    pub fn max_pwr_w(&self) -> f64 {
        self.max_pwr_kw * 1e3
    }

    /// Speed governor, $m/s$
    pub fn max_speed_mps(&self) -> Option<f64> {
        self.max_speed_kph.map(|kph| kph / KPH_PER_MPS)
    }

    /// Motor efficiency at `pwr_out_w` (absolute value used for regen)
    pub fn motor_eff(&self, pwr_out_w: f64) -> f64 {
        let frac = (pwr_out_w.abs() / self.max_pwr_w()).min(1.0);
        interpolate(frac, &self.pwr_out_frac, &self.eff_map, false)
    }

    /// Mid-size battery electric sedan used for tests and as a CLI template
    pub fn mock_vehicle() -> Self {
        let mut v = Self {
            props: PhysicalProperties::default(),
            scenario_name: String::from("mid-size electric sedan"),
            veh_kg: 1800.0,
            cargo_kg: 136.0,
            drag_coef: 0.23,
            frontal_area_m2: 2.2,
            wheel_rr_coef: 0.009,
            max_pwr_kw: 150.0,
            pwr_out_frac: vec![0.0, 0.05, 0.1, 0.2, 0.4, 0.6, 0.8, 1.0],
            eff_map: vec![0.80, 0.86, 0.90, 0.93, 0.95, 0.95, 0.94, 0.93],
            trans_eff: 0.97,
            max_regen: 0.6,
            aux_kw: 0.7,
            wheel_coef_of_fric: 0.7,
            drive_axle_weight_frac: 0.55,
            veh_cg_m: -0.53,
            wheel_base_m: 2.875,
            max_speed_kph: Some(225.0),
            mass_kg: Default::default(),
            max_trac_mps2: Default::default(),
        };
        v.set_derived().unwrap();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_derived_via_new() {
        let veh = Vehicle::mock_vehicle();
        assert_eq!(veh.mass_kg, 1936.0);
        // RWD: 0.7 * 0.55 / (1 - 0.53 * 0.7 / 2.875) * 9.81
        assert!(veh.max_trac_mps2.approx_eq(&4.3364, 1e-4));
    }

    #[test]
    fn test_yaml_round_trip_sets_derived() {
        let veh = Vehicle::mock_vehicle();
        let yaml = veh.to_yaml().unwrap();
        let veh2 = Vehicle::from_yaml(yaml).unwrap();
        assert!(veh.approx_eq(&veh2, 1e-9));
        assert!(veh2.max_trac_mps2 > 0.0);
    }

    #[test]
    fn test_validation_rejects_bad_inputs() {
        let mut veh = Vehicle::mock_vehicle();
        veh.trans_eff = 1.5;
        let err = veh.set_derived().unwrap_err();
        assert!(err.to_string().contains("trans_eff"));

        let mut veh = Vehicle::mock_vehicle();
        veh.drag_coef = -0.1;
        assert!(veh.set_derived().is_err());

        let mut veh = Vehicle::mock_vehicle();
        veh.eff_map = vec![0.9, 0.9];
        let err = veh.set_derived().unwrap_err();
        assert!(err.to_string().contains("eff_map"));

        let mut veh = Vehicle::mock_vehicle();
        veh.max_pwr_kw = 0.0;
        assert!(veh.set_derived().is_err());
    }

    #[test]
    fn test_traction_geometry_is_checked() {
        let mut veh = Vehicle::mock_vehicle();
        veh.wheel_base_m = 0.0;
        veh.veh_cg_m = 0.0;
        let err = veh.set_derived().unwrap_err();
        assert!(err.to_string().contains("wheel_base_m"), "{err}");

        // rear-drive cg far enough back to flip the load transfer denominator
        let mut veh = Vehicle::mock_vehicle();
        veh.veh_cg_m = -5.0;
        let err = veh.set_derived().unwrap_err();
        assert!(err.to_string().contains("traction limit"), "{err}");

        let mut veh = Vehicle::mock_vehicle();
        veh.wheel_coef_of_fric = 0.0;
        assert!(veh.set_derived().is_err());
    }

    #[test]
    fn test_missing_fields_fail_to_parse() {
        assert!(Vehicle::from_json(r#"{"veh_kg": 1500.0}"#).is_err());
    }

    #[test]
    fn test_motor_eff_interpolates_and_saturates() {
        let veh = Vehicle::mock_vehicle();
        assert!(veh.motor_eff(0.0).approx_eq(&0.80, 1e-12));
        assert!(veh.motor_eff(0.3 * veh.max_pwr_w()).approx_eq(&0.94, 1e-12));
        assert!(veh.motor_eff(2.0 * veh.max_pwr_w()).approx_eq(&0.93, 1e-12));
        assert!(veh.motor_eff(-0.3 * veh.max_pwr_w()).approx_eq(&0.94, 1e-12));
    }
}
