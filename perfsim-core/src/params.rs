//! Module containing physical constants and unit conversions.

use crate::imports::*;

/// Unit conversions that should NEVER change
pub const KPH_PER_MPS: f64 = 3.6;
pub const M_PER_QUARTER_MILE: f64 = 402.336;
pub const J_PER_WH: f64 = 3600.0;

/// Standard gravity used for expressing acceleration in g
pub const STANDARD_GRAVITY_MPS2: f64 = 9.81;

/// Physical properties shared by the vehicle model and the metrics driver
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ApproxEq)]
pub struct PhysicalProperties {
    pub air_density_kg_per_m3: f64, // = 1.2, Sea level air density at approximately 20C
    pub a_grav_mps2: f64,           // = 9.81
    /// energy content of one litre of gasoline, used for L/100km equivalents
    pub kwh_per_l_fuel: f64, // = 8.9
}

impl Default for PhysicalProperties {
    fn default() -> Self {
        Self {
            air_density_kg_per_m3: 1.2,
            a_grav_mps2: STANDARD_GRAVITY_MPS2,
            kwh_per_l_fuel: 8.9,
        }
    }
}

impl SerdeAPI for PhysicalProperties {
    fn init(&mut self) -> anyhow::Result<()> {
        ensure!(
            self.air_density_kg_per_m3 >= 0.0,
            format_dbg!(self.air_density_kg_per_m3)
        );
        ensure!(self.a_grav_mps2 > 0.0, format_dbg!(self.a_grav_mps2));
        ensure!(self.kwh_per_l_fuel > 0.0, format_dbg!(self.kwh_per_l_fuel));
        Ok(())
    }
}

impl PhysicalProperties {
    /// Litres of fuel per 100 km carrying the same energy as `wh_per_km`
    pub fn l_per_100km_from_wh_per_km(&self, wh_per_km: f64) -> f64 {
        // Wh/km * 100 km / (Wh/L)
        wh_per_km * 100.0 / (self.kwh_per_l_fuel * 1e3)
    }

    /// Litres of fuel per 100 km carrying the same energy as `j_per_m`
    pub fn l_per_100km_from_j_per_m(&self, j_per_m: f64) -> f64 {
        // J/m -> Wh/km
        self.l_per_100km_from_wh_per_km(j_per_m * 1e3 / J_PER_WH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuel_equivalents_agree_across_units() {
        let props = PhysicalProperties::default();
        // 150 W at 1 kph is 150 Wh/km, and 150 W at 1/3.6 m/s is 540 J/m
        let from_wh = props.l_per_100km_from_wh_per_km(150.0);
        let from_j = props.l_per_100km_from_j_per_m(150.0 * KPH_PER_MPS);
        assert!(from_wh.approx_eq(&from_j, 1e-12));
        assert!(from_wh.approx_eq(&(150.0 * 0.01123595505), 1e-9));
        assert!(from_j.approx_eq(&(540.0 * 0.00312109862), 1e-9));
    }

    #[test]
    fn test_rejects_nonpositive_energy_density() {
        let mut props = PhysicalProperties::default();
        props.kwh_per_l_fuel = 0.0;
        assert!(props.init().is_err());
    }
}
