use super::cycle_eval::CycleOutcome;
use super::*;

/// Performance figures for one vehicle, serialized with the field names
/// clients expect
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ApproxEq)]
pub struct PerformanceReport {
    #[serde(rename = "Accel100")]
    pub time_to_100kph: String,
    #[serde(rename = "QuarterMile")]
    pub quarter_mile_time: String,
    #[serde(rename = "TopSpeed")]
    pub top_speed: String,
    #[serde(rename = "TopSpeedAccelTime")]
    pub time_to_top_speed: String,
    #[serde(rename = "TopSpeedEff")]
    pub top_speed_eff: String,
    #[serde(rename = "CityEff")]
    pub city_eff: String,
    #[serde(rename = "HighwayEff")]
    pub highway_eff: String,
    #[serde(rename = "PeakG")]
    pub peak_accel: String,
    /// empty string on the wire when top speed is below 120 kph
    #[serde(rename = "Cruise120", with = "empty_as_none")]
    pub cruise_120kph_eff: Option<String>,

    /// acceleration-phase speed samples, $m/s$
    #[serde(rename = "Speed")]
    pub speed: Vec<f64>,
    /// acceleration-phase power samples, $W$
    #[serde(rename = "Power")]
    pub power: Vec<f64>,
    /// acceleration-phase acceleration samples, $m/s^2$
    #[serde(rename = "Acceleration")]
    pub acceleration: Vec<f64>,
    /// $Wh/km$, first entry at 30 kph, one entry per kph
    #[serde(rename = "Efficiency")]
    pub efficiency: Vec<f64>,
}

impl SerdeAPI for PerformanceReport {
    fn init(&mut self) -> anyhow::Result<()> {
        ensure!(
            self.speed.len() == self.power.len() && self.speed.len() == self.acceleration.len(),
            "acceleration series have unequal lengths: Speed {}, Power {}, Acceleration {}",
            self.speed.len(),
            self.power.len(),
            self.acceleration.len()
        );
        Ok(())
    }
}

impl PerformanceReport {
    pub(super) fn assemble(accel: AccelOutcome, sweep: SweepOutcome, cycles: CycleOutcome) -> Self {
        let AccelSampleHistoryVec {
            speed_mps,
            pwr_w,
            accel_mps2,
        } = accel.history;
        Self {
            time_to_100kph: accel.time_to_100kph,
            quarter_mile_time: accel.quarter_mile_time,
            top_speed: accel.top_speed,
            time_to_top_speed: accel.time_to_top_speed,
            top_speed_eff: sweep.top_speed_eff,
            city_eff: cycles.city_eff,
            highway_eff: cycles.highway_eff,
            peak_accel: accel.peak_accel,
            cruise_120kph_eff: sweep.cruise_120kph_eff,
            speed: speed_mps,
            power: pwr_w,
            acceleration: accel_mps2,
            efficiency: sweep.efficiency,
        }
    }
}

mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let model = ScriptedModel::new(80.0, 3.0);
        let report = simulate_performance(&model, &test_catalog(), &PerfParams::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "Accel100",
            "QuarterMile",
            "TopSpeed",
            "TopSpeedAccelTime",
            "TopSpeedEff",
            "CityEff",
            "HighwayEff",
            "PeakG",
            "Cruise120",
            "Speed",
            "Power",
            "Acceleration",
            "Efficiency",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 13);
        assert_eq!(obj["Cruise120"], "");
        assert_eq!(
            obj["Speed"].as_array().unwrap().len(),
            obj["Power"].as_array().unwrap().len()
        );
    }

    #[test]
    fn test_json_round_trip_keeps_unset_cruise() {
        let model = ScriptedModel::new(80.0, 3.0);
        let report = simulate_performance(&model, &test_catalog(), &PerfParams::default()).unwrap();
        let parsed = PerformanceReport::from_json(report.to_json().unwrap()).unwrap();
        assert!(parsed.approx_eq(&report, 1e-12));
        assert!(parsed.cruise_120kph_eff.is_none());
    }
}
