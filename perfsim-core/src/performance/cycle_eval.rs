//! Drive cycle efficiency for the catalog's city and highway cycles.

use super::*;
use crate::cycle::DriveCycle;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleOutcome {
    pub city_eff: String,
    pub highway_eff: String,
}

/// Replay one cycle. Success is formatted as L/100km equivalent; failure
/// becomes the model's error text, unchanged.
pub fn evaluate_cycle<M: VehicleModel>(
    model: &M,
    cyc: &DriveCycle,
    props: &PhysicalProperties,
) -> String {
    match model.run_cycle(cyc) {
        Ok(energy) => fmt_l_per_100km(props.l_per_100km_from_j_per_m(energy.j_per_m())),
        Err(err) => {
            log_debug!("{} cycle infeasible: {err}", cyc.name);
            err.to_string()
        }
    }
}

/// Replay the city and highway cycles in parallel. Each result is
/// independent of the other.
pub fn evaluate_cycles<M>(model: &M, catalog: &CycleCatalog, props: &PhysicalProperties) -> CycleOutcome
where
    M: VehicleModel + Sync,
{
    let [(_, city), (_, highway)] = catalog.entries();
    let (city_eff, highway_eff) = rayon::join(
        || evaluate_cycle(model, city, props),
        || evaluate_cycle(model, highway, props),
    );
    CycleOutcome {
        city_eff,
        highway_eff,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;
    use super::*;

    #[test]
    fn test_feasible_cycles_are_formatted() {
        let model = ScriptedModel::new(180.0, 4.0);
        let outcome = evaluate_cycles(&model, &test_catalog(), &PhysicalProperties::default());
        assert!(outcome.city_eff.ends_with(" L/100km equivalent"));
        assert_eq!(outcome.city_eff, outcome.highway_eff);
    }

    #[test]
    fn test_failures_are_independent() {
        let model = ScriptedModel::new(180.0, 4.0)
            .with_cycle_error("highway", "vehicle cannot follow highway cycle");
        let outcome = evaluate_cycles(&model, &test_catalog(), &PhysicalProperties::default());
        assert_eq!(outcome.highway_eff, "vehicle cannot follow highway cycle");
        assert!(outcome.city_eff.ends_with(" L/100km equivalent"));
    }

    #[test]
    fn test_conversion_matches_j_per_m() {
        let model = ScriptedModel::new(180.0, 4.0);
        let cyc = DriveCycle::test_cyc();
        let energy = model.run_cycle(&cyc).unwrap();
        let expected = fmt_l_per_100km(energy.j_per_m() * 0.00312109862);
        assert_eq!(
            evaluate_cycle(&model, &cyc, &PhysicalProperties::default()),
            expected
        );
    }
}
