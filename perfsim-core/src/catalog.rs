//! Reference drive cycles, loaded once and shared read-only between requests.

use crate::cycle::DriveCycle;
use crate::imports::*;

pub const CITY_CYCLE_NAME: &str = "city";
pub const HIGHWAY_CYCLE_NAME: &str = "highway";

/// The two reference drive cycles every report is evaluated on.
///
/// Immutable after construction; wrap in an `Arc` to share across threads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ApproxEq)]
pub struct CycleCatalog {
    pub city: DriveCycle,
    pub highway: DriveCycle,
}

impl SerdeAPI for CycleCatalog {
    fn init(&mut self) -> anyhow::Result<()> {
        self.city.init()?;
        self.highway.init()?;
        Ok(())
    }
}

impl CycleCatalog {
    /// Cycles bundled with the crate under `resources/cycles`
    #[cfg(feature = "resources")]
    pub fn from_resources() -> anyhow::Result<Self> {
        let load = |name: &str| -> anyhow::Result<DriveCycle> {
            let mut cyc = DriveCycle::from_resource(format!("cycles/{name}.csv"))
                .with_context(|| format!("failed to load bundled {name} cycle"))?;
            cyc.name = name.to_string();
            Ok(cyc)
        };
        Ok(Self {
            city: load(CITY_CYCLE_NAME)?,
            highway: load(HIGHWAY_CYCLE_NAME)?,
        })
    }

    /// Cycles read from disk, in any format [`DriveCycle`] accepts. CSV cycles
    /// are named after their file stem.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(city: P, highway: Q) -> anyhow::Result<Self> {
        let load = |path: &Path| -> anyhow::Result<DriveCycle> {
            let mut cyc = DriveCycle::from_file(path)
                .with_context(|| format!("failed to load cycle from {path:?}"))?;
            if cyc.name.is_empty() {
                cyc.name = path
                    .file_stem()
                    .and_then(OsStr::to_str)
                    .unwrap_or_default()
                    .to_string();
            }
            Ok(cyc)
        };
        Ok(Self {
            city: load(city.as_ref())?,
            highway: load(highway.as_ref())?,
        })
    }

    /// Catalog entries in report order
    pub fn entries(&self) -> [(&'static str, &DriveCycle); 2] {
        [
            (CITY_CYCLE_NAME, &self.city),
            (HIGHWAY_CYCLE_NAME, &self.highway),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_cycles_load() {
        let catalog = CycleCatalog::from_resources().unwrap();
        assert_eq!(catalog.city.name, "city");
        assert_eq!(catalog.highway.name, "highway");
        assert!(catalog.city.dist_total_m() > 1_000.0);
        assert!(catalog.highway.avg_speed_mps() > catalog.city.avg_speed_mps());
    }

    #[test]
    fn test_from_files_names_cycles_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let city = dir.path().join("udds.csv");
        let hwy = dir.path().join("hwfet.csv");
        DriveCycle::test_cyc().to_file(&city).unwrap();
        DriveCycle::test_cyc().to_file(&hwy).unwrap();
        let catalog = CycleCatalog::from_files(&city, &hwy).unwrap();
        assert_eq!(catalog.city.name, "udds");
        assert_eq!(catalog.highway.name, "hwfet");
        assert_eq!(catalog.entries()[1].0, "highway");
    }

    #[test]
    fn test_from_files_reports_missing_file() {
        let err = CycleCatalog::from_files("nope/city.csv", "nope/highway.csv").unwrap_err();
        assert!(format!("{err:#}").contains("File not found"));
    }
}
