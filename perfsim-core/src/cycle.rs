//! Module containing drive cycle struct and related functions.

use crate::imports::*;

/// One row of a drive cycle, as read from or written to CSV
#[derive(Default, PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct DriveCycleElement {
    /// time [s]
    #[serde(alias = "cycSecs")]
    pub time_s: f64,
    /// speed [m/s]
    #[serde(alias = "cycMps")]
    pub mps: f64,
    /// grade [rise/run]
    #[serde(alias = "cycGrade")]
    pub grade: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, ApproxEq)]
/// Speed-vs-time trace a vehicle is asked to follow
/// * time_s, cycle time, $s$
/// * mps, vehicle speed, $\frac{m}{s}$
/// * grade, road grade/slope, $\frac{rise}{run}$
pub struct DriveCycle {
    /// array of time [s]
    #[serde(alias = "cycSecs")]
    pub time_s: Array1<f64>,
    /// array of speed [m/s]
    #[serde(alias = "cycMps")]
    pub mps: Array1<f64>,
    /// array of grade [rise/run]
    #[serde(alias = "cycGrade")]
    #[serde(default)]
    pub grade: Array1<f64>,
    #[serde(default)]
    pub name: String,
}

impl SerdeAPI for DriveCycle {
    const ACCEPTED_BYTE_FORMATS: &'static [&'static str] = &["yaml", "json", "bin", "csv"];
    const ACCEPTED_STR_FORMATS: &'static [&'static str] = &["yaml", "json", "csv"];

    fn init(&mut self) -> anyhow::Result<()> {
        if self.grade.is_empty() {
            self.grade = Array::zeros(self.len());
        }
        self.init_checks()
    }

    fn to_writer<W: std::io::Write>(&self, wtr: W, format: &str) -> anyhow::Result<()> {
        match format.trim_start_matches('.').to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml::to_writer(wtr, self)?,
            "json" => serde_json::to_writer(wtr, self)?,
            "bin" => bincode::serialize_into(wtr, self)?,
            "csv" => {
                let mut wtr = csv::Writer::from_writer(wtr);
                for i in 0..self.len() {
                    wtr.serialize(DriveCycleElement {
                        time_s: self.time_s[i],
                        mps: self.mps[i],
                        grade: Some(self.grade[i]),
                    })?;
                }
                wtr.flush()?
            }
            _ => bail!(
                "Unsupported format {format:?}, must be one of {:?}",
                Self::ACCEPTED_BYTE_FORMATS
            ),
        }
        Ok(())
    }

    fn to_str(&self, format: &str) -> anyhow::Result<String> {
        Ok(
            match format.trim_start_matches('.').to_lowercase().as_str() {
                "yaml" | "yml" => self.to_yaml()?,
                "json" => self.to_json()?,
                "csv" => self.to_csv()?,
                _ => {
                    bail!(
                        "Unsupported format {format:?}, must be one of {:?}",
                        Self::ACCEPTED_STR_FORMATS
                    )
                }
            },
        )
    }

    /// Note that using this method to instantiate a DriveCycle from CSV, rather
    /// than the `from_csv_str` method, sets the cycle name to an empty string
    fn from_str<S: AsRef<str>>(contents: S, format: &str) -> anyhow::Result<Self> {
        Ok(
            match format.trim_start_matches('.').to_lowercase().as_str() {
                "yaml" | "yml" => Self::from_yaml(contents)?,
                "json" => Self::from_json(contents)?,
                "csv" => Self::from_reader(contents.as_ref().as_bytes(), "csv")?,
                _ => bail!(
                    "Unsupported format {format:?}, must be one of {:?}",
                    Self::ACCEPTED_STR_FORMATS
                ),
            },
        )
    }

    fn from_reader<R: std::io::Read>(rdr: R, format: &str) -> anyhow::Result<Self> {
        let mut deserialized = match format.trim_start_matches('.').to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml::from_reader(rdr)?,
            "json" => serde_json::from_reader(rdr)?,
            "bin" => bincode::deserialize_from(rdr)?,
            "csv" => {
                let mut elements: Vec<DriveCycleElement> = Vec::new();
                let mut rdr = csv::Reader::from_reader(rdr);
                for result in rdr.deserialize() {
                    elements.push(result?);
                }
                Self::from_elements(elements)?
            }
            _ => {
                bail!(
                    "Unsupported format {format:?}, must be one of {:?}",
                    Self::ACCEPTED_BYTE_FORMATS
                )
            }
        };
        deserialized.init()?;
        Ok(deserialized)
    }
}

impl DriveCycle {
    fn init_checks(&self) -> anyhow::Result<()> {
        ensure!(!self.is_empty(), "Deserialized cycle is empty");
        ensure!(
            self.len() >= 2,
            "Deserialized cycle `{}` needs at least 2 samples, found {}",
            self.name,
            self.len()
        );
        ensure!(
            self.are_fields_equal_length(),
            "Deserialized cycle has unequal field lengths\ntime_s: {}\nmps: {}\ngrade: {}",
            self.time_s.len(),
            self.mps.len(),
            self.grade.len(),
        );
        ensure!(self.is_sorted(), "Deserialized cycle is not sorted in time");
        ensure!(
            self.mps.iter().all(|v| v.is_finite() && *v >= 0.0),
            "Deserialized cycle `{}` has negative or non-finite speeds",
            self.name
        );
        Ok(())
    }

    /// Build a cycle from CSV rows. Grade is taken from the rows only if every
    /// row has one, otherwise it is left for `init` to fill with zeros.
    fn from_elements(elements: Vec<DriveCycleElement>) -> anyhow::Result<Self> {
        let grade: Option<Vec<f64>> = elements.iter().map(|e| e.grade).collect();
        Ok(Self {
            time_s: elements.iter().map(|e| e.time_s).collect(),
            mps: elements.iter().map(|e| e.mps).collect(),
            grade: grade.map(Array1::from_vec).unwrap_or_default(),
            name: String::default(),
        })
    }

    /// Load cycle from CSV file, parsing name from filepath
    pub fn from_csv_file<P: AsRef<Path>>(filepath: P) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        let name = filepath
            .file_stem()
            .and_then(OsStr::to_str)
            .with_context(|| format!("Could not parse cycle name from filepath: {filepath:?}"))?
            .to_string();
        let mut cyc = Self::from_file(filepath)?;
        cyc.name = name;
        Ok(cyc)
    }

    /// Load cycle from CSV string
    pub fn from_csv_str<S: AsRef<str>>(csv_str: S, name: String) -> anyhow::Result<Self> {
        let mut cyc = Self::from_str(csv_str, "csv")?;
        cyc.name = name;
        Ok(cyc)
    }

    /// Write (serialize) cycle to a CSV string
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut buf = Vec::with_capacity(self.len());
        self.to_writer(&mut buf, "csv")?;
        Ok(String::from_utf8(buf)?)
    }

    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_sorted(&self) -> bool {
        self.time_s
            .windows(2)
            .into_iter()
            .all(|window| window[0] < window[1])
    }

    pub fn are_fields_equal_length(&self) -> bool {
        let cyc_len = self.len();
        [self.mps.len(), self.grade.len()]
            .iter()
            .all(|len| len == &cyc_len)
    }

    pub fn test_cyc() -> Self {
        Self {
            time_s: Array::range(0.0, 10.0, 1.0),
            mps: Array::range(0.0, 10.0, 1.0),
            grade: Array::zeros(10),
            name: String::from("test"),
        }
    }

    /// elapsed time of each step, with a leading zero
    pub fn dt_s(&self) -> Array1<f64> {
        diff(&self.time_s)
    }

    /// elapsed time of step `i`, from sample `i - 1` to sample `i`
    pub fn dt_s_at_i(&self, i: usize) -> f64 {
        if i == 0 {
            0.0
        } else {
            self.time_s[i] - self.time_s[i - 1]
        }
    }

    /// distance covered in each step by trapezoidal integration, with a leading zero
    pub fn dist_m(&self) -> Array1<f64> {
        let mut dist_m = Array1::zeros(self.len());
        for i in 1..self.len() {
            dist_m[i] = self.dt_s_at_i(i) * 0.5 * (self.mps[i] + self.mps[i - 1]);
        }
        dist_m
    }

    /// total cycle distance [m]
    pub fn dist_total_m(&self) -> f64 {
        self.dist_m().sum()
    }

    /// total cycle duration [s]
    pub fn duration_s(&self) -> f64 {
        match (self.time_s.first(), self.time_s.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// distance-weighted average speed [m/s]
    pub fn avg_speed_mps(&self) -> f64 {
        let duration_s = self.duration_s();
        if duration_s > 0.0 {
            self.dist_total_m() / duration_s
        } else {
            0.0
        }
    }
}
