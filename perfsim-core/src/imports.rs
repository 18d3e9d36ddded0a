pub use anyhow::{anyhow, bail, ensure, Context};
pub use ndarray::{array, s, Array, Array1, Axis};
pub use serde::{Deserialize, Serialize};
pub use std::ffi::OsStr;
pub use std::fs::File;
pub use std::path::{Path, PathBuf};

pub use crate::traits::*;
pub use crate::utils::*;
pub use perfsim_proc_macros::{ApproxEq, HistoryVec};
