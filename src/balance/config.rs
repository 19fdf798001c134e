//! Balance configuration.
//!
//! The host passes a [`BalanceConfig`] into every balance call. The mode
//! selector is an exhaustive enum; unrecognized mode strings are rejected
//! when the configuration is built, before any computation runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::GRAVITY;
use crate::error::BalanceError;

/// Which of SSH / land-ice pressure is known, and how the other is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitVariable {
    /// SSH is known; land-ice pressure is derived from the water column.
    #[serde(rename = "ssh")]
    Ssh,
    /// Land-ice pressure is known; SSH is derived by inverting the column.
    #[serde(rename = "landIcePressure")]
    LandIcePressure,
    /// Pressure from the top-layer density alone; the grid is left as is.
    #[serde(rename = "landIcePressure_from_top_density")]
    LandIcePressureFromTopDensity,
}

impl InitVariable {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            InitVariable::Ssh => "ssh",
            InitVariable::LandIcePressure => "landIcePressure",
            InitVariable::LandIcePressureFromTopDensity => "landIcePressure_from_top_density",
        }
    }

    /// Whether this mode rebuilds the grid and remaps tracers.
    pub fn is_iterative(&self) -> bool {
        !matches!(self, InitVariable::LandIcePressureFromTopDensity)
    }
}

impl fmt::Display for InitVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitVariable {
    type Err = BalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ssh" => Ok(InitVariable::Ssh),
            "landIcePressure" => Ok(InitVariable::LandIcePressure),
            "landIcePressure_from_top_density" => Ok(InitVariable::LandIcePressureFromTopDensity),
            other => Err(BalanceError::InvalidMode(other.to_string())),
        }
    }
}

/// Configuration of a balance pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBalanceConfig")]
pub struct BalanceConfig {
    /// Known variable and derivation mode.
    pub init_variable: InitVariable,

    /// Rebuild SSH-updated grids with the rx1-constrained generator.
    pub use_rx1_constraint: bool,

    /// Gravitational acceleration [m/s²].
    pub gravity: f64,

    /// Maintain `effectiveDensityInLandIce`.
    pub track_effective_density: bool,
}

/// Wire form of [`BalanceConfig`]; the mode stays a string until validated.
#[derive(Deserialize)]
struct RawBalanceConfig {
    init_variable: String,
    #[serde(default)]
    use_rx1_constraint: bool,
    #[serde(default = "default_gravity")]
    gravity: f64,
    #[serde(default = "default_track_effective_density")]
    track_effective_density: bool,
}

fn default_gravity() -> f64 {
    GRAVITY
}

fn default_track_effective_density() -> bool {
    true
}

impl TryFrom<RawBalanceConfig> for BalanceConfig {
    type Error = BalanceError;

    fn try_from(raw: RawBalanceConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            init_variable: raw.init_variable.parse()?,
            use_rx1_constraint: raw.use_rx1_constraint,
            gravity: raw.gravity,
            track_effective_density: raw.track_effective_density,
        })
    }
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self::new(InitVariable::LandIcePressure)
    }
}

impl BalanceConfig {
    /// Configuration with default gravity, no rx1 constraint and effective
    /// density tracking on.
    pub fn new(init_variable: InitVariable) -> Self {
        Self {
            init_variable,
            use_rx1_constraint: false,
            gravity: GRAVITY,
            track_effective_density: true,
        }
    }

    /// Build from the host's raw settings: a mode string and the rx1 flag.
    ///
    /// # Example
    ///
    /// ```
    /// use landice_balance::balance::{BalanceConfig, InitVariable};
    ///
    /// let config = BalanceConfig::from_settings("landIcePressure", false).unwrap();
    /// assert_eq!(config.init_variable, InitVariable::LandIcePressure);
    ///
    /// assert!(BalanceConfig::from_settings("draft", false).is_err());
    /// ```
    pub fn from_settings(mode: &str, use_rx1_constraint: bool) -> Result<Self, BalanceError> {
        Ok(Self {
            use_rx1_constraint,
            ..Self::new(mode.parse()?)
        })
    }

    /// Parse a JSON configuration.
    ///
    /// An unrecognized `init_variable` is reported as
    /// [`BalanceError::InvalidMode`]; malformed JSON as
    /// [`BalanceError::ConfigParse`].
    pub fn from_json(json: &str) -> Result<Self, BalanceError> {
        let raw: RawBalanceConfig = serde_json::from_str(json)?;
        raw.try_into()
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_rx1_constraint(mut self, enabled: bool) -> Self {
        self.use_rx1_constraint = enabled;
        self
    }

    pub fn with_effective_density(mut self, tracked: bool) -> Self {
        self.track_effective_density = tracked;
        self
    }
}
