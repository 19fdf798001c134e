//! Equation of State for seawater density.
//!
//! Computes seawater density ρ(T, S, p) from temperature, salinity, and pressure.
//! This module implements the UNESCO EOS-80 formulation which is standard in
//! oceanographic modeling, plus a linear approximation.
//!
//! # References
//!
//! - UNESCO (1981): Tenth report of the joint panel on oceanographic tables and standards.
//! - Millero & Poisson (1981): International one-atmosphere equation of state of seawater.
//!
//! # Units
//!
//! - Temperature: °C (ITS-90)
//! - Salinity: PSU (practical salinity units)
//! - Pressure: dbar (decibars), where 1 dbar ≈ 1 m depth
//! - Density: kg/m³
//!
//! # Sub-ice-shelf context
//!
//! Water in ice-shelf cavities sits close to the surface freezing point
//! (T ≈ -1.9°C, S ≈ 34.5 PSU), giving densities around 1027.8 kg/m³ at
//! the surface and noticeably more at the grounding line where the column
//! can be over 1000 m deep.

use super::DensityEvaluator;
use crate::error::CollaboratorError;
use crate::mesh::{ColumnField, MeshPartition};

/// Reference density for seawater (kg/m³).
pub const RHO_0: f64 = 1025.0;

/// Name of the temperature tracer in [`crate::mesh::ActiveTracers`].
pub const TEMPERATURE: &str = "temperature";

/// Name of the salinity tracer in [`crate::mesh::ActiveTracers`].
pub const SALINITY: &str = "salinity";

/// Equation of State calculator for seawater.
#[derive(Clone, Debug)]
pub struct EquationOfState {
    /// Reference density (kg/m³)
    pub rho_0: f64,
    /// Include pressure effects (if false, uses surface pressure only)
    pub include_pressure: bool,
}

impl Default for EquationOfState {
    fn default() -> Self {
        Self::new()
    }
}

impl EquationOfState {
    /// Create a new equation of state calculator with default reference density.
    pub fn new() -> Self {
        Self {
            rho_0: RHO_0,
            include_pressure: false,
        }
    }

    /// Create with pressure effects included.
    ///
    /// Pressure in dbar is taken as the depth of the layer midpoint.
    pub fn with_pressure() -> Self {
        Self {
            rho_0: RHO_0,
            include_pressure: true,
        }
    }

    /// Compute seawater density at surface pressure (p = 0).
    ///
    /// Uses the UNESCO EOS-80 one-atmosphere equation of state.
    ///
    /// # Example
    /// ```
    /// use landice_balance::equations::EquationOfState;
    ///
    /// let eos = EquationOfState::new();
    ///
    /// // Fresh water at 4°C (maximum density)
    /// let rho_fresh = eos.density_surface(4.0, 0.0);
    /// assert!((rho_fresh - 1000.0).abs() < 0.1);
    /// ```
    pub fn density_surface(&self, temperature: f64, salinity: f64) -> f64 {
        let t = temperature;
        let s = salinity;

        // Pure water density (Bigg formula)
        let rho_w = 999.842594 + 6.793952e-2 * t - 9.095290e-3 * t.powi(2)
            + 1.001685e-4 * t.powi(3)
            - 1.120083e-6 * t.powi(4)
            + 6.536336e-9 * t.powi(5);

        let a0 = 8.24493e-1;
        let a1 = -4.0899e-3;
        let a2 = 7.6438e-5;
        let a3 = -8.2467e-7;
        let a4 = 5.3875e-9;

        let b0 = -5.72466e-3;
        let b1 = 1.0227e-4;
        let b2 = -1.6546e-6;

        let c0 = 4.8314e-4;

        let a = a0 + a1 * t + a2 * t.powi(2) + a3 * t.powi(3) + a4 * t.powi(4);
        let b = b0 + b1 * t + b2 * t.powi(2);

        // Negative salinity is unphysical; clamp so s^1.5 stays real.
        let s = s.max(0.0);
        rho_w + a * s + b * s.powf(1.5) + c0 * s.powi(2)
    }

    /// Compute seawater density at given pressure (dbar).
    pub fn density(&self, temperature: f64, salinity: f64, pressure: f64) -> f64 {
        if !self.include_pressure || pressure.abs() < 1e-6 {
            return self.density_surface(temperature, salinity);
        }

        let rho_0 = self.density_surface(temperature, salinity);
        let k = self.secant_bulk_modulus(temperature, salinity.max(0.0), pressure);

        rho_0 / (1.0 - pressure / k)
    }

    /// Secant bulk modulus K(S, T, p) for pressure effects.
    fn secant_bulk_modulus(&self, temperature: f64, salinity: f64, pressure: f64) -> f64 {
        let t = temperature;
        let s = salinity;
        let p = pressure;

        let kw = 19652.21 + 148.4206 * t - 2.327105 * t.powi(2) + 1.360477e-2 * t.powi(3)
            - 5.155288e-5 * t.powi(4);

        let k0 = kw
            + s * (54.6746 - 0.603459 * t + 1.09987e-2 * t.powi(2) - 6.1670e-5 * t.powi(3))
            + s.powf(1.5) * (7.944e-2 + 1.6483e-2 * t - 5.3009e-4 * t.powi(2));

        let aw = 3.239908 + 1.43713e-3 * t + 1.16092e-4 * t.powi(2) - 5.77905e-7 * t.powi(3);
        let a =
            aw + s * (2.2838e-3 - 1.0981e-5 * t - 1.6078e-6 * t.powi(2)) + s.powf(1.5) * 1.91075e-4;

        let bw = 8.50935e-5 - 6.12293e-6 * t + 5.2787e-8 * t.powi(2);
        let b = bw + s * (-9.9348e-7 + 2.0816e-8 * t + 9.1697e-10 * t.powi(2));

        k0 + p * (a + b * p)
    }
}

impl DensityEvaluator for EquationOfState {
    fn compute_density(
        &self,
        block: &MeshPartition,
        density: &mut ColumnField,
    ) -> Result<(), CollaboratorError> {
        fill_density(block, density, |t, s, z_mid| self.density(t, s, -z_mid))
    }
}

/// Linear equation of state for simplified/faster calculations.
///
/// ρ = ρ₀ * (1 - α(T - T₀) + β(S - S₀))
#[derive(Clone, Debug)]
pub struct LinearEquationOfState {
    /// Reference density (kg/m³)
    pub rho_0: f64,
    /// Reference temperature (°C)
    pub t_0: f64,
    /// Reference salinity (PSU)
    pub s_0: f64,
    /// Thermal expansion coefficient (1/°C)
    pub alpha: f64,
    /// Haline contraction coefficient (1/PSU)
    pub beta: f64,
}

impl Default for LinearEquationOfState {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearEquationOfState {
    /// Linear EOS about a cold cavity reference state: T₀ = -1.8°C, S₀ = 34.5 PSU.
    pub fn new() -> Self {
        Self {
            rho_0: 1027.8,
            t_0: -1.8,
            s_0: 34.5,
            alpha: 3.7e-5, // thermal expansion is weak near freezing
            beta: 7.8e-4,
        }
    }

    /// Create with custom reference state and coefficients.
    pub fn with_params(rho_0: f64, t_0: f64, s_0: f64, alpha: f64, beta: f64) -> Self {
        Self {
            rho_0,
            t_0,
            s_0,
            alpha,
            beta,
        }
    }

    /// Compute density using linear approximation.
    pub fn density(&self, temperature: f64, salinity: f64) -> f64 {
        self.rho_0
            * (1.0 - self.alpha * (temperature - self.t_0) + self.beta * (salinity - self.s_0))
    }
}

impl DensityEvaluator for LinearEquationOfState {
    fn compute_density(
        &self,
        block: &MeshPartition,
        density: &mut ColumnField,
    ) -> Result<(), CollaboratorError> {
        fill_density(block, density, |t, s, _| self.density(t, s))
    }
}

/// Evaluate `rho(T, S, zMid)` on every active level of every cell.
///
/// Levels below `maxLevelCell` are left at zero.
fn fill_density<F>(
    block: &MeshPartition,
    density: &mut ColumnField,
    rho: F,
) -> Result<(), CollaboratorError>
where
    F: Fn(f64, f64, f64) -> f64,
{
    let tracers = &block.active_tracers;
    let t_idx = tracers
        .index_of(TEMPERATURE)
        .ok_or_else(|| CollaboratorError::new(1, "active tracers have no temperature"))?;
    let s_idx = tracers
        .index_of(SALINITY)
        .ok_or_else(|| CollaboratorError::new(1, "active tracers have no salinity"))?;

    if density.n_cells() != block.n_cells() || density.n_levels() != block.n_vert_levels() {
        return Err(CollaboratorError::new(1, "density field has wrong shape"));
    }

    for cell in 0..block.n_cells() {
        let max_level = block.max_level_cell[cell];
        let temperature = tracers.column(t_idx, cell);
        let salinity = tracers.column(s_idx, cell);
        let z_mid = block.z_mid.column(cell);
        let out = density.column_mut(cell);

        for k in 0..max_level {
            out[k] = rho(temperature[k], salinity[k], z_mid[k]);
        }
        for value in &mut out[max_level..] {
            *value = 0.0;
        }
    }
    Ok(())
}
