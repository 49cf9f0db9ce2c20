//! External potential fields
//!
//! A level picks one background field that accelerates every gravity body in
//! addition to mutual Barnes-Hut attraction. The field never depends on the
//! mass of the body being accelerated.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::game::constants::physics::DEGENERATE_DISTANCE;
use crate::game::constants::potential as tuning;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Potential {
    /// Free space
    #[default]
    None,
    /// Softened central point mass, Keplerian orbits
    PointMass { center: Vec2, gm: f32, eps: f32 },
    /// Linear restoring force, amplitude-independent period
    Harmonic { center: Vec2, omega2: f32 },
    /// Cored logarithmic halo, asymptotically flat rotation curve
    Logarithmic { center: Vec2, v0: f32, rc: f32 },
    /// Navarro-Frenk-White halo, spherically-symmetric enclosed mass
    Nfw {
        center: Vec2,
        rho_s: f32,
        r_s: f32,
        g: f32,
        eps: f32,
    },
}

impl Potential {
    /// Field for a level id, tuned to the world size. Unknown ids are free space.
    pub fn for_level(level: i32, world_center: Vec2, world_width: f32) -> Self {
        match level {
            0 => Potential::None,
            1 => Potential::PointMass {
                center: world_center,
                gm: tuning::POINT_MASS_GM,
                eps: tuning::POINT_MASS_EPS,
            },
            2 => Potential::Harmonic {
                center: world_center,
                omega2: tuning::HARMONIC_OMEGA2,
            },
            3 => Potential::Logarithmic {
                center: world_center,
                v0: tuning::LOG_V0,
                rc: world_width * tuning::LOG_CORE_FRACTION,
            },
            4 => Potential::Nfw {
                center: world_center,
                rho_s: tuning::NFW_RHO_S,
                r_s: world_width * tuning::NFW_SCALE_FRACTION,
                g: tuning::NFW_G,
                eps: tuning::NFW_EPS,
            },
            _ => Potential::None,
        }
    }

    /// Acceleration at a world-space position
    pub fn acceleration_at(&self, pos: Vec2) -> Vec2 {
        match *self {
            Potential::None => Vec2::ZERO,
            Potential::PointMass { center, gm, eps } => {
                let dr = center - pos;
                let denom = (dr.length_sq() + eps * eps).powf(1.5);
                if denom <= 0.0 {
                    return Vec2::ZERO;
                }
                dr * (gm / denom)
            }
            Potential::Harmonic { center, omega2 } => (pos - center) * -omega2,
            Potential::Logarithmic { center, v0, rc } => {
                let dr = pos - center;
                let r2 = dr.length_sq();
                if r2.sqrt() < DEGENERATE_DISTANCE {
                    return Vec2::ZERO;
                }
                dr * (-v0 * v0 / (r2 + rc * rc))
            }
            Potential::Nfw {
                center,
                rho_s,
                r_s,
                g,
                eps,
            } => {
                let dr = pos - center;
                let r = dr.length();
                if r < DEGENERATE_DISTANCE {
                    return Vec2::ZERO;
                }
                let m_enc = nfw_enclosed_mass(r, rho_s, r_s);
                let r2_soft = r * r + eps * eps;
                dr * (-g * m_enc / (r2_soft * r2_soft.sqrt()))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Potential::None => "No Potential",
            Potential::PointMass { .. } => "Point Mass",
            Potential::Harmonic { .. } => "Harmonic Oscillator",
            Potential::Logarithmic { .. } => "Logarithmic",
            Potential::Nfw { .. } => "NFW Profile",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Potential::None => "Empty space. Bodies feel only each other's gravity.",
            Potential::PointMass { .. } => {
                "Softened central mass: a = -GM r / (r^2 + eps^2)^1.5. Keplerian orbits."
            }
            Potential::Harmonic { .. } => {
                "Linear restoring force: a = -omega^2 r. Every orbit has the same period."
            }
            Potential::Logarithmic { .. } => {
                "Cored logarithmic halo: V = v0^2 ln(r^2 + rc^2). Flat rotation curve."
            }
            Potential::Nfw { .. } => {
                "Navarro-Frenk-White dark matter halo: rho ~ 1 / (r (1 + r/rs)^2)."
            }
        }
    }
}

/// `M(<r) = 4 pi rho_s r_s^3 [ln(1+x) - x/(1+x)]`, `x = r / r_s`
pub fn nfw_enclosed_mass(r: f32, rho_s: f32, r_s: f32) -> f32 {
    let x = r / r_s;
    4.0 * PI * rho_s * r_s * r_s * r_s * ((1.0 + x).ln() - x / (1.0 + x))
}
