//! Pipe operating point: Reynolds number, relative roughness, friction factor
//! and Darcy-Weisbach head loss per unit length.

use crate::common::check_finite;
use crate::error::{FlowError, FlowResult};
use crate::regime::{FlowRegime, RegimeClassifier, regime};
use hk_core::units::{Area, Length, VolumeRate, constants::G0_MPS2, us};
use hk_solver::RootFinder;
use rand::Rng;
use serde::Serialize;

/// Reynolds number `v d / nu` (any consistent unit system).
pub fn reynolds_number(diameter: f64, velocity: f64, kinematic_viscosity: f64) -> f64 {
    velocity * diameter / kinematic_viscosity
}

/// Darcy-Weisbach head loss per unit length, `f (1/d) v² / 2g`.
///
/// Dimensionless (m/m, equivalently ft/ft). SI inputs.
pub fn head_loss_per_length(friction_factor: f64, diameter_m: f64, velocity_mps: f64) -> f64 {
    friction_factor / diameter_m * velocity_mps.powi(2) / (2.0 * G0_MPS2)
}

/// Circular pipe with absolute wall roughness.
#[derive(Debug, Clone)]
pub struct Pipe {
    name: String,
    /// Pipe inner diameter
    pub diameter: Length,
    /// Surface roughness (absolute)
    pub roughness: Length,
}

/// Everything computed for one flow through one pipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipeOperatingPoint {
    pub reynolds: f64,
    pub relative_roughness: f64,
    pub velocity_mps: f64,
    pub friction_factor: f64,
    /// Head loss per unit length (m/m)
    pub head_loss_per_length: f64,
    pub regime: FlowRegime,
}

impl Pipe {
    /// Create a new pipe.
    pub fn new(name: String, diameter: Length, roughness: Length) -> FlowResult<Self> {
        check_finite(diameter.value, "pipe diameter")?;
        check_finite(roughness.value, "pipe roughness")?;
        if diameter.value <= 0.0 {
            return Err(FlowError::Domain {
                what: "pipe diameter",
                value: diameter.value,
            });
        }
        if roughness.value < 0.0 {
            return Err(FlowError::Domain {
                what: "pipe roughness",
                value: roughness.value,
            });
        }
        Ok(Self {
            name,
            diameter,
            roughness,
        })
    }

    /// Pipe from inch diameter and micro-inch roughness.
    pub fn from_us_customary(
        name: String,
        diameter_in: f64,
        roughness_microinch: f64,
    ) -> FlowResult<Self> {
        Self::new(
            name,
            us::inch(diameter_in),
            us::microinch(roughness_microinch),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Roughness divided by diameter.
    pub fn relative_roughness(&self) -> f64 {
        self.roughness.value / self.diameter.value
    }

    /// Flow cross-section.
    pub fn area(&self) -> Area {
        self.diameter * self.diameter * (std::f64::consts::PI / 4.0)
    }

    /// Mean velocity (m/s) for a volumetric flow.
    pub fn velocity(&self, flow_rate: VolumeRate) -> f64 {
        flow_rate.value / self.area().value
    }

    /// Reynolds number for a volumetric flow and kinematic viscosity (m²/s).
    pub fn reynolds(&self, flow_rate: VolumeRate, kinematic_viscosity_m2ps: f64) -> f64 {
        reynolds_number(
            self.diameter.value,
            self.velocity(flow_rate),
            kinematic_viscosity_m2ps,
        )
    }

    /// Classify the flow and compute friction factor and head loss.
    pub fn operating_point<R, G>(
        &self,
        flow_rate: VolumeRate,
        kinematic_viscosity_m2ps: f64,
        classifier: &RegimeClassifier<R>,
        rng: &mut G,
    ) -> FlowResult<PipeOperatingPoint>
    where
        R: RootFinder,
        G: Rng + ?Sized,
    {
        check_finite(flow_rate.value, "flow rate")?;
        check_finite(kinematic_viscosity_m2ps, "kinematic viscosity")?;
        if kinematic_viscosity_m2ps <= 0.0 {
            return Err(FlowError::Domain {
                what: "kinematic viscosity",
                value: kinematic_viscosity_m2ps,
            });
        }

        // Head loss does not depend on direction; classify on |v|.
        let velocity = self.velocity(flow_rate).abs();
        let reynolds = reynolds_number(self.diameter.value, velocity, kinematic_viscosity_m2ps);
        let relative_roughness = self.relative_roughness();
        let friction_factor = classifier.classify(reynolds, relative_roughness, rng)?;
        let head_loss = head_loss_per_length(friction_factor, self.diameter.value, velocity);
        check_finite(head_loss, "head loss")?;

        Ok(PipeOperatingPoint {
            reynolds,
            relative_roughness,
            velocity_mps: velocity,
            friction_factor,
            head_loss_per_length: head_loss,
            regime: regime(reynolds),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hk_core::units::{constants::water_nu_m2ps, m, m3ps};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pipe_rejects_bad_geometry() {
        assert!(Pipe::new("zero".into(), m(0.0), m(0.0)).is_err());
        assert!(Pipe::new("neg".into(), m(0.1), m(-1e-6)).is_err());
        assert!(Pipe::new("nan".into(), m(f64::NAN), m(0.0)).is_err());
    }

    #[test]
    fn relative_roughness_and_area() {
        let pipe = Pipe::new("test".into(), m(0.1), m(1e-4)).unwrap();
        assert!((pipe.relative_roughness() - 1e-3).abs() < 1e-15);
        assert!((pipe.area().value - 7.853_981_633_974_483e-3).abs() < 1e-15);
    }

    #[test]
    fn reynolds_scales_with_flow() {
        let pipe = Pipe::new("test".into(), m(0.05), m(0.0)).unwrap();
        let nu = 1e-6;
        let re1 = pipe.reynolds(m3ps(1e-3), nu);
        let re2 = pipe.reynolds(m3ps(2e-3), nu);
        assert!((re2 / re1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn operating_point_laminar_head_loss() {
        // d = 0.1 m, v = 0.01 m/s, nu = 1e-6 -> Re = 1000
        let pipe = Pipe::new("test".into(), m(0.1), m(1e-5)).unwrap();
        let q = m3ps(0.01 * pipe.area().value);
        let mut rng = StdRng::seed_from_u64(0);
        let op = pipe
            .operating_point(q, 1e-6, &RegimeClassifier::new(), &mut rng)
            .unwrap();

        assert_eq!(op.regime, FlowRegime::Laminar);
        assert!((op.reynolds - 1000.0).abs() < 1e-9);
        assert!((op.friction_factor - 0.064).abs() < 1e-12);
        let expected = 0.064 / 0.1 * 0.01f64.powi(2) / (2.0 * G0_MPS2);
        assert!((op.head_loss_per_length - expected).abs() < 1e-15);
    }

    #[test]
    fn us_customary_turbulent_point() {
        // 2 in pipe, 60 µin roughness, 100 gpm of water
        let pipe = Pipe::from_us_customary("water".into(), 2.0, 60.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let op = pipe
            .operating_point(us::gpm(100.0), water_nu_m2ps(), &RegimeClassifier::new(), &mut rng)
            .unwrap();

        assert_eq!(op.regime, FlowRegime::Turbulent);
        assert!((op.relative_roughness - 3e-5).abs() < 1e-15);
        // v = 3.12 m/s, Re ~ 1.55e5
        assert!((op.velocity_mps - 3.112).abs() < 0.01);
        assert!(op.reynolds > 1.5e5 && op.reynolds < 1.6e5);
        assert!(op.friction_factor > 0.015 && op.friction_factor < 0.02);
        assert!(op.head_loss_per_length > 0.1 && op.head_loss_per_length < 0.2);
    }

    #[test]
    fn rejects_non_positive_viscosity() {
        let pipe = Pipe::new("test".into(), m(0.1), m(0.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let err = pipe
            .operating_point(m3ps(1e-3), 0.0, &RegimeClassifier::new(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, FlowError::Domain { .. }));
    }
}
