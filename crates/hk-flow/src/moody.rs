//! Moody diagram data.
//!
//! Produces the curves of a Moody chart as plain series. Rendering (log-log
//! axes, annotations) belongs to whoever consumes [`MoodyDiagram`].

use crate::error::FlowResult;
use crate::friction::{FrictionEquation, FrictionFactorSolver};
use crate::regime::{LAMINAR_MAX_RE, TURBULENT_MIN_RE, is_transition};
use hk_core::numeric::geomspace;
use hk_solver::RootFinder;
use serde::Serialize;

/// Relative roughness curves drawn in the turbulent region.
pub const DEFAULT_ROUGHNESS_CURVES: [f64; 20] = [
    0.0, 1e-6, 5e-6, 1e-5, 5e-5, 1e-4, 2e-4, 4e-4, 6e-4, 8e-4, 1e-3, 2e-3, 4e-3, 6e-3, 8e-3,
    1.5e-2, 2e-2, 3e-2, 4e-2, 5e-2,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// f = 64/Re, solid
    Laminar,
    /// f = 64/Re continued through 2000..4000, dashed
    Transition,
    /// Colebrook at one relative roughness
    Turbulent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    /// Used for points inside the transition band
    Triangle,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoodySeries {
    pub kind: SeriesKind,
    /// Set for turbulent curves only
    pub relative_roughness: Option<f64>,
    pub reynolds: Vec<f64>,
    pub friction_factor: Vec<f64>,
}

impl MoodySeries {
    pub fn label(&self) -> String {
        match (self.kind, self.relative_roughness) {
            (SeriesKind::Turbulent, Some(rr)) => format!("{rr:.5}"),
            (SeriesKind::Turbulent, None) => "turbulent".to_string(),
            (SeriesKind::Laminar, _) => "Laminar".to_string(),
            (SeriesKind::Transition, _) => "Transition".to_string(),
        }
    }
}

/// Operating point overlaid on the chart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MoodyPoint {
    pub reynolds: f64,
    pub friction_factor: f64,
    pub marker: MarkerShape,
}

impl MoodyPoint {
    /// Picks the triangle marker when `reynolds` is in the transition band.
    pub fn new(reynolds: f64, friction_factor: f64) -> Self {
        let marker = if is_transition(reynolds) {
            MarkerShape::Triangle
        } else {
            MarkerShape::Circle
        };
        Self {
            reynolds,
            friction_factor,
            marker,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AxisLimits {
    pub reynolds: (f64, f64),
    pub friction_factor: (f64, f64),
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self {
            reynolds: (600.0, 1e8),
            friction_factor: (0.008, 0.10),
        }
    }
}

/// Sampling of the chart.
#[derive(Clone, Debug)]
pub struct MoodyOptions {
    pub laminar_re_min: f64,
    pub laminar_points: usize,
    pub transition_points: usize,
    pub turbulent_re_max: f64,
    pub turbulent_points: usize,
    pub roughness_curves: Vec<f64>,
}

impl Default for MoodyOptions {
    fn default() -> Self {
        Self {
            laminar_re_min: 600.0,
            laminar_points: 20,
            transition_points: 20,
            turbulent_re_max: 1e8,
            turbulent_points: 50,
            roughness_curves: DEFAULT_ROUGHNESS_CURVES.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoodyDiagram {
    pub series: Vec<MoodySeries>,
    pub point: Option<MoodyPoint>,
    pub axes: AxisLimits,
}

impl MoodyDiagram {
    /// Compute every curve of the chart.
    pub fn build<R: RootFinder>(
        solver: &FrictionFactorSolver<R>,
        options: &MoodyOptions,
    ) -> FlowResult<Self> {
        let laminar_re = geomspace(options.laminar_re_min, LAMINAR_MAX_RE, options.laminar_points)?;
        let transition_re = geomspace(LAMINAR_MAX_RE, TURBULENT_MIN_RE, options.transition_points)?;
        let turbulent_re = geomspace(
            TURBULENT_MIN_RE,
            options.turbulent_re_max,
            options.turbulent_points,
        )?;

        let mut series = Vec::with_capacity(options.roughness_curves.len() + 2);
        series.push(MoodySeries {
            kind: SeriesKind::Laminar,
            relative_roughness: None,
            friction_factor: laminar_re
                .iter()
                .map(|&re| solver.friction_factor(re, 0.0, FrictionEquation::Laminar))
                .collect::<FlowResult<_>>()?,
            reynolds: laminar_re,
        });
        series.push(MoodySeries {
            kind: SeriesKind::Transition,
            relative_roughness: None,
            friction_factor: transition_re
                .iter()
                .map(|&re| solver.friction_factor(re, 0.0, FrictionEquation::Laminar))
                .collect::<FlowResult<_>>()?,
            reynolds: transition_re,
        });

        for &rr in &options.roughness_curves {
            let friction_factor = turbulent_re
                .iter()
                .map(|&re| solver.friction_factor(re, rr, FrictionEquation::Colebrook))
                .collect::<FlowResult<_>>()?;
            series.push(MoodySeries {
                kind: SeriesKind::Turbulent,
                relative_roughness: Some(rr),
                reynolds: turbulent_re.clone(),
                friction_factor,
            });
        }

        Ok(Self {
            series,
            point: None,
            axes: AxisLimits::default(),
        })
    }

    /// Overlay an operating point.
    pub fn with_point(mut self, point: MoodyPoint) -> Self {
        self.point = Some(point);
        self
    }

    /// Turbulent curves only.
    pub fn turbulent(&self) -> impl Iterator<Item = &MoodySeries> {
        self.series
            .iter()
            .filter(|s| s.kind == SeriesKind::Turbulent)
    }

    /// Long-format CSV, one row per sample; the overlay point (if any) is a
    /// `point` row.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("series,relative_roughness,reynolds,friction_factor\n");
        for s in &self.series {
            let kind = match s.kind {
                SeriesKind::Laminar => "laminar",
                SeriesKind::Transition => "transition",
                SeriesKind::Turbulent => "turbulent",
            };
            let rr = s.relative_roughness.map(|v| v.to_string()).unwrap_or_default();
            for (re, f) in s.reynolds.iter().zip(&s.friction_factor) {
                csv.push_str(&format!("{kind},{rr},{re},{f}\n"));
            }
        }
        if let Some(p) = &self.point {
            csv.push_str(&format!("point,,{},{}\n", p.reynolds, p.friction_factor));
        }
        csv
    }

    pub fn to_json(&self) -> FlowResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
