//! scan::stitch — polar marching along a 2-D contour.
//!
//! Purpose
//! -------
//! Trace the `deltaNLL = level` contour around the best fit sector by sector,
//! with a two-probe stencil that steps along the boundary instead of
//! scanning a full grid.
//!
//! Key behaviors
//! -------------
//! - The plane around the best fit is split into `sectors` equal angular
//!   sectors `[θmin, θmax)`.
//! - **Touch**: along the ray at `θmin`, evaluate the exit point of the POI
//!   box, then bisect the radius between `step = √(area/points)` and the exit
//!   until the bracket is no wider than `step` (at most `points/sectors`
//!   iterations).
//! - **March**: from the touch point `P` at angle `θ`, probe
//!   `P − l·(cos(θ−α), sin(θ−α))` (inside, forward) and
//!   `P + l·(cos(θ+α), sin(θ+α))` (outside, forward) with `α = π/4` and
//!   `l = 2√2·π·(rmax + rmin)/points`; the zero of the linear interpolation
//!   of `deltaNLL − level` between the probes is the next contour point.
//! - A sector closes once the unwrapped angle reaches `θmax`. It stays open
//!   when the angle stops increasing, when the probes cannot be
//!   interpolated, or when the step budget `4·points + 16` is used up.
//! - Both stencil points sit `l·sin α` ahead of `P` on the radial line, so the next
//!   point is always ahead in angle and the trace is single-valued in angle.
//!   Regions that are not star-shaped around the best fit are traced as if
//!   they were: boundary pieces hidden behind others are skipped.
//!
//! Invariants & assumptions
//! ------------------------
//! - Accepted contour points of a sector have strictly increasing unwrapped
//!   polar angle.
//! - Every probe is committed through the per-point rule; accepted points
//!   are committed with `deltaNLL = level` and [`PointStatus::ContourPoint`],
//!   recording the nuisance values left by the outer point of their stencil.
//! - The march is sequential, so the point-index range filter does not apply.
//!
//! Conventions
//! -----------
//! - Angles are measured around the best fit, counter-clockwise from the
//!   first scanned axis.
use std::f64::consts::{FRAC_PI_4, PI, TAU};

use tracing::{debug, info, warn};

use crate::model::NegLogLikelihood;
use crate::scan::{context::ScanContext, point::PointStatus};

const PROBE_SCALE: f64 = 2.0 * std::f64::consts::SQRT_2 * PI;

/// One accepted point on the contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourVertex {
    pub x: f64,
    pub y: f64,
    /// Unwrapped polar angle around the best fit.
    pub theta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContourSector {
    pub index: usize,
    pub theta_min: f64,
    pub theta_max: f64,
    /// Where the radial bisection met the contour.
    pub touch: (f64, f64),
    pub probe_length: f64,
    pub points: Vec<ContourVertex>,
    /// The march reached `theta_max`.
    pub closed: bool,
}

/// Output of the `stitch2d` algorithm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub level: f64,
    pub sectors: Vec<ContourSector>,
}

impl Contour {
    pub fn is_closed(&self) -> bool {
        !self.sectors.is_empty() && self.sectors.iter().all(|s| s.closed)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &ContourVertex> {
        self.sectors.iter().flat_map(|s| s.points.iter())
    }
}

struct Geometry {
    origin: (f64, f64),
    lower: (f64, f64),
    upper: (f64, f64),
    level: f64,
    points: usize,
    sectors: usize,
}

impl Geometry {
    fn step(&self) -> f64 {
        let area = (self.upper.0 - self.lower.0) * (self.upper.1 - self.lower.1);
        (area / self.points as f64).sqrt()
    }

    /// Distance from the origin to the box boundary along `theta`.
    fn exit_radius(&self, theta: f64) -> f64 {
        let axis = |origin: f64, lo: f64, hi: f64, d: f64| -> f64 {
            if d > f64::EPSILON {
                (hi - origin) / d
            } else if d < -f64::EPSILON {
                (lo - origin) / d
            } else {
                f64::INFINITY
            }
        };
        let rx = axis(self.origin.0, self.lower.0, self.upper.0, theta.cos());
        let ry = axis(self.origin.1, self.lower.1, self.upper.1, theta.sin());
        rx.min(ry).max(0.0)
    }

    fn at(&self, r: f64, theta: f64) -> (f64, f64) {
        (self.origin.0 + r * theta.cos(), self.origin.1 + r * theta.sin())
    }

    fn angle(&self, p: (f64, f64)) -> f64 {
        (p.1 - self.origin.1).atan2(p.0 - self.origin.0)
    }
}

/// Representative of `raw` (mod 2π) closest to `reference`.
fn unwrap_angle(raw: f64, reference: f64) -> f64 {
    raw + TAU * ((reference - raw) / TAU).round()
}

/// Trace the `level` contour of a 2-D scan in `sectors` angular sectors.
pub fn scan_stitch<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, points: usize, level: f64, sectors: usize,
) -> Contour {
    let (x_lo, x_hi) = ctx.poi_bounds(0);
    let (y_lo, y_hi) = ctx.poi_bounds(1);
    let geo = Geometry {
        origin: (ctx.poi_best_fit(0), ctx.poi_best_fit(1)),
        lower: (x_lo, y_lo),
        upper: (x_hi, y_hi),
        level,
        points: points.max(1),
        sectors: sectors.max(1),
    };
    let contour = ctx.scoped(|c| {
        c.fix_pois(true);
        let sectors = (0..geo.sectors).map(|u| trace_sector(c, &geo, u)).collect();
        Contour { level, sectors }
    });
    let n_closed = contour.sectors.iter().filter(|s| s.closed).count();
    info!(
        level,
        sectors = contour.sectors.len(),
        closed = n_closed,
        vertices = contour.vertices().count(),
        "stitch2d finished"
    );
    contour
}

/// `deltaNLL − level` at `p`, committing the probe; `+∞` when invalid.
fn probe<M: NegLogLikelihood>(ctx: &mut ScanContext<'_, M>, geo: &Geometry, p: (f64, f64)) -> f64 {
    let eval = ctx.evaluate_point(&[p.0, p.1]);
    ctx.commit_eval(eval);
    if eval.is_valid() { eval.delta_nll - geo.level } else { f64::INFINITY }
}

fn trace_sector<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, geo: &Geometry, index: usize,
) -> ContourSector {
    let theta_min = index as f64 * TAU / geo.sectors as f64;
    let theta_max = (index + 1) as f64 * TAU / geo.sectors as f64;
    let step = geo.step();

    // Touch the contour along the ray at theta_min.
    let mut r_min = step;
    let mut r_max = geo.exit_radius(theta_min);
    if probe(ctx, geo, geo.at(r_max, theta_min)) < 0.0 {
        warn!(sector = index, "contour is not enclosed by the scan range; widen the range");
    }
    let budget = geo.points / geo.sectors;
    let mut iterations = 0;
    while r_max - r_min > step {
        let r = 0.5 * (r_min + r_max);
        if probe(ctx, geo, geo.at(r, theta_min)) < 0.0 {
            r_min = r;
        } else {
            r_max = r;
        }
        iterations += 1;
        if iterations >= budget {
            warn!(sector = index, iterations, "radial bisection toward the contour did not converge");
            break;
        }
    }
    let touch = geo.at(0.5 * (r_min + r_max), theta_min);
    let probe_length = PROBE_SCALE * (r_max + r_min) / geo.points as f64;
    info!(sector = index, x = touch.0, y = touch.1, probe_length, "touched contour");

    // March along the contour.
    let mut vertices = Vec::new();
    let mut closed = false;
    let mut p = touch;
    let mut theta = unwrap_angle(geo.angle(p), theta_min);
    for _ in 0..4 * geo.points + 16 {
        if theta >= theta_max {
            closed = true;
            break;
        }
        let inner = (
            p.0 - probe_length * (theta - FRAC_PI_4).cos(),
            p.1 - probe_length * (theta - FRAC_PI_4).sin(),
        );
        let z1 = probe(ctx, geo, inner);
        let outer = (
            p.0 + probe_length * (theta + FRAC_PI_4).cos(),
            p.1 + probe_length * (theta + FRAC_PI_4).sin(),
        );
        let z2 = probe(ctx, geo, outer);
        if !(z1.is_finite() && z2.is_finite()) || z1 == z2 {
            warn!(sector = index, z1, z2, "contour probes cannot be interpolated; sector left open");
            break;
        }
        let t = z1 / (z1 - z2);
        let next = (inner.0 + (outer.0 - inner.0) * t, inner.1 + (outer.1 - inner.1) * t);
        let next_theta = unwrap_angle(geo.angle(next), theta);
        if next_theta <= theta {
            debug!(sector = index, theta, next_theta, "polar angle stopped increasing");
            break;
        }
        // Nuisances keep the outer stencil point's profile.
        ctx.set_pois(&[next.0, next.1]);
        ctx.commit(geo.level, ctx.p_value(geo.level), PointStatus::ContourPoint);
        vertices.push(ContourVertex { x: next.0, y: next.1, theta: next_theta });
        p = next;
        theta = next_theta;
    }
    if !closed {
        warn!(sector = index, theta, theta_max, "contour sector was not closed");
    }
    ContourSector { index, theta_min, theta_max, touch, probe_length, points: vertices, closed }
}
