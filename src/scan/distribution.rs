//! scan::distribution — placement of scan points along one axis.
//!
//! Purpose
//! -------
//! Map integer grid indices to parameter values. Uniform grids use cell
//! centres; non-uniform grids use a power law anchored at an origin (the best
//! fit or a bracketed minimum) so that points cluster where the profile is
//! most interesting.
//!
//! Key behaviors
//! -------------
//! - [`PointDistributor::value`] places index `i` of `n` on one side of the
//!   origin:
//!   - `power >= 1`: `origin + (bound − origin)·(i/n)^power`;
//!   - `power < 1`: `bound + (origin − bound)·((n − i)/n)^power`, the same
//!     law anchored at the bound.
//!   Both laws send `i = 0` to the origin and `i = n` to the bound, are
//!   monotonic in `i`, and put the densest points next to the origin with
//!   gaps widening toward the bound. At `power = 0.5` the distance from the
//!   origin grows roughly like the square root of the index near the bound
//!   and linearly near the origin.
//! - [`PointDistributor::split`] shares a budget between the two sides in
//!   proportion to the room on each side of the origin.
//! - [`cell_centers`] is the uniform lattice used whenever `power == 1` in
//!   one dimension and for every multi-dimensional grid.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower < upper` and `lower <= origin <= upper` (the origin is clamped on
//!   construction).

/// Which side of the origin an index lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointDistributor {
    origin: f64,
    lower: f64,
    upper: f64,
    power: f64,
}

impl PointDistributor {
    pub fn new(origin: f64, lower: f64, upper: f64, power: f64) -> Self {
        Self { origin: origin.clamp(lower, upper), lower, upper, power }
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Value of index `i` out of `n` on `side`; a side with no points maps
    /// everything to the origin.
    pub fn value(&self, side: Side, i: usize, n: usize) -> f64 {
        if n == 0 || i == 0 {
            return self.origin;
        }
        let bound = match side {
            Side::Lower => self.lower,
            Side::Upper => self.upper,
        };
        if i >= n {
            return bound;
        }
        let t = i as f64 / n as f64;
        if self.power >= 1.0 {
            self.origin + (bound - self.origin) * t.powf(self.power)
        } else {
            bound + (self.origin - bound) * (1.0 - t).powf(self.power)
        }
    }

    /// Value for a signed offset from the origin: positive offsets use the
    /// upper side with `n_upper` points, negative ones the lower side.
    pub fn offset_value(&self, offset: isize, n_lower: usize, n_upper: usize) -> f64 {
        match offset {
            0 => self.origin,
            o if o > 0 => self.value(Side::Upper, o.unsigned_abs(), n_upper),
            o => self.value(Side::Lower, o.unsigned_abs(), n_lower),
        }
    }

    /// Split `points` into `(n_lower, n_upper)` proportionally to the room on
    /// each side of the origin.
    pub fn split(&self, points: usize) -> (usize, usize) {
        let width = self.upper - self.lower;
        if !(width > 0.0) {
            return (0, points);
        }
        let share = (self.origin - self.lower) / width;
        let n_lower = ((points as f64 * share).floor() as usize).min(points);
        (n_lower, points - n_lower)
    }

    /// `k` ascending values including the origin.
    ///
    /// The `k − 1` non-origin points are split between the sides; a side
    /// with room keeps at least one point when `k >= 3`, so the sequence
    /// reaches both bounds.
    pub fn axis_values(&self, k: usize) -> Vec<f64> {
        if k == 0 {
            return Vec::new();
        }
        let rest = k - 1;
        let (mut n_lower, mut n_upper) = self.split(rest);
        if rest >= 2 {
            if n_lower == 0 && self.origin > self.lower {
                n_lower = 1;
                n_upper -= 1;
            } else if n_upper == 0 && self.origin < self.upper {
                n_upper = 1;
                n_lower -= 1;
            }
        }
        let mut values = Vec::with_capacity(k);
        values.extend((1..=n_lower).rev().map(|i| self.value(Side::Lower, i, n_lower)));
        values.push(self.origin);
        values.extend((1..=n_upper).map(|i| self.value(Side::Upper, i, n_upper)));
        values
    }
}

/// `n` cell centres `lower + (i + ½)(upper − lower)/n`.
pub fn cell_centers(lower: f64, upper: f64, n: usize) -> Vec<f64> {
    let width = (upper - lower) / n as f64;
    (0..n).map(|i| lower + (i as f64 + 0.5) * width).collect()
}

/// Smallest `k` with `k^dim >= budget`.
pub fn ceil_root(budget: usize, dim: usize) -> usize {
    if dim <= 1 {
        return budget;
    }
    let mut k = floor_root(budget, dim);
    while !pow_at_least(k, dim, budget) {
        k += 1;
    }
    k
}

/// Largest `k` with `k^dim <= budget`.
pub fn floor_root(budget: usize, dim: usize) -> usize {
    if dim <= 1 {
        return budget;
    }
    let mut k = (budget as f64).powf(1.0 / dim as f64).round() as usize;
    while k > 0 && pow_at_least(k, dim, budget + 1) {
        k -= 1;
    }
    while !pow_at_least(k + 1, dim, budget + 1) {
        k += 1;
    }
    k
}

/// `k^dim >= target`, saturating on overflow.
fn pow_at_least(k: usize, dim: usize, target: usize) -> bool {
    let exp = u32::try_from(dim).unwrap_or(u32::MAX);
    k.checked_pow(exp).map_or(true, |v| v >= target)
}
