//! L-BFGS construction for the profiling minimizer.
//!
//! Only the history size and the two convergence tolerances are set here;
//! the start point and the iteration cap belong to the executor and are
//! applied in [`solve`](super::run::solve). Tolerances argmin rejects come
//! back as [`OptError`](crate::optimization::errors::OptError).
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    profile_minimizer::{
        traits::MinimizerOptions,
        types::{Cost, DEFAULT_LBFGS_MEM, Grad, Theta},
    },
};

/// L-BFGS over free-parameter vectors using `line_search`.
///
/// A `None` tolerance in `opts` keeps argmin's default for that criterion.
pub fn lbfgs<L>(line_search: L, opts: &MinimizerOptions) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    let memory = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let tols = &opts.tols;
    let mut solver = LBFGS::new(line_search, memory);
    solver = match tols.tol_grad {
        Some(tol) => solver.with_tolerance_grad(tol)?,
        None => solver,
    };
    solver = match tols.tol_cost {
        Some(tol) => solver.with_tolerance_cost(tol)?,
        None => solver,
    };
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::profile_minimizer::{
        traits::{LineSearcher, Tolerances},
        types::{HagerZhangLS, MoreThuenteLS},
    };

    #[test]
    // Purpose
    // -------
    // Both line searches produce a solver with default or explicit memory.
    //
    // Given
    // -----
    // - Gradient and cost tolerances set; `lbfgs_mem` absent, then 11.
    //
    // Expect
    // ------
    // - Every construction succeeds.
    fn solver_builds_for_both_line_searches() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), Some(1e-8), Some(50)).unwrap();
        let short = MinimizerOptions::new(tols, LineSearcher::HagerZhang, false, None).unwrap();
        let long = MinimizerOptions::new(tols, LineSearcher::MoreThuente, false, Some(11)).unwrap();

        // Act / Assert
        for opts in [&short, &long] {
            assert!(lbfgs(HagerZhangLS::new(), opts).is_ok());
            assert!(lbfgs(MoreThuenteLS::new(), opts).is_ok());
        }
    }

    #[test]
    // Purpose
    // -------
    // An iteration cap alone is enough to build a solver.
    //
    // Given
    // -----
    // - Tolerances with only `max_iter`.
    //
    // Expect
    // ------
    // - `Ok(_)` with argmin's default tolerances in place.
    fn iteration_cap_alone_builds() {
        // Arrange
        let tols = Tolerances::new(None, None, Some(5)).unwrap();
        let opts = MinimizerOptions::new(tols, LineSearcher::MoreThuente, false, None).unwrap();

        // Act / Assert
        assert!(lbfgs(MoreThuenteLS::new(), &opts).is_ok());
    }
}
