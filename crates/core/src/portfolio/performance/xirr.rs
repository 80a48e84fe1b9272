//! Newton-Raphson solver for the money-weighted return (XIRR).
//!
//! ```text
//! f(r)  = Σ CF_i / (1 + r)^t_i
//! f'(r) = Σ -t_i × CF_i / (1 + r)^(t_i + 1)
//! r_new = r - f(r) / f'(r)
//! ```
//!
//! `t_i` is the time in years from the first flow. Negative flows are money
//! the investor paid in, positive flows are money received.

use crate::constants::{XIRR_INITIAL_GUESS, XIRR_MAX_ITERATIONS, XIRR_TOLERANCE};

/// A flow expressed as `(amount, years since the first flow)`.
pub type TimedFlow = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XirrSolution {
    /// Annual rate as a fraction (0.1 = 10%).
    pub rate: f64,
    pub converged: bool,
    pub iterations: u32,
}

fn npv_and_derivative(flows: &[TimedFlow], rate: f64) -> (f64, f64) {
    let base = 1.0 + rate;
    flows
        .iter()
        .fold((0.0, 0.0), |(npv, dnpv), &(amount, years)| {
            let discount = base.powf(years);
            (
                npv + amount / discount,
                dnpv - years * amount / (discount * base),
            )
        })
}

/// Solves for the rate at which the discounted flows sum to zero.
///
/// Never fails: when the iteration cannot continue (flat derivative,
/// non-finite values) or runs out of iterations, the last finite iterate is
/// returned with `converged = false`.
pub fn solve_xirr(flows: &[TimedFlow]) -> XirrSolution {
    let mut rate = XIRR_INITIAL_GUESS;

    for iteration in 1..=XIRR_MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(flows, rate);

        if !npv.is_finite() || !dnpv.is_finite() || dnpv == 0.0 {
            return XirrSolution {
                rate,
                converged: false,
                iterations: iteration - 1,
            };
        }

        let mut next = rate - npv / dnpv;
        if !next.is_finite() {
            return XirrSolution {
                rate,
                converged: false,
                iterations: iteration,
            };
        }
        // 1 + r must stay positive for fractional powers to be real
        if next <= -1.0 {
            next = (rate - 1.0) / 2.0;
        }

        if (next - rate).abs() < XIRR_TOLERANCE {
            return XirrSolution {
                rate: next,
                converged: true,
                iterations: iteration,
            };
        }

        rate = next;
    }

    XirrSolution {
        rate,
        converged: false,
        iterations: XIRR_MAX_ITERATIONS,
    }
}
