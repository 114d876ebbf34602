//! Probability helpers for play resolution.
//!
//! Every probability the engine draws against goes through [`checked`] so a
//! bad rating blend surfaces as an error instead of a skewed game.

use rand::Rng;

use crate::error::InternalError;

/// Returns `p` unchanged, or an error when it is NaN or outside [0, 1].
pub fn checked(context: &'static str, p: f64) -> Result<f64, InternalError> {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return Err(InternalError::ProbabilityOutOfRange { context, value: p });
    }
    Ok(p)
}

/// Bernoulli draw against a checked probability.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, context: &'static str, p: f64) -> Result<bool, InternalError> {
    let p = checked(context, p)?;
    Ok(rng.gen::<f64>() < p)
}

/// Logistic curve centred on 0, used to turn rating gaps into odds.
#[inline]
pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Shifts a base probability by a rating edge (positive favours success).
///
/// `edge` is the ratio of attacker to defender strength minus one; `scale`
/// controls how strongly it moves the odds. The result stays in (0, 1) for
/// any base in (0, 1).
pub fn adjust(base: f64, edge: f64, scale: f64) -> f64 {
    let base = base.clamp(1e-6, 1.0 - 1e-6);
    let logit = (base / (1.0 - base)).ln();
    logistic(logit + edge * scale)
}
