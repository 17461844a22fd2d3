//! RNG utilities shared across the simulator.
//!
//! Every stochastic choice in the crate goes through these functions so
//! that callers can inject a seeded `rand::Rng` and get reproducible runs.

use rand::Rng;

/// Uniform integer in `[min, max]` inclusive.
///
/// Generic over `?Sized` so callers holding a `&mut dyn RngCore` (trait
/// objects behind `Replacer`) can use this the same as a concrete `StdRng`.
pub fn rand_int<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    rng.gen_range(min..=max)
}

/// Uniform integer in `[0, max]` inclusive.
pub fn rand_int_upto<R: Rng + ?Sized>(rng: &mut R, max: u32) -> u32 {
    rand_int(rng, 0, max)
}

/// Rejection sampling: redraws from `[min, max]` while `taken` returns true
/// for the candidate. Used for fresh pids that must not collide with a live
/// process.
pub fn rand_int_unique<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32, taken: impl Fn(u32) -> bool) -> u32 {
    loop {
        let candidate = rand_int(rng, min, max);
        if !taken(candidate) {
            return candidate;
        }
    }
}

/// `true` with probability `p`.
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen_bool(p.clamp(0.0, 1.0))
}

/// Uniform element of `seq`. Panics if `seq` is empty — callers must
/// guarantee non-empty input.
pub fn pick<'a, R: Rng + ?Sized, T>(rng: &mut R, seq: &'a [T]) -> &'a T {
    let idx = rand_int_upto(rng, (seq.len() - 1) as u32) as usize;
    &seq[idx]
}
