//! Integer dice helpers over any `rand::Rng`.
//!
//! Every probabilistic decision in the engine goes through these so that a
//! seeded generator reproduces a run exactly.

use rand::Rng;

/// Uniform integer in `0..max`. Returns 0 when `max <= 1`.
pub fn random2<R: Rng + ?Sized>(rng: &mut R, max: i32) -> i32 {
    if max <= 1 {
        0
    } else {
        rng.gen_range(0..max)
    }
}

/// Average of `rolls` draws, biased toward the middle of `0..max`.
///
/// The result never exceeds `max - 1`.
pub fn random2avg<R: Rng + ?Sized>(rng: &mut R, max: i32, rolls: i32) -> i32 {
    let rolls = rolls.max(1);
    let mut sum = random2(rng, max);
    for _ in 1..rolls {
        sum += random2(rng, max + 1);
    }
    (sum / rolls).min((max - 1).max(0))
}

/// Uniform integer in `low..=high`.
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, low: i32, high: i32) -> i32 {
    if high <= low {
        low
    } else {
        rng.gen_range(low..=high)
    }
}

pub fn one_chance_in<R: Rng + ?Sized>(rng: &mut R, n: i32) -> bool {
    n <= 1 || random2(rng, n) == 0
}

/// `x` chances out of `y`.
pub fn x_chance_in_y<R: Rng + ?Sized>(rng: &mut R, x: i32, y: i32) -> bool {
    if x <= 0 {
        false
    } else if x >= y {
        true
    } else {
        random2(rng, y) < x
    }
}

pub fn coinflip<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_bool(0.5)
}

/// Integer division that rounds up with probability equal to the remainder.
pub fn div_rand_round<R: Rng + ?Sized>(rng: &mut R, num: i32, den: i32) -> i32 {
    if den <= 0 {
        return num;
    }
    let rem = num.rem_euclid(den);
    num.div_euclid(den) + i32::from(random2(rng, den) < rem)
}
