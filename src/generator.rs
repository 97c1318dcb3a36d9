//! Synthetic fixed-mode rule corpora.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default generator seed.
pub const DEFAULT_SEED: u64 = 1;

/// Protocol written into every generated rule (TCP).
pub const GENERATED_PROTOCOL: u8 = 0x6;

/// Generate `count` fixed-mode rule lines, deterministic for a given seed.
///
/// Sources fall in `141.20.0.0/16`, destinations in `1.2.0.0/16`, and
/// both ports are exact.
pub fn generate_rules(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| generate_rule(&mut rng)).collect()
}

fn generate_rule<R: Rng>(rng: &mut R) -> String {
    let src: [u8; 2] = rng.gen();
    let dst: [u8; 2] = rng.gen();
    let sport: u16 = rng.gen();
    let dport: u16 = rng.gen();
    format!(
        "@141.20.{}.{}/16 1.2.{}.{}/16 {} : {} {} : {} {:#x}/0xFF",
        src[0], src[1], dst[0], dst[1], sport, sport, dport, dport, GENERATED_PROTOCOL
    )
}
