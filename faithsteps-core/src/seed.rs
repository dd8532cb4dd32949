//! Stable seed derivation for procedural trail layouts.
//!
//! A journey's trail seed is the FNV-1a 64-bit hash of its first milestone id.
//! Generator streams are keyed off that seed with HMAC-SHA256 and a domain tag,
//! so separate consumers never share a stream.

use hmac::{Hmac, Mac};
use sha2::Sha256;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// FNV-1a 64-bit hash.
#[must_use]
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Seed used for a trail whose first milestone has the given id.
#[must_use]
pub fn trail_seed(first_milestone_id: &str) -> u64 {
    fnv1a64(first_milestone_id.as_bytes())
}

/// Derive an independent generator seed for `domain_tag` from a trail seed.
#[must_use]
pub fn derive_stream_seed(seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length, so construction cannot fail for an 8-byte key.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&seed.to_le_bytes()) else {
        return seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv_matches_reference_vectors() {
        assert_eq!(fnv1a64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a64(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn trail_seed_is_stable_per_id() {
        assert_eq!(trail_seed("emmaus-start"), trail_seed("emmaus-start"));
        assert_ne!(trail_seed("emmaus-start"), trail_seed("jericho-start"));
    }

    #[test]
    fn stream_seeds_are_domain_separated() {
        let seed = trail_seed("exodus-rameses");
        assert_eq!(
            derive_stream_seed(seed, b"terrain"),
            derive_stream_seed(seed, b"terrain")
        );
        assert_ne!(
            derive_stream_seed(seed, b"terrain"),
            derive_stream_seed(seed, b"labels")
        );
    }
}
