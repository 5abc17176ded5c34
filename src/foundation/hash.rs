//! Deterministic id derivation.
//!
//! Every derived id in the engine goes through one of the named functions below so that
//! re-running propagation or a take over the same snapshot reproduces byte-identical ids.

use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::{PartId, PartInstanceId, PieceId, PieceInstanceId};

const XXH3_SEED: u64 = 0x5f0c_7a11_d3e9_42b1;

/// Seeded xxh3-128 hasher with length-prefixed string writes.
pub(crate) struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    pub(crate) fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_i64(&mut self, v: i64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn finish128(self) -> u128 {
        self.inner.digest128()
    }

    fn finish_hex(self) -> String {
        format!("{:032x}", self.finish128())
    }
}

// Domain tags keep original and continuation ids for the same (piece, part) pair apart.
const DOMAIN_ORIGINAL: u8 = 1;
const DOMAIN_CONTINUATION: u8 = 2;
const DOMAIN_PART_INSTANCE: u8 = 3;

/// Id of the PieceInstance materializing `piece` inside its own `part`.
pub fn original_instance_id(piece: &PieceId, part: &PartId) -> PieceInstanceId {
    let mut h = StableHasher::new();
    h.write_u8(DOMAIN_ORIGINAL);
    h.write_str(piece.as_str());
    h.write_str(part.as_str());
    PieceInstanceId(format!("pi_{}", h.finish_hex()))
}

/// Id of the continuation of the chain started by `origin` inside `part`.
///
/// Depends only on the originating piece and the hosting part, never on intermediate
/// continuations, so re-running propagation keeps ids (and per-instance overrides) stable.
pub fn continuation_id(origin: &PieceId, part: &PartId) -> PieceInstanceId {
    let mut h = StableHasher::new();
    h.write_u8(DOMAIN_CONTINUATION);
    h.write_str(origin.as_str());
    h.write_str(part.as_str());
    PieceInstanceId(format!("pi_{}", h.finish_hex()))
}

/// Id of the `playthrough`-th instance of `part` in a playlist.
pub fn part_instance_id(part: &PartId, playthrough: u64) -> PartInstanceId {
    let mut h = StableHasher::new();
    h.write_u8(DOMAIN_PART_INSTANCE);
    h.write_str(part.as_str());
    h.write_u64(playthrough);
    PartInstanceId(format!("partinst_{}", h.finish_hex()))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/hash.rs"]
mod tests;
