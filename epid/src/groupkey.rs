/*
 * Copyright 2025 by Ideal Labs, LLC
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! [`Gid`] and [`GroupPubKey`] (spec.md §3/§4.G): the 16-octet group
//! identifier (whose first two octets encode the hash algorithm) and
//! the bundle `(gid, h1, h2, w)` every member and verifier context is
//! built around.

use crate::curve::{g1_from_be_bytes, g1_to_be_bytes, g2_from_be_bytes, hash_to_curve_g1, G1_BYTE_LEN};
use crate::error::{EpidError, Result};
use crate::hash::HashAlg;
use ark_bn254::{G1Affine, G2Affine};
use ark_ff::Zero;

/// 16-octet group identifier. Octets 0-1 encode [`HashAlg`]; octets
/// 2-15 are an opaque issuer-assigned identifier (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gid(pub [u8; 16]);

impl Gid {
	pub fn hash_alg(&self) -> Result<HashAlg> {
		HashAlg::from_u16(u16::from_be_bytes([self.0[0], self.0[1]]))
	}
}

/// `(gid, h1, h2, w)` (spec.md §3). Construction validates the
/// invariants spec.md §3 states: `h1`, `h2` are non-identity and
/// on-curve (checked by [`crate::curve::g1_from_be_bytes`] at decode
/// time, or explicitly here when points arrive already decoded); `w`
/// is on-curve and in the prime-order subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPubKey {
	pub gid: Gid,
	pub h1: G1Affine,
	pub h2: G1Affine,
	pub w: G2Affine,
}

impl GroupPubKey {
	/// Build from already-decoded points, re-checking the non-identity
	/// invariant `decode` alone does not enforce (identity is a valid
	/// `G1Affine` value, just not a valid `h1`/`h2`).
	pub fn new(gid: Gid, h1: G1Affine, h2: G1Affine, w: G2Affine) -> Result<GroupPubKey> {
		if h1.is_zero() || h2.is_zero() {
			return Err(EpidError::SigInvalid);
		}
		Ok(GroupPubKey { gid, h1, h2, w })
	}

	/// The canonical big-endian encoding of `h1`, as split-key
	/// derivation hashes the *encoded* point, not the field elements
	/// directly (spec.md §3, "split group public key").
	pub fn h1_bytes(&self) -> [u8; G1_BYTE_LEN] {
		g1_to_be_bytes(&self.h1)
	}
}

/// Compute the split-mode `h1' = hash_to_curve_g1(h1_bytes, hash_alg)`
/// and return a `GroupPubKey` with `h1` replaced by `h1'` (spec.md §3,
/// §4.G). All split-mode signing and verification uses the returned
/// key in place of the original.
pub fn split_group_pub_key(pub_key: &GroupPubKey, hash_alg: HashAlg) -> Result<GroupPubKey> {
	let h1_prime = hash_to_curve_g1(&pub_key.h1_bytes(), hash_alg)?;
	GroupPubKey::new(pub_key.gid, h1_prime, pub_key.h2, pub_key.w)
}

/// Decode `h1`/`h2`/`w` from their canonical wire encodings and build
/// a validated [`GroupPubKey`] (the form a verifier loads a
/// group-public-key file into, spec.md §6).
pub fn decode_group_pub_key(
	gid: Gid,
	h1_bytes: &[u8; G1_BYTE_LEN],
	h2_bytes: &[u8; G1_BYTE_LEN],
	w_bytes: &[u8; crate::curve::G2_BYTE_LEN],
) -> Result<GroupPubKey> {
	let h1 = g1_from_be_bytes(h1_bytes)?;
	let h2 = g1_from_be_bytes(h2_bytes)?;
	let w = g2_from_be_bytes(w_bytes)?;
	GroupPubKey::new(gid, h1, h2, w)
}
