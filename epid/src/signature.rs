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

//! The signature data types spec.md §3/§6 names: [`BasicSignature`]
//! (the Sigma-protocol core), [`NonRevokedProof`] (one per `SigRl`
//! entry), and [`Signature`] (a `BasicSignature` plus the trailing
//! list of non-revoked proofs). Wire encoding lives in
//! [`crate::serialize`]; the Sigma-protocol math for `NonRevokedProof`
//! lives in [`crate::revocation`].

use crate::field::Fr;
use ark_bn254::G1Affine;

/// The core of an EPID signature (spec.md §3): `B`, `K`, `T` in `G1`,
/// challenge `c` and responses `sx`, `sf`, `sa`, `sb` in `Fr`.
///
/// `B` is basename-dependent: a fresh random point per signature in
/// unlinkable mode, or `hash_to_curve_g1(bsn)` when a basename is set
/// (making signatures by the same member under that basename
/// linkable via equal `B`/`K`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicSignature {
	pub b: G1Affine,
	pub k: G1Affine,
	pub t: G1Affine,
	pub c: Fr,
	pub sx: Fr,
	pub sf: Fr,
	pub sa: Fr,
	pub sb: Fr,
}

/// Ties a `BasicSignature` to one `SigRl` entry `(B_i, K_i)` (spec.md
/// §4.K): `T' = [r]*B_i`, `c' = H(transcript)`, `s = r + c'*f`. The
/// proof verifies (see [`crate::revocation::verify_nrp`]) iff the
/// signer's `f` *is* the secret behind this entry; a verifier checks
/// every `SigRl` entry and revokes on the first one that verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonRevokedProof {
	pub t_prime: G1Affine,
	pub c_prime: Fr,
	pub s: Fr,
}

/// A full EPID signature: the basic signature plus one
/// [`NonRevokedProof`] per `SigRl` entry active when the signature was
/// produced (spec.md §3). `rl_ver` records the `SigRl` version the
/// signer proved against.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
	pub sigma0: BasicSignature,
	pub rl_ver: u32,
	pub sigma_i: alloc::vec::Vec<NonRevokedProof>,
}

impl Signature {
	/// `n2`, the number of non-revoked proofs carried, as it appears
	/// on the wire (spec.md §3/§6).
	pub fn n2(&self) -> u32 {
		self.sigma_i.len() as u32
	}
}
