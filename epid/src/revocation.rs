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

//! The four revocation lists spec.md §3/§6 names, plus the
//! non-revoked-proof Sigma-protocol spec.md §4.K describes.
//!
//! Revocation lists installed on a [`crate::verifier::VerifierCtx`]
//! are borrowed for the duration of a `verify` call (spec.md §3, §5);
//! [`crate::verifier::VerifierCtx`] owns its `verifier_rl` since that
//! one is locally mutated.

use crate::curve::scalar_mul_ct;
use crate::field::Fr;
use crate::groupkey::Gid;
use crate::hash::HashAlg;
use crate::signature::NonRevokedProof;
use ark_bn254::G1Affine;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::UniformRand;
use rand_core::RngCore;

/// Revoked member secrets (spec.md §3, §6): `gid || rl_ver || n1 ||
/// n1 x Fp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivRl {
	pub gid: Gid,
	pub rl_ver: u32,
	pub f: alloc::vec::Vec<Fr>,
}

/// Revoked `(B, K)` signature pairs (spec.md §3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigRlEntry {
	pub b: G1Affine,
	pub k: G1Affine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigRl {
	pub gid: Gid,
	pub rl_ver: u32,
	pub entries: alloc::vec::Vec<SigRlEntry>,
}

/// Revoked group identifiers (spec.md §3, §6): no per-group `gid`
/// header of its own, just a version and a flat list of revoked
/// `gid`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRl {
	pub rl_ver: u32,
	pub gids: alloc::vec::Vec<Gid>,
}

impl GroupRl {
	pub fn contains(&self, gid: &Gid) -> bool {
		self.gids.iter().any(|g| g == gid)
	}
}

/// The verifier-local blacklist (spec.md §3, §4.J), keyed by `(gid,
/// basename)`. Unlike the other three lists this one is produced and
/// consumed locally; it has no CA signature and is owned (not
/// borrowed) by the verifier context that maintains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierRl {
	pub gid: Gid,
	/// `hash_to_curve_g1(bsn)` for the basename this blacklist is
	/// scoped to.
	pub bsn_hash: G1Affine,
	pub rl_ver: u32,
	pub k: alloc::vec::Vec<G1Affine>,
}

impl VerifierRl {
	/// A fresh, empty blacklist for `(gid, bsn_hash)` (spec.md §4.J,
	/// "Initial: empty (rl_ver = 0, n4 = 0)").
	pub fn new(gid: Gid, bsn_hash: G1Affine) -> VerifierRl {
		VerifierRl { gid, bsn_hash, rl_ver: 0, k: alloc::vec::Vec::new() }
	}

	/// `n4`, the number of blacklisted `K`s, as it appears on the wire.
	pub fn n4(&self) -> u32 {
		self.k.len() as u32
	}

	pub fn contains(&self, k: &G1Affine) -> bool {
		self.k.iter().any(|entry| entry == k)
	}

	/// Append `k` and advance `rl_ver` (spec.md §4.J: "blacklist_sig
	/// appends: (rl_ver += 1, n4 += 1, K appended)").
	pub fn append(&mut self, k: G1Affine) {
		self.k.push(k);
		self.rl_ver += 1;
	}
}

/// Generate a [`NonRevokedProof`] tying the signer's secret `f` (bound
/// to `B`/`K` via `K = [f]*B`) to a specific `SigRl` entry `(b_i, k_i)`,
/// per the exact Sigma-protocol spec.md §4.K names:
///
/// `T' = [r]*b_i`, `c' = H(gid || b || k || b_i || k_i || T')`,
/// `s = r + c'*f mod p`.
///
/// `r` is a fresh nonce drawn from `rng` and zeroized once the proof
/// is computed. Note on soundness direction: with this construction
/// `[s]*b_i - [c']*k_i == T'` holds iff `f*b_i == k_i`, i.e. iff the
/// signer's secret *is* the one behind the revoked entry — see
/// [`verify_nrp`].
pub fn generate_nrp(
	hash_alg: HashAlg,
	gid: &Gid,
	b: &G1Affine,
	k: &G1Affine,
	sig_rl_entry: &SigRlEntry,
	f: &Fr,
	rng: &mut impl RngCore,
) -> NonRevokedProof {
	let mut r = Fr::rand(rng);
	let t_prime = scalar_mul_ct(&sig_rl_entry.b, &r).into_affine();

	let c_prime = challenge(hash_alg, gid, b, k, sig_rl_entry, &t_prime);
	let s = r + c_prime * f;
	r = Fr::from(0u64);
	let _ = r;
	NonRevokedProof { t_prime, c_prime, s }
}

/// Verify a [`NonRevokedProof`] against `(b, k)` (the signer's
/// basename/pseudonym point) and the `SigRl` entry it was issued
/// against: recompute `c'` and check `[s]*b_i - [c']*k_i == T'`
/// (spec.md §4.K).
///
/// Expanding `s = r + c'*f` shows `[s]*b_i - [c']*k_i == T' + c'*([f]*
/// b_i - k_i)`, which equals `T'` iff `[f]*b_i == k_i` — i.e. iff the
/// signer's secret *is* the secret behind this revoked entry. So
/// `true` here means this entry **confirms revocation**; `false`
/// means this entry does not implicate the signer (the caller must
/// still check every other entry, and the unconditional `K == K_i`
/// check spec.md §4.J step 5 names separately).
pub fn verify_nrp(
	hash_alg: HashAlg,
	gid: &Gid,
	b: &G1Affine,
	k: &G1Affine,
	sig_rl_entry: &SigRlEntry,
	proof: &NonRevokedProof,
) -> bool {
	let expected_c = challenge(hash_alg, gid, b, k, sig_rl_entry, &proof.t_prime);
	if expected_c != proof.c_prime {
		return false;
	}
	let lhs = scalar_mul_ct(&sig_rl_entry.b, &proof.s)
		- scalar_mul_ct(&sig_rl_entry.k, &proof.c_prime);
	lhs.into_affine() == proof.t_prime
}

fn challenge(
	hash_alg: HashAlg,
	gid: &Gid,
	b: &G1Affine,
	k: &G1Affine,
	sig_rl_entry: &SigRlEntry,
	t_prime: &G1Affine,
) -> Fr {
	use crate::curve::g1_to_be_bytes;
	crate::hash::hash_to_field_fr(
		hash_alg,
		&[
			&gid.0,
			&g1_to_be_bytes(b),
			&g1_to_be_bytes(k),
			&g1_to_be_bytes(&sig_rl_entry.b),
			&g1_to_be_bytes(&sig_rl_entry.k),
			&g1_to_be_bytes(t_prime),
		],
	)
}

#[cfg(test)]
mod test {
	use super::*;
	use ark_ec::PrimeGroup;
	use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};

	fn sample_gid() -> Gid {
		let mut bytes = [0u8; 16];
		bytes[2..].copy_from_slice(b"issuer-group-id");
		Gid(bytes)
	}

	#[test]
	fn nrp_confirms_revocation_when_secret_matches_entry() {
		let mut rng = ChaCha20Rng::seed_from_u64(7);
		let gid = sample_gid();
		let f = Fr::rand(&mut rng);
		let b = ark_bn254::G1Projective::generator().into_affine();
		let k = scalar_mul_ct(&b, &f).into_affine();

		// The revoked entry's own (B_i, K_i) is bound to this same `f`:
		// K_i = [f]*B_i, so the signer's secret is the one revoked here.
		let revoked_b = (ark_bn254::G1Projective::generator() * Fr::rand(&mut rng)).into_affine();
		let revoked_k = scalar_mul_ct(&revoked_b, &f).into_affine();
		let entry = SigRlEntry { b: revoked_b, k: revoked_k };

		let proof = generate_nrp(HashAlg::Sha256, &gid, &b, &k, &entry, &f, &mut rng);
		assert!(verify_nrp(HashAlg::Sha256, &gid, &b, &k, &entry, &proof));
	}

	#[test]
	fn nrp_does_not_confirm_revocation_for_unrelated_entry() {
		let mut rng = ChaCha20Rng::seed_from_u64(11);
		let gid = sample_gid();
		let f = Fr::rand(&mut rng);
		let b = ark_bn254::G1Projective::generator().into_affine();
		let k = scalar_mul_ct(&b, &f).into_affine();
		let entry = SigRlEntry {
			b: ark_bn254::G1Projective::generator().into_affine(),
			k: scalar_mul_ct(&ark_bn254::G1Projective::generator().into_affine(), &Fr::rand(&mut rng))
				.into_affine(),
		};
		let proof = generate_nrp(HashAlg::Sha256, &gid, &b, &k, &entry, &f, &mut rng);
		assert!(!verify_nrp(HashAlg::Sha256, &gid, &b, &k, &entry, &proof));
	}

	#[test]
	fn nrp_rejects_tampered_proof() {
		let mut rng = ChaCha20Rng::seed_from_u64(13);
		let gid = sample_gid();
		let f = Fr::rand(&mut rng);
		let b = ark_bn254::G1Projective::generator().into_affine();
		let k = scalar_mul_ct(&b, &f).into_affine();
		let revoked_b = (ark_bn254::G1Projective::generator() * Fr::rand(&mut rng)).into_affine();
		let entry = SigRlEntry { b: revoked_b, k: scalar_mul_ct(&revoked_b, &f).into_affine() };
		let mut proof = generate_nrp(HashAlg::Sha256, &gid, &b, &k, &entry, &f, &mut rng);
		proof.s = proof.s + Fr::from(1u64);
		assert!(!verify_nrp(HashAlg::Sha256, &gid, &b, &k, &entry, &proof));
	}

	#[test]
	fn group_rl_contains() {
		let gid = sample_gid();
		let rl = GroupRl { rl_ver: 1, gids: alloc::vec![gid] };
		assert!(rl.contains(&gid));
		let mut other = gid;
		other.0[2] ^= 0xFF;
		assert!(!rl.contains(&other));
	}

	#[test]
	fn verifier_rl_append_advances_version_and_count() {
		let gid = sample_gid();
		let bsn_hash = ark_bn254::G1Projective::generator().into_affine();
		let mut rl = VerifierRl::new(gid, bsn_hash);
		assert_eq!(rl.n4(), 0);
		assert_eq!(rl.rl_ver, 0);
		let k1 = ark_bn254::G1Projective::generator().into_affine();
		rl.append(k1);
		assert_eq!(rl.n4(), 1);
		assert_eq!(rl.rl_ver, 1);
		assert!(rl.contains(&k1));
	}
}
