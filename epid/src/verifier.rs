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

//! The verifier context (spec.md §4.J): holds the group public key,
//! borrowed revocation lists, an optional basename, and an owned,
//! locally-mutated `VerifierRl`. [`VerifierCtx::verify`] implements
//! the exact check order spec.md §4.K lays out: group_rl, then
//! `BasicSignature` integrity, then `priv_rl`, then `sig_rl`'s
//! non-revoked proofs, then `verifier_rl`.

use crate::credential::MembershipCredential;
use crate::curve::scalar_mul_ct;
use crate::error::{EpidError, Result};
use crate::field::Fr;
use crate::groupkey::{split_group_pub_key, GroupPubKey};
use crate::hash::HashAlg;
use crate::member::{challenge, pairing_t_w};
use crate::pairing::PairingPrecomp;
use crate::revocation::{GroupRl, PrivRl, SigRl, VerifierRl};
use crate::signature::Signature;
use ark_bn254::{G1Affine, G1Projective, G2Projective};
use ark_ec::{AffineRepr, CurveGroup, PrimeGroup};
use ark_ff::{Field, PrimeField, Zero};

/// Per-verifier state (spec.md §4.J). Revocation lists are borrowed
/// for the lifetime `'a` of the calls that use them; `verifier_rl` is
/// owned since `blacklist_sig` mutates it locally.
pub struct VerifierCtx<'a> {
	pub_key: GroupPubKey,
	hash_alg: HashAlg,
	precomp: PairingPrecomp,
	priv_rl: Option<&'a PrivRl>,
	sig_rl: Option<&'a SigRl>,
	group_rl: Option<&'a GroupRl>,
	basename: Option<alloc::vec::Vec<u8>>,
	basename_hash: Option<G1Affine>,
	verifier_rl: Option<VerifierRl>,
}

impl<'a> VerifierCtx<'a> {
	/// Build a verifier context for `pub_key`: parses `hash_alg` from
	/// `gid`, derives the split-mode public key, and precomputes the
	/// four group-level pairing values (spec.md §4.D/§4.J).
	pub fn new(pub_key: GroupPubKey) -> Result<VerifierCtx<'a>> {
		let hash_alg = pub_key.gid.hash_alg()?;
		let split_pub_key = split_group_pub_key(&pub_key, hash_alg)?;
		let g1 = G1Projective::generator().into_affine();
		let g2 = G2Projective::generator().into_affine();
		let precomp =
			PairingPrecomp::new(&g1, &g2, &split_pub_key.h1, &split_pub_key.h2, &split_pub_key.w);
		Ok(VerifierCtx {
			pub_key: split_pub_key,
			hash_alg,
			precomp,
			priv_rl: None,
			sig_rl: None,
			group_rl: None,
			basename: None,
			basename_hash: None,
			verifier_rl: None,
		})
	}

	/// Set or clear the basename. Setting a basename invalidates the
	/// in-memory `verifier_rl` (spec.md §4.J: "set_basename ...
	/// invalidates the in-memory verifier_rl; caller must install a
	/// matching one").
	pub fn set_basename(&mut self, bsn: Option<&[u8]>) -> Result<()> {
		self.verifier_rl = None;
		match bsn {
			Some(bsn) => {
				self.basename_hash =
					Some(crate::curve::hash_to_curve_g1(bsn, self.hash_alg)?);
				self.basename = Some(bsn.to_vec());
			},
			None => {
				self.basename_hash = None;
				self.basename = None;
			},
		}
		Ok(())
	}

	/// Install a borrowed `PrivRl`, validating its `gid` matches this
	/// group (spec.md §4.J).
	pub fn set_priv_rl(&mut self, rl: &'a PrivRl) -> Result<()> {
		if rl.gid != self.pub_key.gid {
			return Err(EpidError::BadArg);
		}
		self.priv_rl = Some(rl);
		Ok(())
	}

	/// Install a borrowed `SigRl`, validating its `gid` matches this
	/// group.
	pub fn set_sig_rl(&mut self, rl: &'a SigRl) -> Result<()> {
		if rl.gid != self.pub_key.gid {
			return Err(EpidError::BadArg);
		}
		self.sig_rl = Some(rl);
		Ok(())
	}

	/// Install a borrowed `GroupRl`. `GroupRl` carries no per-group
	/// `gid` of its own (it is a flat list of revoked groups), so there
	/// is no header to validate beyond the decode step already done.
	pub fn set_group_rl(&mut self, rl: &'a GroupRl) {
		self.group_rl = Some(rl);
	}

	/// Install an owned `VerifierRl`, validating its `gid` and, if a
	/// basename is set, that `bsn_hash` matches the cached basename
	/// hash (spec.md §4.J).
	pub fn set_verifier_rl(&mut self, rl: VerifierRl) -> Result<()> {
		if rl.gid != self.pub_key.gid {
			return Err(EpidError::BadArg);
		}
		if let Some(bsn_hash) = self.basename_hash {
			if rl.bsn_hash != bsn_hash {
				return Err(EpidError::BadArg);
			}
		}
		self.verifier_rl = Some(rl);
		Ok(())
	}

	/// The current verifier-local blacklist, if one is installed.
	pub fn verifier_rl(&self) -> Option<&VerifierRl> {
		self.verifier_rl.as_ref()
	}

	/// Verify `sig` over `msg` (spec.md §4.J/§4.K). Check order: group
	/// revocation, `BasicSignature` integrity (point validity plus the
	/// Fiat-Shamir challenge), private-key revocation, signature
	/// revocation (non-revoked proofs plus the direct `K == K_i`
	/// check), then the verifier-local blacklist. The first failing
	/// check's error is returned; `Ok(())` means the signature is
	/// valid and not revoked by any installed list.
	pub fn verify(&self, sig: &Signature, msg: &[u8]) -> Result<()> {
		if let Some(group_rl) = self.group_rl {
			if group_rl.contains(&self.pub_key.gid) {
				return Err(EpidError::SigRevokedInGroupRl);
			}
		}

		let sigma0 = &sig.sigma0;
		if !sigma0.b.is_on_curve() || !sigma0.b.is_in_correct_subgroup_assuming_on_curve() {
			return Err(EpidError::SigInvalid);
		}
		if !sigma0.k.is_on_curve() || !sigma0.k.is_in_correct_subgroup_assuming_on_curve() {
			return Err(EpidError::SigInvalid);
		}
		if sigma0.k.is_zero() {
			return Err(EpidError::SigInvalid);
		}
		match self.basename_hash {
			Some(bsn_hash) if sigma0.b != bsn_hash => return Err(EpidError::SigInvalid),
			_ => {},
		}

		let c_prime = self.recompute_challenge(sig, msg)?;
		if c_prime != sigma0.c {
			return Err(EpidError::SigInvalid);
		}

		if let Some(priv_rl) = self.priv_rl {
			for f_i in &priv_rl.f {
				if scalar_mul_ct(&sigma0.b, f_i).into_affine() == sigma0.k {
					return Err(EpidError::SigRevokedInPrivRl);
				}
			}
		}

		if let Some(sig_rl) = self.sig_rl {
			// The direct `K == K_i` match is unconditional (spec.md §4.J
			// step 5) and must be checked against every entry regardless
			// of how many non-revoked proofs `sig` carries.
			for entry in &sig_rl.entries {
				if entry.k == sigma0.k {
					return Err(EpidError::SigRevokedInSigRl);
				}
			}
			if sig.sigma_i.len() != sig_rl.entries.len() {
				return Err(EpidError::SigInvalid);
			}
			for (entry, nrp) in sig_rl.entries.iter().zip(sig.sigma_i.iter()) {
				if crate::revocation::verify_nrp(
					self.hash_alg,
					&self.pub_key.gid,
					&sigma0.b,
					&sigma0.k,
					entry,
					nrp,
				) {
					return Err(EpidError::SigRevokedInSigRl);
				}
			}
		}

		if let Some(verifier_rl) = &self.verifier_rl {
			if verifier_rl.contains(&sigma0.k) {
				return Err(EpidError::SigRevokedInVerifierRl);
			}
		}

		Ok(())
	}

	/// Recompute the Fiat-Shamir challenge exactly as [`crate::member::
	/// MemberCtx::sign`] did, from the public transcript alone: `R1' =
	/// [sf]*B - [c]*K` (the response bound to `K = [f]*B`), `R2'`
	/// recovered from the GT response equation `e_h1_g2^sf * e_h2_w^sa
	/// * e_h2_g2^sb * e(T,g2)^{-sx} * Y^{-c}` where `Y = e(T,w) /
	/// e(g1,g2)` (spec.md §4.I step 4/5, §4.J step 3). See
	/// `DESIGN.md` for the algebraic derivation showing this
	/// reconstructs the signer's original commitment exactly when the
	/// signature is honest.
	fn recompute_challenge(&self, sig: &Signature, msg: &[u8]) -> Result<Fr> {
		let sigma0 = &sig.sigma0;
		let g2 = G2Projective::generator().into_affine();

		let r1 = (scalar_mul_ct(&sigma0.b, &sigma0.sf)
			- scalar_mul_ct(&sigma0.k, &sigma0.c))
		.into_affine();

		let e_t_g2 = crate::pairing::pairing(&sigma0.t, &g2);
		let e_t_w = pairing_t_w(&sigma0.t, &self.pub_key.w);
		let y = e_t_w * self.precomp.e_g1_g2.inverse().ok_or(EpidError::Math)?;

		let neg_sx = -sigma0.sx;
		let neg_c = -sigma0.c;
		let r2 = self.precomp.e_h1_g2.pow(PrimeField::into_bigint(sigma0.sf))
			* self.precomp.e_h2_w.pow(PrimeField::into_bigint(sigma0.sa))
			* self.precomp.e_h2_g2.pow(PrimeField::into_bigint(sigma0.sb))
			* e_t_g2.pow(PrimeField::into_bigint(neg_sx))
			* y.pow(PrimeField::into_bigint(neg_c));

		Ok(challenge(self.hash_alg, &self.pub_key, &sigma0.b, &sigma0.k, &sigma0.t, &r1, &r2, msg))
	}

	/// Run `verify`; on success, append `sig`'s `K` to the verifier-
	/// local blacklist for the current basename and advance its
	/// version (spec.md §4.J: "only if it returns valid, append sig's
	/// K to verifier_rl ... increment rl_ver by one"). If `verify`
	/// already rejected the signature for another reason, that reason
	/// is returned unchanged and `verifier_rl` is untouched.
	pub fn blacklist_sig(&mut self, sig: &Signature, msg: &[u8]) -> Result<()> {
		self.verify(sig, msg)?;
		let bsn_hash = self.basename_hash.ok_or(EpidError::OutOfSequence)?;
		let rl = self.verifier_rl.get_or_insert_with(|| VerifierRl::new(self.pub_key.gid, bsn_hash));
		rl.append(sig.sigma0.k);
		Ok(())
	}

	/// `true` iff `sig1` and `sig2` have equal `B` and equal `K`
	/// (spec.md §4.J). Two signatures by the same member under the
	/// same basename link this way; random-basename signatures never
	/// do, since `B` is freshly random each time (spec.md §9's resolved
	/// Open Question — documented in `DESIGN.md`, not silently carried
	/// forward).
	pub fn are_sigs_linked(sig1: &Signature, sig2: &Signature) -> bool {
		sig1.sigma0.b == sig2.sigma0.b && sig1.sigma0.k == sig2.sigma0.k
	}

	pub fn pub_key(&self) -> &GroupPubKey {
		&self.pub_key
	}
}

/// Build a self-consistent `(GroupPubKey, PrivKey)` fixture for this
/// module's own unit tests: plays the issuer role to produce a
/// credential satisfying `e(A,w)*e(A,g2)^x == e(g1,g2)*e(h1,g2)^f`,
/// the same relation `crate::member` documents. `tests/e2e.rs` builds
/// its own copy of this helper, since integration tests compile
/// against the crate without `cfg(test)`.
#[cfg(test)]
mod test_fixtures {
	use super::*;
	use crate::credential::PrivKey;
	use crate::groupkey::Gid;
	use ark_ff::UniformRand;
	use rand_core::RngCore;

	pub fn sample_gid() -> Gid {
		let mut bytes = [0u8; 16];
		bytes[2..].copy_from_slice(b"issuer-group-id");
		Gid(bytes)
	}

	pub fn issue_credential(rng: &mut impl RngCore) -> (GroupPubKey, PrivKey) {
		let g1 = G1Projective::generator();
		let g2 = G2Projective::generator();
		let gamma = Fr::rand(rng);
		let h1 = (g1 * Fr::rand(rng)).into_affine();
		let h2 = (g1 * Fr::rand(rng)).into_affine();
		let w = (g2 * gamma).into_affine();

		let f = Fr::rand(rng);
		let x = Fr::rand(rng);
		let rhs = g1 + G1Projective::from(h1) * f;
		let a_scalar = (gamma + x).inverse().expect("gamma + x invertible with overwhelming probability");
		let a = (rhs * a_scalar).into_affine();

		let gid = sample_gid();
		let pub_key = GroupPubKey::new(gid, h1, h2, w).unwrap();
		let credential = MembershipCredential { gid, a, x };
		(pub_key, PrivKey { credential, f })
	}
}
