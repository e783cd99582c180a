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

//! Membership credentials (spec.md §3). Issuer-side join verification
//! that *produces* a credential is out of scope (spec.md §1, §2 row
//! H); this module only carries the credential a member already holds.

use crate::field::Fr;
use crate::groupkey::Gid;
use ark_bn254::G1Affine;
use ark_ff::Zero;
use zeroize::Zeroize;

/// `(gid, A, x)`: the credential an issuer grants a member, satisfying
/// the EPID relation with the member's own secret `f` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipCredential {
	pub gid: Gid,
	pub a: G1Affine,
	pub x: Fr,
}

/// A credential plus the member's own secret `f`. `x` and `f` are the
/// two scalars a member must never leak; both are zeroized on drop
/// (spec.md §5, §9).
#[derive(Clone)]
pub struct PrivKey {
	pub credential: MembershipCredential,
	pub f: Fr,
}

impl Drop for PrivKey {
	fn drop(&mut self) {
		// `ark_ff::Fp` does not implement `zeroize::Zeroize`; overwrite
		// with the additive identity instead, matching the "scrub on
		// drop" requirement of spec.md §5/§9 without depending on an
		// arkworks feature flag this workspace does not enable.
		self.credential.x = Fr::zero();
		self.f = Fr::zero();
	}
}

/// A capability an embedder injects to derive a full [`PrivKey`] from
/// a [`CompressedPrivKey`] and the group public key. The derivation
/// itself is issuer-defined and out of scope (spec.md §1), the same
/// "abstract oracle" treatment spec.md gives the TPM and CA-signature
/// interfaces (spec.md §1, §4.E).
pub trait CompressedKeyExpander {
	fn expand(
		&self,
		compressed: &CompressedPrivKey,
		pub_key: &crate::groupkey::GroupPubKey,
	) -> crate::error::Result<PrivKey>;
}

/// The shorter wire form spec.md §3 names, from which a [`PrivKey`]
/// can be derived given the group public key and a
/// [`CompressedKeyExpander`]. Holds a 32-byte issuer-derived seed.
#[derive(Clone)]
pub struct CompressedPrivKey {
	pub gid: Gid,
	pub seed: [u8; 32],
}

impl Zeroize for CompressedPrivKey {
	fn zeroize(&mut self) {
		self.seed.zeroize();
	}
}

impl Drop for CompressedPrivKey {
	fn drop(&mut self) {
		self.zeroize();
	}
}

impl CompressedPrivKey {
	/// Derive the full [`PrivKey`] via an injected expander capability.
	pub fn expand(
		&self,
		pub_key: &crate::groupkey::GroupPubKey,
		expander: &impl CompressedKeyExpander,
	) -> crate::error::Result<PrivKey> {
		expander.expand(self, pub_key)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::error::EpidError;
	use crate::groupkey::GroupPubKey;
	use ark_ec::{AffineRepr, CurveGroup, PrimeGroup};
	use ark_std::UniformRand;

	fn sample_gid() -> Gid {
		let mut bytes = [0u8; 16];
		bytes[2..].copy_from_slice(b"issuer-group-id");
		Gid(bytes)
	}

	struct FixedExpander(PrivKey);

	impl CompressedKeyExpander for FixedExpander {
		fn expand(
			&self,
			_compressed: &CompressedPrivKey,
			_pub_key: &GroupPubKey,
		) -> crate::error::Result<PrivKey> {
			Ok(self.0.clone())
		}
	}

	#[test]
	fn compressed_key_expands_via_capability() {
		let mut rng = ark_std::test_rng();
		let gid = sample_gid();
		let a = ark_bn254::G1Projective::generator().into_affine();
		let credential = MembershipCredential { gid, a, x: Fr::rand(&mut rng) };
		let priv_key = PrivKey { credential, f: Fr::rand(&mut rng) };
		let expander = FixedExpander(priv_key.clone());
		let compressed = CompressedPrivKey { gid, seed: [7u8; 32] };
		let h1 = a;
		let h2 = a;
		let w = ark_bn254::G2Projective::generator().into_affine();
		let pub_key = GroupPubKey::new(gid, h1, h2, w).unwrap();
		let expanded = compressed.expand(&pub_key, &expander).unwrap();
		assert_eq!(expanded.f, priv_key.f);
	}

	#[test]
	fn expander_error_propagates() {
		struct Failing;
		impl CompressedKeyExpander for Failing {
			fn expand(
				&self,
				_c: &CompressedPrivKey,
				_p: &GroupPubKey,
			) -> crate::error::Result<PrivKey> {
				Err(EpidError::KeyNotInGroup)
			}
		}
		let gid = sample_gid();
		let a = ark_bn254::G1Projective::generator().into_affine();
		let w = ark_bn254::G2Projective::generator().into_affine();
		let pub_key = GroupPubKey::new(gid, a, a, w).unwrap();
		let compressed = CompressedPrivKey { gid, seed: [0u8; 32] };
		let err = compressed.expand(&pub_key, &Failing).unwrap_err();
		assert_eq!(err, EpidError::KeyNotInGroup);
	}
}
