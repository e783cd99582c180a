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

//! Canonical big-endian wire encoding for every structure spec.md §6
//! names. Every multi-byte integer is big-endian (`byteorder`); list
//! headers (`rl_ver`, `n1..n4`) are `u32`. Decoding validates
//! `declared count * entry size == remaining buffer length` before
//! indexing (spec.md §4.E) and rejects unknown header version/type
//! combinations immediately.

use crate::curve::{
	g1_from_be_bytes, g1_to_be_bytes, g2_from_be_bytes, g2_to_be_bytes, G1_BYTE_LEN, G2_BYTE_LEN,
};
use crate::error::{EpidError, Result};
use crate::field::{fr_from_be_bytes, fr_to_be_bytes, FQ_BYTE_LEN};
use crate::groupkey::{decode_group_pub_key, Gid, GroupPubKey};
use crate::revocation::{GroupRl, PrivRl, SigRl, SigRlEntry, VerifierRl};
use crate::signature::{BasicSignature, NonRevokedProof, Signature};
use byteorder::{BigEndian, ByteOrder};

/// `epid_version` for the current revision of the wire format: major
/// 2, minor 0, as big-endian octets `{0x00, 0x02}` (spec.md §6).
pub const EPID_VERSION: u16 = 0x0002;

/// File-type tags carried in [`EpidFileHeader`] (spec.md §4.E/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
	GroupPubKey,
	PrivRl,
	SigRl,
	GroupRl,
	SigRlRequest,
	GroupRlRequest,
}

impl FileType {
	fn to_u16(self) -> u16 {
		match self {
			FileType::GroupPubKey => 1,
			FileType::PrivRl => 2,
			FileType::SigRl => 3,
			FileType::GroupRl => 4,
			FileType::SigRlRequest => 5,
			FileType::GroupRlRequest => 6,
		}
	}

	fn from_u16(v: u16) -> Result<FileType> {
		match v {
			1 => Ok(FileType::GroupPubKey),
			2 => Ok(FileType::PrivRl),
			3 => Ok(FileType::SigRl),
			4 => Ok(FileType::GroupRl),
			5 => Ok(FileType::SigRlRequest),
			6 => Ok(FileType::GroupRlRequest),
			_ => Err(EpidError::BadArg),
		}
	}
}

/// The 4-octet header every top-level wire structure starts with
/// (spec.md §4.E/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpidFileHeader {
	pub epid_version: u16,
	pub file_type: FileType,
}

pub const HEADER_LEN: usize = 4;

impl EpidFileHeader {
	pub fn new(file_type: FileType) -> EpidFileHeader {
		EpidFileHeader { epid_version: EPID_VERSION, file_type }
	}

	pub fn encode(&self, out: &mut alloc::vec::Vec<u8>) {
		let mut buf = [0u8; HEADER_LEN];
		BigEndian::write_u16(&mut buf[0..2], self.epid_version);
		BigEndian::write_u16(&mut buf[2..4], self.file_type.to_u16());
		out.extend_from_slice(&buf);
	}

	/// Decode and validate: unknown version or file-type combinations
	/// are rejected immediately (spec.md §4.E).
	pub fn decode(bytes: &[u8]) -> Result<(EpidFileHeader, &[u8])> {
		if bytes.len() < HEADER_LEN {
			return Err(EpidError::BadArg);
		}
		let epid_version = BigEndian::read_u16(&bytes[0..2]);
		if epid_version != EPID_VERSION {
			return Err(EpidError::BadArg);
		}
		let file_type = FileType::from_u16(BigEndian::read_u16(&bytes[2..4]))?;
		Ok((EpidFileHeader { epid_version, file_type }, &bytes[HEADER_LEN..]))
	}
}

/// An injected capability that authenticates the trailing ECDSA-over-
/// P-256 signature on a group-public-key / revocation-list file. The
/// actual ECDSA verification is out of scope (spec.md §1, §4.E); the
/// core only needs to know whether the issuing CA accepted the buffer.
pub trait CaVerifier {
	fn verify(&self, signed_body: &[u8], signature: &[u8; 64]) -> bool;
}

fn take<'a>(bytes: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
	if bytes.len() < n {
		return Err(EpidError::BadArg);
	}
	let (head, tail) = bytes.split_at(n);
	*bytes = tail;
	Ok(head)
}

fn take_array<const N: usize>(bytes: &mut &[u8]) -> Result<[u8; N]> {
	let slice = take(bytes, N)?;
	let mut out = [0u8; N];
	out.copy_from_slice(slice);
	Ok(out)
}

fn take_u32(bytes: &mut &[u8]) -> Result<u32> {
	Ok(BigEndian::read_u32(&take(bytes, 4)?))
}

/// Encode `gid || h1 || h2 || w` (the payload a group-public-key file
/// wraps in a header and an opaque CA signature, spec.md §6).
pub fn encode_group_pub_key_body(pub_key: &GroupPubKey) -> alloc::vec::Vec<u8> {
	let mut out = alloc::vec::Vec::with_capacity(16 + G1_BYTE_LEN * 2 + G2_BYTE_LEN);
	out.extend_from_slice(&pub_key.gid.0);
	out.extend_from_slice(&g1_to_be_bytes(&pub_key.h1));
	out.extend_from_slice(&g1_to_be_bytes(&pub_key.h2));
	out.extend_from_slice(&g2_to_be_bytes(&pub_key.w));
	out
}

/// Decode a full group-public-key file: header, body, and the
/// trailing 64-octet ECDSA signature, which is handed to `verifier`
/// unparsed (spec.md §6). Returns `EpidError::SigInvalid` if the CA
/// rejects the signed body.
pub fn decode_group_pub_key_file(
	bytes: &[u8],
	verifier: &impl CaVerifier,
) -> Result<GroupPubKey> {
	let (header, rest) = EpidFileHeader::decode(bytes)?;
	if header.file_type != FileType::GroupPubKey {
		return Err(EpidError::BadArg);
	}
	let body_len = 16 + G1_BYTE_LEN * 2 + G2_BYTE_LEN;
	if rest.len() != body_len + 64 {
		return Err(EpidError::BadArg);
	}
	let signed_body = &bytes[..HEADER_LEN + body_len];
	let (body, sig_bytes) = rest.split_at(body_len);
	let mut sig = [0u8; 64];
	sig.copy_from_slice(sig_bytes);
	if !verifier.verify(signed_body, &sig) {
		return Err(EpidError::SigInvalid);
	}

	let mut cursor = body;
	let gid = Gid(take_array(&mut cursor)?);
	let h1_bytes: [u8; G1_BYTE_LEN] = take_array(&mut cursor)?;
	let h2_bytes: [u8; G1_BYTE_LEN] = take_array(&mut cursor)?;
	let w_bytes: [u8; G2_BYTE_LEN] = take_array(&mut cursor)?;
	decode_group_pub_key(gid, &h1_bytes, &h2_bytes, &w_bytes)
}

/// `gid || rl_ver || n1 || n1 x Fp` (spec.md §6), not including the
/// trailing CA signature.
pub fn encode_priv_rl_body(rl: &PrivRl) -> alloc::vec::Vec<u8> {
	let mut out = alloc::vec::Vec::with_capacity(16 + 8 + rl.f.len() * FQ_BYTE_LEN);
	out.extend_from_slice(&rl.gid.0);
	write_u32(&mut out, rl.rl_ver);
	write_u32(&mut out, rl.f.len() as u32);
	for f in &rl.f {
		out.extend_from_slice(&fr_to_be_bytes(f));
	}
	out
}

/// Decode a `PrivRl` body (header already stripped by the caller via
/// [`EpidFileHeader::decode`]), validating `n1 * 32 ==
/// remaining_len` before indexing (spec.md §4.E) and that `gid`
/// matches the group the caller expects.
pub fn decode_priv_rl_body(mut body: &[u8], expected_gid: &Gid) -> Result<PrivRl> {
	let gid = Gid(take_array(&mut body)?);
	if gid != *expected_gid {
		return Err(EpidError::BadArg);
	}
	let rl_ver = take_u32(&mut body)?;
	let n1 = take_u32(&mut body)? as usize;
	if body.len() != n1 * FQ_BYTE_LEN {
		return Err(EpidError::BadArg);
	}
	let mut f = alloc::vec::Vec::with_capacity(n1);
	for _ in 0..n1 {
		let bytes: [u8; FQ_BYTE_LEN] = take_array(&mut body)?;
		f.push(fr_from_be_bytes(&bytes)?);
	}
	Ok(PrivRl { gid, rl_ver, f })
}

/// `gid || rl_ver || n2 || n2 x (B, K)` (spec.md §6).
pub fn encode_sig_rl_body(rl: &SigRl) -> alloc::vec::Vec<u8> {
	let mut out = alloc::vec::Vec::with_capacity(16 + 8 + rl.entries.len() * 2 * G1_BYTE_LEN);
	out.extend_from_slice(&rl.gid.0);
	write_u32(&mut out, rl.rl_ver);
	write_u32(&mut out, rl.entries.len() as u32);
	for e in &rl.entries {
		out.extend_from_slice(&g1_to_be_bytes(&e.b));
		out.extend_from_slice(&g1_to_be_bytes(&e.k));
	}
	out
}

pub fn decode_sig_rl_body(mut body: &[u8], expected_gid: &Gid) -> Result<SigRl> {
	let gid = Gid(take_array(&mut body)?);
	if gid != *expected_gid {
		return Err(EpidError::BadArg);
	}
	let rl_ver = take_u32(&mut body)?;
	let n2 = take_u32(&mut body)? as usize;
	if body.len() != n2 * 2 * G1_BYTE_LEN {
		return Err(EpidError::BadArg);
	}
	let mut entries = alloc::vec::Vec::with_capacity(n2);
	for _ in 0..n2 {
		let b_bytes: [u8; G1_BYTE_LEN] = take_array(&mut body)?;
		let k_bytes: [u8; G1_BYTE_LEN] = take_array(&mut body)?;
		entries.push(SigRlEntry { b: g1_from_be_bytes(&b_bytes)?, k: g1_from_be_bytes(&k_bytes)? });
	}
	Ok(SigRl { gid, rl_ver, entries })
}

/// `rl_ver || n3 || n3 x gid` (spec.md §6).
pub fn encode_group_rl_body(rl: &GroupRl) -> alloc::vec::Vec<u8> {
	let mut out = alloc::vec::Vec::with_capacity(8 + rl.gids.len() * 16);
	write_u32(&mut out, rl.rl_ver);
	write_u32(&mut out, rl.gids.len() as u32);
	for gid in &rl.gids {
		out.extend_from_slice(&gid.0);
	}
	out
}

pub fn decode_group_rl_body(mut body: &[u8]) -> Result<GroupRl> {
	let rl_ver = take_u32(&mut body)?;
	let n3 = take_u32(&mut body)? as usize;
	if body.len() != n3 * 16 {
		return Err(EpidError::BadArg);
	}
	let mut gids = alloc::vec::Vec::with_capacity(n3);
	for _ in 0..n3 {
		gids.push(Gid(take_array(&mut body)?));
	}
	Ok(GroupRl { rl_ver, gids })
}

/// `gid || bsn_hash || rl_ver || n4 || n4 x K` (spec.md §6). No CA
/// signature: produced and consumed locally by a verifier.
pub fn encode_verifier_rl(rl: &VerifierRl) -> alloc::vec::Vec<u8> {
	let mut out = alloc::vec::Vec::with_capacity(16 + G1_BYTE_LEN + 8 + rl.k.len() * G1_BYTE_LEN);
	out.extend_from_slice(&rl.gid.0);
	out.extend_from_slice(&g1_to_be_bytes(&rl.bsn_hash));
	write_u32(&mut out, rl.rl_ver);
	write_u32(&mut out, rl.n4());
	for k in &rl.k {
		out.extend_from_slice(&g1_to_be_bytes(k));
	}
	out
}

pub fn decode_verifier_rl(mut bytes: &[u8]) -> Result<VerifierRl> {
	let gid = Gid(take_array(&mut bytes)?);
	let bsn_bytes: [u8; G1_BYTE_LEN] = take_array(&mut bytes)?;
	let bsn_hash = g1_from_be_bytes(&bsn_bytes)?;
	let rl_ver = take_u32(&mut bytes)?;
	let n4 = take_u32(&mut bytes)? as usize;
	if bytes.len() != n4 * G1_BYTE_LEN {
		return Err(EpidError::BadArg);
	}
	let mut k = alloc::vec::Vec::with_capacity(n4);
	for _ in 0..n4 {
		let kb: [u8; G1_BYTE_LEN] = take_array(&mut bytes)?;
		k.push(g1_from_be_bytes(&kb)?);
	}
	Ok(VerifierRl { gid, bsn_hash, rl_ver, k })
}

const NRP_BYTE_LEN: usize = G1_BYTE_LEN + 2 * FQ_BYTE_LEN;

fn encode_nrp(out: &mut alloc::vec::Vec<u8>, nrp: &NonRevokedProof) {
	out.extend_from_slice(&g1_to_be_bytes(&nrp.t_prime));
	out.extend_from_slice(&fr_to_be_bytes(&nrp.c_prime));
	out.extend_from_slice(&fr_to_be_bytes(&nrp.s));
}

fn decode_nrp(bytes: &mut &[u8]) -> Result<NonRevokedProof> {
	let t_bytes: [u8; G1_BYTE_LEN] = take_array(bytes)?;
	let c_bytes: [u8; FQ_BYTE_LEN] = take_array(bytes)?;
	let s_bytes: [u8; FQ_BYTE_LEN] = take_array(bytes)?;
	Ok(NonRevokedProof {
		t_prime: g1_from_be_bytes(&t_bytes)?,
		c_prime: fr_from_be_bytes(&c_bytes)?,
		s: fr_from_be_bytes(&s_bytes)?,
	})
}

const BASIC_SIGNATURE_BYTE_LEN: usize = 3 * G1_BYTE_LEN + 5 * FQ_BYTE_LEN;

fn encode_basic_signature(out: &mut alloc::vec::Vec<u8>, sig: &BasicSignature) {
	out.extend_from_slice(&g1_to_be_bytes(&sig.b));
	out.extend_from_slice(&g1_to_be_bytes(&sig.k));
	out.extend_from_slice(&g1_to_be_bytes(&sig.t));
	out.extend_from_slice(&fr_to_be_bytes(&sig.c));
	out.extend_from_slice(&fr_to_be_bytes(&sig.sx));
	out.extend_from_slice(&fr_to_be_bytes(&sig.sf));
	out.extend_from_slice(&fr_to_be_bytes(&sig.sa));
	out.extend_from_slice(&fr_to_be_bytes(&sig.sb));
}

fn decode_basic_signature(bytes: &mut &[u8]) -> Result<BasicSignature> {
	let b: [u8; G1_BYTE_LEN] = take_array(bytes)?;
	let k: [u8; G1_BYTE_LEN] = take_array(bytes)?;
	let t: [u8; G1_BYTE_LEN] = take_array(bytes)?;
	let c: [u8; FQ_BYTE_LEN] = take_array(bytes)?;
	let sx: [u8; FQ_BYTE_LEN] = take_array(bytes)?;
	let sf: [u8; FQ_BYTE_LEN] = take_array(bytes)?;
	let sa: [u8; FQ_BYTE_LEN] = take_array(bytes)?;
	let sb: [u8; FQ_BYTE_LEN] = take_array(bytes)?;
	Ok(BasicSignature {
		b: g1_from_be_bytes(&b).map_err(|_| EpidError::SigInvalid)?,
		k: g1_from_be_bytes(&k).map_err(|_| EpidError::SigInvalid)?,
		t: g1_from_be_bytes(&t).map_err(|_| EpidError::SigInvalid)?,
		c: fr_from_be_bytes(&c).map_err(|_| EpidError::SigInvalid)?,
		sx: fr_from_be_bytes(&sx).map_err(|_| EpidError::SigInvalid)?,
		sf: fr_from_be_bytes(&sf).map_err(|_| EpidError::SigInvalid)?,
		sa: fr_from_be_bytes(&sa).map_err(|_| EpidError::SigInvalid)?,
		sb: fr_from_be_bytes(&sb).map_err(|_| EpidError::SigInvalid)?,
	})
}

/// `BasicSignature || rl_ver(4) || n2(4) || n2 x NonRevokedProof`
/// (spec.md §6).
pub fn encode_signature(sig: &Signature) -> alloc::vec::Vec<u8> {
	let mut out = alloc::vec::Vec::with_capacity(
		BASIC_SIGNATURE_BYTE_LEN + 8 + sig.sigma_i.len() * NRP_BYTE_LEN,
	);
	encode_basic_signature(&mut out, &sig.sigma0);
	write_u32(&mut out, sig.rl_ver);
	write_u32(&mut out, sig.n2());
	for nrp in &sig.sigma_i {
		encode_nrp(&mut out, nrp);
	}
	out
}

/// Decode a [`Signature`], validating `n2 * NRP size ==
/// remaining_len` before indexing (spec.md §4.E); malformed buffers
/// return `EpidError::SigInvalid` (the caller is verifying a
/// signature, not loading a list, per spec.md §7's format-error
/// mapping).
pub fn decode_signature(bytes: &[u8]) -> Result<Signature> {
	if bytes.len() < BASIC_SIGNATURE_BYTE_LEN + 8 {
		return Err(EpidError::SigInvalid);
	}
	let mut cursor = bytes;
	let sigma0 = decode_basic_signature(&mut cursor)?;
	let rl_ver = take_u32(&mut cursor).map_err(|_| EpidError::SigInvalid)?;
	let n2 = take_u32(&mut cursor).map_err(|_| EpidError::SigInvalid)? as usize;
	if cursor.len() != n2 * NRP_BYTE_LEN {
		return Err(EpidError::SigInvalid);
	}
	let mut sigma_i = alloc::vec::Vec::with_capacity(n2);
	for _ in 0..n2 {
		sigma_i.push(decode_nrp(&mut cursor).map_err(|_| EpidError::SigInvalid)?);
	}
	Ok(Signature { sigma0, rl_ver, sigma_i })
}

fn write_u32(out: &mut alloc::vec::Vec<u8>, v: u32) {
	let mut buf = [0u8; 4];
	BigEndian::write_u32(&mut buf, v);
	out.extend_from_slice(&buf);
}

/// Decode-only support for the revocation-request file layouts
/// external tools (`revokegrp`, `revokesig`) emit (spec.md §6). The
/// core never produces these; it only needs to decode them if it
/// serves as an issuing authority, which is itself out of scope, but
/// decoding the shape is not.
pub mod revocation_requests {
	use super::*;

	/// `EpidFileHeader || gid || BasicSignature || be_msg_size(4) ||
	/// msg`.
	pub struct SigRlRequest {
		pub gid: Gid,
		pub sig: BasicSignature,
		pub msg: alloc::vec::Vec<u8>,
	}

	pub fn decode_sig_rl_request(bytes: &[u8]) -> Result<SigRlRequest> {
		let (header, rest) = EpidFileHeader::decode(bytes)?;
		if header.file_type != FileType::SigRlRequest {
			return Err(EpidError::BadArg);
		}
		let mut cursor = rest;
		let gid = Gid(take_array(&mut cursor)?);
		let sig = decode_basic_signature(&mut cursor)?;
		let msg_size = take_u32(&mut cursor)? as usize;
		if cursor.len() != msg_size {
			return Err(EpidError::BadArg);
		}
		Ok(SigRlRequest { gid, sig, msg: cursor.to_vec() })
	}

	/// One opaque revocation reason byte per `gid` (spec.md §9: whether
	/// it is semantically meaningful to the issuer is not defined in
	/// the core).
	pub struct GroupRlRequestEntry {
		pub gid: Gid,
		pub reason: u8,
	}

	/// `EpidFileHeader || count(4) || count x (gid(16), reason(1))`.
	pub struct GroupRlRequest {
		pub entries: alloc::vec::Vec<GroupRlRequestEntry>,
	}

	pub fn decode_group_rl_request(bytes: &[u8]) -> Result<GroupRlRequest> {
		let (header, rest) = EpidFileHeader::decode(bytes)?;
		if header.file_type != FileType::GroupRlRequest {
			return Err(EpidError::BadArg);
		}
		let mut cursor = rest;
		let count = take_u32(&mut cursor)? as usize;
		if cursor.len() != count * 17 {
			return Err(EpidError::BadArg);
		}
		let mut entries = alloc::vec::Vec::with_capacity(count);
		for _ in 0..count {
			let gid = Gid(take_array(&mut cursor)?);
			let reason_byte = take(&mut cursor, 1)?[0];
			entries.push(GroupRlRequestEntry { gid, reason: reason_byte });
		}
		Ok(GroupRlRequest { entries })
	}
}
