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

//! Status codes surfaced by the core. There is no `kEpidNoErr` variant:
//! success is `Ok(_)`.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpidError {
	/// Bad pointer, wrong buffer size, unsupported hash algorithm, etc.
	BadArg,
	/// Point at infinity where forbidden, division by zero while signing.
	/// Signing may be retried with fresh randomness.
	Math,
	/// Allocation failure. The context is left in a destructible state.
	MemAlloc,
	/// `c` mismatch, point off curve, point not in the prime-order subgroup,
	/// or a malformed non-revoked proof.
	SigInvalid,
	SigRevokedInGroupRl,
	SigRevokedInPrivRl,
	SigRevokedInSigRl,
	SigRevokedInVerifierRl,
	HashAlgorithmNotSupported,
	OutOfSequence,
	KeyNotInGroup,
}

impl fmt::Display for EpidError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let msg = match self {
			EpidError::BadArg => "invalid argument",
			EpidError::Math => "internal arithmetic error",
			EpidError::MemAlloc => "allocation failure",
			EpidError::SigInvalid => "signature is invalid",
			EpidError::SigRevokedInGroupRl => "group is revoked",
			EpidError::SigRevokedInPrivRl => "signature key is revoked (PrivRL)",
			EpidError::SigRevokedInSigRl => "signature is revoked (SigRL)",
			EpidError::SigRevokedInVerifierRl => {
				"signature is revoked (verifier blacklist)"
			},
			EpidError::HashAlgorithmNotSupported => "unsupported hash algorithm",
			EpidError::OutOfSequence => "operation performed out of sequence",
			EpidError::KeyNotInGroup => "key does not belong to the group",
		};
		f.write_str(msg)
	}
}

pub type Result<T> = core::result::Result<T, EpidError>;
