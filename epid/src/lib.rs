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

#![no_std]
#![warn(
	unused,
	future_incompatible,
	nonstandard_style,
	rust_2018_idioms,
	rust_2021_compatibility
)]
#![deny(unsafe_code)]

//! # Enhanced Privacy ID (EPID) 2.0
//!
//! A bilinear-pairing group signature scheme: members of a group
//! produce anonymous, optionally linkable signatures that any
//! verifier holding the group public key can validate, while
//! authorized revocation authorities can revoke individual keys or
//! specific signatures without learning member identities.
//!
//! Arithmetic runs over a 256-bit Barreto-Naehrig curve (`ark-bn254`
//! supplies Fq, Fq2, Fq6, Fq12, Fr, G1, G2 and the optimal Ate
//! pairing). This crate builds the EPID protocol state machine and
//! wire format on top of that arithmetic; it does not implement
//! random-number generation (an entropy source is a capability
//! supplied by the embedder), issuer-side group creation, key escrow,
//! or side-channel countermeasures beyond constant-time scalar
//! handling.

extern crate alloc;

pub mod bigint;
pub mod credential;
pub mod curve;
pub mod error;
pub mod field;
pub mod groupkey;
pub mod hash;
pub mod member;
pub mod pairing;
pub mod revocation;
pub mod serialize;
pub mod signature;
pub mod verifier;

pub use error::EpidError;
pub use groupkey::{Gid, GroupPubKey};
pub use member::MemberCtx;
pub use verifier::VerifierCtx;
