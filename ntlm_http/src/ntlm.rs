/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Construction and parsing of NTLMSSP messages.
//!
//! The exchange follows MS-NLMP: the client offers a negotiate (Type 1)
//! message, the server answers with a challenge (Type 2) message, and the
//! client completes the handshake with an authenticate (Type 3) message
//! carrying the LMv2 and NTLMv2 responses.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::credentials::Credentials;
use crate::error::Error;

const SIGNATURE: &[u8; 8] = b"NTLMSSP\0";

const CHALLENGE_MESSAGE: u32 = 2;

// Negotiate flags from MS-NLMP section 2.2.2.5.
const NEGOTIATE_UNICODE: u32 = 0x00000001;
const NEGOTIATE_OEM: u32 = 0x00000002;
const REQUEST_TARGET: u32 = 0x00000004;
const NEGOTIATE_NTLM: u32 = 0x00000200;
const NEGOTIATE_ALWAYS_SIGN: u32 = 0x00008000;
const NEGOTIATE_EXTENDED_SESSION_SECURITY: u32 = 0x00080000;

/// Builds a negotiate (Type 1) message advertising NTLMv2-capable flags.
pub(crate) fn negotiate_message(credentials: &Credentials) -> Vec<u8> {
    let flags = NEGOTIATE_UNICODE
        | NEGOTIATE_OEM
        | REQUEST_TARGET
        | NEGOTIATE_NTLM
        | NEGOTIATE_ALWAYS_SIGN
        | NEGOTIATE_EXTENDED_SESSION_SECURITY;

    let workstation = credentials.workstation().as_bytes();
    let domain = credentials.domain().as_bytes();

    let mut message = SIGNATURE.to_vec();
    message.extend_from_slice(&1u32.to_le_bytes());
    message.extend_from_slice(&flags.to_le_bytes());

    // The domain and workstation fields trail the fixed 32 byte header as
    // OEM strings, workstation first.
    push_buffer_descriptor(&mut message, domain.len(), 32 + workstation.len());
    push_buffer_descriptor(&mut message, workstation.len(), 32);
    message.extend_from_slice(workstation);
    message.extend_from_slice(domain);

    message
}

/// A parsed challenge (Type 2) message.
#[derive(Clone, Debug)]
pub(crate) struct Challenge {
    pub(crate) server_challenge: [u8; 8],
    pub(crate) target_info: Vec<u8>,
}

impl Challenge {
    /// Parses the server's challenge, extracting the nonce and the target
    /// information block that must be echoed back in the NTLMv2 response.
    pub(crate) fn parse(message: &[u8]) -> crate::Result<Challenge> {
        if message.len() < 48 {
            return Err(Error::Handshake("authentication challenge is truncated"));
        }

        if &message[..8] != SIGNATURE {
            return Err(Error::Handshake(
                "authentication challenge does not carry the NTLMSSP signature",
            ));
        }

        if read_u32(message, 8) != CHALLENGE_MESSAGE {
            return Err(Error::Handshake(
                "server answered with an unexpected NTLM message type",
            ));
        }

        let mut server_challenge = [0u8; 8];
        server_challenge.copy_from_slice(&message[24..32]);

        let target_info = read_buffer(message, 40)
            .ok_or(Error::Handshake(
                "authentication challenge points outside of its own data",
            ))?
            .to_vec();

        Ok(Challenge {
            server_challenge,
            target_info,
        })
    }
}

/// Builds an authenticate (Type 3) message answering the given challenge.
pub(crate) fn authenticate_message(credentials: &Credentials, challenge: &Challenge) -> Vec<u8> {
    let client_challenge: [u8; 8] = rand::random();

    build_authenticate(credentials, challenge, &client_challenge, filetime_now())
}

fn build_authenticate(
    credentials: &Credentials,
    challenge: &Challenge,
    client_challenge: &[u8; 8],
    timestamp: u64,
) -> Vec<u8> {
    let key = ntowf_v2(
        credentials.username(),
        credentials.password(),
        credentials.domain(),
    );

    // NTLMv2 response: the proof over the server challenge and the temporal
    // blob, followed by the blob itself.
    let blob = ntlmv2_blob(timestamp, client_challenge, &challenge.target_info);
    let mut proof_input = challenge.server_challenge.to_vec();
    proof_input.extend_from_slice(&blob);
    let mut nt_response = hmac_md5(&key, &proof_input).to_vec();
    nt_response.extend_from_slice(&blob);

    let lm_response = lmv2_response(&key, &challenge.server_challenge, client_challenge);

    let domain = utf16le(credentials.domain());
    let username = utf16le(credentials.username());
    let workstation = utf16le(credentials.workstation());

    let flags = NEGOTIATE_UNICODE
        | NEGOTIATE_NTLM
        | NEGOTIATE_ALWAYS_SIGN
        | NEGOTIATE_EXTENDED_SESSION_SECURITY;

    // The fixed header is 88 bytes: signature, message type, six buffer
    // descriptors, flags, then empty version and MIC fields. Payloads are
    // laid out in descriptor order.
    let lm_offset = 88;
    let nt_offset = lm_offset + lm_response.len();
    let domain_offset = nt_offset + nt_response.len();
    let username_offset = domain_offset + domain.len();
    let workstation_offset = username_offset + username.len();
    let session_key_offset = workstation_offset + workstation.len();

    let mut message = SIGNATURE.to_vec();
    message.extend_from_slice(&3u32.to_le_bytes());
    push_buffer_descriptor(&mut message, lm_response.len(), lm_offset);
    push_buffer_descriptor(&mut message, nt_response.len(), nt_offset);
    push_buffer_descriptor(&mut message, domain.len(), domain_offset);
    push_buffer_descriptor(&mut message, username.len(), username_offset);
    push_buffer_descriptor(&mut message, workstation.len(), workstation_offset);
    push_buffer_descriptor(&mut message, 0, session_key_offset);
    message.extend_from_slice(&flags.to_le_bytes());
    message.extend_from_slice(&[0u8; 8]);
    message.extend_from_slice(&[0u8; 16]);

    message.extend_from_slice(&lm_response);
    message.extend_from_slice(&nt_response);
    message.extend_from_slice(&domain);
    message.extend_from_slice(&username);
    message.extend_from_slice(&workstation);

    message
}

/// Appends a security buffer descriptor (length, allocated length and
/// offset) to a message under construction.
fn push_buffer_descriptor(message: &mut Vec<u8>, len: usize, offset: usize) {
    message.extend_from_slice(&(len as u16).to_le_bytes());
    message.extend_from_slice(&(len as u16).to_le_bytes());
    message.extend_from_slice(&(offset as u32).to_le_bytes());
}

/// Reads the payload a security buffer descriptor at `at` points to.
fn read_buffer(message: &[u8], at: usize) -> Option<&[u8]> {
    if message.len() < at + 8 {
        return None;
    }

    let len = read_u16(message, at) as usize;
    let offset = read_u32(message, at + 4) as usize;

    message.get(offset..offset + len)
}

fn read_u16(message: &[u8], at: usize) -> u16 {
    let mut bytes = [0u8; 2];
    bytes.copy_from_slice(&message[at..at + 2]);
    u16::from_le_bytes(bytes)
}

fn read_u32(message: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&message[at..at + 4]);
    u32::from_le_bytes(bytes)
}

/// Builds the temporal blob over which the NTLMv2 proof is computed:
/// version markers, the timestamp, the client challenge and the server's
/// target information, with reserved fields zeroed.
fn ntlmv2_blob(timestamp: u64, client_challenge: &[u8; 8], target_info: &[u8]) -> Vec<u8> {
    let mut blob = vec![0x01, 0x01, 0x00, 0x00];
    blob.extend_from_slice(&0u32.to_le_bytes());
    blob.extend_from_slice(&timestamp.to_le_bytes());
    blob.extend_from_slice(client_challenge);
    blob.extend_from_slice(&0u32.to_le_bytes());
    blob.extend_from_slice(target_info);
    blob.extend_from_slice(&0u32.to_le_bytes());

    blob
}

/// Computes the LMv2 response: an HMAC over both challenges, followed by
/// the client challenge itself.
fn lmv2_response(key: &[u8; 16], server_challenge: &[u8; 8], client_challenge: &[u8; 8]) -> Vec<u8> {
    let mut input = server_challenge.to_vec();
    input.extend_from_slice(client_challenge);

    let mut response = hmac_md5(key, &input).to_vec();
    response.extend_from_slice(client_challenge);

    response
}

/// Derives the NTLMv2 key: an HMAC over the user name and domain, keyed
/// with the NT hash. Per MS-NLMP section 3.3.2, only the user name is
/// uppercased.
fn ntowf_v2(username: &str, password: &str, domain: &str) -> [u8; 16] {
    let identity = format!("{}{}", username.to_uppercase(), domain);

    hmac_md5(&nt_hash(password), &utf16le(&identity))
}

/// Computes the NT hash: MD4 over the UTF-16LE encoded password.
fn nt_hash(password: &str) -> [u8; 16] {
    use md4::{Digest, Md4};

    let mut hasher = Md4::new();
    hasher.update(utf16le(password));

    hasher.finalize().into()
}

/// HMAC-MD5 with the usual 64 byte block size.
fn hmac_md5(key: &[u8], data: &[u8]) -> [u8; 16] {
    let mut block = [0u8; 64];
    if key.len() > 64 {
        block[..16].copy_from_slice(&md5::compute(key).0);
    } else {
        block[..key.len()].copy_from_slice(key);
    }

    let mut inner = Vec::with_capacity(block.len() + data.len());
    inner.extend(block.iter().map(|byte| byte ^ 0x36));
    inner.extend_from_slice(data);
    let inner_hash = md5::compute(&inner);

    let mut outer = Vec::with_capacity(block.len() + inner_hash.0.len());
    outer.extend(block.iter().map(|byte| byte ^ 0x5c));
    outer.extend_from_slice(&inner_hash.0);

    md5::compute(&outer).0
}

/// Encodes a string as UTF-16LE.
fn utf16le(value: &str) -> Vec<u8> {
    value
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

/// The current time as a Windows FILETIME: 100 nanosecond ticks since
/// 1601-01-01.
fn filetime_now() -> u64 {
    const EPOCH_GAP_SECONDS: u64 = 11_644_473_600;
    const TICKS_PER_SECOND: u64 = 10_000_000;

    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    (seconds + EPOCH_GAP_SECONDS) * TICKS_PER_SECOND
}
