// vault-core - Epic Games marketplace vault downloader core
// Copyright (C) 2026 vault-core contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Codec for the platform's 24-digit chunk hash encoding
//!
//! Manifests store every chunk hash as eight 3-digit decimal byte values
//! concatenated into a 24-character string. The canonical form used in chunk
//! download URLs is the same eight bytes hex-encoded in *reverse* order (the
//! last group becomes the most significant hex pair).
//!
//! The manifest stores per-chunk-part `Offset` and `Size` fields in the exact
//! same encoding, so the decoder here has two call sites: once as a hash
//! ([`decode_chunk_hash`]) and once as a big-endian integer parse of the
//! decoded hex ([`decode_packed_u64`]). Keep them sharing one primitive.

use crate::error::{Result, VaultError};

/// Number of 3-digit decimal groups in an encoded hash
const GROUPS: usize = 8;

/// Decode a 24-character decimal-triplet hash into its canonical 16-character
/// uppercase hex form, reversing byte order.
///
/// `"001002003004005006007008"` (bytes `[1..=8]`) decodes to
/// `"0807060504030201"`.
pub fn decode_chunk_hash(encoded: &str) -> Result<String> {
    let invalid = || VaultError::InvalidChunkHash {
        value: encoded.to_string(),
    };

    if encoded.len() != GROUPS * 3 || !encoded.is_ascii() {
        return Err(invalid());
    }

    let mut bytes = [0u8; GROUPS];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = encoded[i * 3..i * 3 + 3]
            .parse::<u8>()
            .map_err(|_| invalid())?;
    }
    bytes.reverse();

    Ok(hex::encode_upper(bytes))
}

/// Decode a 24-character triplet-encoded integer field (manifest `Offset` /
/// `Size`) into a `u64` by parsing the canonical hex form.
pub fn decode_packed_u64(encoded: &str) -> Result<u64> {
    let hex = decode_chunk_hash(encoded)?;
    u64::from_str_radix(&hex, 16).map_err(|_| VaultError::InvalidChunkHash {
        value: encoded.to_string(),
    })
}

/// Zero-pad a number on the left to `width` digits, e.g. `(4, 2)` -> `"04"`.
/// Used for the 2-digit chunk storage data-group directory names.
pub fn pad_number_left(n: u64, width: usize) -> String {
    format!("{n:0width$}")
}
