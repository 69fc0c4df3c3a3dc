//! Minimal DER codec covering the subset of types used by the key and
//! signature wire forms: `SEQUENCE`, `INTEGER` (non-negative),
//! `OCTET STRING` and `UTF8String`.
//!
//! Integers follow `BigInteger.toByteArray` semantics: minimal-length
//! two's-complement big-endian, so a value whose top bit is set gets one
//! leading zero byte. The same byte form is used outside DER when an
//! accumulator value or a reconstructed secret is bound under ECDSA.

use num_bigint::{BigInt, BigUint, Sign};

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_UTF8_STRING: u8 = 0x0c;
pub const TAG_SEQUENCE: u8 = 0x30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DerError {
    UnexpectedEndOfInput,
    UnexpectedTag { expected: u8, found: u8 },
    LengthOverflow,
    NegativeInteger,
    EmptyInteger,
    InvalidUtf8,
    TrailingBytes,
}

/// Minimal two's-complement big-endian bytes of a non-negative integer.
/// Zero encodes as a single zero byte.
pub fn signed_bytes_be(n: &BigUint) -> Vec<u8> {
    let bytes = BigInt::from_biguint(Sign::Plus, n.clone()).to_signed_bytes_be();
    if bytes.is_empty() {
        vec![0]
    } else {
        bytes
    }
}

/// Inverse of [`signed_bytes_be`]. Fails on negative input.
pub fn biguint_from_signed_bytes_be(bytes: &[u8]) -> Result<BigUint, DerError> {
    if bytes.is_empty() {
        return Err(DerError::EmptyInteger);
    }
    if bytes[0] & 0x80 != 0 {
        return Err(DerError::NegativeInteger);
    }
    Ok(BigUint::from_bytes_be(bytes))
}

fn encode_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 4);
    out.push(tag);
    encode_length(content.len(), &mut out);
    out.extend_from_slice(content);
    out
}

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        out.push(0x80 | (bytes.len() - skip) as u8);
        out.extend_from_slice(&bytes[skip..]);
    }
}

/// Encode a sequence whose `parts` are already encoded TLVs.
pub fn encode_sequence(parts: &[Vec<u8>]) -> Vec<u8> {
    let content: Vec<u8> = parts.iter().flat_map(|p| p.iter().copied()).collect();
    encode_tlv(TAG_SEQUENCE, &content)
}

pub fn encode_integer(n: &BigUint) -> Vec<u8> {
    encode_tlv(TAG_INTEGER, &signed_bytes_be(n))
}

pub fn encode_octet_string(bytes: &[u8]) -> Vec<u8> {
    encode_tlv(TAG_OCTET_STRING, bytes)
}

pub fn encode_utf8_string(s: &str) -> Vec<u8> {
    encode_tlv(TAG_UTF8_STRING, s.as_bytes())
}

/// Split one TLV off the front of `input`, returning `(tag, content, rest)`.
fn read_tlv(input: &[u8]) -> Result<(u8, &[u8], &[u8]), DerError> {
    if input.len() < 2 {
        return Err(DerError::UnexpectedEndOfInput);
    }
    let tag = input[0];
    let (len, header) = if input[1] < 0x80 {
        (input[1] as usize, 2)
    } else {
        let num_len_bytes = (input[1] & 0x7f) as usize;
        if num_len_bytes == 0 || num_len_bytes > core::mem::size_of::<usize>() {
            return Err(DerError::LengthOverflow);
        }
        if input.len() < 2 + num_len_bytes {
            return Err(DerError::UnexpectedEndOfInput);
        }
        let mut len = 0usize;
        for b in &input[2..2 + num_len_bytes] {
            len = (len << 8) | *b as usize;
        }
        (len, 2 + num_len_bytes)
    };
    if input.len() < header + len {
        return Err(DerError::UnexpectedEndOfInput);
    }
    Ok((tag, &input[header..header + len], &input[header + len..]))
}

fn expect_tag(input: &[u8], expected: u8) -> Result<&[u8], DerError> {
    let (tag, content, rest) = read_tlv(input)?;
    if tag != expected {
        return Err(DerError::UnexpectedTag {
            expected,
            found: tag,
        });
    }
    if !rest.is_empty() {
        return Err(DerError::TrailingBytes);
    }
    Ok(content)
}

pub fn is_sequence(input: &[u8]) -> bool {
    input.first() == Some(&TAG_SEQUENCE)
}

/// Decode a sequence TLV into the TLVs of its immediate children.
pub fn decode_sequence(input: &[u8]) -> Result<Vec<&[u8]>, DerError> {
    let mut content = expect_tag(input, TAG_SEQUENCE)?;
    let mut parts = Vec::new();
    while !content.is_empty() {
        let (_, child_content, rest) = read_tlv(content)?;
        let tlv_len = content.len() - rest.len();
        // sanity: the child TLV spans its header plus content
        debug_assert!(tlv_len >= child_content.len());
        parts.push(&content[..tlv_len]);
        content = rest;
    }
    Ok(parts)
}

pub fn decode_integer(input: &[u8]) -> Result<BigUint, DerError> {
    biguint_from_signed_bytes_be(expect_tag(input, TAG_INTEGER)?)
}

pub fn decode_octet_string(input: &[u8]) -> Result<Vec<u8>, DerError> {
    Ok(expect_tag(input, TAG_OCTET_STRING)?.to_vec())
}

pub fn decode_utf8_string(input: &[u8]) -> Result<String, DerError> {
    let content = expect_tag(input, TAG_UTF8_STRING)?;
    String::from_utf8(content.to_vec()).map_err(|_| DerError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trip() {
        for n in [
            BigUint::from(0u32),
            BigUint::from(1u32),
            BigUint::from(127u32),
            BigUint::from(128u32),
            BigUint::from(255u32),
            BigUint::from(256u32),
            BigUint::parse_bytes(b"ffffffffffffffffffffffffffffffff", 16).unwrap(),
        ] {
            let enc = encode_integer(&n);
            assert_eq!(decode_integer(&enc).unwrap(), n);
        }
    }

    #[test]
    fn high_bit_integers_get_a_sign_byte() {
        let enc = encode_integer(&BigUint::from(128u32));
        assert_eq!(enc, vec![TAG_INTEGER, 2, 0x00, 0x80]);
        let enc = encode_integer(&BigUint::from(127u32));
        assert_eq!(enc, vec![TAG_INTEGER, 1, 0x7f]);
    }

    #[test]
    fn zero_has_one_content_byte() {
        assert_eq!(signed_bytes_be(&BigUint::from(0u32)), vec![0]);
        let enc = encode_integer(&BigUint::from(0u32));
        assert_eq!(enc, vec![TAG_INTEGER, 1, 0x00]);
    }

    #[test]
    fn negative_integers_are_rejected() {
        assert_eq!(
            decode_integer(&[TAG_INTEGER, 1, 0x80]),
            Err(DerError::NegativeInteger)
        );
    }

    #[test]
    fn sequence_round_trip() {
        let parts = vec![
            encode_utf8_string("a member"),
            encode_integer(&BigUint::from(42u32)),
            encode_octet_string(&[1, 2, 3]),
            encode_sequence(&[encode_utf8_string("nested")]),
        ];
        let seq = encode_sequence(&parts);
        assert!(is_sequence(&seq));
        let decoded = decode_sequence(&seq).unwrap();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decode_utf8_string(decoded[0]).unwrap(), "a member");
        assert_eq!(decode_integer(decoded[1]).unwrap(), BigUint::from(42u32));
        assert_eq!(decode_octet_string(decoded[2]).unwrap(), vec![1, 2, 3]);
        let nested = decode_sequence(decoded[3]).unwrap();
        assert_eq!(decode_utf8_string(nested[0]).unwrap(), "nested");
    }

    #[test]
    fn long_form_lengths() {
        let content = vec![7u8; 300];
        let enc = encode_octet_string(&content);
        assert_eq!(&enc[..4], &[TAG_OCTET_STRING, 0x82, 0x01, 0x2c]);
        assert_eq!(decode_octet_string(&enc).unwrap(), content);
    }

    #[test]
    fn truncated_input_is_an_error_not_a_panic() {
        let enc = encode_octet_string(&[1, 2, 3, 4]);
        for cut in 0..enc.len() {
            assert!(decode_octet_string(&enc[..cut]).is_err());
        }
        assert!(decode_sequence(&[TAG_SEQUENCE, 5, 1, 2]).is_err());
    }

    #[test]
    fn wrong_tag_is_reported() {
        let enc = encode_octet_string(&[1]);
        assert_eq!(
            decode_integer(&enc),
            Err(DerError::UnexpectedTag {
                expected: TAG_INTEGER,
                found: TAG_OCTET_STRING
            })
        );
    }
}
