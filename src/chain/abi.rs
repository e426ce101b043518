//! Minimal ABI encoding for the handful of FlightSurety contract calls.
//!
//! Covers exactly the types those calls use: static `uint8`/`uint256`/
//! `address` words, one dynamic `string` argument, the `uint8[3]` return of
//! `getMyIndexes()`, and the non-indexed `OracleRequest` event data.

use sha3::{Digest, Keccak256};

use super::ChainError;
use crate::models::{Address, OracleRequest};

const WORD: usize = 32;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First four bytes of the keccak hash of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Full 32-byte event topic, 0x-prefixed, for `eth_getLogs` filters.
pub fn event_topic(signature: &str) -> String {
    format!("0x{}", hex::encode(keccak256(signature.as_bytes())))
}

/// ABI value for call encoding.
#[derive(Debug, Clone)]
pub enum Token {
    Uint8(u8),
    Uint(u128),
    Address(Address),
    String(String),
}

/// Selector plus encoded arguments, ready for a transaction `data` field.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(encode_tokens(args));
    data
}

fn encode_tokens(args: &[Token]) -> Vec<u8> {
    let head_len = WORD * args.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in args {
        match token {
            Token::Uint8(v) => head.extend(word_uint(u128::from(*v))),
            Token::Uint(v) => head.extend(word_uint(*v)),
            Token::Address(a) => head.extend(word_address(a)),
            Token::String(s) => {
                // Head slot holds the offset of the tail data, relative to
                // the start of the argument block.
                head.extend(word_uint((head_len + tail.len()) as u128));
                tail.extend(encode_bytes(s.as_bytes()));
            }
        }
    }

    head.extend(tail);
    head
}

fn word_uint(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn word_address(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 20..].copy_from_slice(address.as_bytes());
    word
}

fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = word_uint(bytes.len() as u128).to_vec();
    out.extend_from_slice(bytes);
    let partial = bytes.len() % WORD;
    if partial != 0 {
        out.extend(std::iter::repeat(0u8).take(WORD - partial));
    }
    out
}

fn word_at(data: &[u8], index: usize) -> Result<&[u8], ChainError> {
    let start = index * WORD;
    data.get(start..start + WORD)
        .ok_or_else(|| ChainError::Decode(format!("return data shorter than word {index}")))
}

pub fn decode_u8(data: &[u8], index: usize) -> Result<u8, ChainError> {
    Ok(word_at(data, index)?[WORD - 1])
}

pub fn decode_u64(data: &[u8], index: usize) -> Result<u64, ChainError> {
    let word = word_at(data, index)?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(bytes))
}

pub fn decode_address(data: &[u8], index: usize) -> Result<Address, ChainError> {
    let word = word_at(data, index)?;
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[WORD - 20..]);
    Ok(Address::new(bytes))
}

/// Decode a dynamic `string` whose offset lives in head word `index`.
pub fn decode_string(data: &[u8], index: usize) -> Result<String, ChainError> {
    let offset = decode_u64(data, index)? as usize;
    if offset % WORD != 0 {
        return Err(ChainError::Decode(format!("misaligned string offset {offset}")));
    }
    let len = decode_u64(data, offset / WORD)? as usize;
    let start = offset + WORD;
    let bytes = data
        .get(start..start + len)
        .ok_or_else(|| ChainError::Decode("string data out of bounds".to_string()))?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ChainError::Decode("string data is not utf-8".to_string()))
}

/// Decode the static `uint8[3]` returned by `getMyIndexes()`.
pub fn decode_index_set(data: &[u8]) -> Result<[u8; 3], ChainError> {
    Ok([
        decode_u8(data, 0)?,
        decode_u8(data, 1)?,
        decode_u8(data, 2)?,
    ])
}

/// Decode the data section of an `OracleRequest(uint8,address,string,uint256)`
/// log. All parameters are non-indexed.
pub fn decode_oracle_request(data: &[u8]) -> Result<OracleRequest, ChainError> {
    Ok(OracleRequest {
        index: decode_u8(data, 0)?,
        airline: decode_address(data, 1)?,
        flight: decode_string(data, 2)?,
        timestamp: decode_u64(data, 3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_of_empty_input_matches_known_digest() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn selector_matches_known_erc20_vector() {
        assert_eq!(
            hex::encode(selector("transfer(address,uint256)")),
            "a9059cbb"
        );
    }

    #[test]
    fn event_topic_matches_known_erc20_vector() {
        assert_eq!(
            event_topic("Transfer(address,address,uint256)"),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn encodes_static_words() {
        let airline = Address::new([0x11; 20]);
        let data = encode_tokens(&[Token::Uint8(4), Token::Address(airline)]);

        assert_eq!(data.len(), 64);
        assert_eq!(data[31], 4);
        assert!(data[..31].iter().all(|b| *b == 0));
        assert_eq!(&data[44..64], airline.as_bytes());
        assert!(data[32..44].iter().all(|b| *b == 0));
    }

    #[test]
    fn encodes_submit_response_layout() {
        let airline = Address::new([0x22; 20]);
        let data = encode_call(
            "submitOracleResponse(uint8,address,string,uint256,uint8)",
            &[
                Token::Uint8(4),
                Token::Address(airline),
                Token::String("ND1309".to_string()),
                Token::Uint(1_588_000_000),
                Token::Uint8(20),
            ],
        );

        // 4 selector bytes, 5 head words, length word, one padded data word.
        assert_eq!(data.len(), 4 + 5 * 32 + 32 + 32);

        let args = &data[4..];
        // String offset points past the five head words.
        assert_eq!(decode_u64(args, 2).unwrap(), 160);
        assert_eq!(decode_string(args, 2).unwrap(), "ND1309");
        assert_eq!(decode_u64(args, 3).unwrap(), 1_588_000_000);
        assert_eq!(decode_u8(args, 4).unwrap(), 20);
    }

    #[test]
    fn decodes_index_set() {
        let mut data = Vec::new();
        for index in [1u8, 4, 7] {
            data.extend(word_uint(u128::from(index)));
        }
        assert_eq!(decode_index_set(&data).unwrap(), [1, 4, 7]);
    }

    #[test]
    fn decodes_oracle_request_event_data() {
        let airline = Address::new([0x33; 20]);
        let data = encode_tokens(&[
            Token::Uint8(7),
            Token::Address(airline),
            Token::String("LH454".to_string()),
            Token::Uint(1_700_000_000),
        ]);

        let request = decode_oracle_request(&data).unwrap();
        assert_eq!(request.index, 7);
        assert_eq!(request.airline, airline);
        assert_eq!(request.flight, "LH454");
        assert_eq!(request.timestamp, 1_700_000_000);
    }

    #[test]
    fn decode_rejects_truncated_data() {
        assert!(decode_index_set(&[0u8; 64]).is_err());
        assert!(decode_oracle_request(&[0u8; 32]).is_err());
    }
}
