//! Serializer Tests
//!
//! Tests for the text, raw-byte and bincode serializers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use typedkv::serializer::{
    text, BincodeSerializer, DisplayFromStr, RawBytes, TextAdapter, TextSerializer,
};
use typedkv::{ByteBuffer, KvError, Serializer};

// =============================================================================
// Test Types
// =============================================================================

/// Domain type with a `name:age` text form
#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
    age: u32,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.age)
    }
}

impl FromStr for User {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, age) = s.split_once(':').ok_or("missing ':'")?;
        let age = age.parse().map_err(|e| format!("bad age: {}", e))?;
        Ok(User {
            name: name.to_string(),
            age,
        })
    }
}

/// Text serializer writing integers in hex, for adapter tests
struct HexText;

impl TextSerializer<u32> for HexText {
    fn to_text(&self, value: &u32) -> String {
        format!("{:x}", value)
    }

    fn from_text(&self, text: &str) -> typedkv::Result<u32> {
        u32::from_str_radix(text, 16).map_err(|e| KvError::Format(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Session {
    id: u64,
    user: String,
    scopes: Vec<String>,
}

// =============================================================================
// Text Serializer Tests
// =============================================================================

#[test]
fn test_text_integer_round_trip() {
    let serializer = text::<i64>();
    let encoded = serializer.serialize(&-1020).unwrap();
    assert_eq!(encoded.as_slice(), b"-1020");
    assert_eq!(serializer.deserialize(&encoded).unwrap(), -1020);
}

#[test]
fn test_text_float_and_bool() {
    let floats = text::<f64>();
    assert_eq!(floats.deserialize(&ByteBuffer::from("2.5")).unwrap(), 2.5);

    let bools = text::<bool>();
    assert_eq!(bools.serialize(&true).unwrap().as_slice(), b"true");
    assert!(!bools.deserialize(&ByteBuffer::from("false")).unwrap());
}

#[test]
fn test_text_string_is_utf8_identity() {
    let serializer = text::<String>();
    let value = "  héllo wörld \n".to_string();
    let encoded = serializer.serialize(&value).unwrap();
    assert_eq!(encoded.as_slice(), value.as_bytes());
    assert_eq!(serializer.deserialize(&encoded).unwrap(), value);
}

#[test]
fn test_text_empty_string() {
    let serializer = text::<String>();
    let encoded = serializer.serialize(&String::new()).unwrap();
    assert!(encoded.is_empty());
    assert_eq!(serializer.deserialize(&encoded).unwrap(), "");
}

#[test]
fn test_text_rejects_garbage() {
    let serializer = text::<u32>();
    for input in ["", "abc", "10x", "1020 ", "-1"] {
        let result = serializer.deserialize(&ByteBuffer::from(input));
        assert!(
            matches!(result, Err(KvError::Format(_))),
            "{:?} should not parse",
            input
        );
    }
}

#[test]
fn test_text_rejects_invalid_utf8() {
    let serializer = text::<String>();
    let result = serializer.deserialize(&ByteBuffer::from(&[0xffu8, 0xfe][..]));
    assert!(matches!(result, Err(KvError::Format(_))));
}

#[test]
fn test_text_custom_domain_type() {
    let serializer = text::<User>();
    let user = User {
        name: "ada".to_string(),
        age: 36,
    };

    let encoded = serializer.serialize(&user).unwrap();
    assert_eq!(encoded.as_slice(), b"ada:36");
    assert_eq!(serializer.deserialize(&encoded).unwrap(), user);

    let err = serializer.deserialize(&ByteBuffer::from("ada")).unwrap_err();
    assert!(matches!(err, KvError::Format(ref m) if m.contains("missing ':'")));
}

#[test]
fn test_adapter_over_custom_text_serializer() {
    let serializer = TextAdapter::<u32, _>::new(HexText);
    let encoded = serializer.serialize(&255).unwrap();
    assert_eq!(encoded.as_slice(), b"ff");
    assert_eq!(serializer.deserialize(&encoded).unwrap(), 255);
}

#[test]
fn test_display_from_str_directly() {
    let text = DisplayFromStr::<u16>::new();
    assert_eq!(text.to_text(&8080), "8080");
    assert_eq!(text.from_text("8080").unwrap(), 8080);
    assert!(text.from_text("70000").is_err());
}

// =============================================================================
// Raw Byte Serializer Tests
// =============================================================================

#[test]
fn test_raw_bytes_identity() {
    let data = ByteBuffer::from(&[0u8, 1, 2, 255][..]);
    let encoded = Serializer::<ByteBuffer>::serialize(&RawBytes, &data).unwrap();
    assert_eq!(encoded, data);

    let vec: Vec<u8> = Serializer::<Vec<u8>>::deserialize(&RawBytes, &encoded).unwrap();
    assert_eq!(vec, vec![0, 1, 2, 255]);
}

// =============================================================================
// Bincode Serializer Tests
// =============================================================================

#[test]
fn test_bincode_struct_round_trip() {
    let serializer = BincodeSerializer::<Session>::new();
    let session = Session {
        id: 7,
        user: "ada".to_string(),
        scopes: vec!["read".to_string(), "write".to_string()],
    };

    let encoded = serializer.serialize(&session).unwrap();
    assert_eq!(serializer.deserialize(&encoded).unwrap(), session);
}

#[test]
fn test_bincode_rejects_truncated_input() {
    let serializer = BincodeSerializer::<Session>::new();
    let session = Session {
        id: 1,
        user: "x".to_string(),
        scopes: Vec::new(),
    };
    let encoded = serializer.serialize(&session).unwrap();
    let truncated = ByteBuffer::from(&encoded.as_slice()[..encoded.len() - 1]);

    assert!(matches!(
        serializer.deserialize(&truncated),
        Err(KvError::Format(_))
    ));
}

#[test]
fn test_bincode_rejects_trailing_bytes() {
    let serializer = BincodeSerializer::<u32>::new();
    let mut bytes = serializer.serialize(&5).unwrap().to_vec();
    bytes.push(0);

    assert!(matches!(
        serializer.deserialize(&ByteBuffer::from(bytes)),
        Err(KvError::Format(_))
    ));
}
