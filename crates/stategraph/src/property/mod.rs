//! A narrow property-document demarshaller (spec §1 subsystem (a), §6
//! scalar type table), grounded in `TinyDemarshaller.cxx`'s `<simple
//! name type>` scalar decoding.
//!
//! This module is self-contained and is not wired into the state-graph
//! grammar — the parser never consults it (spec §1: "the property
//! value-object system implementation, the XML document loader" are
//! external collaborators). It exists so the scalar-type contract has a
//! concrete, testable counterpart.

use std::str::FromStr;

/// A decoded property value. `Struct`/`Sequence` mirror the document's
/// `<struct>`/`<sequence>` container elements; every other variant is a
/// leaf scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Char(char),
    UChar(char),
    Short(i16),
    UShort(u16),
    Long(i32),
    ULong(u32),
    Float(f32),
    Double(f64),
    String(String),
    Struct(Vec<(String, PropertyValue)>),
    Sequence(Vec<PropertyValue>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown scalar type \"{0}\"")]
    UnknownType(String),
    #[error("value should contain '0' or '1', got '{0}'")]
    InvalidBoolean(String),
    #[error("value should contain a single character, got '{0}'")]
    InvalidChar(String),
    #[error("value should contain a valid {type_name}, got '{value}'")]
    InvalidNumber { type_name: String, value: String },
}

/// Decodes `text` as the scalar named by `type_name`, following exactly
/// the original's per-type parsing (`boolean` from `"0"`/`"1"`,
/// `char`/`uchar` from a single character, the integer/float families via
/// the target Rust numeric type's `FromStr`).
pub fn decode_scalar(type_name: &str, text: &str) -> Result<PropertyValue, PropertyError> {
    match type_name {
        "boolean" => match text {
            "1" => Ok(PropertyValue::Bool(true)),
            "0" => Ok(PropertyValue::Bool(false)),
            other => Err(PropertyError::InvalidBoolean(other.to_string())),
        },
        "char" => single_char(text).map(PropertyValue::Char),
        "uchar" => single_char(text).map(PropertyValue::UChar),
        "short" => parse_number(text, "short").map(PropertyValue::Short),
        "ushort" => parse_number(text, "ushort").map(PropertyValue::UShort),
        "long" => parse_number(text, "long").map(PropertyValue::Long),
        "ulong" => parse_number(text, "ulong").map(PropertyValue::ULong),
        "float" => parse_number(text, "float").map(PropertyValue::Float),
        "double" => parse_number(text, "double").map(PropertyValue::Double),
        "string" => Ok(PropertyValue::String(text.to_string())),
        other => Err(PropertyError::UnknownType(other.to_string())),
    }
}

fn single_char(text: &str) -> Result<char, PropertyError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(PropertyError::InvalidChar(text.to_string())),
    }
}

fn parse_number<T: FromStr>(text: &str, type_name: &str) -> Result<T, PropertyError> {
    text.parse().map_err(|_| PropertyError::InvalidNumber {
        type_name: type_name.to_string(),
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_boolean() {
        assert_eq!(decode_scalar("boolean", "1").unwrap(), PropertyValue::Bool(true));
        assert_eq!(decode_scalar("boolean", "0").unwrap(), PropertyValue::Bool(false));
        assert!(decode_scalar("boolean", "yes").is_err());
    }

    #[test]
    fn decodes_char_and_uchar() {
        assert_eq!(decode_scalar("char", "x").unwrap(), PropertyValue::Char('x'));
        assert_eq!(decode_scalar("uchar", "y").unwrap(), PropertyValue::UChar('y'));
        assert!(decode_scalar("char", "xy").is_err());
    }

    #[test]
    fn decodes_numeric_families() {
        assert_eq!(decode_scalar("short", "-5").unwrap(), PropertyValue::Short(-5));
        assert_eq!(decode_scalar("ushort", "5").unwrap(), PropertyValue::UShort(5));
        assert_eq!(decode_scalar("long", "-100000").unwrap(), PropertyValue::Long(-100000));
        assert_eq!(decode_scalar("ulong", "100000").unwrap(), PropertyValue::ULong(100000));
        assert_eq!(decode_scalar("float", "1.5").unwrap(), PropertyValue::Float(1.5));
        assert_eq!(decode_scalar("double", "1.5").unwrap(), PropertyValue::Double(1.5));
    }

    #[test]
    fn decodes_string() {
        assert_eq!(
            decode_scalar("string", "hello world").unwrap(),
            PropertyValue::String("hello world".to_string())
        );
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(matches!(
            decode_scalar("vector3", "1,2,3"),
            Err(PropertyError::UnknownType(_))
        ));
    }
}
