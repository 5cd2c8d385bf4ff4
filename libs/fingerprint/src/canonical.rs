//! Canonical text encoding of arbitrary `Serialize` values.
//!
//! The encoding is what gets hashed, so it must be byte-identical for
//! structurally equal values on every machine and every run:
//!
//! - Owned indirection (`Box`, `&T`, `Cow`) is invisible: serde
//!   serializes the pointee, so only structure reaches the output.
//! - Map entries are sorted by their encoded key (then value), so
//!   insertion order and `HashMap` iteration order never leak.
//! - Every scalar carries a type tag (`i32(1)`, `u8(1)`, `"1"`), structs
//!   carry their type and field names, enums their type and variant.
//!
//! Sets are the one hole: serde presents `HashSet` as a plain sequence, so
//! templates should use `BTreeSet` for set-valued fields.
//!
//! Grammar, informally:
//!
//! ```text
//! scalar   = bool(true) | i64(-3) | u16(7) | f64(1.5) | char('x') | "str" | bytes(0aff)
//! option   = nil | some(value)
//! seq      = [v,v,...]            tuple   = (v,v,...)
//! map      = map[k:v,k:v,...]     struct  = Name{field:v,...}
//! variant  = Name::Var | Name::Var(v) | Name::Var(v,...) | Name::Var{field:v,...}
//! ```

use std::fmt::Write as _;

use serde::ser::{self, Serialize};
use thiserror::Error;

/// Failure raised by a value's own `Serialize` impl.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("{0}")]
    Custom(String),

    #[error("map value serialized without a key")]
    MissingMapKey,
}

impl ser::Error for CanonicalError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        CanonicalError::Custom(msg.to_string())
    }
}

/// Encodes `value` into its canonical text form.
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonicalError> {
    value.serialize(CanonicalSerializer)
}

#[derive(Debug, Clone, Copy)]
struct CanonicalSerializer;

type Encoded = Result<String, CanonicalError>;

impl ser::Serializer for CanonicalSerializer {
    type Ok = String;
    type Error = CanonicalError;

    type SerializeSeq = Compound;
    type SerializeTuple = Compound;
    type SerializeTupleStruct = Compound;
    type SerializeTupleVariant = Compound;
    type SerializeMap = MapEncoder;
    type SerializeStruct = Compound;
    type SerializeStructVariant = Compound;

    fn serialize_bool(self, v: bool) -> Encoded {
        Ok(format!("bool({v})"))
    }

    fn serialize_i8(self, v: i8) -> Encoded {
        Ok(format!("i8({v})"))
    }

    fn serialize_i16(self, v: i16) -> Encoded {
        Ok(format!("i16({v})"))
    }

    fn serialize_i32(self, v: i32) -> Encoded {
        Ok(format!("i32({v})"))
    }

    fn serialize_i64(self, v: i64) -> Encoded {
        Ok(format!("i64({v})"))
    }

    fn serialize_i128(self, v: i128) -> Encoded {
        Ok(format!("i128({v})"))
    }

    fn serialize_u8(self, v: u8) -> Encoded {
        Ok(format!("u8({v})"))
    }

    fn serialize_u16(self, v: u16) -> Encoded {
        Ok(format!("u16({v})"))
    }

    fn serialize_u32(self, v: u32) -> Encoded {
        Ok(format!("u32({v})"))
    }

    fn serialize_u64(self, v: u64) -> Encoded {
        Ok(format!("u64({v})"))
    }

    fn serialize_u128(self, v: u128) -> Encoded {
        Ok(format!("u128({v})"))
    }

    fn serialize_f32(self, v: f32) -> Encoded {
        Ok(format!("f32({v:?})"))
    }

    fn serialize_f64(self, v: f64) -> Encoded {
        Ok(format!("f64({v:?})"))
    }

    fn serialize_char(self, v: char) -> Encoded {
        Ok(format!("char({v:?})"))
    }

    fn serialize_str(self, v: &str) -> Encoded {
        Ok(format!("{v:?}"))
    }

    fn serialize_bytes(self, v: &[u8]) -> Encoded {
        let mut out = String::with_capacity(v.len() * 2 + 7);
        out.push_str("bytes(");
        for b in v {
            let _ = write!(out, "{b:02x}");
        }
        out.push(')');
        Ok(out)
    }

    fn serialize_none(self) -> Encoded {
        Ok("nil".to_string())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Encoded {
        Ok(format!("some({})", value.serialize(self)?))
    }

    fn serialize_unit(self) -> Encoded {
        Ok("()".to_string())
    }

    fn serialize_unit_struct(self, name: &'static str) -> Encoded {
        Ok(format!("{name}{{}}"))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Encoded {
        Ok(format!("{name}::{variant}"))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Encoded {
        Ok(format!("{name}({})", value.serialize(self)?))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Encoded {
        Ok(format!("{name}::{variant}({})", value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Compound, CanonicalError> {
        Ok(Compound::new(String::new(), '[', ']', len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<Compound, CanonicalError> {
        Ok(Compound::new(String::new(), '(', ')', len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Compound, CanonicalError> {
        Ok(Compound::new(name.to_string(), '(', ')', len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Compound, CanonicalError> {
        Ok(Compound::new(format!("{name}::{variant}"), '(', ')', len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapEncoder, CanonicalError> {
        Ok(MapEncoder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Compound, CanonicalError> {
        Ok(Compound::new(name.to_string(), '{', '}', len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Compound, CanonicalError> {
        Ok(Compound::new(format!("{name}::{variant}"), '{', '}', len))
    }
}

/// Accumulates the items of a sequence, tuple or struct in order.
#[derive(Debug)]
struct Compound {
    head: String,
    items: Vec<String>,
    close: char,
}

impl Compound {
    fn new(mut head: String, open: char, close: char, len: usize) -> Self {
        head.push(open);
        Self {
            head,
            items: Vec::with_capacity(len),
            close,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CanonicalError> {
        self.items.push(value.serialize(CanonicalSerializer)?);
        Ok(())
    }

    fn push_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CanonicalError> {
        let encoded = value.serialize(CanonicalSerializer)?;
        self.items.push(format!("{key}:{encoded}"));
        Ok(())
    }

    fn finish(self) -> String {
        let Compound {
            mut head,
            items,
            close,
        } = self;
        head.push_str(&items.join(","));
        head.push(close);
        head
    }
}

impl ser::SerializeSeq for Compound {
    type Ok = String;
    type Error = CanonicalError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Encoded {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for Compound {
    type Ok = String;
    type Error = CanonicalError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Encoded {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for Compound {
    type Ok = String;
    type Error = CanonicalError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Encoded {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for Compound {
    type Ok = String;
    type Error = CanonicalError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Encoded {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for Compound {
    type Ok = String;
    type Error = CanonicalError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.push_field(key, value)
    }

    fn end(self) -> Encoded {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for Compound {
    type Ok = String;
    type Error = CanonicalError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.push_field(key, value)
    }

    fn end(self) -> Encoded {
        Ok(self.finish())
    }
}

/// Collects map entries, sorting them on `end`.
#[derive(Debug)]
struct MapEncoder {
    entries: Vec<(String, String)>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapEncoder {
    type Ok = String;
    type Error = CanonicalError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        self.pending_key = Some(key.serialize(CanonicalSerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self.pending_key.take().ok_or(CanonicalError::MissingMapKey)?;
        self.entries
            .push((key, value.serialize(CanonicalSerializer)?));
        Ok(())
    }

    fn end(mut self) -> Encoded {
        self.entries.sort();
        let inner: Vec<String> = self
            .entries
            .into_iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect();
        Ok(format!("map[{}]", inner.join(",")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Port {
        name: String,
        number: u16,
    }

    #[derive(Serialize)]
    enum Probe {
        None,
        Tcp(u16),
        Exec { command: Vec<String> },
    }

    #[derive(Serialize)]
    struct Owned {
        port: Box<Port>,
    }

    #[derive(Serialize)]
    struct Borrowed<'a> {
        port: &'a Port,
    }

    fn port() -> Port {
        Port {
            name: "mqtt".into(),
            number: 1883,
        }
    }

    #[test]
    fn test_struct_encoding() {
        assert_eq!(
            to_canonical_string(&port()).unwrap(),
            r#"Port{name:"mqtt",number:u16(1883)}"#
        );
    }

    #[test]
    fn test_enum_encoding() {
        assert_eq!(to_canonical_string(&Probe::None).unwrap(), "Probe::None");
        assert_eq!(
            to_canonical_string(&Probe::Tcp(8080)).unwrap(),
            "Probe::Tcp(u16(8080))"
        );
        assert_eq!(
            to_canonical_string(&Probe::Exec {
                command: vec!["true".into()]
            })
            .unwrap(),
            r#"Probe::Exec{command:["true"]}"#
        );
    }

    #[test]
    fn test_map_keys_sorted() {
        let mut forward = HashMap::new();
        let mut backward = HashMap::new();
        for i in 0..32 {
            forward.insert(format!("k{i}"), i);
        }
        for i in (0..32).rev() {
            backward.insert(format!("k{i}"), i);
        }
        let sorted: BTreeMap<_, _> = forward.clone().into_iter().collect();

        let encoded = to_canonical_string(&forward).unwrap();
        assert_eq!(encoded, to_canonical_string(&backward).unwrap());
        assert_eq!(encoded, to_canonical_string(&sorted).unwrap());
    }

    #[test]
    fn test_type_tags_distinguish_lookalikes() {
        let as_i32 = to_canonical_string(&1i32).unwrap();
        let as_u32 = to_canonical_string(&1u32).unwrap();
        let as_str = to_canonical_string("1").unwrap();

        assert_ne!(as_i32, as_u32);
        assert_ne!(as_i32, as_str);
        assert_ne!(
            to_canonical_string(&Some(1i32)).unwrap(),
            to_canonical_string(&1i32).unwrap()
        );
    }

    #[test]
    fn test_ownership_is_invisible() {
        let boxed = Owned {
            port: Box::new(port()),
        };
        let owned_port = port();
        let borrowed = Borrowed { port: &owned_port };
        let inner = |s: String| s.split_once('{').map(|(_, rest)| rest.to_string());

        assert_eq!(
            inner(to_canonical_string(&boxed).unwrap()),
            inner(to_canonical_string(&borrowed).unwrap())
        );
    }

    #[test]
    fn test_strings_are_escaped() {
        assert_eq!(
            to_canonical_string("a\"b,c").unwrap(),
            r#""a\"b,c""#
        );
    }

    #[test]
    fn test_bytes() {
        assert_eq!(
            to_canonical_string(&serde_bytes_like(&[0x0a, 0xff])).unwrap(),
            "bytes(0aff)"
        );
    }

    struct RawBytes<'a>(&'a [u8]);

    impl Serialize for RawBytes<'_> {
        fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_bytes(self.0)
        }
    }

    fn serde_bytes_like(bytes: &[u8]) -> RawBytes<'_> {
        RawBytes(bytes)
    }

    struct Broken;

    impl Serialize for Broken {
        fn serialize<S: ser::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(ser::Error::custom("cannot encode"))
        }
    }

    #[test]
    fn test_custom_error_propagates() {
        assert_eq!(
            to_canonical_string(&vec![Broken]),
            Err(CanonicalError::Custom("cannot encode".to_string()))
        );
    }
}
