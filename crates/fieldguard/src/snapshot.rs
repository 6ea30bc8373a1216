//! Detection of non-finite floats before a value is turned into JSON.
//!
//! `serde_json` writes NaN and the infinities as `null`, which would make a
//! NaN assignment indistinguishable from an absent one.

use serde::ser::{self, Impossible, Serialize, Serializer};
use std::fmt;

/// The float carried by `value` when it is a non-finite `f32`/`f64`, looking
/// through `Option` and newtype wrappers.
pub(crate) fn non_finite<V: Serialize + ?Sized>(value: &V) -> Option<f64> {
    value.serialize(FloatScan).ok().flatten()
}

/// Compound values are never scalars; the scan stops at them.
#[derive(Debug)]
pub(crate) struct NotScalar;

impl fmt::Display for NotScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("not a scalar")
    }
}

impl std::error::Error for NotScalar {}

impl ser::Error for NotScalar {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        NotScalar
    }
}

struct FloatScan;

type Scanned = Result<Option<f64>, NotScalar>;
type Bail = Impossible<Option<f64>, NotScalar>;

fn float(n: f64) -> Scanned {
    Ok((!n.is_finite()).then_some(n))
}

impl Serializer for FloatScan {
    type Ok = Option<f64>;
    type Error = NotScalar;
    type SerializeSeq = Bail;
    type SerializeTuple = Bail;
    type SerializeTupleStruct = Bail;
    type SerializeTupleVariant = Bail;
    type SerializeMap = Bail;
    type SerializeStruct = Bail;
    type SerializeStructVariant = Bail;

    fn serialize_f32(self, v: f32) -> Scanned {
        float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Scanned {
        float(v)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Scanned {
        value.serialize(self)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Scanned {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Scanned {
        Ok(None)
    }

    fn serialize_i8(self, _v: i8) -> Scanned {
        Ok(None)
    }

    fn serialize_i16(self, _v: i16) -> Scanned {
        Ok(None)
    }

    fn serialize_i32(self, _v: i32) -> Scanned {
        Ok(None)
    }

    fn serialize_i64(self, _v: i64) -> Scanned {
        Ok(None)
    }

    fn serialize_u8(self, _v: u8) -> Scanned {
        Ok(None)
    }

    fn serialize_u16(self, _v: u16) -> Scanned {
        Ok(None)
    }

    fn serialize_u32(self, _v: u32) -> Scanned {
        Ok(None)
    }

    fn serialize_u64(self, _v: u64) -> Scanned {
        Ok(None)
    }

    fn serialize_char(self, _v: char) -> Scanned {
        Ok(None)
    }

    fn serialize_str(self, _v: &str) -> Scanned {
        Ok(None)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Scanned {
        Ok(None)
    }

    fn serialize_none(self) -> Scanned {
        Ok(None)
    }

    fn serialize_unit(self) -> Scanned {
        Ok(None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Scanned {
        Ok(None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Scanned {
        Ok(None)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Scanned {
        Err(NotScalar)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Bail, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Bail, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Bail, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Bail, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Bail, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Bail, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Bail, NotScalar> {
        Err(NotScalar)
    }
}
