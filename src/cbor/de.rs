use core::convert::TryFrom;

use serde::de::{self, DeserializeSeed, Visitor};
use serde::Deserialize;

use super::error::{Error, Result};
use super::validate::{
    self, MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP, MAJOR_NEGATIVE, MAJOR_SIMPLE, MAJOR_TEXT,
    MAJOR_UNSIGNED,
};
use crate::sizes::MAX_CBOR_NESTING;

/// Deserialize a message of type `T` from a byte slice, which must contain
/// nothing else.
pub fn from_bytes<'a, T>(s: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let (t, rest) = take_from_bytes(s)?;
    if !rest.is_empty() {
        return Err(Error::DeserializeTrailingData);
    }
    Ok(t)
}

/// Deserialize a message of type `T` from a byte slice. The unused portion (if any)
/// of the byte slice is returned for further usage
pub fn take_from_bytes<'a, T>(s: &'a [u8]) -> Result<(T, &'a [u8])>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_bytes(s);
    let t = T::deserialize(&mut deserializer)?;
    Ok((t, deserializer.input))
}

/// A structure for deserializing canonical CBOR.
///
/// Only the shapes CTAP2 uses are supported: there is no `deserialize_any`,
/// no floats and no enums. Everything else is consumed as it is requested.
pub struct Deserializer<'de> {
    // This slice starts with the input data and bytes are truncated off
    // the beginning as data is parsed.
    pub(crate) input: &'de [u8],
}

impl<'de> Deserializer<'de> {
    /// Obtain a Deserializer from a slice of bytes
    pub fn from_bytes(input: &'de [u8]) -> Self {
        Deserializer { input }
    }
}

impl<'de> Deserializer<'de> {
    fn try_take_n(&mut self, count: usize) -> Result<&'de [u8]> {
        if self.input.len() >= count {
            let (a, b) = self.input.split_at(count);
            self.input = b;
            Ok(a)
        } else {
            Err(Error::DeserializeUnexpectedEnd)
        }
    }

    fn peek(&mut self) -> Result<u8> {
        self.input.first().copied().ok_or(Error::DeserializeUnexpectedEnd)
    }

    fn consume(&mut self) -> Result<()> {
        self.try_take_n(1).map(|_| ())
    }

    /// Argument of the next item, which must be of the given major type.
    fn raw_argument(&mut self, major: u8) -> Result<u64> {
        let head = validate::head(self.input)?;
        if head.major != major {
            return Err(Error::DeserializeBadMajor);
        }
        self.try_take_n(head.len)?;
        Ok(head.argument)
    }

    fn raw_unsigned(&mut self) -> Result<u64> {
        self.raw_argument(MAJOR_UNSIGNED)
    }

    fn raw_signed(&mut self) -> Result<i64> {
        let head = validate::head(self.input)?;
        let magnitude = match head.major {
            MAJOR_UNSIGNED | MAJOR_NEGATIVE => {
                i64::try_from(head.argument).map_err(|_| Error::DeserializeIntegerRange)?
            }
            _ => return Err(Error::DeserializeBadMajor),
        };
        self.try_take_n(head.len)?;
        Ok(if head.major == MAJOR_NEGATIVE {
            -1 - magnitude
        } else {
            magnitude
        })
    }

    /// Length of a string or collection, which can not exceed what is left.
    fn raw_length(&mut self, major: u8, min_item_size: usize) -> Result<usize> {
        let len = self.raw_argument(major)?;
        usize::try_from(len)
            .ok()
            .filter(|len| {
                len.checked_mul(min_item_size)
                    .map_or(false, |size| size <= self.input.len())
            })
            .ok_or(Error::DeserializeUnexpectedEnd)
    }
}

fn narrow<T: TryFrom<N>, N>(number: N) -> Result<T> {
    T::try_from(number).map_err(|_| Error::DeserializeIntegerRange)
}

struct SeqAccess<'a, 'b: 'a> {
    deserializer: &'a mut Deserializer<'b>,
    len: usize,
}

impl<'a, 'b: 'a> serde::de::SeqAccess<'b> for SeqAccess<'a, 'b> {
    type Error = Error;

    fn next_element_seed<V>(&mut self, seed: V) -> Result<Option<V::Value>>
    where
        V: DeserializeSeed<'b>,
    {
        if self.len > 0 {
            self.len -= 1;
            Ok(Some(seed.deserialize(&mut *self.deserializer)?))
        } else {
            Ok(None)
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len)
    }
}

struct MapAccess<'a, 'b: 'a> {
    deserializer: &'a mut Deserializer<'b>,
    len: usize,
}

impl<'a, 'b: 'a> serde::de::MapAccess<'b> for MapAccess<'a, 'b> {
    type Error = Error;

    fn next_key_seed<V>(&mut self, seed: V) -> Result<Option<V::Value>>
    where
        V: DeserializeSeed<'b>,
    {
        if self.len > 0 {
            self.len -= 1;
            Ok(Some(seed.deserialize(&mut *self.deserializer)?))
        } else {
            Ok(None)
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'b>,
    {
        seed.deserialize(&mut *self.deserializer)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len)
    }
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut Deserializer<'de> {
    type Error = Error;

    // Structures not known at compile time are not supported.
    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::WontImplement)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let val = match self.peek()? {
            0xf4 => false,
            0xf5 => true,
            byte if byte >> 5 == MAJOR_SIMPLE => return Err(Error::DeserializeBadBool),
            _ => return Err(Error::DeserializeBadMajor),
        };
        self.consume()?;
        visitor.visit_bool(val)
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let raw = self.raw_signed()?;
        visitor.visit_i8(narrow(raw)?)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let raw = self.raw_signed()?;
        visitor.visit_i16(narrow(raw)?)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let raw = self.raw_signed()?;
        visitor.visit_i32(narrow(raw)?)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let raw = self.raw_signed()?;
        visitor.visit_i64(raw)
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let raw = self.raw_unsigned()?;
        visitor.visit_u8(narrow(raw)?)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let raw = self.raw_unsigned()?;
        visitor.visit_u16(narrow(raw)?)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let raw = self.raw_unsigned()?;
        visitor.visit_u32(narrow(raw)?)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let raw = self.raw_unsigned()?;
        visitor.visit_u64(raw)
    }

    fn deserialize_f32<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::WontImplement)
    }

    fn deserialize_f64<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::WontImplement)
    }

    fn deserialize_char<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::WontImplement)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        // major type 2: "byte string"
        let length = self.raw_length(MAJOR_BYTES, 1)?;
        let bytes: &'de [u8] = self.try_take_n(length)?;
        visitor.visit_borrowed_bytes(bytes)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        // major type 3: "text string"
        let length = self.raw_length(MAJOR_TEXT, 1)?;
        let bytes: &'de [u8] = self.try_take_n(length)?;
        let string_slice = core::str::from_utf8(bytes).map_err(|_| Error::DeserializeBadUtf8)?;
        visitor.visit_borrowed_str(string_slice)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.peek()? {
            0xf6 => {
                self.consume()?;
                visitor.visit_none()
            }
            _ => visitor.visit_some(self),
        }
    }

    // In Serde, unit means an anonymous value containing no data: null.
    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.peek()? {
            0xf6 => {
                self.consume()?;
                visitor.visit_unit()
            }
            _ => Err(Error::DeserializeBadMajor),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        // major type 4: "array"
        let len = self.raw_length(MAJOR_ARRAY, 1)?;

        visitor.visit_seq(SeqAccess {
            deserializer: self,
            len,
        })
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let actual = self.raw_length(MAJOR_ARRAY, 1)?;
        if actual != len {
            return Err(de::Error::invalid_length(actual, &visitor));
        }

        visitor.visit_seq(SeqAccess {
            deserializer: self,
            len,
        })
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        // major type 5: "map"
        let len = self.raw_length(MAJOR_MAP, 2)?;

        visitor.visit_map(MapAccess {
            deserializer: self,
            len,
        })
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::WontImplement)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let len = validate::skip_item(self.input, MAX_CBOR_NESTING)?;
        self.try_take_n(len)?;
        visitor.visit_unit()
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::from_bytes;
    use crate::cbor::Error;
    use hex_literal::hex;
    use serde::de::IgnoredAny;

    fn reference<T: serde::Serialize>(object: &T) -> std::vec::Vec<u8> {
        serde_cbor::to_vec(object).unwrap()
    }

    #[test]
    fn de_bool() {
        for boolean in [true, false].iter() {
            let de: bool = from_bytes(&reference(boolean)).unwrap();
            assert_eq!(de, *boolean);
        }
        assert_eq!(from_bytes::<bool>(&hex!("f6")), Err(Error::DeserializeBadBool));
        assert_eq!(from_bytes::<bool>(&hex!("01")), Err(Error::DeserializeBadMajor));
    }

    #[test]
    fn de_i8() {
        for number in -128i8..=127 {
            let de: i8 = from_bytes(&reference(&number)).unwrap();
            assert_eq!(de, number);
        }
        assert_eq!(from_bytes::<i8>(&reference(&128)), Err(Error::DeserializeIntegerRange));
        assert_eq!(from_bytes::<i8>(&reference(&-129)), Err(Error::DeserializeIntegerRange));
    }

    #[test]
    fn de_i32() {
        for number in [0i32, -1, 23, -24, -25, 1000, -1000, i32::MAX, i32::MIN].iter() {
            let de: i32 = from_bytes(&reference(number)).unwrap();
            assert_eq!(de, *number);
        }
        assert_eq!(
            from_bytes::<i32>(&reference(&(i32::MAX as i64 + 1))),
            Err(Error::DeserializeIntegerRange)
        );
    }

    #[test]
    fn de_i64_extremes() {
        assert_eq!(from_bytes::<i64>(&reference(&i64::MIN)), Ok(i64::MIN));
        // -1 - (2^64 - 1) does not fit
        assert_eq!(
            from_bytes::<i64>(&hex!("3b ffffffffffffffff")),
            Err(Error::DeserializeIntegerRange)
        );
    }

    #[test]
    fn de_u8() {
        for number in 0..=255u8 {
            let de: u8 = from_bytes(&reference(&number)).unwrap();
            assert_eq!(de, number);
        }
        assert_eq!(from_bytes::<u8>(&reference(&256)), Err(Error::DeserializeIntegerRange));
        assert_eq!(from_bytes::<u8>(&reference(&-1)), Err(Error::DeserializeBadMajor));
    }

    #[test]
    fn non_minimal_integers() {
        assert_eq!(from_bytes::<u8>(&hex!("18 05")), Err(Error::DeserializeNonMinimal));
        assert_eq!(from_bytes::<u32>(&hex!("1a 0000ffff")), Err(Error::DeserializeNonMinimal));
        assert_eq!(from_bytes::<i32>(&hex!("38 00")), Err(Error::DeserializeNonMinimal));
    }

    #[test]
    fn de_bytes() {
        let slice = b"thank you postcard!";
        let bytes = crate::buffer::ByteSlice(slice);
        let de: crate::FixedBuffer<64> = from_bytes(&reference(&bytes)).unwrap();
        assert_eq!(&de[..], &slice[..]);

        // length header claims more than there is
        assert_eq!(
            from_bytes::<crate::FixedBuffer<64>>(&hex!("5a 00010000 00")),
            Err(Error::DeserializeUnexpectedEnd)
        );
    }

    #[test]
    fn de_str() {
        let string_slice = "thank you postcard, for blazing the path üêù";
        let de: heapless::String<64> = from_bytes(&reference(&string_slice)).unwrap();
        assert_eq!(de, string_slice);

        assert_eq!(
            from_bytes::<heapless::String<64>>(&hex!("62 c328")),
            Err(Error::DeserializeBadUtf8)
        );
        assert_eq!(
            from_bytes::<heapless::String<4>>(&reference(&"too long")),
            Err(Error::SerdeInvalidLength)
        );
    }

    #[test]
    fn de_seq() {
        let de: heapless::Vec<u8, 4> = from_bytes(&hex!("83 01 02 03")).unwrap();
        assert_eq!(&de[..], &[1, 2, 3]);
        assert_eq!(
            from_bytes::<heapless::Vec<u8, 2>>(&hex!("83 01 02 03")),
            Err(Error::SerdeInvalidLength)
        );
        assert_eq!(
            from_bytes::<heapless::Vec<u8, 4>>(&hex!("9f 01 ff")),
            Err(Error::DeserializeIndefiniteLength)
        );
    }

    #[test]
    fn ignored_any_skips_whole_items() {
        let (_, rest) =
            super::take_from_bytes::<IgnoredAny>(&hex!("a2 01 82 01 02 61 61 f5 07")).unwrap();
        assert_eq!(rest, &[0x07]);
    }

    #[test]
    fn trailing_bytes() {
        assert_eq!(from_bytes::<u8>(&hex!("01 02")), Err(Error::DeserializeTrailingData));
    }

    #[test]
    fn de_struct() {
        #[derive(Debug, Eq, PartialEq, serde::Deserialize)]
        struct Entity {
            id: crate::FixedBuffer<8>,
            name: Option<heapless::String<8>>,
        }

        // {"id": h'01', "x": [1], "name": "a"}
        let de: Entity =
            from_bytes(&hex!("a3 62 6964 41 01 61 78 81 01 64 6e616d65 61 61")).unwrap();
        assert_eq!(&de.id[..], &[1]);
        assert_eq!(de.name.as_deref(), Some("a"));

        assert_eq!(from_bytes::<Entity>(&hex!("a0")), Err(Error::SerdeMissingField));
        assert_eq!(
            from_bytes::<Entity>(&hex!("a2 62 6964 41 01 62 6964 41 02")),
            Err(Error::SerdeDuplicateField)
        );
        // integer key
        assert_eq!(from_bytes::<Entity>(&hex!("a1 01 41 01")), Err(Error::DeserializeBadMajor));
    }
}
