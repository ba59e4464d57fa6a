#![allow(unused_variables)]

use core::fmt::{Display, Formatter};

use crate::status::Status;

/// This is the Result type used by the CBOR codec.
pub type Result<T> = core::result::Result<T, Error>;

/// This is the error type used by the CBOR codec.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// This is a feature that the codec will never implement
    WontImplement,
    /// The serialize buffer is full, after this many bytes
    SerializeBufferFull(usize),
    /// A collection was serialized without known length
    SerializeLengthUnknown,
    /// Hit the end of buffer, expected more data
    DeserializeUnexpectedEnd,
    /// Input continues after the top-level item
    DeserializeTrailingData,
    /// Indefinite lengths are not canonical
    DeserializeIndefiniteLength,
    /// Additional information 28, 29 or 30
    DeserializeReservedValue,
    /// Break code outside of an indefinite length item
    DeserializeUnexpectedBreak,
    /// Two-byte simple value below 32
    DeserializeBadSimple,
    /// Arrays and maps nested too deep
    DeserializeNestingTooDeep,
    /// Found a bool that wasn't 0xf4 or 0xf5
    DeserializeBadBool,
    /// Tried to parse invalid utf-8
    DeserializeBadUtf8,
    /// Expected a different major type
    DeserializeBadMajor,
    /// Integer does not fit the requested type
    DeserializeIntegerRange,
    /// Value may be valid, but not encoded in minimal way
    DeserializeNonMinimal,
    /// Serde Serialization Error
    SerdeSerCustom,
    /// Serde Deserialization Error
    SerdeDeCustom,
    /// Serde Missing required value
    SerdeMissingField,
    /// Serde found a field twice
    SerdeDuplicateField,
    /// Serde got a value of the wrong type
    SerdeInvalidType,
    /// Serde got a value outside of what the type accepts
    SerdeInvalidValue,
    /// Serde got too many (or too few) elements
    SerdeInvalidLength,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        use Error::*;
        write!(
            f,
            "{}",
            match self {
                WontImplement => "This is a feature that the CBOR codec will never implement",
                SerializeBufferFull(_) => "The serialize buffer is full",
                SerializeLengthUnknown => "Collections must have known length",
                DeserializeUnexpectedEnd => "Hit the end of buffer, expected more data",
                DeserializeTrailingData => "Data after the top-level item",
                DeserializeIndefiniteLength => "Indefinite length encoding",
                DeserializeReservedValue => "Reserved additional information",
                DeserializeUnexpectedBreak => "Unexpected break code",
                DeserializeBadSimple => "Two-byte simple value below 32",
                DeserializeNestingTooDeep => "Nesting too deep",
                DeserializeBadBool => "Found a bool that wasn't 0xf4 or 0xf5",
                DeserializeBadUtf8 => "Tried to parse invalid utf-8",
                DeserializeBadMajor => "Expected a different major type",
                DeserializeIntegerRange => "Integer out of range",
                DeserializeNonMinimal => "Value may be valid, but not encoded in minimal way",
                SerdeSerCustom => "Serde Serialization Error",
                SerdeDeCustom => "Serde Deserialization Error",
                SerdeMissingField => "Serde Missing Required Field",
                SerdeDuplicateField => "Serde Duplicate Field",
                SerdeInvalidType => "Serde Invalid Type",
                SerdeInvalidValue => "Serde Invalid Value",
                SerdeInvalidLength => "Serde Invalid Length",
            }
        )
    }
}

impl serde::ser::Error for Error {
    fn custom<T>(_msg: T) -> Self
    where
        T: Display,
    {
        Error::SerdeSerCustom
    }
}

impl serde::de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        info_now!("deser error: {}", &msg);
        Error::SerdeDeCustom
    }

    fn invalid_type(unexp: serde::de::Unexpected, exp: &dyn serde::de::Expected) -> Self {
        info_now!("deser invalid type: {}, expected {}", unexp, exp);
        Error::SerdeInvalidType
    }

    fn invalid_value(unexp: serde::de::Unexpected, exp: &dyn serde::de::Expected) -> Self {
        info_now!("deser invalid value: {}, expected {}", unexp, exp);
        Error::SerdeInvalidValue
    }

    fn invalid_length(len: usize, exp: &dyn serde::de::Expected) -> Self {
        info_now!("deser invalid length: {}, expected {}", len, exp);
        Error::SerdeInvalidLength
    }

    fn missing_field(field: &'static str) -> Self {
        info_now!("deser missing: {}", field);
        Error::SerdeMissingField
    }

    fn duplicate_field(field: &'static str) -> Self {
        info_now!("deser duplicate: {}", field);
        Error::SerdeDuplicateField
    }
}

impl serde::ser::StdError for Error {}

impl From<Error> for Status {
    fn from(error: Error) -> Status {
        use Error::*;
        match error {
            DeserializeUnexpectedEnd
            | DeserializeTrailingData
            | DeserializeIndefiniteLength
            | DeserializeReservedValue
            | DeserializeUnexpectedBreak
            | DeserializeBadSimple
            | DeserializeNestingTooDeep
            | DeserializeBadUtf8
            | DeserializeNonMinimal
            | SerdeDuplicateField
            | SerdeDeCustom => Status::InvalidCbor,

            DeserializeBadMajor
            | DeserializeBadBool
            | SerdeInvalidType => Status::CborUnexpectedType,

            DeserializeIntegerRange | SerdeInvalidValue => Status::InvalidParameter,
            SerdeInvalidLength => Status::InvalidLength,
            SerdeMissingField => Status::MissingParameter,

            SerializeBufferFull(_) => Status::RequestTooLarge,
            WontImplement | SerializeLengthUnknown | SerdeSerCustom => Status::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(Status::from(Error::DeserializeTrailingData), Status::InvalidCbor);
        assert_eq!(Status::from(Error::DeserializeBadMajor), Status::CborUnexpectedType);
        assert_eq!(Status::from(Error::SerdeMissingField), Status::MissingParameter);
        assert_eq!(Status::from(Error::SerdeInvalidLength), Status::InvalidLength);
        assert_eq!(Status::from(Error::SerdeInvalidValue), Status::InvalidParameter);
        assert_eq!(Status::from(Error::SerializeBufferFull(3)), Status::RequestTooLarge);
    }
}
