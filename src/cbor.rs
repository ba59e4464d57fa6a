//! A small, allocation free CBOR codec for the canonical subset CTAP2 uses.

pub mod de;
pub mod error;
pub mod ser;
pub mod validate;

pub use error::{Error, Result};
pub use validate::{validate_item, MAJOR_ARRAY, MAJOR_MAP};

use crate::buffer::FixedBuffer;

pub fn cbor_serialize<T: serde::Serialize>(object: &T, buffer: &mut [u8]) -> Result<usize> {
    let writer = ser::SliceWriter::new(buffer);
    let mut ser = ser::Serializer::new(writer);

    object.serialize(&mut ser)?;

    let writer = ser.into_inner();
    let size = writer.bytes_written();

    Ok(size)
}

/// Appends the encoding of `object` to `buffer`, returning the number of
/// bytes added. On error the buffer may hold a partial encoding.
pub fn cbor_serialize_extending<T: serde::Serialize, const N: usize>(
    object: &T,
    buffer: &mut FixedBuffer<N>,
) -> Result<usize> {
    let initial = buffer.len();
    let mut ser = ser::Serializer::new(&mut *buffer);
    object.serialize(&mut ser)?;
    Ok(buffer.len() - initial)
}

pub fn cbor_deserialize<'de, T: serde::Deserialize<'de>>(buffer: &'de [u8]) -> Result<T> {
    de::from_bytes(buffer)
}
