//! Bounded byte buffers.
//!
//! Everything the message layer stores or emits has a fixed maximum size,
//! `FixedBuffer<N>` reports overflow as a `Status` instead of truncating.

use core::convert::TryFrom;
use core::fmt;
use core::ops::{Deref, DerefMut};

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::cbor::{self, ser::Writer};
use crate::sizes::MESSAGE_SIZE;
use crate::status::{Result, Status};

/// A complete CTAP message: one status byte, then the CBOR payload.
pub type Message = FixedBuffer<MESSAGE_SIZE>;

#[derive(Clone, Default, Eq, PartialEq)]
pub struct FixedBuffer<const N: usize> {
    bytes: heapless::Vec<u8, N>,
}

impl<const N: usize> FixedBuffer<N> {
    pub const fn new() -> Self {
        Self { bytes: heapless::Vec::new() }
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.extend_from_slice(slice)?;
        Ok(buffer)
    }

    pub fn extend_from_slice(&mut self, slice: &[u8]) -> Result<()> {
        self.bytes
            .extend_from_slice(slice)
            .map_err(|_| Status::InvalidLength)
    }

    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.bytes.push(byte).map_err(|_| Status::InvalidLength)
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Copies out the contents, which must fill the buffer exactly.
    pub fn to_array(&self) -> Result<[u8; N]> {
        if self.bytes.len() != N {
            return Err(Status::InvalidLength);
        }
        let mut array = [0u8; N];
        array.copy_from_slice(&self.bytes);
        Ok(array)
    }
}

impl<const N: usize> Deref for FixedBuffer<N> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<const N: usize> DerefMut for FixedBuffer<N> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl<const N: usize> AsRef<[u8]> for FixedBuffer<N> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<const N: usize> PartialEq<[u8]> for FixedBuffer<N> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl<const N: usize> TryFrom<&[u8]> for FixedBuffer<N> {
    type Error = Status;

    fn try_from(slice: &[u8]) -> Result<Self> {
        Self::from_slice(slice)
    }
}

impl<const N: usize> fmt::Debug for FixedBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FixedBuffer<{}>(", N)?;
        for byte in self.bytes.iter() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl<const N: usize> Writer for FixedBuffer<N> {
    type Error = cbor::Error;

    fn write_all(&mut self, buf: &[u8]) -> cbor::Result<()> {
        let written = self.len();
        self.extend_from_slice(buf)
            .map_err(|_| cbor::Error::SerializeBufferFull(written))
    }
}

impl<const N: usize> Serialize for FixedBuffer<N> {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.bytes)
    }
}

impl<'de, const N: usize> Deserialize<'de> for FixedBuffer<N> {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor<const N: usize>;

        impl<'de, const N: usize> Visitor<'de> for ValueVisitor<N> {
            type Value = FixedBuffer<N>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a byte string of at most {} bytes", N)
            }

            fn visit_bytes<E>(self, value: &[u8]) -> core::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                FixedBuffer::from_slice(value).map_err(|_| E::invalid_length(value.len(), &self))
            }
        }

        deserializer.deserialize_bytes(ValueVisitor::<N>)
    }
}

/// Borrowed bytes that serialize as a CBOR byte string.
pub(crate) struct ByteSlice<'a>(pub &'a [u8]);

impl Serialize for ByteSlice<'_> {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.0)
    }
}
