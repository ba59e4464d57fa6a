//! # COSE keys
//!
//! Data types and serde for the public COSE_Keys CTAP2 exchanges
//!
//! https://tools.ietf.org/html/rfc8152#section-7
//!
//! Key Type 2 (EC2)
//! -1: crv
//! -2: x (x-coordinate)
//! -3: y (y-coordinate)
//!
//! Credential public keys are ES256, the keys of the PIN protocol's key
//! agreement are ECDH-ES+HKDF-256. Both live on P-256 and encode as
//!
//! ```text
//! {1: 2, 3: alg, -1: 1, -2: x, -3: y}
//! ```
//!
//! with the entries in this (canonical) order.

use core::fmt;
use core::marker::PhantomData;

use serde::de::{self, IgnoredAny, MapAccess, Unexpected, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::buffer::{ByteSlice, FixedBuffer};
use crate::cbor::cbor_serialize_extending;
use crate::sizes::{COORDINATE_LENGTH, COSE_KEY_LENGTH};
use crate::status::{Result, Status};

#[repr(i8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Label {
    Kty = 1,
    Alg = 3,
    Crv = -1,
    X = -2,
    Y = -3,
}

#[repr(i8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Kty {
    Ec2 = 2,
}

#[repr(i8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Alg {
    Es256 = -7, // ECDSA with SHA-256
    // Key Agreement
    EcdhEsHkdf256 = -25, // ES = ephemeral-static
}

#[repr(i8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Crv {
    P256 = 1,
}

trait PublicKeyConstants {
    const KTY: Kty;
    const ALG: Alg;
    const CRV: Crv;
    const NAME: &'static str;
}

type Coordinate = [u8; COORDINATE_LENGTH];

/// An ES256 credential public key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct P256PublicKey {
    pub x: Coordinate,
    pub y: Coordinate,
}

impl PublicKeyConstants for P256PublicKey {
    const KTY: Kty = Kty::Ec2;
    const ALG: Alg = Alg::Es256;
    const CRV: Crv = Crv::P256;
    const NAME: &'static str = "P256PublicKey";
}

/// A P-256 key for ECDH-ES+HKDF-256, as used by the PIN protocol.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EcdhEsHkdf256PublicKey {
    pub x: Coordinate,
    pub y: Coordinate,
}

impl PublicKeyConstants for EcdhEsHkdf256PublicKey {
    const KTY: Kty = Kty::Ec2;
    const ALG: Alg = Alg::EcdhEsHkdf256;
    const CRV: Crv = Crv::P256;
    const NAME: &'static str = "EcdhEsHkdf256PublicKey";
}

trait Ec2Key: PublicKeyConstants + Sized {
    fn from_coordinates(x: Coordinate, y: Coordinate) -> Self;
    fn coordinates(&self) -> (&Coordinate, &Coordinate);
}

macro_rules! ec2_key {
    ($key:ident) => {
        impl $key {
            pub fn new(x: Coordinate, y: Coordinate) -> Self {
                Self { x, y }
            }

            /// Takes the uncompressed SEC1 form `0x04 || x || y`.
            pub fn from_sec1_uncompressed(point: &[u8]) -> Result<Self> {
                let (tag, coordinates) = point.split_first().ok_or(Status::InvalidLength)?;
                if coordinates.len() != 2 * COORDINATE_LENGTH {
                    return Err(Status::InvalidLength);
                }
                if *tag != 0x04 {
                    return Err(Status::InvalidParameter);
                }
                let mut x = [0u8; COORDINATE_LENGTH];
                let mut y = [0u8; COORDINATE_LENGTH];
                x.copy_from_slice(&coordinates[..COORDINATE_LENGTH]);
                y.copy_from_slice(&coordinates[COORDINATE_LENGTH..]);
                Ok(Self { x, y })
            }
        }

        impl Ec2Key for $key {
            fn from_coordinates(x: Coordinate, y: Coordinate) -> Self {
                Self { x, y }
            }

            fn coordinates(&self) -> (&Coordinate, &Coordinate) {
                (&self.x, &self.y)
            }
        }

        impl Serialize for $key {
            fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serialize_ec2(self, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $key {
            fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_map(Ec2Visitor::<$key>(PhantomData))
            }
        }
    };
}

ec2_key!(P256PublicKey);
ec2_key!(EcdhEsHkdf256PublicKey);

fn serialize_ec2<K: Ec2Key, S: Serializer>(
    key: &K,
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    let (x, y) = key.coordinates();
    let mut map = serializer.serialize_map(Some(5))?;

    //  1: kty
    map.serialize_entry(&(Label::Kty as i8), &(K::KTY as i8))?;
    //  3: alg
    map.serialize_entry(&(Label::Alg as i8), &(K::ALG as i8))?;
    // -1: crv
    map.serialize_entry(&(Label::Crv as i8), &(K::CRV as i8))?;
    // -2: x
    map.serialize_entry(&(Label::X as i8), &ByteSlice(x))?;
    // -3: y
    map.serialize_entry(&(Label::Y as i8), &ByteSlice(y))?;

    map.end()
}

/// Accepts the entries in any order, ignores labels it does not know.
/// `alg` may be left out; if present it has to match. A known label may
/// appear only once.
struct Ec2Visitor<K>(PhantomData<K>);

impl<'de, K: Ec2Key> Visitor<'de> for Ec2Visitor<K> {
    type Value = K;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(K::NAME)
    }

    fn visit_map<V>(self, mut map: V) -> core::result::Result<K, V::Error>
    where
        V: MapAccess<'de>,
    {
        fn expect<E: de::Error>(
            value: i64,
            expected: i8,
            what: &'static str,
        ) -> core::result::Result<(), E> {
            if value != expected as i64 {
                return Err(E::invalid_value(Unexpected::Signed(value), &what));
            }
            Ok(())
        }

        fn coordinate<'de, V: MapAccess<'de>>(
            map: &mut V,
        ) -> core::result::Result<Coordinate, V::Error> {
            let bytes: FixedBuffer<COORDINATE_LENGTH> = map.next_value()?;
            bytes
                .to_array()
                .map_err(|_| de::Error::invalid_length(bytes.len(), &"a 32 byte coordinate"))
        }

        fn unique<E: de::Error>(
            seen: &mut bool,
            label: &'static str,
        ) -> core::result::Result<(), E> {
            if *seen {
                return Err(E::duplicate_field(label));
            }
            *seen = true;
            Ok(())
        }

        let mut kty = false;
        let mut alg = false;
        let mut crv = false;
        let mut x = None;
        let mut y = None;

        while let Some(label) = map.next_key::<i64>()? {
            match label {
                l if l == Label::Kty as i64 => {
                    unique(&mut kty, "kty")?;
                    expect(map.next_value()?, K::KTY as i8, "kty 2 (EC2)")?;
                }
                l if l == Label::Alg as i64 => {
                    unique(&mut alg, "alg")?;
                    expect(map.next_value()?, K::ALG as i8, "the key's algorithm")?;
                }
                l if l == Label::Crv as i64 => {
                    unique(&mut crv, "crv")?;
                    expect(map.next_value()?, K::CRV as i8, "crv 1 (P-256)")?;
                }
                l if l == Label::X as i64 => {
                    if x.is_some() {
                        return Err(de::Error::duplicate_field("x"));
                    }
                    x = Some(coordinate(&mut map)?);
                }
                l if l == Label::Y as i64 => {
                    if y.is_some() {
                        return Err(de::Error::duplicate_field("y"));
                    }
                    y = Some(coordinate(&mut map)?);
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        if !kty {
            return Err(de::Error::missing_field("kty"));
        }
        if !crv {
            return Err(de::Error::missing_field("crv"));
        }
        let x = x.ok_or_else(|| de::Error::missing_field("x"))?;
        let y = y.ok_or_else(|| de::Error::missing_field("y"))?;
        Ok(K::from_coordinates(x, y))
    }
}

/// The COSE encoding of a credential public key, as it appears in
/// attested credential data.
pub fn encode_public_key(key: &P256PublicKey) -> Result<FixedBuffer<COSE_KEY_LENGTH>> {
    let mut encoded = FixedBuffer::new();
    cbor_serialize_extending(key, &mut encoded).map_err(|_| Status::Other)?;
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::{cbor_deserialize, Error};
    use hex_literal::hex;

    const X: [u8; 32] = hex!("e866e1d9e17e6fa4da4ff0d1a5e7f1dd07a74d4a5e8e9e2ae9af27bb2cf32e27");
    const Y: [u8; 32] = hex!("2b1e7e5d0b4fe1c9a4e6ff21e20fc3a6d0d59a0d5d2c4f7f0e0a1e3a1f5b3c6d");

    fn expected(alg: u8) -> std::vec::Vec<u8> {
        let mut bytes = std::vec![0xa5, 0x01, 0x02, 0x03];
        bytes.extend_from_slice(match alg {
            7 => &[0x26][..],
            _ => &[0x38, 0x18][..],
        });
        bytes.extend_from_slice(&[0x20, 0x01, 0x21, 0x58, 0x20]);
        bytes.extend_from_slice(&X);
        bytes.extend_from_slice(&[0x22, 0x58, 0x20]);
        bytes.extend_from_slice(&Y);
        bytes
    }

    #[test]
    fn es256_key_is_77_bytes() {
        let encoded = encode_public_key(&P256PublicKey::new(X, Y)).unwrap();
        assert_eq!(encoded.len(), COSE_KEY_LENGTH);
        assert_eq!(&encoded[..], &expected(7)[..]);
    }

    #[test]
    fn key_agreement_key() {
        let mut buffer = FixedBuffer::<128>::new();
        cbor_serialize_extending(&EcdhEsHkdf256PublicKey::new(X, Y), &mut buffer).unwrap();
        assert_eq!(&buffer[..], &expected(25)[..]);

        let key: EcdhEsHkdf256PublicKey = cbor_deserialize(&buffer).unwrap();
        assert_eq!(key, EcdhEsHkdf256PublicKey::new(X, Y));
    }

    #[test]
    fn any_order_and_unknown_labels() {
        let mut map = std::collections::BTreeMap::new();
        use serde_cbor::Value;
        map.insert(Value::Integer(-3), Value::Bytes(Y.to_vec()));
        map.insert(Value::Integer(-2), Value::Bytes(X.to_vec()));
        map.insert(Value::Integer(-1), Value::Integer(1));
        map.insert(Value::Integer(1), Value::Integer(2));
        map.insert(Value::Integer(4), Value::Text("kid".into()));
        let bytes = serde_cbor::to_vec(&Value::Map(map)).unwrap();

        let key: EcdhEsHkdf256PublicKey = cbor_deserialize(&bytes).unwrap();
        assert_eq!(key, EcdhEsHkdf256PublicKey::new(X, Y));
    }

    #[test]
    fn wrong_curve_or_type() {
        let mut bytes = expected(25);
        // crv 2
        bytes[7] = 0x02;
        assert_eq!(
            cbor_deserialize::<EcdhEsHkdf256PublicKey>(&bytes),
            Err(Error::SerdeInvalidValue)
        );

        let mut bytes = expected(25);
        // kty 1
        bytes[2] = 0x01;
        assert_eq!(
            cbor_deserialize::<EcdhEsHkdf256PublicKey>(&bytes),
            Err(Error::SerdeInvalidValue)
        );

        // an ES256 key is not a key agreement key
        assert_eq!(
            cbor_deserialize::<EcdhEsHkdf256PublicKey>(&expected(7)),
            Err(Error::SerdeInvalidValue)
        );
    }

    #[test]
    fn short_coordinate() {
        // {1: 2, -1: 1, -2: h'00', -3: y}
        let mut bytes = std::vec![0xa4, 0x01, 0x02, 0x20, 0x01, 0x21, 0x41, 0x00, 0x22, 0x58, 0x20];
        bytes.extend_from_slice(&Y);
        assert_eq!(
            cbor_deserialize::<EcdhEsHkdf256PublicKey>(&bytes),
            Err(Error::SerdeInvalidLength)
        );
    }

    #[test]
    fn missing_coordinate() {
        // {1: 2, -1: 1, -2: x}
        let mut bytes = std::vec![0xa3, 0x01, 0x02, 0x20, 0x01, 0x21, 0x58, 0x20];
        bytes.extend_from_slice(&X);
        assert_eq!(
            cbor_deserialize::<EcdhEsHkdf256PublicKey>(&bytes),
            Err(Error::SerdeMissingField)
        );
    }

    #[test]
    fn repeated_labels() {
        // {1: 2, 3: -25, -1: 1, -2: x, -2: x, -3: y}
        let mut bytes = std::vec![0xa6, 0x01, 0x02, 0x03, 0x38, 0x18, 0x20, 0x01];
        for coordinate in &[X, X] {
            bytes.extend_from_slice(&[0x21, 0x58, 0x20]);
            bytes.extend_from_slice(coordinate);
        }
        bytes.extend_from_slice(&[0x22, 0x58, 0x20]);
        bytes.extend_from_slice(&Y);
        assert_eq!(
            cbor_deserialize::<EcdhEsHkdf256PublicKey>(&bytes),
            Err(Error::SerdeDuplicateField)
        );

        // {1: 2, 1: 2, -1: 1, -2: x, -3: y}
        let mut bytes = expected(25);
        bytes[0] = 0xa5;
        bytes[3] = 0x01;
        bytes[4] = 0x02;
        bytes.remove(5);
        assert_eq!(
            cbor_deserialize::<EcdhEsHkdf256PublicKey>(&bytes),
            Err(Error::SerdeDuplicateField)
        );
        assert_eq!(Status::from(Error::SerdeDuplicateField), Status::InvalidCbor);
    }

    #[test]
    fn sec1() {
        let mut point = std::vec![0x04];
        point.extend_from_slice(&X);
        point.extend_from_slice(&Y);
        assert_eq!(P256PublicKey::from_sec1_uncompressed(&point), Ok(P256PublicKey::new(X, Y)));
        point[0] = 0x02;
        assert_eq!(P256PublicKey::from_sec1_uncompressed(&point), Err(Status::InvalidParameter));
        assert_eq!(P256PublicKey::from_sec1_uncompressed(&point[..33]), Err(Status::InvalidLength));
    }
}
