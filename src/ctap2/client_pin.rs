use core::convert::TryFrom;
use core::fmt;

use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, Unexpected, Visitor};
use serde_indexed::SerializeIndexed;

use super::{next_unique, next_unique_array};
use crate::buffer::FixedBuffer;
use crate::cose::EcdhEsHkdf256PublicKey;
use crate::sizes::*;
use crate::status::{Result, Status};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Subcommand {
    GetPinRetries = 0x01,
    GetKeyAgreement = 0x02,
    SetPin = 0x03,
    ChangePin = 0x04,
    GetPinUvAuthTokenUsingPin = 0x05,
    GetPinUvAuthTokenUsingUv = 0x06,
    GetUvRetries = 0x07,
}

impl TryFrom<u8> for Subcommand {
    type Error = u8;

    fn try_from(from: u8) -> core::result::Result<Self, u8> {
        Ok(match from {
            0x01 => Subcommand::GetPinRetries,
            0x02 => Subcommand::GetKeyAgreement,
            0x03 => Subcommand::SetPin,
            0x04 => Subcommand::ChangePin,
            0x05 => Subcommand::GetPinUvAuthTokenUsingPin,
            0x06 => Subcommand::GetPinUvAuthTokenUsingUv,
            0x07 => Subcommand::GetUvRetries,
            other => return Err(other),
        })
    }
}

impl<'de> Deserialize<'de> for Subcommand {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = u8::deserialize(deserializer)?;
        Subcommand::try_from(code).map_err(|code| {
            de::Error::invalid_value(Unexpected::Unsigned(code as u64), &"a subcommand from 1 to 7")
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Key {
    PinUvAuthProtocol,
    SubCommand,
    KeyAgreement,
    PinUvAuthParam,
    NewPinEnc,
    PinHashEnc,
}

impl Key {
    fn from_i64(key: i64) -> Option<Self> {
        Some(match key {
            0x01 => Key::PinUvAuthProtocol,
            0x02 => Key::SubCommand,
            0x03 => Key::KeyAgreement,
            0x04 => Key::PinUvAuthParam,
            0x05 => Key::NewPinEnc,
            0x06 => Key::PinHashEnc,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameters {
    // 0x01
    pub pin_uv_auth_protocol: u8,
    // 0x02
    pub sub_command: Subcommand,
    // 0x03
    pub key_agreement: Option<EcdhEsHkdf256PublicKey>,
    // 0x04
    pub pin_uv_auth_param: Option<[u8; PIN_AUTH_LENGTH]>,
    // 0x05
    pub new_pin_enc: Option<FixedBuffer<NEW_PIN_ENC_LENGTH>>,
    // 0x06
    pub pin_hash_enc: Option<[u8; PIN_HASH_ENC_LENGTH]>,
}

impl Parameters {
    /// Checks that everything the subcommand works with was sent.
    ///
    /// The decoder accepts any combination, this is left to the caller.
    pub fn check_required(&self) -> Result<()> {
        let key_agreement = self.key_agreement.is_some();
        let pin_uv_auth_param = self.pin_uv_auth_param.is_some();
        let new_pin_enc = self.new_pin_enc.is_some();
        let pin_hash_enc = self.pin_hash_enc.is_some();

        let complete = match self.sub_command {
            Subcommand::GetPinRetries
            | Subcommand::GetKeyAgreement
            | Subcommand::GetUvRetries => true,
            Subcommand::SetPin => key_agreement && new_pin_enc && pin_uv_auth_param,
            Subcommand::ChangePin => {
                key_agreement && pin_hash_enc && new_pin_enc && pin_uv_auth_param
            }
            Subcommand::GetPinUvAuthTokenUsingPin => key_agreement && pin_hash_enc,
            Subcommand::GetPinUvAuthTokenUsingUv => key_agreement,
        };

        if complete {
            Ok(())
        } else {
            info_now!("{:?} is incomplete", self.sub_command);
            Err(Status::MissingParameter)
        }
    }
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IndexedVisitor;

        impl<'de> Visitor<'de> for IndexedVisitor {
            type Value = Parameters;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("authenticatorClientPIN parameters")
            }

            fn visit_map<V>(self, mut map: V) -> core::result::Result<Parameters, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut pin_uv_auth_protocol = None;
                let mut sub_command = None;
                let mut key_agreement = None;
                let mut pin_uv_auth_param = None;
                let mut new_pin_enc = None;
                let mut pin_hash_enc = None;

                while let Some(key) = map.next_key::<i64>()? {
                    match Key::from_i64(key) {
                        Some(Key::PinUvAuthProtocol) => {
                            next_unique(&mut map, &mut pin_uv_auth_protocol, "pinUvAuthProtocol")?
                        }
                        Some(Key::SubCommand) => {
                            next_unique(&mut map, &mut sub_command, "subCommand")?
                        }
                        Some(Key::KeyAgreement) => {
                            next_unique(&mut map, &mut key_agreement, "keyAgreement")?
                        }
                        Some(Key::PinUvAuthParam) => {
                            next_unique_array(&mut map, &mut pin_uv_auth_param, "pinUvAuthParam")?
                        }
                        Some(Key::NewPinEnc) => {
                            next_unique(&mut map, &mut new_pin_enc, "newPinEnc")?
                        }
                        Some(Key::PinHashEnc) => {
                            next_unique_array(&mut map, &mut pin_hash_enc, "pinHashEnc")?
                        }
                        None => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(Parameters {
                    pin_uv_auth_protocol: pin_uv_auth_protocol
                        .ok_or_else(|| de::Error::missing_field("pinUvAuthProtocol"))?,
                    sub_command: sub_command.ok_or_else(|| de::Error::missing_field("subCommand"))?,
                    key_agreement,
                    pin_uv_auth_param,
                    new_pin_enc,
                    pin_hash_enc,
                })
            }
        }

        deserializer.deserialize_map(IndexedVisitor)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, SerializeIndexed)]
#[serde_indexed(offset = 1)]
pub struct Response {
    // 0x01, the authenticator's half of the shared secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<EcdhEsHkdf256PublicKey>,

    // 0x02, encrypted under the shared secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_uv_auth_token: Option<FixedBuffer<PIN_TOKEN_LENGTH>>,

    // 0x03
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_retries: Option<u8>,

    // 0x04
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_cycle_state: Option<bool>,

    // 0x05
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_retries: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::{cbor_deserialize, cbor_serialize, Error};
    use hex_literal::hex;

    // {1: 2, 3: -25, -1: 1, -2: h'11..', -3: h'22..'}
    fn key_agreement() -> std::vec::Vec<u8> {
        let mut bytes = std::vec::Vec::from(&hex!("a5 01 02 03 38 18 20 01 21 5820")[..]);
        bytes.extend_from_slice(&[0x11; 32]);
        bytes.extend_from_slice(&hex!("22 5820"));
        bytes.extend_from_slice(&[0x22; 32]);
        bytes
    }

    #[test]
    fn get_pin_retries() {
        // {1: 1, 2: 1}
        let parameters: Parameters = cbor_deserialize(&hex!("a2 01 01 02 01")).unwrap();
        assert_eq!(parameters.pin_uv_auth_protocol, 1);
        assert_eq!(parameters.sub_command, Subcommand::GetPinRetries);
        assert_eq!(parameters.check_required(), Ok(()));
    }

    #[test]
    fn subcommand_out_of_range() {
        // {1: 1, 2: 8}
        assert_eq!(
            cbor_deserialize::<Parameters>(&hex!("a2 01 01 02 08")),
            Err(Error::SerdeInvalidValue)
        );
        assert_eq!(Status::from(Error::SerdeInvalidValue), Status::InvalidParameter);
        // {1: 1, 2: 0}
        assert!(cbor_deserialize::<Parameters>(&hex!("a2 01 01 02 00")).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        // {1: 1}
        assert_eq!(
            cbor_deserialize::<Parameters>(&hex!("a1 01 01")),
            Err(Error::SerdeMissingField)
        );
    }

    #[test]
    fn get_pin_token() {
        // {1: 1, 2: 5, 3: key, 6: h'44..'}
        let mut bytes = std::vec::Vec::from(&hex!("a4 01 01 02 05 03")[..]);
        bytes.extend_from_slice(&key_agreement());
        bytes.extend_from_slice(&hex!("06 50"));
        bytes.extend_from_slice(&[0x44; 16]);

        let parameters: Parameters = cbor_deserialize(&bytes).unwrap();
        assert_eq!(parameters.sub_command, Subcommand::GetPinUvAuthTokenUsingPin);
        assert_eq!(
            parameters.key_agreement,
            Some(EcdhEsHkdf256PublicKey::new([0x11; 32], [0x22; 32]))
        );
        assert_eq!(parameters.pin_hash_enc, Some([0x44; 16]));
        assert_eq!(parameters.check_required(), Ok(()));

        let change_pin = Parameters { sub_command: Subcommand::ChangePin, ..parameters };
        assert_eq!(change_pin.check_required(), Err(Status::MissingParameter));
    }

    #[test]
    fn pin_hash_enc_is_exact() {
        // {1: 1, 2: 5, 6: h'44 * 15'}
        let mut bytes = std::vec::Vec::from(&hex!("a3 01 01 02 05 06 4f")[..]);
        bytes.extend_from_slice(&[0x44; 15]);
        assert_eq!(cbor_deserialize::<Parameters>(&bytes), Err(Error::SerdeInvalidLength));
    }

    #[test]
    fn retries_response() {
        let response = Response {
            pin_retries: Some(8),
            power_cycle_state: Some(false),
            ..Default::default()
        };
        let mut buffer = [0u8; 16];
        let n = cbor_serialize(&response, &mut buffer).unwrap();
        assert_eq!(&buffer[..n], &hex!("a2 03 08 04 f4"));
    }

    #[test]
    fn key_agreement_response() {
        let response = Response {
            key_agreement: Some(EcdhEsHkdf256PublicKey::new([0x11; 32], [0x22; 32])),
            ..Default::default()
        };
        let mut buffer = [0u8; 128];
        let n = cbor_serialize(&response, &mut buffer).unwrap();
        assert_eq!(&buffer[..3], &hex!("a1 01 a5"));
        assert_eq!(&buffer[2..n], &key_agreement()[..]);
    }
}
