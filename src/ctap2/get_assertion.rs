use core::fmt;

use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_indexed::SerializeIndexed;

use super::{next_unique, next_unique_array, AuthenticatorData, AuthenticatorOptions};
use crate::buffer::FixedBuffer;
use crate::cose::EcdhEsHkdf256PublicKey;
use crate::sizes::*;
use crate::webauthn::*;
use crate::{String, Vec};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Key {
    RpId,
    ClientDataHash,
    AllowList,
    Extensions,
    Options,
    PinUvAuthParam,
    PinUvAuthProtocol,
}

impl Key {
    fn from_i64(key: i64) -> Option<Self> {
        Some(match key {
            0x01 => Key::RpId,
            0x02 => Key::ClientDataHash,
            0x03 => Key::AllowList,
            0x04 => Key::Extensions,
            0x05 => Key::Options,
            0x06 => Key::PinUvAuthParam,
            0x07 => Key::PinUvAuthProtocol,
            _ => return None,
        })
    }
}

/// The GetAssertion extension inputs this authenticator understands,
/// others are dropped.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize)]
pub struct Extensions {
    #[serde(rename = "hmac-secret")]
    pub hmac_secret: Option<HmacSecretInput>,
}

/// `{1: keyAgreement, 2: saltEnc, 3: saltAuth, 4: pinUvAuthProtocol}`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HmacSecretInput {
    pub key_agreement: EcdhEsHkdf256PublicKey,
    pub salt_enc: FixedBuffer<HMAC_SECRET_SALT_ENC_LENGTH>,
    pub salt_auth: FixedBuffer<HMAC_SECRET_SALT_AUTH_LENGTH>,
    pub pin_uv_auth_protocol: Option<u8>,
}

impl<'de> Deserialize<'de> for HmacSecretInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IndexedVisitor;

        impl<'de> Visitor<'de> for IndexedVisitor {
            type Value = HmacSecretInput;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("hmac-secret input")
            }

            fn visit_map<V>(self, mut map: V) -> Result<HmacSecretInput, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut key_agreement = None;
                let mut salt_enc = None;
                let mut salt_auth = None;
                let mut pin_uv_auth_protocol = None;

                while let Some(key) = map.next_key::<i64>()? {
                    match key {
                        0x01 => next_unique(&mut map, &mut key_agreement, "keyAgreement")?,
                        0x02 => next_unique(&mut map, &mut salt_enc, "saltEnc")?,
                        0x03 => next_unique(&mut map, &mut salt_auth, "saltAuth")?,
                        0x04 => {
                            next_unique(&mut map, &mut pin_uv_auth_protocol, "pinUvAuthProtocol")?
                        }
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(HmacSecretInput {
                    key_agreement: key_agreement
                        .ok_or_else(|| de::Error::missing_field("keyAgreement"))?,
                    salt_enc: salt_enc.ok_or_else(|| de::Error::missing_field("saltEnc"))?,
                    salt_auth: salt_auth.ok_or_else(|| de::Error::missing_field("saltAuth"))?,
                    pin_uv_auth_protocol,
                })
            }
        }

        deserializer.deserialize_map(IndexedVisitor)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameters {
    pub rp_id: String<MAX_RP_ID_LENGTH>,
    pub client_data_hash: [u8; CLIENT_DATA_HASH_LENGTH],
    pub allow_list: Option<Vec<PublicKeyCredentialDescriptor, MAX_CREDENTIAL_COUNT_IN_LIST>>,
    pub extensions: Option<Extensions>,
    pub options: AuthenticatorOptions,
    pub pin_uv_auth_param: Option<FixedBuffer<PIN_AUTH_LENGTH>>,
    pub pin_uv_auth_protocol: Option<u8>,
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IndexedVisitor;

        impl<'de> Visitor<'de> for IndexedVisitor {
            type Value = Parameters;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("authenticatorGetAssertion parameters")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Parameters, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut rp_id = None;
                let mut client_data_hash = None;
                let mut allow_list = None;
                let mut extensions = None;
                let mut options = None;
                let mut pin_uv_auth_param = None;
                let mut pin_uv_auth_protocol = None;

                while let Some(key) = map.next_key::<i64>()? {
                    match Key::from_i64(key) {
                        Some(Key::RpId) => next_unique(&mut map, &mut rp_id, "rpId")?,
                        Some(Key::ClientDataHash) => {
                            next_unique_array(&mut map, &mut client_data_hash, "clientDataHash")?
                        }
                        Some(Key::AllowList) => {
                            next_unique(&mut map, &mut allow_list, "allowList")?
                        }
                        Some(Key::Extensions) => {
                            next_unique(&mut map, &mut extensions, "extensions")?
                        }
                        Some(Key::Options) => next_unique(&mut map, &mut options, "options")?,
                        Some(Key::PinUvAuthParam) => {
                            next_unique(&mut map, &mut pin_uv_auth_param, "pinUvAuthParam")?
                        }
                        Some(Key::PinUvAuthProtocol) => {
                            next_unique(&mut map, &mut pin_uv_auth_protocol, "pinUvAuthProtocol")?
                        }
                        None => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(Parameters {
                    rp_id: rp_id.ok_or_else(|| de::Error::missing_field("rpId"))?,
                    client_data_hash: client_data_hash
                        .ok_or_else(|| de::Error::missing_field("clientDataHash"))?,
                    allow_list,
                    extensions,
                    options: options.unwrap_or_default(),
                    pin_uv_auth_param,
                    pin_uv_auth_protocol,
                })
            }
        }

        deserializer.deserialize_map(IndexedVisitor)
    }
}

/// Also the response to authenticatorGetNextAssertion.
#[derive(Clone, Debug, Eq, PartialEq, SerializeIndexed)]
#[serde_indexed(offset = 1)]
pub struct Response {
    pub credential: PublicKeyCredentialDescriptor,
    pub auth_data: AuthenticatorData,
    pub signature: FixedBuffer<ASN1_SIGNATURE_LENGTH>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicKeyCredentialUserEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_credentials: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_selected: Option<bool>,
}
