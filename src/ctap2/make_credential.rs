use core::fmt;

use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{
    next_unique, next_unique_array, AuthenticatorData, AuthenticatorExtensions,
    AuthenticatorOptions,
};
use crate::buffer::FixedBuffer;
use crate::sizes::*;
use crate::webauthn::*;
use crate::Vec;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Key {
    ClientDataHash,
    Rp,
    User,
    PubKeyCredParams,
    ExcludeList,
    Extensions,
    Options,
    PinUvAuthParam,
    PinUvAuthProtocol,
}

impl Key {
    fn from_i64(key: i64) -> Option<Self> {
        Some(match key {
            0x01 => Key::ClientDataHash,
            0x02 => Key::Rp,
            0x03 => Key::User,
            0x04 => Key::PubKeyCredParams,
            0x05 => Key::ExcludeList,
            0x06 => Key::Extensions,
            0x07 => Key::Options,
            0x08 => Key::PinUvAuthParam,
            0x09 => Key::PinUvAuthProtocol,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameters {
    // 0x01
    pub client_data_hash: [u8; CLIENT_DATA_HASH_LENGTH],
    // 0x02
    pub rp: PublicKeyCredentialRpEntity,
    // 0x03
    pub user: PublicKeyCredentialUserEntity,
    // 0x04
    // e.g. webauthn.io sends 10
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters, MAX_PUB_KEY_CRED_PARAMS>,
    // 0x05
    pub exclude_list: Option<Vec<PublicKeyCredentialDescriptor, MAX_CREDENTIAL_COUNT_IN_LIST>>,
    // 0x06
    pub extensions: Option<AuthenticatorExtensions>,
    // 0x07
    pub options: AuthenticatorOptions,
    // 0x08
    pub pin_uv_auth_param: Option<FixedBuffer<PIN_AUTH_LENGTH>>,
    // 0x09
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
                formatter.write_str("authenticatorMakeCredential parameters")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Parameters, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut client_data_hash = None;
                let mut rp = None;
                let mut user = None;
                let mut pub_key_cred_params = None;
                let mut exclude_list = None;
                let mut extensions = None;
                let mut options = None;
                let mut pin_uv_auth_param = None;
                let mut pin_uv_auth_protocol = None;

                while let Some(key) = map.next_key::<i64>()? {
                    match Key::from_i64(key) {
                        Some(Key::ClientDataHash) => {
                            next_unique_array(&mut map, &mut client_data_hash, "clientDataHash")?
                        }
                        Some(Key::Rp) => next_unique(&mut map, &mut rp, "rp")?,
                        Some(Key::User) => next_unique(&mut map, &mut user, "user")?,
                        Some(Key::PubKeyCredParams) => {
                            next_unique(&mut map, &mut pub_key_cred_params, "pubKeyCredParams")?
                        }
                        Some(Key::ExcludeList) => {
                            next_unique(&mut map, &mut exclude_list, "excludeList")?
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
                    client_data_hash: client_data_hash
                        .ok_or_else(|| de::Error::missing_field("clientDataHash"))?,
                    rp: rp.ok_or_else(|| de::Error::missing_field("rp"))?,
                    user: user.ok_or_else(|| de::Error::missing_field("user"))?,
                    pub_key_cred_params: pub_key_cred_params
                        .ok_or_else(|| de::Error::missing_field("pubKeyCredParams"))?,
                    exclude_list,
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

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NoneAttestationStatement {}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PackedAttestationStatement {
    pub alg: i32,
    pub sig: FixedBuffer<ASN1_SIGNATURE_LENGTH>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<FixedBuffer<MAX_CERTIFICATE_LENGTH>, 1>>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttestationStatement {
    None(NoneAttestationStatement),
    Packed(PackedAttestationStatement),
}

impl AttestationStatement {
    pub fn format(&self) -> &'static str {
        match self {
            AttestationStatement::None(_) => "none",
            AttestationStatement::Packed(_) => "packed",
        }
    }
}

// NB: attn object definition / order at end of
// https://fidoalliance.org/specs/fido-v2.0-ps-20190130/fido-client-to-authenticator-protocol-v2.0-ps-20190130.html#authenticatorMakeCredential
// does not coincide with what python-fido2 expects in AttestationObject.__init__ *at all* :'-)
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    // 0x02
    pub auth_data: AuthenticatorData,
    // 0x03, its format goes to 0x01
    pub att_stmt: AttestationStatement,
}

impl Response {
    pub fn fmt(&self) -> &'static str {
        self.att_stmt.format()
    }
}

impl Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(&0x01, self.fmt())?;
        map.serialize_entry(&0x02, &self.auth_data)?;
        map.serialize_entry(&0x03, &self.att_stmt)?;
        map.end()
    }
}
