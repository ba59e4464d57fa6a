use serde::{Deserialize, Serialize};

use crate::sizes::*;
use crate::{FixedBuffer, String, Vec};

/// The credential type every authenticator understands.
pub const PUBLIC_KEY: &str = "public-key";

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct PublicKeyCredentialRpEntity {
    pub id: String<MAX_RP_ID_LENGTH>,
    pub name: Option<String<MAX_NAME_LENGTH>>,
    pub icon: Option<String<MAX_ICON_LENGTH>>,
}

// field order is the canonical key order: id, icon, name, displayName
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialUserEntity {
    pub id: FixedBuffer<MAX_USER_ID_LENGTH>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String<MAX_ICON_LENGTH>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String<MAX_NAME_LENGTH>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String<MAX_NAME_LENGTH>>,
}

impl PublicKeyCredentialUserEntity {
    pub fn from(id: FixedBuffer<MAX_USER_ID_LENGTH>) -> Self {
        Self { id, icon: None, name: None, display_name: None }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PublicKeyCredentialParameters {
    pub alg: i32,
    #[serde(rename = "type")]
    pub key_type: String<MAX_TYPE_LENGTH>,
}

impl PublicKeyCredentialParameters {
    pub fn public_key_with_alg(alg: i32) -> Self {
        let mut key_type = String::new();
        // "public-key" always fits
        key_type.push_str(PUBLIC_KEY).ok();
        Self { alg, key_type }
    }

    pub fn is_public_key(&self) -> bool {
        self.key_type == PUBLIC_KEY
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PublicKeyCredentialDescriptor {
    pub id: FixedBuffer<CREDENTIAL_ID_LENGTH>,
    #[serde(rename = "type")]
    pub key_type: String<MAX_TYPE_LENGTH>,
    // https://w3c.github.io/webauthn/#enumdef-authenticatortransport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String<MAX_TRANSPORT_LENGTH>, MAX_TRANSPORTS>>,
}

impl PublicKeyCredentialDescriptor {
    pub fn new(id: FixedBuffer<CREDENTIAL_ID_LENGTH>) -> Self {
        let mut key_type = String::new();
        key_type.push_str(PUBLIC_KEY).ok();
        Self { id, key_type, transports: None }
    }
}
