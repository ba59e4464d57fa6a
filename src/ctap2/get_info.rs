use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::buffer::ByteSlice;
use crate::sizes::*;
use crate::webauthn::PublicKeyCredentialParameters;
use crate::{String, Vec};

pub type AuthenticatorInfo = Response;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    // 0x01, omitted when empty
    pub versions: Vec<String<MAX_VERSION_LENGTH>, MAX_VERSIONS>,

    // 0x02, omitted when empty
    pub extensions: Vec<String<MAX_EXTENSION_LENGTH>, MAX_EXTENSIONS>,

    // 0x03
    pub aaguid: [u8; AAGUID_LENGTH],

    // 0x04
    pub options: CtapOptions,

    // 0x05
    pub max_msg_size: Option<u16>,

    // 0x06
    pub pin_uv_auth_protocols: Option<Vec<u8, MAX_PIN_PROTOCOLS>>,

    // 0x07
    pub max_credential_count_in_list: Option<u8>,

    // 0x08
    pub max_credential_id_length: Option<u8>,

    // 0x09
    // can be: usb, nfc, ble, internal
    pub transports: Option<Vec<String<MAX_TRANSPORT_LENGTH>, MAX_TRANSPORTS>>,

    // 0x0A
    pub algorithms: Option<Vec<PublicKeyCredentialParameters, MAX_ALGORITHMS>>,

    // 0x0B
    pub max_authenticator_config_length: Option<u8>,

    // 0x0C
    pub default_cred_protect: Option<u8>,
}

impl Default for Response {
    fn default() -> Self {
        let mut versions = Vec::new();
        let mut fido_2_0 = String::new();
        fido_2_0.push_str("FIDO_2_0").ok();
        versions.push(fido_2_0).ok();

        Self {
            versions,
            extensions: Vec::new(),
            aaguid: [0u8; AAGUID_LENGTH],
            options: CtapOptions::default(),
            max_msg_size: None,
            pin_uv_auth_protocols: None,
            max_credential_count_in_list: None,
            max_credential_id_length: None,
            transports: None,
            algorithms: None,
            max_authenticator_config_length: None,
            default_cred_protect: None,
        }
    }
}

impl Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = 2
            + !self.versions.is_empty() as usize
            + !self.extensions.is_empty() as usize
            + self.max_msg_size.is_some() as usize
            + self.pin_uv_auth_protocols.is_some() as usize
            + self.max_credential_count_in_list.is_some() as usize
            + self.max_credential_id_length.is_some() as usize
            + self.transports.is_some() as usize
            + self.algorithms.is_some() as usize
            + self.max_authenticator_config_length.is_some() as usize
            + self.default_cred_protect.is_some() as usize;

        let mut map = serializer.serialize_map(Some(len))?;

        if !self.versions.is_empty() {
            map.serialize_entry(&0x01, &self.versions)?;
        }
        if !self.extensions.is_empty() {
            map.serialize_entry(&0x02, &self.extensions)?;
        }
        map.serialize_entry(&0x03, &ByteSlice(&self.aaguid))?;
        map.serialize_entry(&0x04, &self.options)?;
        if let Some(max_msg_size) = &self.max_msg_size {
            map.serialize_entry(&0x05, max_msg_size)?;
        }
        if let Some(protocols) = &self.pin_uv_auth_protocols {
            map.serialize_entry(&0x06, protocols)?;
        }
        if let Some(count) = &self.max_credential_count_in_list {
            map.serialize_entry(&0x07, count)?;
        }
        if let Some(length) = &self.max_credential_id_length {
            map.serialize_entry(&0x08, length)?;
        }
        if let Some(transports) = &self.transports {
            map.serialize_entry(&0x09, transports)?;
        }
        if let Some(algorithms) = &self.algorithms {
            map.serialize_entry(&0x0A, algorithms)?;
        }
        if let Some(length) = &self.max_authenticator_config_length {
            map.serialize_entry(&0x0B, length)?;
        }
        if let Some(level) = &self.default_cred_protect {
            map.serialize_entry(&0x0C, level)?;
        }

        map.end()
    }
}

/// What the authenticator supports, reported as the `options` map.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CtapOptions {
    pub plat: bool,
    pub rk: bool,
    /// `clientPin` is only reported when supported,
    pub client_pin_supported: bool,
    /// and then says whether a PIN is set.
    pub client_pin: bool,
    pub up: bool,
    /// `uv` is only reported when supported,
    pub uv_supported: bool,
    /// and then says whether UV is configured.
    pub uv: bool,
    pub uv_token: bool,
    pub config: bool,
}

impl Default for CtapOptions {
    fn default() -> Self {
        Self {
            plat: false,
            rk: false,
            client_pin_supported: false,
            client_pin: false,
            up: true,
            uv_supported: false,
            uv: false,
            uv_token: false,
            config: false,
        }
    }
}

// Keys in canonical order: rk, up, uv, plat, config, uvToken, clientPin
impl Serialize for CtapOptions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = 3
            + self.uv_supported as usize
            + self.config as usize
            + self.uv_token as usize
            + self.client_pin_supported as usize;

        let mut map = serializer.serialize_map(Some(len))?;

        map.serialize_entry("rk", &self.rk)?;
        map.serialize_entry("up", &self.up)?;
        if self.uv_supported {
            map.serialize_entry("uv", &self.uv)?;
        }
        map.serialize_entry("plat", &self.plat)?;
        if self.config {
            map.serialize_entry("config", &true)?;
        }
        if self.uv_token {
            map.serialize_entry("uvToken", &true)?;
        }
        if self.client_pin_supported {
            map.serialize_entry("clientPin", &self.client_pin)?;
        }

        map.end()
    }
}
