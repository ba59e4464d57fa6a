use core::fmt;

use serde::de::{self, MapAccess};
use serde::{Deserialize, Serialize, Serializer};

use crate::buffer::FixedBuffer;
use crate::cose::{encode_public_key, P256PublicKey};
use crate::sizes::*;
use crate::status::{Result, Status};

pub mod client_pin;
pub mod get_assertion;
pub mod get_info;
pub mod make_credential;

/// Options the platform sends with MakeCredential and GetAssertion.
/// Anything not sent is `false`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthenticatorOptions {
    pub rk: bool,
    pub up: bool,
    pub uv: bool,
}

/// The MakeCredential extension inputs this authenticator understands,
/// others are dropped. GetAssertion has its own, see
/// [`get_assertion::Extensions`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct AuthenticatorExtensions {
    #[serde(rename = "credProtect")]
    pub cred_protect: Option<u8>,
    #[serde(rename = "hmac-secret")]
    pub hmac_secret: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AuthenticatorDataFlags {
    pub user_present: bool,
    pub user_verified: bool,
    pub attested_credential_data: bool,
    pub extension_data: bool,
}

impl AuthenticatorDataFlags {
    pub const USER_PRESENCE: u8 = 1 << 0;
    pub const USER_VERIFIED: u8 = 1 << 2;
    pub const ATTESTED_CREDENTIAL_DATA: u8 = 1 << 6;
    pub const EXTENSION_DATA: u8 = 1 << 7;

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.user_present {
            bits |= Self::USER_PRESENCE;
        }
        if self.user_verified {
            bits |= Self::USER_VERIFIED;
        }
        if self.attested_credential_data {
            bits |= Self::ATTESTED_CREDENTIAL_DATA;
        }
        if self.extension_data {
            bits |= Self::EXTENSION_DATA;
        }
        bits
    }

    /// Reserved bits are dropped.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            user_present: bits & Self::USER_PRESENCE != 0,
            user_verified: bits & Self::USER_VERIFIED != 0,
            attested_credential_data: bits & Self::ATTESTED_CREDENTIAL_DATA != 0,
            extension_data: bits & Self::EXTENSION_DATA != 0,
        }
    }
}

// NOTE: This is not CBOR, it has a custom encoding...
// https://www.w3.org/TR/webauthn/#sec-attested-credential-data
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttestedCredentialData {
    pub aaguid: [u8; AAGUID_LENGTH],
    pub credential_id: FixedBuffer<CREDENTIAL_ID_LENGTH>,
    pub credential_public_key: P256PublicKey,
}

impl AttestedCredentialData {
    pub fn to_bytes(&self) -> Result<FixedBuffer<ATTESTED_CREDENTIAL_DATA_LENGTH>> {
        let mut bytes = FixedBuffer::new();
        // 16 bytes, the aaguid
        bytes.extend_from_slice(&self.aaguid)?;

        // byte length of credential ID as 16-bit unsigned big-endian integer.
        bytes.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes())?;
        // raw bytes of credential ID
        bytes.extend_from_slice(&self.credential_id)?;

        bytes.extend_from_slice(&encode_public_key(&self.credential_public_key)?)?;

        Ok(bytes)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; RP_ID_HASH_LENGTH],
    pub flags: AuthenticatorDataFlags,
    pub sign_count: u32,
    pub attested_credential_data: Option<AttestedCredentialData>,
}

impl AuthenticatorData {
    /// The binary layout: rpIdHash, flags, big-endian signCount, then the
    /// attested credential data if and only if the AT flag is set.
    ///
    /// Setting the AT flag without attested credential data is a bug in
    /// the caller, reported as `CTAP1_ERR_OTHER`.
    pub fn to_bytes(&self) -> Result<FixedBuffer<AUTHENTICATOR_DATA_LENGTH>> {
        let mut bytes = FixedBuffer::new();

        // 32 bytes, the RP id's hash
        bytes.extend_from_slice(&self.rp_id_hash)?;
        // flags
        bytes.push(self.flags.bits())?;
        // signature counts as 32-bit unsigned big-endian integer.
        bytes.extend_from_slice(&self.sign_count.to_be_bytes())?;

        if self.flags.attested_credential_data {
            let attested_credential_data = self.attested_credential_data.as_ref().ok_or_else(|| {
                error_now!("AT flag set without attested credential data");
                Status::Other
            })?;
            bytes.extend_from_slice(&attested_credential_data.to_bytes()?)?;
        }

        Ok(bytes)
    }
}

/// Embedded into responses as a CBOR byte string.
impl Serialize for AuthenticatorData {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bytes = self
            .to_bytes()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        serializer.serialize_bytes(&bytes)
    }
}

// Helpers for the hand-written request visitors, whose top level maps
// are keyed by small integers.

/// Stores the next value in `slot`, unless the key was seen before.
pub(crate) fn next_unique<'de, V, T>(
    map: &mut V,
    slot: &mut Option<T>,
    field: &'static str,
) -> core::result::Result<(), V::Error>
where
    V: MapAccess<'de>,
    T: Deserialize<'de>,
{
    if slot.is_some() {
        return Err(de::Error::duplicate_field(field));
    }
    *slot = Some(map.next_value()?);
    Ok(())
}

struct ExactLength(usize);

impl de::Expected for ExactLength {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "exactly {} bytes", self.0)
    }
}

/// Like `next_unique`, for byte strings of exactly `N` bytes.
pub(crate) fn next_unique_array<'de, V, const N: usize>(
    map: &mut V,
    slot: &mut Option<[u8; N]>,
    field: &'static str,
) -> core::result::Result<(), V::Error>
where
    V: MapAccess<'de>,
{
    if slot.is_some() {
        return Err(de::Error::duplicate_field(field));
    }
    let bytes: FixedBuffer<N> = map.next_value()?;
    let array = bytes
        .to_array()
        .map_err(|_| de::Error::invalid_length(bytes.len(), &ExactLength(N)))?;
    *slot = Some(array);
    Ok(())
}
