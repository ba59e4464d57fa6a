//! Fixed capacities of everything the authenticator accepts or produces.
//!
//! Inputs that do not fit are rejected with `CTAP1_ERR_INVALID_LENGTH`,
//! they are never truncated.

pub const AAGUID_LENGTH: usize = 16;
pub const CLIENT_DATA_HASH_LENGTH: usize = 32;
pub const RP_ID_HASH_LENGTH: usize = 32;

// also reported as `maxCredentialIdLength` in GetInfo
pub const CREDENTIAL_ID_LENGTH: usize = 16;
pub const MAX_USER_ID_LENGTH: usize = 64;

// P-256 coordinates
pub const COORDINATE_LENGTH: usize = 32;
// {1: 2, 3: -7, -1: 1, -2: x, -3: y}
pub const COSE_KEY_LENGTH: usize = 77;

pub const ATTESTED_CREDENTIAL_DATA_LENGTH: usize =
    AAGUID_LENGTH + 2 + CREDENTIAL_ID_LENGTH + COSE_KEY_LENGTH;
pub const AUTHENTICATOR_DATA_LENGTH: usize =
    RP_ID_HASH_LENGTH + 1 + 4 + ATTESTED_CREDENTIAL_DATA_LENGTH;

// DER encoded ECDSA P-256 signature
pub const ASN1_SIGNATURE_LENGTH: usize = 72;
pub const MAX_CERTIFICATE_LENGTH: usize = 1024;

pub const PIN_AUTH_LENGTH: usize = 16;
pub const PIN_HASH_ENC_LENGTH: usize = 16;
pub const NEW_PIN_ENC_LENGTH: usize = 64;
pub const PIN_TOKEN_LENGTH: usize = 48;

// two salts, plus an IV under PIN protocol 2
pub const HMAC_SECRET_SALT_ENC_LENGTH: usize = 80;
// 16 bytes under PIN protocol 1, 32 under protocol 2
pub const HMAC_SECRET_SALT_AUTH_LENGTH: usize = 32;

pub const MAX_RP_ID_LENGTH: usize = 256;
pub const MAX_NAME_LENGTH: usize = 64;
pub const MAX_ICON_LENGTH: usize = 128;
pub const MAX_TYPE_LENGTH: usize = 32;
pub const MAX_TRANSPORT_LENGTH: usize = 16;
pub const MAX_TRANSPORTS: usize = 8;

// also reported as `maxCredentialCountInList` in GetInfo
pub const MAX_CREDENTIAL_COUNT_IN_LIST: usize = 8;
// e.g. webauthn.io sends 10
pub const MAX_PUB_KEY_CRED_PARAMS: usize = 12;

pub const MAX_VERSIONS: usize = 4;
pub const MAX_VERSION_LENGTH: usize = 12;
pub const MAX_EXTENSIONS: usize = 4;
pub const MAX_EXTENSION_LENGTH: usize = 16;
pub const MAX_PIN_PROTOCOLS: usize = 2;
pub const MAX_ALGORITHMS: usize = 4;

// deepest CBOR nesting we are willing to walk
pub const MAX_CBOR_NESTING: usize = 8;

pub const PACKET_SIZE: usize = 64;

// 7609 bytes
pub const MESSAGE_SIZE: usize = PACKET_SIZE - 7 + 128 * (PACKET_SIZE - 5);
