//! CTAP status codes.
//!
//! Every reply starts with one of these bytes. A success byte is followed by
//! the CBOR encoded response (possibly empty), an error byte stands alone.

use core::convert::TryFrom;
use core::fmt;

pub type Result<T> = core::result::Result<T, Status>;

macro_rules! status_codes {
    ($($(#[$attr:meta])* $variant:ident = $code:literal => $name:literal,)*) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        pub enum Status {
            $($(#[$attr])* $variant,)*
            /// Extension specific error, `0xE0..=0xEF`.
            Extension(u8),
            /// Vendor specific error, `0xF0..=0xFF`.
            Vendor(u8),
        }

        impl Status {
            /// The name the CTAP documents use for this status.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Status::$variant => $name,)*
                    Status::Extension(_) => "CTAP2_ERR_EXTENSION",
                    Status::Vendor(_) => "CTAP2_ERR_VENDOR",
                }
            }
        }

        impl From<Status> for u8 {
            fn from(status: Status) -> u8 {
                match status {
                    $(Status::$variant => $code,)*
                    Status::Extension(code) | Status::Vendor(code) => code,
                }
            }
        }

        impl TryFrom<u8> for Status {
            type Error = u8;

            fn try_from(code: u8) -> core::result::Result<Self, u8> {
                Ok(match code {
                    $($code => Status::$variant,)*
                    Status::EXTENSION_FIRST..=Status::EXTENSION_LAST => Status::Extension(code),
                    Status::VENDOR_FIRST..=Status::VENDOR_LAST => Status::Vendor(code),
                    code => return Err(code),
                })
            }
        }
    }
}

status_codes! {
    Success = 0x00 => "CTAP2_OK",
    InvalidCommand = 0x01 => "CTAP1_ERR_INVALID_COMMAND",
    InvalidParameter = 0x02 => "CTAP1_ERR_INVALID_PARAMETER",
    InvalidLength = 0x03 => "CTAP1_ERR_INVALID_LENGTH",
    InvalidSeq = 0x04 => "CTAP1_ERR_INVALID_SEQ",
    Timeout = 0x05 => "CTAP1_ERR_TIMEOUT",
    ChannelBusy = 0x06 => "CTAP1_ERR_CHANNEL_BUSY",
    LockRequired = 0x0A => "CTAP1_ERR_LOCK_REQUIRED",
    InvalidChannel = 0x0B => "CTAP1_ERR_INVALID_CHANNEL",
    CborUnexpectedType = 0x11 => "CTAP2_ERR_CBOR_UNEXPECTED_TYPE",
    InvalidCbor = 0x12 => "CTAP2_ERR_INVALID_CBOR",
    MissingParameter = 0x14 => "CTAP2_ERR_MISSING_PARAMETER",
    LimitExceeded = 0x15 => "CTAP2_ERR_LIMIT_EXCEEDED",
    UnsupportedExtension = 0x16 => "CTAP2_ERR_UNSUPPORTED_EXTENSION",
    FingerprintDatabaseFull = 0x17 => "CTAP2_ERR_FP_DATABASE_FULL",
    CredentialExcluded = 0x19 => "CTAP2_ERR_CREDENTIAL_EXCLUDED",
    Processing = 0x21 => "CTAP2_ERR_PROCESSING",
    InvalidCredential = 0x22 => "CTAP2_ERR_INVALID_CREDENTIAL",
    UserActionPending = 0x23 => "CTAP2_ERR_USER_ACTION_PENDING",
    OperationPending = 0x24 => "CTAP2_ERR_OPERATION_PENDING",
    NoOperations = 0x25 => "CTAP2_ERR_NO_OPERATIONS",
    UnsupportedAlgorithm = 0x26 => "CTAP2_ERR_UNSUPPORTED_ALGORITHM",
    OperationDenied = 0x27 => "CTAP2_ERR_OPERATION_DENIED",
    KeyStoreFull = 0x28 => "CTAP2_ERR_KEY_STORE_FULL",
    NotBusy = 0x29 => "CTAP2_ERR_NOT_BUSY",
    NoOperationPending = 0x2A => "CTAP2_ERR_NO_OPERATION_PENDING",
    UnsupportedOption = 0x2B => "CTAP2_ERR_UNSUPPORTED_OPTION",
    InvalidOption = 0x2C => "CTAP2_ERR_INVALID_OPTION",
    KeepaliveCancel = 0x2D => "CTAP2_ERR_KEEPALIVE_CANCEL",
    NoCredentials = 0x2E => "CTAP2_ERR_NO_CREDENTIALS",
    UserActionTimeout = 0x2F => "CTAP2_ERR_USER_ACTION_TIMEOUT",
    NotAllowed = 0x30 => "CTAP2_ERR_NOT_ALLOWED",
    PinInvalid = 0x31 => "CTAP2_ERR_PIN_INVALID",
    PinBlocked = 0x32 => "CTAP2_ERR_PIN_BLOCKED",
    PinAuthInvalid = 0x33 => "CTAP2_ERR_PIN_AUTH_INVALID",
    PinAuthBlocked = 0x34 => "CTAP2_ERR_PIN_AUTH_BLOCKED",
    PinNotSet = 0x35 => "CTAP2_ERR_PIN_NOT_SET",
    PinRequired = 0x36 => "CTAP2_ERR_PIN_REQUIRED",
    PinPolicyViolation = 0x37 => "CTAP2_ERR_PIN_POLICY_VIOLATION",
    PinTokenExpired = 0x38 => "CTAP2_ERR_PIN_TOKEN_EXPIRED",
    RequestTooLarge = 0x39 => "CTAP2_ERR_REQUEST_TOO_LARGE",
    ActionTimeout = 0x3A => "CTAP2_ERR_ACTION_TIMEOUT",
    UpRequired = 0x3B => "CTAP2_ERR_UP_REQUIRED",
    UvBlocked = 0x3C => "CTAP2_ERR_UV_BLOCKED",
    IntegrityFailure = 0x3D => "CTAP2_ERR_INTEGRITY_FAILURE",
    InvalidSubcommand = 0x3E => "CTAP2_ERR_INVALID_SUBCOMMAND",
    UvInvalid = 0x3F => "CTAP2_ERR_UV_INVALID",
    UnauthorizedPermission = 0x40 => "CTAP2_ERR_UNAUTHORIZED_PERMISSION",
    /// Something went wrong inside the authenticator, also used when a
    /// response cannot be encoded.
    Other = 0x7F => "CTAP1_ERR_OTHER",
    SpecLast = 0xDF => "CTAP2_ERR_SPEC_LAST",
}

impl Status {
    pub const EXTENSION_FIRST: u8 = 0xE0;
    pub const EXTENSION_LAST: u8 = 0xEF;
    pub const VENDOR_FIRST: u8 = 0xF0;
    pub const VENDOR_LAST: u8 = 0xFF;

    pub fn is_success(&self) -> bool {
        *self == Status::Success
    }

    pub fn code(&self) -> u8 {
        u8::from(*self)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}
