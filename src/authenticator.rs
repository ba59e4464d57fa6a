//! The FIDO CTAP Authenticator API is a completely irregular RPC protocol.
//! Anytime there is some consistency in one place, another choice is made
//! in another place. Sorry!
//!
//! [`Request::deserialize`] turns one complete CTAP2 message into a typed
//! request, [`respond`] turns the executor's result back into bytes.

use core::convert::TryFrom;

use serde::Deserialize;

use crate::buffer::Message;
use crate::cbor::{self, cbor_deserialize, cbor_serialize_extending};
use crate::ctap2::*;
use crate::operation::{Command, CommandCode};
use crate::sizes::MAX_CBOR_NESTING;
use crate::status::{Result, Status};

#[derive(Clone, Debug, Eq, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Request {
    GetInfo,
    MakeCredential(make_credential::Parameters),
    GetAssertion(get_assertion::Parameters),
    GetNextAssertion,
    ClientPin(client_pin::Parameters),
    Reset,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Response {
    GetInfo(get_info::Response),
    MakeCredential(make_credential::Response),
    GetAssertion(get_assertion::Response),
    GetNextAssertion(get_assertion::Response),
    ClientPin(client_pin::Response),
    Reset,
}

impl Request {
    /// Decodes a message whose first byte is the command code.
    ///
    /// Commands without parameters ignore anything after that byte.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let (&code, body) = data.split_first().ok_or_else(|| {
            info_now!("empty message");
            Status::InvalidCommand
        })?;

        let command = CommandCode::try_from(code).map_err(|_| {
            info_now!("unknown command {:#04x}", code);
            Status::InvalidCommand
        })?;

        match command {
            CommandCode::MakeCredential => {
                info!("authenticatorMakeCredential");
                Ok(Request::MakeCredential(deserialize_body(body)?))
            }

            CommandCode::GetAssertion => {
                info!("authenticatorGetAssertion");
                Ok(Request::GetAssertion(deserialize_body(body)?))
            }

            CommandCode::GetNextAssertion => {
                info!("authenticatorGetNextAssertion");
                Ok(Request::GetNextAssertion)
            }

            CommandCode::GetInfo => {
                info!("authenticatorGetInfo");
                Ok(Request::GetInfo)
            }

            CommandCode::ClientPin => {
                info!("authenticatorClientPIN");
                Ok(Request::ClientPin(deserialize_body(body)?))
            }

            CommandCode::Reset => {
                info!("authenticatorReset");
                Ok(Request::Reset)
            }

            CommandCode::BioEnrollment
            | CommandCode::CredentialManagement
            | CommandCode::PlatformConfig
            | CommandCode::Vendor(_) => {
                info_now!("unsupported command {:#04x}", code);
                Err(Status::InvalidCommand)
            }
        }
    }
}

/// The body has to be exactly one well-formed map, checked before any
/// field is looked at.
fn deserialize_body<'de, T: Deserialize<'de>>(body: &'de [u8]) -> Result<T> {
    let major = cbor::validate_item(body, MAX_CBOR_NESTING).map_err(|error| {
        info_now!("malformed parameters: {:?}", error);
        Status::from(error)
    })?;

    if major != cbor::MAJOR_MAP {
        info_now!("parameters are not a map (major type {})", major);
        return Err(Status::CborUnexpectedType);
    }

    cbor_deserialize(body).map_err(|error| {
        info_now!("could not parse parameters: {:?}", error);
        Status::from(error)
    })
}

impl Response {
    /// Writes status `0x00` followed by the CBOR body, replacing whatever
    /// `message` held.
    ///
    /// On failure `message` is left empty.
    pub fn serialize(&self, message: &mut Message) -> Result<()> {
        message.clear();
        message.push(Status::Success.into())?;

        let encoded = match self {
            Response::GetInfo(response) => cbor_serialize_extending(response, message),
            Response::MakeCredential(response) => cbor_serialize_extending(response, message),
            Response::GetAssertion(response) | Response::GetNextAssertion(response) => {
                cbor_serialize_extending(response, message)
            }
            Response::ClientPin(response) => cbor_serialize_extending(response, message),
            Response::Reset => Ok(0),
        };

        encoded.map(drop).map_err(|error| {
            message.clear();
            error_now!("could not serialize response: {:?}", error);
            Status::from(error)
        })
    }
}

/// Fills `message` with the reply to a request: the serialized response,
/// or a single status byte if either the executor or the encoder failed.
pub fn respond(result: Result<Response>, message: &mut Message) {
    let status = match result {
        Ok(response) => match response.serialize(message) {
            Ok(()) => return,
            Err(status) => status,
        },
        Err(status) => status,
    };

    info!("responding with {}", status);
    message.clear();
    // a single byte always fits
    message.push(status.into()).ok();
}

macro_rules! command {
    ($($type:ty: $code:ident,)*) => {
        $(
            impl Command for $type {
                fn command_code(&self) -> CommandCode {
                    CommandCode::$code
                }
            }
        )*
    };
}

command! {
    make_credential::Parameters: MakeCredential,
    make_credential::Response: MakeCredential,
    get_assertion::Parameters: GetAssertion,
    get_assertion::Response: GetAssertion,
    get_info::Response: GetInfo,
    client_pin::Parameters: ClientPin,
    client_pin::Response: ClientPin,
}

impl Command for Request {
    fn command_code(&self) -> CommandCode {
        match self {
            Request::GetInfo => CommandCode::GetInfo,
            Request::MakeCredential(_) => CommandCode::MakeCredential,
            Request::GetAssertion(_) => CommandCode::GetAssertion,
            Request::GetNextAssertion => CommandCode::GetNextAssertion,
            Request::ClientPin(_) => CommandCode::ClientPin,
            Request::Reset => CommandCode::Reset,
        }
    }
}

impl Command for Response {
    fn command_code(&self) -> CommandCode {
        match self {
            Response::GetInfo(_) => CommandCode::GetInfo,
            Response::MakeCredential(_) => CommandCode::MakeCredential,
            Response::GetAssertion(_) => CommandCode::GetAssertion,
            Response::GetNextAssertion(_) => CommandCode::GetNextAssertion,
            Response::ClientPin(_) => CommandCode::ClientPin,
            Response::Reset => CommandCode::Reset,
        }
    }
}
