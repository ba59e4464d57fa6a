#![cfg_attr(not(test), no_std)]

//! `ctap-message` is the message layer of a FIDO2 authenticator: it maps the
//! bytes of a CTAP2 request to Rust structures consisting of `heapless` data
//! types, and serializes the authenticator's typed results back into the
//! byte layout the protocol requires.
//!
//! Covered commands are `authenticatorMakeCredential`, `authenticatorGetAssertion`,
//! `authenticatorGetNextAssertion`, `authenticatorGetInfo`, `authenticatorClientPIN`
//! and `authenticatorReset`.
//!
//! It also contains a lightweight CBOR serializer and deserializer, as the
//! existing `serde_cbor` creates very large code and allocates.
//!
//! Transports (USB, NFC, BLE) handle framing and hand over one complete
//! message; the authenticator logic only ever sees [`Request`] and produces
//! [`Response`]. Nothing in here keeps state between calls.
//!
//! ```ignore
//! let request = ctap_message::Request::deserialize(&data)?;
//! let result = authenticator.call(request);
//! ctap_message::respond(result, &mut message);
//! ```

#[macro_use]
extern crate delog;
generate_macros!();

pub use heapless::{String, Vec};

pub mod authenticator;
pub mod buffer;
pub mod cbor;
pub mod cose;
pub mod ctap2;
pub mod operation;
pub mod sizes;
pub mod status;
pub mod webauthn;

pub use authenticator::{respond, Request, Response};
pub use buffer::{FixedBuffer, Message};
pub use operation::{Command, CommandCode};
pub use status::{Result, Status};
