#![no_main]

use libfuzzer_sys::fuzz_target;
use ctap_message::cbor::cbor_deserialize;

fuzz_target!(|data: &[u8]| {
    type T = ctap_message::webauthn::PublicKeyCredentialUserEntity;
    cbor_deserialize::<T>(data).ok();
});
