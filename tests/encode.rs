use ctap_message::cose::{EcdhEsHkdf256PublicKey, P256PublicKey};
use ctap_message::ctap2::get_info::CtapOptions;
use ctap_message::ctap2::make_credential::{
    AttestationStatement, NoneAttestationStatement, PackedAttestationStatement,
};
use ctap_message::ctap2::{
    client_pin, get_assertion, get_info, make_credential, AttestedCredentialData, AuthenticatorData,
    AuthenticatorDataFlags,
};
use ctap_message::sizes::*;
use ctap_message::webauthn::{
    PublicKeyCredentialDescriptor, PublicKeyCredentialParameters, PublicKeyCredentialUserEntity,
};
use ctap_message::{respond, FixedBuffer, Message, Response, Status, String, Vec};
use hex_literal::hex;
use serde_cbor::Value;

const X: [u8; 32] = hex!("1a1b1c1d1e1f202122232425262728292a2b2c2d2e2f30313233343536373839");
const Y: [u8; 32] = hex!("fafbfcfdfeff000102030405060708090a0b0c0d0e0f10111213141516171819");

fn encode(response: Response) -> std::vec::Vec<u8> {
    let mut message = Message::new();
    respond(Ok(response), &mut message);
    message.to_vec()
}

/// Splits off the status byte and parses the rest, checking that it is
/// a single item in canonical order.
fn body(message: &[u8]) -> std::collections::BTreeMap<Value, Value> {
    assert_eq!(message[0], 0x00);
    let value: Value = serde_cbor::from_slice(&message[1..]).unwrap();
    // serde_cbor writes maps sorted by its canonical ordering
    assert_eq!(serde_cbor::to_vec(&value).unwrap(), &message[1..]);
    match value {
        Value::Map(map) => map,
        _ => panic!("body is not a map"),
    }
}

fn keys(map: &std::collections::BTreeMap<Value, Value>) -> std::vec::Vec<i128> {
    map.keys()
        .map(|key| match key {
            Value::Integer(i) => *i,
            _ => panic!("non-integer key"),
        })
        .collect()
}

fn get(map: &std::collections::BTreeMap<Value, Value>, key: i128) -> &Value {
    &map[&Value::Integer(key)]
}

fn attested_data() -> AuthenticatorData {
    AuthenticatorData {
        rp_id_hash: [0xD0; 32],
        flags: AuthenticatorDataFlags {
            user_present: true,
            attested_credential_data: true,
            ..Default::default()
        },
        sign_count: 0x0000_0102,
        attested_credential_data: Some(AttestedCredentialData {
            aaguid: hex!("0102030405060708090a0b0c0d0e0f10"),
            credential_id: FixedBuffer::from_slice(&[0xC1; CREDENTIAL_ID_LENGTH]).unwrap(),
            credential_public_key: P256PublicKey::new(X, Y),
        }),
    }
}

#[test]
fn cose_credential_key() {
    let encoded = ctap_message::cose::encode_public_key(&P256PublicKey::new(X, Y)).unwrap();
    assert_eq!(encoded.len(), COSE_KEY_LENGTH);
    // {1: 2, 3: -7, -1: 1, -2: x, -3: y}
    assert_eq!(&encoded[..10], &hex!("a5 01 02 03 26 20 01 21 58 20"));
    assert_eq!(&encoded[10..42], &X);
    assert_eq!(&encoded[42..45], &hex!("22 58 20"));
    assert_eq!(&encoded[45..], &Y);
}

#[test]
fn authenticator_data_layout() {
    let bytes = attested_data().to_bytes().unwrap();
    let mut expected = [0xD0; 32].to_vec();
    expected.extend_from_slice(&hex!("41 00000102"));
    expected.extend_from_slice(&hex!("0102030405060708090a0b0c0d0e0f10 0010"));
    expected.extend_from_slice(&[0xC1; 16]);
    let key = ctap_message::cose::encode_public_key(&P256PublicKey::new(X, Y)).unwrap();
    expected.extend_from_slice(&key);
    assert_eq!(&*bytes, &expected[..]);
    assert_eq!(bytes.len(), 32 + 1 + 4 + 16 + 2 + 16 + 77);
}

#[test]
fn make_credential_none() {
    let message = encode(Response::MakeCredential(make_credential::Response {
        auth_data: attested_data(),
        att_stmt: AttestationStatement::None(NoneAttestationStatement {}),
    }));

    let map = body(&message);
    assert_eq!(keys(&map), [1, 2, 3]);
    assert_eq!(get(&map, 1), &Value::Text("none".into()));
    assert_eq!(get(&map, 2), &Value::Bytes(attested_data().to_bytes().unwrap().to_vec()));
    assert_eq!(get(&map, 3), &Value::Map(Default::default()));
}

#[test]
fn make_credential_packed() {
    let mut x5c = Vec::new();
    x5c.push(FixedBuffer::from_slice(&[0x30; 300]).unwrap()).unwrap();
    let message = encode(Response::MakeCredential(make_credential::Response {
        auth_data: attested_data(),
        att_stmt: AttestationStatement::Packed(PackedAttestationStatement {
            alg: -7,
            sig: FixedBuffer::from_slice(&[0x30; 71]).unwrap(),
            x5c: Some(x5c),
        }),
    }));

    let map = body(&message);
    assert_eq!(get(&map, 1), &Value::Text("packed".into()));
    let statement = match get(&map, 3) {
        Value::Map(statement) => statement,
        _ => panic!("attStmt is not a map"),
    };
    assert_eq!(statement[&Value::Text("alg".into())], Value::Integer(-7));
    assert_eq!(statement[&Value::Text("sig".into())], Value::Bytes(vec![0x30; 71]));
    assert_eq!(
        statement[&Value::Text("x5c".into())],
        Value::Array(vec![Value::Bytes(vec![0x30; 300])])
    );
}

#[test]
fn get_assertion_minimal() {
    let message = encode(Response::GetAssertion(get_assertion::Response {
        credential: PublicKeyCredentialDescriptor::new(FixedBuffer::from_slice(&[9; 16]).unwrap()),
        auth_data: AuthenticatorData {
            rp_id_hash: [0xD0; 32],
            flags: AuthenticatorDataFlags::from_bits(AuthenticatorDataFlags::USER_PRESENCE),
            sign_count: 5,
            attested_credential_data: None,
        },
        signature: FixedBuffer::from_slice(&[0x30; 72]).unwrap(),
        user: None,
        number_of_credentials: None,
        user_selected: None,
    }));

    let map = body(&message);
    assert_eq!(keys(&map), [1, 2, 3]);
    let mut auth_data = [0xD0; 32].to_vec();
    auth_data.extend_from_slice(&hex!("01 00000005"));
    assert_eq!(get(&map, 2), &Value::Bytes(auth_data));
    // {"id": h'09..', "type": "public-key"}
    let credential = match get(&map, 1) {
        Value::Map(credential) => credential,
        _ => panic!("credential is not a map"),
    };
    assert_eq!(credential.len(), 2);
    assert_eq!(credential[&Value::Text("type".into())], Value::Text("public-key".into()));
}

#[test]
fn get_next_assertion_with_user() {
    let mut user = PublicKeyCredentialUserEntity::from(FixedBuffer::from_slice(b"user").unwrap());
    user.name = Some(String::from("alice"));
    let message = encode(Response::GetNextAssertion(get_assertion::Response {
        credential: PublicKeyCredentialDescriptor::new(FixedBuffer::from_slice(&[9; 16]).unwrap()),
        auth_data: AuthenticatorData {
            rp_id_hash: [0; 32],
            flags: AuthenticatorDataFlags::from_bits(0x05),
            sign_count: 0,
            attested_credential_data: None,
        },
        signature: FixedBuffer::from_slice(&[0x30; 8]).unwrap(),
        user: Some(user),
        number_of_credentials: Some(3),
        user_selected: Some(false),
    }));

    let map = body(&message);
    assert_eq!(keys(&map), [1, 2, 3, 4, 5, 6]);
    assert_eq!(get(&map, 5), &Value::Integer(3));
    assert_eq!(get(&map, 6), &Value::Bool(false));
    let user = match get(&map, 4) {
        Value::Map(user) => user,
        _ => panic!("user is not a map"),
    };
    assert_eq!(user[&Value::Text("id".into())], Value::Bytes(b"user".to_vec()));
    assert_eq!(user[&Value::Text("name".into())], Value::Text("alice".into()));
    assert!(!user.contains_key(&Value::Text("displayName".into())));
}

#[test]
fn get_info_full() {
    let mut info = get_info::Response::default();
    info.versions.push(String::from("FIDO_2_1_PRE")).unwrap();
    info.extensions.push(String::from("credProtect")).unwrap();
    info.extensions.push(String::from("hmac-secret")).unwrap();
    info.aaguid = hex!("8bc5496807b14d5fb249607f5d527da2");
    info.options = CtapOptions {
        rk: true,
        client_pin_supported: true,
        client_pin: false,
        ..Default::default()
    };
    info.max_msg_size = Some(MESSAGE_SIZE as u16);
    info.pin_uv_auth_protocols = Some(Vec::from_slice(&[1]).unwrap());
    info.max_credential_count_in_list = Some(MAX_CREDENTIAL_COUNT_IN_LIST as u8);
    info.max_credential_id_length = Some(CREDENTIAL_ID_LENGTH as u8);
    let es256 = PublicKeyCredentialParameters::public_key_with_alg(-7);
    info.algorithms = Some(Vec::from_slice(&[es256]).unwrap());

    let message = encode(Response::GetInfo(info));
    let map = body(&message);
    assert_eq!(keys(&map), [1, 2, 3, 4, 5, 6, 7, 8, 10]);
    assert_eq!(
        get(&map, 1),
        &Value::Array(vec![Value::Text("FIDO_2_0".into()), Value::Text("FIDO_2_1_PRE".into())])
    );
    assert_eq!(get(&map, 3), &Value::Bytes(hex!("8bc5496807b14d5fb249607f5d527da2").to_vec()));
    assert_eq!(get(&map, 5), &Value::Integer(MESSAGE_SIZE as i128));

    let options = match get(&map, 4) {
        Value::Map(options) => options,
        _ => panic!("options is not a map"),
    };
    assert_eq!(options[&Value::Text("clientPin".into())], Value::Bool(false));
    assert_eq!(options[&Value::Text("rk".into())], Value::Bool(true));
    assert!(!options.contains_key(&Value::Text("uv".into())));
}

#[test]
fn get_info_without_client_pin() {
    let message = encode(Response::GetInfo(get_info::Response::default()));
    let map = body(&message);
    assert_eq!(keys(&map), [1, 3, 4]);
    let options = match get(&map, 4) {
        Value::Map(options) => options,
        _ => panic!("options is not a map"),
    };
    assert!(!options.contains_key(&Value::Text("clientPin".into())));
}

#[test]
fn client_pin_key_agreement() {
    let message = encode(Response::ClientPin(client_pin::Response {
        key_agreement: Some(EcdhEsHkdf256PublicKey::new(X, Y)),
        ..Default::default()
    }));

    let map = body(&message);
    assert_eq!(keys(&map), [1]);
    let key = match get(&map, 1) {
        Value::Map(key) => key,
        _ => panic!("keyAgreement is not a map"),
    };
    assert_eq!(key[&Value::Integer(1)], Value::Integer(2));
    assert_eq!(key[&Value::Integer(3)], Value::Integer(-25));
    assert_eq!(key[&Value::Integer(-1)], Value::Integer(1));
    assert_eq!(key[&Value::Integer(-2)], Value::Bytes(X.to_vec()));
    assert_eq!(key[&Value::Integer(-3)], Value::Bytes(Y.to_vec()));
}

#[test]
fn client_pin_token() {
    let message = encode(Response::ClientPin(client_pin::Response {
        pin_uv_auth_token: Some(FixedBuffer::from_slice(&[0x77; 32]).unwrap()),
        ..Default::default()
    }));
    assert_eq!(&message[..4], &hex!("00 a1 02 58"));
    assert_eq!(message[4], 32);
}

#[test]
fn reset() {
    assert_eq!(encode(Response::Reset), [0x00]);
}

#[test]
fn deterministic() {
    let response = Response::MakeCredential(make_credential::Response {
        auth_data: attested_data(),
        att_stmt: AttestationStatement::None(NoneAttestationStatement {}),
    });
    assert_eq!(encode(response.clone()), encode(response));
}

#[test]
fn errors_are_a_single_byte() {
    let mut message = Message::new();
    message.extend_from_slice(&[0xAA; 100]).unwrap();
    respond(Err(Status::NoCredentials), &mut message);
    assert_eq!(&*message, &[0x2E][..]);

    let mut broken = attested_data();
    broken.attested_credential_data = None;
    respond(
        Ok(Response::MakeCredential(make_credential::Response {
            auth_data: broken,
            att_stmt: AttestationStatement::None(NoneAttestationStatement {}),
        })),
        &mut message,
    );
    assert_eq!(&*message, &[0x7F][..]);
}
