//! Property-based tests for the wire value types.
//!
//! Each strategy produces inputs that the wire rules accept or reject, and
//! the tests check that parsing agrees.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use proptest::prelude::*;

use clawlink::{
    BotEndpoint, BotId, BotName, ClaimCode, EncodedPublicKey, MAX_BOT_NAME_LENGTH, OwnerId,
    ValidationError,
};

mod strategies {
    use super::*;

    pub fn six_digits() -> impl Strategy<Value = String> {
        "[0-9]{6}"
    }

    /// Strings of digits with the wrong length, or six characters with at
    /// least one non-digit.
    pub fn not_a_code() -> impl Strategy<Value = String> {
        prop_oneof!["[0-9]{0,5}", "[0-9]{7,10}", "[0-9]{0,5}[a-zA-Z -/][0-9]{0,5}"]
            .prop_filter("exactly six digits", |s| {
                !(s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()))
            })
    }

    pub fn key_bytes() -> impl Strategy<Value = [u8; 32]> {
        prop::array::uniform32(any::<u8>())
    }

    /// Byte strings that are not 32 bytes long.
    pub fn wrong_length_bytes() -> impl Strategy<Value = Vec<u8>> {
        prop_oneof![
            prop::collection::vec(any::<u8>(), 0..32),
            prop::collection::vec(any::<u8>(), 33..64),
        ]
    }

    pub fn name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9][a-zA-Z0-9 _-]{0,60}[a-zA-Z0-9]?"
    }

    pub fn host() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,20}(\\.[a-z]{2,6})?(:[0-9]{2,5})?"
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn six_digit_strings_are_codes(input in strategies::six_digits()) {
        let code = ClaimCode::parse(&input).unwrap();
        prop_assert_eq!(code.as_str(), input.as_str());
    }

    #[test]
    fn other_strings_are_not_codes(input in strategies::not_a_code()) {
        prop_assert_eq!(ClaimCode::parse(&input), Err(ValidationError::InvalidClaimCode));
    }

    #[test]
    fn any_32_bytes_make_a_public_key(bytes in strategies::key_bytes()) {
        let wire = format!("ed25519:{}", STANDARD.encode(bytes));
        let key = EncodedPublicKey::parse(&wire).unwrap();

        prop_assert_eq!(key.key_bytes(), &bytes);
        prop_assert_eq!(key.as_str(), wire.as_str());
        prop_assert_eq!(EncodedPublicKey::from_ed25519_bytes(&bytes), key);
    }

    #[test]
    fn other_lengths_are_rejected(bytes in strategies::wrong_length_bytes()) {
        let wire = format!("ed25519:{}", STANDARD.encode(&bytes));
        let is_length_error = matches!(
            EncodedPublicKey::parse(&wire),
            Err(ValidationError::InvalidKeyLength { expected: 32, actual }) if actual == bytes.len()
        );
        prop_assert!(is_length_error);
    }

    #[test]
    fn key_without_prefix_is_rejected(bytes in strategies::key_bytes()) {
        prop_assert_eq!(
            EncodedPublicKey::parse(&STANDARD.encode(bytes)),
            Err(ValidationError::MissingKeyAlgorithm)
        );
    }

    #[test]
    fn names_are_trimmed(name in strategies::name(), pad in "[ \t]{0,3}") {
        let padded = format!("{pad}{name}{pad}");
        let parsed = BotName::parse(&padded).unwrap();
        prop_assert_eq!(parsed.as_str(), name.trim());
    }

    #[test]
    fn long_names_are_rejected(extra in 1usize..64) {
        let name = "n".repeat(MAX_BOT_NAME_LENGTH + extra);
        let is_too_long = matches!(BotName::parse(&name), Err(ValidationError::NameTooLong { .. }));
        prop_assert!(is_too_long);
    }

    #[test]
    fn owner_ids_are_trimmed(id in "[a-zA-Z0-9-]{1,64}") {
        let parsed = OwnerId::parse(&format!("  {id} ")).unwrap();
        prop_assert_eq!(parsed.as_str(), id.as_str());
    }

    #[test]
    fn endpoints_drop_trailing_slashes(host in strategies::host(), slashes in 0usize..3) {
        let input = format!("http://{host}{}", "/".repeat(slashes));
        let endpoint = BotEndpoint::parse(&input).unwrap();

        let expected = format!("http://{host}");
        prop_assert_eq!(endpoint.as_str(), expected.as_str());
        prop_assert_eq!(endpoint.route("attestation"), format!("{expected}/attestation"));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn generated_bot_ids_reparse(_seed in any::<u8>()) {
        let id = BotId::new();
        let reparsed = BotId::parse(id.as_str()).unwrap();

        prop_assert_eq!(reparsed.as_str(), id.as_str());
        prop_assert!(id.as_str().starts_with("cbot_"));
        prop_assert_eq!(id.suffix().len(), 26);
    }

    #[test]
    fn foreign_typeid_prefixes_are_rejected(prefix in "[a-z]{1,10}") {
        prop_assume!(prefix != "cbot");
        let id = BotId::new();
        let foreign = format!("{prefix}_{}", id.suffix());

        let is_bot_id_error = matches!(BotId::parse(&foreign), Err(ValidationError::InvalidBotId { .. }));
        prop_assert!(is_bot_id_error);
    }
}
