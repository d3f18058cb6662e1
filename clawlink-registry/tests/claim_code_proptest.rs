//! Properties of issued claim codes.

use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};
use clawlink::ClaimCode;
use clawlink_registry::{BotStore, InMemoryBotStore, ManualClock, Registrar, RegistryConfig};
use proptest::prelude::*;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 _-]{0,40}"
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop::array::uniform32(any::<u8>())
        .prop_map(|bytes| clawlink::EncodedPublicKey::from_ed25519_bytes(&bytes).to_string())
}

proptest! {
    #[test]
    fn registration_codes_are_six_digits_for_fifteen_minutes(
        name in name_strategy(),
        key in key_strategy(),
        offset_secs in 0i64..1_000_000_000,
    ) {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
            + TimeDelta::seconds(offset_secs);
        let store = Arc::new(InMemoryBotStore::new());
        let registrar = Registrar::new(
            store.clone(),
            Arc::new(ManualClock::new(start)),
            RegistryConfig::default(),
        );

        let registration = registrar.register(&key, &name, None).unwrap();
        let code = registration.claim_code.as_str();

        prop_assert_eq!(code.len(), 6);
        prop_assert!(code.bytes().all(|b| b.is_ascii_digit()));
        prop_assert_eq!(registration.expires_at, start + TimeDelta::minutes(15));

        let record = store.get(&registration.bot_id).unwrap().unwrap();
        prop_assert!(record.owner_id().is_none());
        prop_assert_eq!(record.pending_claim().unwrap().code(), &registration.claim_code);
    }

    #[test]
    fn generated_codes_reparse(seed in any::<u64>()) {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let code = ClaimCode::generate_with(&mut rng);

        prop_assert_eq!(ClaimCode::parse(code.as_str()).unwrap(), code);
    }
}
