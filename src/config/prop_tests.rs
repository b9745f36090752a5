use super::*;
use crate::test_utils::arb_messy_string;
use proptest::prelude::*;

fn arb_store() -> impl Strategy<Value = StoreKind> {
    prop_oneof![Just(StoreKind::Database), Just(StoreKind::File)]
}

fn arb_mode() -> impl Strategy<Value = StorageMode> {
    prop_oneof![Just(StorageMode::Inline), Just(StorageMode::Local), Just(StorageMode::Remote)]
}

/// Generates a ConfigUpdate touching a representative subset of fields
fn arb_config_update() -> impl Strategy<Value = ConfigUpdate> {
    (
        prop::option::of(arb_messy_string()),
        prop::option::of(arb_store()),
        prop::option::of(arb_mode()),
        prop::option::of(any::<usize>()),
        prop::option::of(arb_messy_string()),
        prop::option::of(any::<u32>()),
        prop::option::of(any::<bool>()),
    )
        .prop_map(
            |(database_url, store, upload_mode, max_upload_bytes, session_secret, login_max_attempts, file_fallback)| {
                ConfigUpdate {
                    database_url,
                    store,
                    upload_mode,
                    max_upload_bytes,
                    session_secret,
                    login_max_attempts,
                    file_fallback,
                    ..Default::default()
                }
            },
        )
}

proptest! {
    /// An empty update changes nothing
    #[test]
    fn prop_empty_update_is_identity(url in arb_messy_string()) {
        let config = base_config(None).apply_update(ConfigUpdate {
            database_url: Some(url.clone()),
            ..Default::default()
        });

        let updated = config.clone().apply_update(ConfigUpdate::default());

        prop_assert_eq!(updated.database_url, url);
        prop_assert_eq!(updated.store, config.store);
        prop_assert_eq!(updated.upload_mode, config.upload_mode);
        prop_assert_eq!(updated.max_upload_bytes, config.max_upload_bytes);
    }

    /// Later updates win field by field
    #[test]
    fn prop_last_write_wins(a in arb_config_update(), b in arb_config_update()) {
        let base = base_config(None);
        let result = base.clone().apply_update(a.clone()).apply_update(b.clone());

        prop_assert_eq!(
            result.database_url,
            b.database_url.or(a.database_url).unwrap_or(base.database_url)
        );
        prop_assert_eq!(result.store, b.store.or(a.store).unwrap_or(base.store));
        prop_assert_eq!(result.upload_mode, b.upload_mode.or(a.upload_mode).unwrap_or(base.upload_mode));
        prop_assert_eq!(
            result.max_upload_bytes,
            b.max_upload_bytes.or(a.max_upload_bytes).unwrap_or(base.max_upload_bytes)
        );
        prop_assert_eq!(result.session_secret, b.session_secret.or(a.session_secret));
        prop_assert_eq!(
            result.login_max_attempts,
            b.login_max_attempts.or(a.login_max_attempts).unwrap_or(base.login_max_attempts)
        );
        prop_assert_eq!(result.file_fallback, b.file_fallback.or(a.file_fallback).unwrap_or(base.file_fallback));
    }

    /// Command line arguments never set the CLI-only server URL
    #[test]
    fn prop_args_mapping(
        database_url in prop::option::of(arb_messy_string()),
        max_files in prop::option::of(any::<usize>()),
        debug in any::<bool>(),
    ) {
        let args = CliArgs {
            database_url: database_url.clone(),
            max_files_per_request: max_files,
            debug,
            ..Default::default()
        };

        let update = config_from_args(args);

        prop_assert_eq!(update.database_url, database_url);
        prop_assert_eq!(update.max_files_per_request, max_files);
        prop_assert_eq!(update.server_url, None);
    }
}
