//! Embedded PostgreSQL helpers shared by the Diesel integration suites.
//!
//! Each test gets a fresh temporary database on the process-wide cluster,
//! migrated with the same embedded migrations the server runs at startup.

use backend::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use tokio::runtime::Runtime;

/// Returns true when `SKIP_TEST_CLUSTER` is set to "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when `SKIP_TEST_CLUSTER` is truthy, otherwise fail.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Pin `PG_PASSWORD` so separate test processes reusing one data directory
/// agree on the superuser password.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads, and the
        // shared handle initialises at most once per process.
        unsafe {
            std::env::set_var("PG_PASSWORD", "game_exchange_embedded_test");
        }
    }
}

/// Create a migrated temporary database on the shared embedded cluster.
pub fn migrated_database(runtime: &Runtime) -> Result<TemporaryDatabase, String> {
    ensure_stable_password();
    let cluster = shared_cluster_handle().map_err(|err| format!("{err:?}"))?;
    let database = cluster
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4().simple()).as_str())
        .map_err(|err| format!("create database: {err:?}"))?;
    runtime
        .block_on(run_pending_migrations(database.url()))
        .map_err(|err| format!("migrate: {err}"))?;
    Ok(database)
}
