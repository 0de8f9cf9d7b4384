use runcheck::adapters::sqlite::{create_migrated_test_pool, repositories};
use runcheck::domain::models::{Actor, ChecklistView, Config, Slot, TargetType};
use runcheck::services::{Engine, Repositories};
use sqlx::SqlitePool;

/// Engine over a fresh in-memory database with default subjects seeded.
///
/// The repositories are the same instances the engine uses, for assertions on
/// stored state.
pub struct TestEnv {
    pub pool: SqlitePool,
    pub engine: Engine,
    pub repos: Repositories,
}

pub async fn setup_test_env() -> TestEnv {
    setup_test_env_with(&Config::default()).await
}

pub async fn setup_test_env_with(config: &Config) -> TestEnv {
    let pool = create_migrated_test_pool()
        .await
        .expect("failed to create test database");
    let repos = repositories(pool.clone());
    let engine = Engine::new(repos.clone(), config);
    engine
        .catalog
        .seed_defaults("setup")
        .await
        .expect("failed to seed default subjects");
    TestEnv { pool, engine, repos }
}

/// Closes the connection pool.
pub async fn teardown_test_env(env: TestEnv) {
    env.pool.close().await;
}

pub fn admin() -> Actor {
    Actor::new("root", ["SYS:ADMIN"])
}

pub fn leader(unit: &str) -> Actor {
    Actor::new(format!("{}-lead", unit.to_lowercase()), [format!("GRP:{unit}#LEADER")])
}

/// A slot in `area` with its own slot-default checklist.
pub async fn slot_with_checklist(env: &TestEnv, name: &str, area: &str) -> (Slot, ChecklistView) {
    let slot = env
        .engine
        .targets
        .create_slot(&admin(), Slot::new(name, area))
        .await
        .expect("failed to create slot");
    let view = env
        .engine
        .checklists
        .create_checklist(&leader(area), TargetType::Slot, slot.id)
        .await
        .expect("failed to create checklist");
    (slot, view)
}
