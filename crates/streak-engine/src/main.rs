//! 连续打卡重算进程
//!
//! 加载习惯与假期数据，完成一次全量重算并输出统计。

use std::sync::Arc;

use anyhow::Result;
use badge_shared::{
    config::{AppConfig, StorageBackend},
    database::Database,
    observability,
};
use tracing::{info, warn};

use badge_engine::{BadgeCatalog, BadgeEngine, ensure_schema};
use streak_engine::{InMemoryHabitSource, InMemoryVacationSource, StreakCalculator};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 环境变量与配置
    dotenvy::dotenv().ok();
    let config = AppConfig::load("streak-worker")?;

    // 2. 可观测性
    let _guard = observability::init(&config.service_name, &config.observability).await?;
    info!(environment = %config.environment, "Starting streak-worker...");

    // 3. 徽章目录
    let catalog = match &config.catalog.path {
        Some(path) => BadgeCatalog::from_path(path)?,
        None => BadgeCatalog::builtin(),
    };
    info!(badge_count = catalog.len(), "Badge catalog ready");

    // 4. 存储后端
    let mut database = None;
    let engine = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            ensure_schema(db.pool()).await?;
            let engine = BadgeEngine::with_pool(catalog, db.pool().clone());
            database = Some(db);
            engine
        }
        StorageBackend::Memory => {
            warn!("Using in-memory badge storage, state is lost on exit");
            BadgeEngine::in_memory(catalog)
        }
    };
    let engine = Arc::new(engine);

    // 5. 习惯与假期数据
    let habits = match &config.streak.habits_file {
        Some(path) => InMemoryHabitSource::from_path(path)?,
        None => {
            warn!("No habits file configured");
            InMemoryHabitSource::default()
        }
    };
    let vacations = match &config.streak.vacations_file {
        Some(path) => InMemoryVacationSource::from_path(path)?,
        None => InMemoryVacationSource::default(),
    };

    let calculator = StreakCalculator::new(Arc::new(habits), Arc::new(vacations), engine.clone());
    let _subscription = calculator.on_badge_unlock(|badges| {
        for badge in badges {
            info!(badge_id = %badge.id, title = %badge.title, "Badge unlocked");
        }
    });

    // 6. 数据加载完成后执行一次全量重算
    calculator.mark_hydrated();
    calculator.wait_until_hydrated().await?;
    let outcome = calculator.force_recalculate().await?;

    for state in calculator.get_current_stats() {
        info!(
            habit_id = %state.habit_id,
            current_streak = state.current_streak,
            longest_streak = state.longest_streak,
            total_completions = state.total_completions,
            "Streak stats"
        );
    }
    for failure in &outcome.failed {
        warn!(habit_id = %failure.habit_id, error = %failure.error, "Habit recalculation failed");
    }

    let unseen = engine.unseen_unlocks().await?;
    info!(
        run_id = %outcome.run_id,
        recalculated = outcome.recalculated.len(),
        unlocked = outcome.unlocked.len(),
        unseen = unseen.len(),
        "streak-worker finished"
    );

    if let Some(db) = database {
        db.close().await;
    }
    Ok(())
}
