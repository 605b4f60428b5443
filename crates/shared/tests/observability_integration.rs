//! 可观测性模块集成测试
//!
//! 测试 metrics 记录函数与配置默认值。

// ============================================================================
// 指标记录测试
// ============================================================================

mod metrics_tests {
    use badge_shared::observability::metrics::{
        record_badge_evaluation, record_badge_unlock, record_streak_recalculation,
    };

    #[test]
    fn test_record_badge_unlock() {
        record_badge_unlock("vol_1", "rule");
        record_badge_unlock("secret_1", "manual");
    }

    #[test]
    fn test_record_badge_evaluation() {
        record_badge_evaluation("habit_complete", 0, 0.001);
        record_badge_evaluation("habit_complete", 3, 0.02);
        record_badge_evaluation("app_open", 1, 0.0);
    }

    #[test]
    fn test_record_streak_recalculation() {
        record_streak_recalculation(false, 0, 0, 0.0);
        record_streak_recalculation(true, 12, 2, 0.35);
    }
}

// ============================================================================
// 配置测试
// ============================================================================

mod config_tests {
    use badge_shared::config::{AppConfig, ObservabilityConfig, StorageBackend};

    #[test]
    fn test_default_observability_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.metrics_enabled);
        assert_eq!(config.metrics_port, 9090);
    }

    #[test]
    fn test_json_logs_case_insensitive() {
        let config = ObservabilityConfig {
            log_format: "JSON".to_string(),
            ..Default::default()
        };
        assert!(config.json_logs());
    }

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.streak.habits_file.is_none());
        assert!(config.streak.vacations_file.is_none());
        assert_eq!(config.environment, "");
    }
}
