use super::{CacheBox, Config};
use std::time::Duration;

/// Creates a new test configuration.
pub fn new_test_config() -> Config {
    Config {
        cache: CacheBox {
            env: super::TEST.to_string(),
            name: Some("test".to_string()),
            logs: Some(super::Logs {
                level: Some("debug".to_string()),
            }),
            runtime: Some(super::Runtime { num_cpus: 2 }),
            refresh: Some(super::Refresh {
                interval: Some(Duration::from_secs(1)),
            }),
            telemetry: Some(super::Telemetry {
                enabled: false,
                interval: Some(Duration::from_secs(5)),
            }),
            demo: Some(super::Demo {
                keys: vec!["foo".to_string()],
                callers: Some(4),
                value: Some(42),
                loader_delay: Some(Duration::ZERO),
                run_for: Some(Duration::from_secs(2)),
            }),
        },
    }
}
