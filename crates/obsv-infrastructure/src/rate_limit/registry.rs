//! Per-endpoint-class limiter registry

use super::core::{RateLimitConfig, RateLimiter};
use crate::config::RateLimitSettings;
use crate::task::SweeperHandle;
use std::sync::Arc;
use std::time::Duration;

/// Named endpoint classes, each with its own window and quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiClass {
    /// Login and token endpoints
    Auth,
    /// Project CRUD and scoped reads
    Projects,
    /// Agent status and command endpoints
    Agents,
    /// Telemetry ingestion
    Telemetry,
}

/// Preconfigured limiters for every endpoint class
pub struct RateLimiterRegistry {
    auth: Arc<RateLimiter>,
    projects: Arc<RateLimiter>,
    agents: Arc<RateLimiter>,
    telemetry: Arc<RateLimiter>,
}

impl RateLimiterRegistry {
    /// Build the registry from configuration
    pub fn new(settings: &RateLimitSettings) -> Self {
        let build = |window_secs: u64, max_requests: u32| {
            Arc::new(RateLimiter::new(RateLimitConfig::new(
                Duration::from_secs(window_secs),
                max_requests,
            )))
        };
        Self {
            auth: build(settings.auth.window_secs, settings.auth.max_requests),
            projects: build(settings.projects.window_secs, settings.projects.max_requests),
            agents: build(settings.agents.window_secs, settings.agents.max_requests),
            telemetry: build(
                settings.telemetry.window_secs,
                settings.telemetry.max_requests,
            ),
        }
    }

    /// The limiter for a named endpoint class
    pub fn limiter(&self, class: ApiClass) -> &Arc<RateLimiter> {
        match class {
            ApiClass::Auth => &self.auth,
            ApiClass::Projects => &self.projects,
            ApiClass::Agents => &self.agents,
            ApiClass::Telemetry => &self.telemetry,
        }
    }

    /// Spawn the background sweep task for every limiter
    pub fn spawn_sweepers(&self) -> Vec<SweeperHandle> {
        [&self.auth, &self.projects, &self.agents, &self.telemetry]
            .into_iter()
            .map(RateLimiter::spawn_sweeper)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitSettings;

    #[test]
    fn test_classes_have_independent_limiters() {
        let registry = RateLimiterRegistry::new(&RateLimitSettings::default());

        let auth = registry.limiter(ApiClass::Auth);
        let agents = registry.limiter(ApiClass::Agents);
        assert_ne!(
            auth.config().max_requests,
            0,
            "auth class must have a quota"
        );

        // Exhausting one class leaves the others untouched.
        for _ in 0..auth.config().max_requests {
            auth.check_at("ip", 0).expect("within quota");
        }
        auth.check_at("ip", 0).expect_err("auth exhausted");
        agents.check_at("ip", 0).expect("agents unaffected");
    }
}
