use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::{
    monitoring::collect_stats,
    protocol::{GitInfo, Health, Info, Stats, Version},
    server::AppState,
};

/// GET /healthz
pub async fn healthz() -> Json<Health> {
    Json(Health { ok: true })
}

/// GET /v1/info
pub async fn get_info() -> Json<Info> {
    tracing::debug!("GET /v1/info");
    let version_str = env!("CARGO_PKG_VERSION");
    let mut parts = version_str
        .split(['-', '+'])
        .next()
        .unwrap_or(version_str)
        .split('.')
        .map(|p| p.parse::<u8>().unwrap_or(0));

    Json(Info {
        version: Version {
            semver: version_str.to_string(),
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        },
        build_time: option_env!("BUILD_TIME")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        git: GitInfo {
            branch: option_env!("GIT_BRANCH").unwrap_or("unknown").to_string(),
            commit: option_env!("GIT_COMMIT").unwrap_or("unknown").to_string(),
        },
    })
}

/// GET /v1/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<Stats> {
    tracing::debug!("GET /v1/stats");
    Json(collect_stats(&state))
}
