use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for the diagnostics endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct DiagnosticsResponse {
    pub open_sessions: usize,
    pub connections: usize,
    pub accepted_ops: u64,
    pub cpu_usage: f32,
    pub memory_alloc: u64,
    pub memory_total: u64,
    pub memory_free: u64,
}
