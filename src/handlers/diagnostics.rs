use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, OnceLock};

use axum::{extract::State, Json};
use sysinfo::System;
use tracing::info;

use crate::models::DiagnosticsResponse;
use crate::AppState;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Operator diagnostics: hub counters plus process CPU/memory stats
pub async fn diagnostics(State(app_state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    let open_sessions = app_state.stats.open_sessions.load(Ordering::Relaxed);
    let connections = app_state.stats.connections.load(Ordering::Relaxed);
    let accepted_ops = app_state.stats.accepted_ops.load(Ordering::Relaxed);

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| Mutex::new(System::new_all()));
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0),
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Sessions: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        connections,
        open_sessions
    );

    Json(DiagnosticsResponse {
        open_sessions,
        connections,
        accepted_ops,
        cpu_usage,
        memory_alloc,
        memory_total,
        memory_free,
    })
}
