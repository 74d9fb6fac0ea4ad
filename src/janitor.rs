use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn a background task that evicts rooms idle for longer than `max_idle`
pub fn spawn_room_janitor(
    state: Arc<AppState>,
    interval: Duration,
    max_idle: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let evicted = state.evict_idle_rooms(max_idle).await;
            if evicted > 0 {
                let remaining = state.room_count().await;
                tracing::info!(evicted, remaining, "Evicted idle rooms");
            }
        }
    })
}
