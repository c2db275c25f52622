//! Shared application state.

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::realtime::RoomRouter;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub rooms: Arc<RoomRouter>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            rooms: Arc::new(RoomRouter::new()),
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<RoomRouter> {
    fn from_ref(state: &AppState) -> Self {
        state.rooms.clone()
    }
}
