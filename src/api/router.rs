use axum::{Json, Router, extract::State, routing::get};

use crate::{AppState, services::consensus::UsersState, services::pin::Pin};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pins", get(list_pins))
        .route("/users", get(get_users))
}

async fn list_pins(State(state): State<AppState>) -> Json<Vec<Pin>> {
    Json(state.room.snapshot().await)
}

async fn get_users(State(state): State<AppState>) -> Json<UsersState> {
    Json(state.room.users())
}
