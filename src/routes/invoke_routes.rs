use axum::{Router, routing::post};
use crate::{AppState, controllers::invoke_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/invoke", post(invoke_controller::post_invoke_event))
        .route("/invoke/store", post(invoke_controller::post_invoke_store))
}
