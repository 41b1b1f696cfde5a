//! Route handlers for the bridge server.

pub mod dispatch;
pub mod groups;
pub mod health;
pub mod messages;
pub mod users;
pub mod webhooks;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Carrier webhooks
        .route("/webhooks/sms", post(webhooks::inbound_sms))
        .route("/webhooks/status", post(webhooks::status_callback))
        // Dispatch trigger
        .route("/api/dispatch", post(dispatch::dispatch))
        // App API
        .route(
            "/api/users/me",
            get(users::me).put(users::upsert_me).patch(users::update_me),
        )
        .route("/api/groups", get(groups::list_groups).post(groups::create_group))
        .route(
            "/api/groups/:group_id",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/api/groups/:group_id/members", get(groups::list_members))
        .route("/api/groups/:group_id/members/sms", post(groups::add_sms_member))
        .route("/api/groups/:group_id/members/users", post(groups::add_user_member))
        .route(
            "/api/groups/:group_id/members/users/:user_id",
            delete(groups::remove_user_member),
        )
        .route(
            "/api/groups/:group_id/members/sms/:participant_id",
            delete(groups::remove_sms_member),
        )
        .route(
            "/api/groups/:group_id/messages",
            get(messages::recent_messages).post(messages::send_message),
        )
        .route("/api/segments", post(messages::estimate))
}
