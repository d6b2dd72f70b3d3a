use axum::Router;

use crate::shared_state::AppState;

mod category_access;
mod health;
mod invites;
mod login;
mod project_access;
mod task_assignment;
mod users;

pub fn configure_routes() -> Router<AppState> {
    let api = Router::new()
        .merge(health::configure())
        .merge(login::configure())
        .merge(users::configure())
        .merge(invites::configure())
        .merge(category_access::configure())
        .merge(task_assignment::configure())
        .merge(project_access::configure());

    Router::new().nest("/api", api)
}
