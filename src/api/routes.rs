use axum::middleware;
use axum::routing::post;
use axum::Router;

use super::auth::auth_middleware;
use super::handlers::{
    clear_shader_cache, get_all_defaults, get_game_paths, get_options, reset_options_to_defaults,
    reset_user_ltx, save_options, ApiState,
};
use crate::storage::OptionsBackend;

/// 创建 API 路由
pub fn create_router<B>(state: ApiState<B>) -> Router
where
    B: OptionsBackend + Send + Sync + 'static,
{
    Router::new()
        .route("/api/v1/get_all_defaults", post(get_all_defaults::<B>))
        .route("/api/v1/get_options", post(get_options::<B>))
        .route("/api/v1/save_options", post(save_options::<B>))
        .route(
            "/api/v1/reset_options_to_defaults",
            post(reset_options_to_defaults::<B>),
        )
        .route("/api/v1/get_game_paths", post(get_game_paths::<B>))
        .route("/api/v1/reset_user_ltx", post(reset_user_ltx::<B>))
        .route("/api/v1/clear_shader_cache", post(clear_shader_cache::<B>))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware::<B>))
        .with_state(state)
}
