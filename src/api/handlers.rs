use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::config::GamePaths;
use crate::error::EditorError;
use crate::models::{DefaultsMap, OptionsSnapshot, PendingChange, ResetEntry};
use crate::storage::OptionsBackend;

/// 共享状态：后端 + 可选令牌
pub struct ApiState<B> {
    pub backend: Arc<B>,
    pub api_token: Option<String>,
}

impl<B> ApiState<B> {
    pub fn new(backend: Arc<B>, api_token: Option<String>) -> Self {
        Self { backend, api_token }
    }
}

impl<B> Clone for ApiState<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            api_token: self.api_token.clone(),
        }
    }
}

// ---- 请求/响应结构体 ----

#[derive(Debug, Deserialize, Serialize)]
pub struct SaveOptionsRequest {
    pub changes: Vec<PendingChange>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResetOptionsRequest {
    pub options: Vec<ResetEntry>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WriteResponse {
    pub success: bool,
    pub count: usize,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShaderCacheResponse {
    pub success: bool,
    pub bytes_freed: u64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---- EditorError -> HTTP Response ----

impl IntoResponse for EditorError {
    fn into_response(self) -> Response {
        let status = match &self {
            EditorError::PageNotFound(_) => StatusCode::NOT_FOUND,
            EditorError::OptionNotFound(_) => StatusCode::NOT_FOUND,
            EditorError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            EditorError::LtxParse(_) => StatusCode::BAD_REQUEST,
            EditorError::SerializationError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---- 处理器 ----

/// POST /api/v1/get_all_defaults
pub async fn get_all_defaults<B>(State(state): State<ApiState<B>>) -> Result<Json<DefaultsMap>, EditorError>
where
    B: OptionsBackend + Send + Sync + 'static,
{
    Ok(Json(state.backend.get_all_defaults().await?))
}

/// POST /api/v1/get_options
pub async fn get_options<B>(State(state): State<ApiState<B>>) -> Result<Json<OptionsSnapshot>, EditorError>
where
    B: OptionsBackend + Send + Sync + 'static,
{
    Ok(Json(state.backend.get_options().await?))
}

/// POST /api/v1/save_options
pub async fn save_options<B>(
    State(state): State<ApiState<B>>,
    Json(req): Json<SaveOptionsRequest>,
) -> Result<Json<WriteResponse>, EditorError>
where
    B: OptionsBackend + Send + Sync + 'static,
{
    let count = req.changes.len();
    state.backend.save_options(req.changes).await?;
    Ok(Json(WriteResponse { success: true, count }))
}

/// POST /api/v1/reset_options_to_defaults
pub async fn reset_options_to_defaults<B>(
    State(state): State<ApiState<B>>,
    Json(req): Json<ResetOptionsRequest>,
) -> Result<Json<WriteResponse>, EditorError>
where
    B: OptionsBackend + Send + Sync + 'static,
{
    let count = req.options.len();
    state.backend.reset_options_to_defaults(req.options).await?;
    Ok(Json(WriteResponse { success: true, count }))
}

/// POST /api/v1/get_game_paths
pub async fn get_game_paths<B>(State(state): State<ApiState<B>>) -> Result<Json<GamePaths>, EditorError>
where
    B: OptionsBackend + Send + Sync + 'static,
{
    Ok(Json(state.backend.get_game_paths().await?))
}

/// POST /api/v1/reset_user_ltx
pub async fn reset_user_ltx<B>(State(state): State<ApiState<B>>) -> Result<Json<WriteResponse>, EditorError>
where
    B: OptionsBackend + Send + Sync + 'static,
{
    state.backend.reset_user_ltx().await?;
    Ok(Json(WriteResponse { success: true, count: 1 }))
}

/// POST /api/v1/clear_shader_cache
pub async fn clear_shader_cache<B>(
    State(state): State<ApiState<B>>,
) -> Result<Json<ShaderCacheResponse>, EditorError>
where
    B: OptionsBackend + Send + Sync + 'static,
{
    let bytes_freed = state.backend.clear_shader_cache().await?;
    Ok(Json(ShaderCacheResponse {
        success: true,
        bytes_freed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OptionPath, StorageKind};
    use crate::storage::MemoryBackend;

    fn state() -> ApiState<MemoryBackend> {
        ApiState::new(Arc::new(MemoryBackend::new()), None)
    }

    #[tokio::test]
    async fn test_save_then_get_options() {
        let state = state();
        let body: SaveOptionsRequest = serde_json::from_str(
            r#"{"changes":[
                {"path":"video/advanced/main/v_sync","value":"on","storageType":"command","command":"rs_v_sync"},
                {"path":"gameplay/general/nickname","value":"strelok","storageType":"structured"}
            ]}"#,
        )
        .unwrap();

        let Json(resp) = save_options(State(state.clone()), Json(body)).await.unwrap();
        assert_eq!(resp, WriteResponse { success: true, count: 2 });

        let Json(snap) = get_options(State(state)).await.unwrap();
        assert_eq!(snap.command_values["rs_v_sync"], "on");
        assert_eq!(snap.structured_values["gameplay/general/nickname"], "strelok");
    }

    #[tokio::test]
    async fn test_reset_options() {
        let state = state();
        let req = ResetOptionsRequest {
            options: vec![ResetEntry {
                path: OptionPath::new("video", "basic", "fov"),
                default_value: "75".to_string(),
                storage: StorageKind::Command {
                    command: "fov".to_string(),
                },
            }],
        };
        let Json(resp) = reset_options_to_defaults(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(resp.count, 1);
        assert_eq!(state.backend.snapshot().await.command_values["fov"], "75");
    }

    #[tokio::test]
    async fn test_maintenance_endpoints() {
        let state = state();
        state.backend.set_command_value("fov", "90").await;

        let Json(resp) = reset_user_ltx(State(state.clone())).await.unwrap();
        assert!(resp.success);
        assert!(state.backend.snapshot().await.command_values.is_empty());

        let Json(resp) = clear_shader_cache(State(state.clone())).await.unwrap();
        assert_eq!(resp, ShaderCacheResponse { success: true, bytes_freed: 0 });
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            serde_json::json!({"success": true, "bytesFreed": 0})
        );

        // 内存后端没有游戏目录
        let err = get_game_paths(State(state)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_backend_failure_is_500() {
        let state = state();
        state.backend.set_fail_reads(true);
        let err = get_all_defaults(State(state)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (EditorError::PageNotFound("x".into()), StatusCode::NOT_FOUND),
            (EditorError::OptionNotFound("x".into()), StatusCode::NOT_FOUND),
            (EditorError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (EditorError::LtxParse("x".into()), StatusCode::BAD_REQUEST),
            (EditorError::Paths("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
