use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiState;
use crate::error::{EditorError, Result};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// 未配置令牌时放行；配置后要求请求头完全一致
pub fn check_api_key(expected: Option<&str>, provided: Option<&str>) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    match provided {
        None => Err(EditorError::Unauthorized(format!("missing {} header", API_KEY_HEADER))),
        Some(key) if key == expected => Ok(()),
        Some(_) => Err(EditorError::Unauthorized("invalid api key".to_string())),
    }
}

/// 认证中间件：从 X-API-Key 请求头验证令牌
pub async fn auth_middleware<B>(
    State(state): State<ApiState<B>>,
    request: Request,
    next: Next,
) -> std::result::Result<Response, EditorError>
where
    B: Send + Sync + 'static,
{
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = check_api_key(state.api_token.as_deref(), provided) {
        tracing::warn!(path = %request.uri().path(), "拒绝请求: {}", e);
        return Err(e);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_token_is_open() {
        assert!(check_api_key(None, None).is_ok());
        assert!(check_api_key(None, Some("anything")).is_ok());
    }

    #[test]
    fn test_token_required() {
        assert!(matches!(
            check_api_key(Some("secret"), None),
            Err(EditorError::Unauthorized(_))
        ));
        assert!(matches!(
            check_api_key(Some("secret"), Some("wrong")),
            Err(EditorError::Unauthorized(_))
        ));
        assert!(check_api_key(Some("secret"), Some("secret")).is_ok());
    }
}
