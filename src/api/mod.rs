pub mod auth;
pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;

use std::sync::Arc;

use crate::error::Result;
use crate::storage::OptionsBackend;

/// 监听地址并提供 HTTP 接口，直到进程退出
pub async fn serve<B>(backend: Arc<B>, listen_addr: &str, api_token: Option<String>) -> Result<()>
where
    B: OptionsBackend + Send + Sync + 'static,
{
    if api_token.is_none() {
        tracing::warn!("未配置 apiToken，HTTP 接口无认证");
    }
    let router = create_router(ApiState::new(backend, api_token));
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!("HTTP 接口监听 {}", listen_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
