use std::sync::Arc;
use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use sqlx::{pool::PoolConnection, MySql};

use crate::db::{ConnectionProvider, Lease};
use crate::error::{AppError, AppResult};

/// State for [`scoped_connection`]: where connections come from and how long
/// the downstream pipeline may hold one.
#[derive(Debug)]
pub struct ConnectionScope<P> {
    provider: P,
    request_timeout: Duration,
}

impl<P: ConnectionProvider> ConnectionScope<P> {
    pub fn new(provider: P, request_timeout: Duration) -> Self {
        Self {
            provider,
            request_timeout,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Leases one connection per request.
///
/// The connection is acquired and configured before the rest of the
/// pipeline runs, exposed to handlers as a [`Lease`] in the request
/// extensions, and released exactly once afterwards, whether the handler
/// succeeded, failed or ran past the request timeout.
pub async fn scoped_connection<P: ConnectionProvider>(
    State(scope): State<Arc<ConnectionScope<P>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let mut conn = scope.provider.acquire().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to acquire connection");
        e
    })?;

    if let Err(e) = scope.provider.configure(&mut conn).await {
        drop(conn);
        tracing::error!(error = %e, "Failed to configure connection; released");
        return Err(e);
    }

    let lease = Lease::new(conn);
    request.extensions_mut().insert(lease.clone());

    let outcome = tokio::time::timeout(scope.request_timeout, next.run(request)).await;

    if lease.release().await {
        tracing::debug!("Connection released");
    } else {
        tracing::debug!("Connection was released by the handler");
    }

    match outcome {
        Ok(response) => {
            if response.status().is_server_error() {
                tracing::warn!(status = %response.status(), "Handler failed");
            }
            Ok(response)
        }
        Err(_) => {
            let secs = scope.request_timeout.as_secs();
            tracing::warn!(timeout_secs = secs, "Request timed out; connection released");
            Err(AppError::Timeout(secs))
        }
    }
}

/// Extracts the request's leased MySQL connection
pub struct Db(pub Lease<PoolConnection<MySql>>);

#[async_trait]
impl<S> FromRequestParts<S> for Db
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Lease<PoolConnection<MySql>>>()
            .cloned()
            .map(Db)
            .ok_or_else(|| {
                AppError::Internal("route is not behind the connection middleware".to_string())
            })
    }
}
