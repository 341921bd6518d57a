use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ledgerly_core::error::AppError;
use uuid::Uuid;

/// AccountantId extractor for ledgerly-server.
///
/// Extracts the accountant id from the X-Accountant-ID header set by the
/// identity-providing frontend after authenticating the user. There is no
/// ambient user context; every store and aggregation call receives this
/// principal explicitly.
#[derive(Debug, Clone, Copy)]
pub struct AccountantId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AccountantId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("X-Accountant-ID")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Authentication(anyhow::anyhow!("Missing X-Accountant-ID header"))
            })?;

        let accountant_id = raw.parse::<Uuid>().map_err(|_| {
            AppError::Authentication(anyhow::anyhow!("Invalid X-Accountant-ID header"))
        })?;

        // Add to tracing span for observability
        tracing::Span::current().record("accountant_id", raw);

        Ok(AccountantId(accountant_id))
    }
}
