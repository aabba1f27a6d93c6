use async_trait::async_trait;
use chrono::Utc;

use crate::error::ApiError;
use crate::router::{Flow, Middleware, RequestContext};
use crate::state::AppState;

/// Rejects requests whose URL does not carry a valid, unexpired signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateSignature;

pub fn signed() -> ValidateSignature {
    ValidateSignature
}

#[async_trait]
impl Middleware<AppState> for ValidateSignature {
    fn name(&self) -> String {
        "signed".to_string()
    }

    async fn handle(&self, ctx: &mut RequestContext<AppState>) -> Result<Flow, ApiError> {
        ctx.state
            .signer
            .verify(&ctx.path, ctx.query.as_deref(), Utc::now())?;
        Ok(Flow::Continue)
    }
}
