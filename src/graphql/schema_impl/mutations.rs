use async_graphql::{Context, Object, ID};

use crate::{
    app_state::AppState,
    auth::{extract_claims_from_context, require_admin},
    errors::{AppError, AppResult},
    graphql::helpers::parse_id,
    models::dto::{request::SetProviderRequest, response::MessageResponse},
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn delete_attempt(&self, ctx: &Context<'_>, id: ID) -> AppResult<MessageResponse> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state
            .attempt_service
            .delete_attempt(&claims, &parse_id(&id)?)
            .await?;
        Ok(MessageResponse::new("Quiz attempt deleted"))
    }

    async fn set_provider(
        &self,
        ctx: &Context<'_>,
        input: SetProviderRequest,
    ) -> AppResult<MessageResponse> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        require_admin(&claims)?;

        let name = input.provider.trim().to_lowercase();
        if !state.generator.set_provider(&name).await {
            return Err(AppError::ValidationError(format!("Unknown provider '{}'", name)));
        }
        Ok(MessageResponse::new(format!("Provider set to {}", name)))
    }
}
