use async_graphql::{Context, Object, ID};

use crate::{
    app_state::AppState,
    auth::extract_claims_from_context,
    errors::AppResult,
    graphql::helpers::{limit_arg, parse_id},
    models::{
        domain::{LeaderboardEntry, QuizAttempt, QuizStatistics, UserProgress},
        dto::response::{QuizForTaking, UserDto},
    },
    providers::ProviderInfo,
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn me(&self, ctx: &Context<'_>) -> AppResult<UserDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.auth_service.current_user(&claims).await
    }

    async fn my_progress(&self, ctx: &Context<'_>) -> AppResult<UserProgress> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.progress_service.get_progress(&claims.sub).await
    }

    async fn my_attempts(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
    ) -> AppResult<Vec<QuizAttempt>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state
            .attempt_service
            .list_attempts(&claims, limit_arg(limit))
            .await
    }

    async fn attempt(&self, ctx: &Context<'_>, id: ID) -> AppResult<QuizAttempt> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.attempt_service.get_attempt(&claims, &parse_id(&id)?).await
    }

    async fn quiz(&self, ctx: &Context<'_>, id: ID) -> AppResult<QuizForTaking> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        state.quiz_service.get_quiz(&claims, &parse_id(&id)?).await
    }

    async fn leaderboard(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let state = ctx.data::<AppState>()?;
        extract_claims_from_context(ctx)?;

        state.progress_service.leaderboard(limit_arg(limit)).await
    }

    async fn statistics(&self, ctx: &Context<'_>) -> AppResult<QuizStatistics> {
        let state = ctx.data::<AppState>()?;
        extract_claims_from_context(ctx)?;

        state.attempt_service.statistics().await
    }

    async fn providers(&self, ctx: &Context<'_>) -> AppResult<Vec<ProviderInfo>> {
        let state = ctx.data::<AppState>()?;
        extract_claims_from_context(ctx)?;

        Ok(state.generator.available_providers().await)
    }
}
