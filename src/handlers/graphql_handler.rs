use actix_web::{get, http::header::AUTHORIZATION, post, web, HttpRequest, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::{app_state::AppState, graphql::Schema};

/// Claims are attached when a valid bearer token is present. Resolvers that
/// need a user reject the request themselves.
#[post("/graphql")]
pub async fn graphql(
    schema: web::Data<Schema>,
    state: web::Data<AppState>,
    req: HttpRequest,
    gql_request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = gql_request.into_inner();

    let claims = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|token| state.jwt_service.verify_access_token(token.trim()).ok());

    if let Some(claims) = claims {
        request = request.data(claims);
    }

    schema.execute(request).await.into()
}

#[get("/graphiql")]
pub async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}
