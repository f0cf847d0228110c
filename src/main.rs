use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use snapquiz_server::{
    app_state::AppState, config::Config, graphql::create_schema, handlers,
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if config.is_production() {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let allowed_origin = config.cors_allowed_origin.clone();

    let state = AppState::new(config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let schema = create_schema(state.clone());

    log::info!(
        "Quiz providers: current={}, registered={}",
        state.generator.current_provider().await,
        state.generator.available_providers().await.len()
    );
    log::info!("Starting HTTP server on {}:{}", host, port);
    log::info!("GraphiQL playground: http://{}:{}/graphiql", host, port);

    let jwt_service = state.jwt_service.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::from(jwt_service.clone()))
            .app_data(web::Data::new(schema.clone()))
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(r#"%a "%r" %s %b %T %{x-request-id}o"#))
            .wrap(cors)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
