use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use quizium_server::{app_state::AppState, config::Config, graphql::create_schema, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config)
        .await
        .expect("failed to initialize application state");
    let schema = create_schema(state.clone());

    log::info!("Starting HTTP server on {}:{}", host, port);
    log::info!("GraphiQL playground: http://{}:{}/graphiql", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(schema.clone()))
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .service(handlers::get_quiz)
            .service(handlers::list_quizzes)
            .service(handlers::health_check)
            .service(web::resource("/graphql").route(web::post().to(handlers::graphql_handler)))
            .service(web::resource("/graphiql").route(web::get().to(handlers::graphiql_handler)))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
