use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{PgSessionStore, SessionManager};
use crate::configuration::AuthSettings;
use crate::logger::RequestLogger;
use crate::middleware::AuthGate;
use crate::routes::{
    create_task, delete_task, get_me, get_task, health_check, list_tasks, logout, refresh, signin,
    signup, update_task,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    auth_config: AuthSettings,
) -> Result<Server, std::io::Error> {
    let session_manager = web::Data::new(SessionManager::new(
        Arc::new(PgSessionStore::new(connection.clone())),
        auth_config.refresh_token_expiry_days,
    ));
    let connection = web::Data::new(connection);
    let auth_config_data = web::Data::new(auth_config.clone());

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(connection.clone())
            .app_data(auth_config_data.clone())
            .app_data(session_manager.clone())

            // Public routes
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api/auth")
                    .route("/signup", web::post().to(signup))
                    .route("/signin", web::post().to(signin))
                    .route("/refresh", web::post().to(refresh))
                    .route("/logout", web::post().to(logout)),
            )

            // Protected routes (bearer token required)
            .service(
                web::scope("/api/me")
                    .wrap(AuthGate::new(auth_config.clone()))
                    .route("", web::get().to(get_me)),
            )
            .service(
                web::scope("/api/tasks")
                    .wrap(AuthGate::new(auth_config.clone()))
                    .route("", web::post().to(create_task))
                    .route("", web::get().to(list_tasks))
                    .route("/{id}", web::get().to(get_task))
                    .route("/{id}", web::patch().to(update_task))
                    .route("/{id}", web::delete().to(delete_task)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
