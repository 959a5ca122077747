//! User service: registration, login and caller lookups

use anyhow::Context;
use tonic::transport::Server;

use catalog_services::{
    api::{AuthLayer, UserHandler},
    config::AppConfig,
    proto::{user::user_service_server::UserServiceServer, FILE_DESCRIPTOR_SET},
    repository::UsersRepository,
    server,
    services::UsersService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    server::init_tracing(&config.logging)?;

    tracing::info!("Starting user service v{}", env!("CARGO_PKG_VERSION"));

    let pool = server::connect_database(&config.database, sqlx::migrate!("./migrations/users")).await?;
    server::spawn_health(&config, pool.clone()).await?;

    let users = UsersService::new(UsersRepository::new(pool), config.auth.clone());

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .with_service_name("catalog.user.UserService")
        .build_v1()?;

    let addr = server::grpc_addr(&config.server)?;
    tracing::info!("gRPC server listening on {}", addr);

    Server::builder()
        .layer(AuthLayer::new(&config.auth.jwt_secret))
        .add_service(reflection)
        .add_service(UserServiceServer::new(UserHandler::new(users)))
        .serve_with_shutdown(addr, server::shutdown_signal())
        .await?;

    Ok(())
}
