//! Category service

use std::sync::Arc;

use anyhow::Context;
use tonic::transport::Server;

use catalog_services::{
    api::{AuthLayer, CategoryHandler},
    clients::GrpcUserDirectory,
    config::AppConfig,
    proto::{category::category_service_server::CategoryServiceServer, FILE_DESCRIPTOR_SET},
    repository::CategoriesRepository,
    server,
    services::CategoriesService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    server::init_tracing(&config.logging)?;

    tracing::info!("Starting category service v{}", env!("CARGO_PKG_VERSION"));

    let user_endpoint = config.upstream.user_endpoint()?;
    let users = Arc::new(GrpcUserDirectory::connect_lazy(&user_endpoint)?);
    tracing::info!("Resolving callers through {}", user_endpoint);

    let pool = server::connect_database(&config.database, sqlx::migrate!("./migrations/categories")).await?;
    server::spawn_health(&config, pool.clone()).await?;

    let categories = CategoriesService::new(CategoriesRepository::new(pool), config.catalog.list_limit);

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .with_service_name("catalog.category.CategoryService")
        .build_v1()?;

    let addr = server::grpc_addr(&config.server)?;
    tracing::info!("gRPC server listening on {}", addr);

    Server::builder()
        .layer(AuthLayer::new(&config.auth.jwt_secret))
        .add_service(reflection)
        .add_service(CategoryServiceServer::new(CategoryHandler::new(categories, users)))
        .serve_with_shutdown(addr, server::shutdown_signal())
        .await?;

    Ok(())
}
