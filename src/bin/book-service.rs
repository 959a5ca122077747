//! Book service: catalog, borrowing and recommendations

use std::sync::Arc;

use anyhow::Context;
use tonic::transport::Server;

use catalog_services::{
    api::{AuthLayer, BookHandler},
    clients::{GrpcAuthorDirectory, GrpcCategoryDirectory, GrpcUserDirectory},
    config::AppConfig,
    proto::{book::book_service_server::BookServiceServer, FILE_DESCRIPTOR_SET},
    repository::BooksRepository,
    server,
    services::{CatalogService, CirculationService, RedisService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    server::init_tracing(&config.logging)?;

    tracing::info!("Starting book service v{}", env!("CARGO_PKG_VERSION"));

    let users = Arc::new(GrpcUserDirectory::connect_lazy(&config.upstream.user_endpoint()?)?);
    let authors = Arc::new(GrpcAuthorDirectory::connect_lazy(&config.upstream.author_endpoint()?)?);
    let categories = Arc::new(GrpcCategoryDirectory::connect_lazy(
        &config.upstream.category_endpoint()?,
    )?);

    let pool = server::connect_database(&config.database, sqlx::migrate!("./migrations/books")).await?;
    server::spawn_health(&config, pool.clone()).await?;

    let cache = Arc::new(RedisService::new(&config.redis.url()).await?);
    tracing::info!(host = %config.redis.host, port = config.redis.port, "Connected to Redis");

    let store = Arc::new(BooksRepository::new(pool));
    let catalog = CatalogService::new(
        store.clone(),
        cache.clone(),
        authors,
        categories,
        &config.cache,
        &config.catalog,
    );
    let circulation = CirculationService::new(store, cache, config.cache.lock_ttl());

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .with_service_name("catalog.book.BookService")
        .build_v1()?;

    let addr = server::grpc_addr(&config.server)?;
    tracing::info!("gRPC server listening on {}", addr);

    Server::builder()
        .layer(AuthLayer::new(&config.auth.jwt_secret))
        .add_service(reflection)
        .add_service(BookServiceServer::new(BookHandler::new(catalog, circulation, users)))
        .serve_with_shutdown(addr, server::shutdown_signal())
        .await?;

    Ok(())
}
