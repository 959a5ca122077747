//! Book catalog: CRUD with a read-through cache, plus recommendations

use std::{sync::Arc, time::Duration};

use uuid::Uuid;
use validator::Validate;

use super::cache::{
    book_key, fill_json, generation, get_json, invalidate_book, Cache, BOOKS_KEY,
};
use crate::{
    clients::{AuthorDirectory, Caller, CategoryDirectory},
    config::{CacheConfig, CatalogConfig},
    error::AppResult,
    models::{
        book::{BookChanges, NewBook},
        Book,
    },
    repository::BookStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BookStore>,
    cache: Arc<dyn Cache>,
    authors: Arc<dyn AuthorDirectory>,
    categories: Arc<dyn CategoryDirectory>,
    cache_ttl: Duration,
    list_limit: i64,
    recommendation_limit: i64,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn BookStore>,
        cache: Arc<dyn Cache>,
        authors: Arc<dyn AuthorDirectory>,
        categories: Arc<dyn CategoryDirectory>,
        cache_config: &CacheConfig,
        catalog_config: &CatalogConfig,
    ) -> Self {
        Self {
            store,
            cache,
            authors,
            categories,
            cache_ttl: cache_config.ttl(),
            list_limit: catalog_config.list_limit,
            recommendation_limit: catalog_config.recommendation_limit,
        }
    }

    /// Create a book after checking its author and category exist
    pub async fn create(&self, caller: &Caller, book: NewBook) -> AppResult<Book> {
        book.validate()?;
        self.authors.get_author(caller, book.author_id).await?;
        self.categories.get_category(caller, book.category_id).await?;

        let book = self.store.create(&book).await?;
        tracing::info!(book_id = %book.id, created_by = %book.created_by, "Book created");

        invalidate_book(self.cache.as_ref(), book.id).await;
        Ok(book)
    }

    /// Get an active book, served from cache when possible
    pub async fn get(&self, id: Uuid) -> AppResult<Book> {
        let key = book_key(id);
        if let Some(book) = self.cached::<Book>(&key).await {
            return Ok(book);
        }

        let seen = generation(self.cache.as_ref(), &key).await;
        let book = self.store.get_by_id(id).await?;
        self.fill(&key, &book, seen).await;
        Ok(book)
    }

    /// List active books. Only the unfiltered list is cached.
    pub async fn list(&self, search: &str) -> AppResult<Vec<Book>> {
        if !search.trim().is_empty() {
            return self.store.list(search, self.list_limit).await;
        }

        if let Some(books) = self.cached::<Vec<Book>>(BOOKS_KEY).await {
            return Ok(books);
        }

        let seen = generation(self.cache.as_ref(), BOOKS_KEY).await;
        let books = self.store.list("", self.list_limit).await?;
        self.fill(BOOKS_KEY, &books, seen).await;
        Ok(books)
    }

    /// Apply `changes`, validating any foreign key that moves.
    /// With nothing to change the book is returned as stored.
    pub async fn update(&self, caller: &Caller, id: Uuid, changes: BookChanges) -> AppResult<Book> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        changes.validate()?;
        if let Some(author_id) = changes.author_id {
            self.authors.get_author(caller, author_id).await?;
        }
        if let Some(category_id) = changes.category_id {
            self.categories.get_category(caller, category_id).await?;
        }

        let book = self.store.update(id, &changes).await?;
        tracing::info!(book_id = %id, "Book updated");

        invalidate_book(self.cache.as_ref(), id).await;
        Ok(book)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.store.soft_delete(id).await?;
        tracing::info!(book_id = %id, "Book deleted");

        invalidate_book(self.cache.as_ref(), id).await;
        Ok(())
    }

    /// Most borrowed active books, never cached
    pub async fn recommend(&self, search: &str) -> AppResult<Vec<Book>> {
        self.store
            .most_borrowed(search, self.recommendation_limit)
            .await
    }

    async fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match get_json(self.cache.as_ref(), key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, using store");
                None
            }
        }
    }

    /// `seen` is the generation read before the store; skipped when that read failed
    async fn fill<T: serde::Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        seen: AppResult<Option<String>>,
    ) {
        let Ok(seen) = seen else {
            return;
        };
        if let Err(e) = fill_json(self.cache.as_ref(), key, value, self.cache_ttl, seen).await {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
    }
}
