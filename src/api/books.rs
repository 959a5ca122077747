//! BookService handlers

use std::sync::Arc;

use tonic::{Request, Response, Status};

use super::{caller, parse_id, parse_optional_id};
use crate::{
    clients::{Caller, UserDirectory, UserSummary},
    error::{AppError, AppResult},
    models::{
        book::{BookChanges, NewBook},
        non_empty,
    },
    proto::book::{
        book_service_server::BookService, Book, BookRequest, BooksResponse, BorrowRecord,
        CommonBookResponse, CommonBorrowRecordResponse,
    },
    services::{CatalogService, CirculationService},
};

pub struct BookHandler {
    catalog: CatalogService,
    circulation: CirculationService,
    users: Arc<dyn UserDirectory>,
}

impl BookHandler {
    pub fn new(
        catalog: CatalogService,
        circulation: CirculationService,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            catalog,
            circulation,
            users,
        }
    }

    /// Resolve the caller against the user service
    async fn current_user<T>(&self, request: &Request<T>) -> AppResult<(Caller, UserSummary)> {
        let caller = caller(request)?;
        let user = self.users.current_user(&caller).await?;
        Ok((caller, user))
    }

    /// Borrow and return always act for the caller
    async fn borrower(&self, request: &Request<BorrowRecord>) -> AppResult<UserSummary> {
        let (_, user) = self.current_user(request).await?;
        if let Some(user_id) = parse_optional_id(&request.get_ref().user_id, "user")? {
            if user_id != user.id {
                return Err(AppError::Authorization(
                    "Cannot borrow or return on behalf of another user".to_string(),
                ));
            }
        }
        Ok(user)
    }
}

#[tonic::async_trait]
impl BookService for BookHandler {
    async fn create(&self, request: Request<Book>) -> Result<Response<CommonBookResponse>, Status> {
        let (caller, user) = self.current_user(&request).await?;
        let message = request.into_inner();

        let book = NewBook {
            name: message.name.trim().to_string(),
            author_id: parse_id(&message.author_id, "author")?,
            category_id: parse_id(&message.category_id, "category")?,
            created_by: user.id,
        };
        let book = self.catalog.create(&caller, book).await?;

        Ok(Response::new(CommonBookResponse {
            message: "Book created successfully".to_string(),
            id: book.id.to_string(),
        }))
    }

    async fn get(&self, request: Request<Book>) -> Result<Response<Book>, Status> {
        let id = parse_id(&request.get_ref().id, "book")?;
        let book = self.catalog.get(id).await?;
        Ok(Response::new(book.into()))
    }

    async fn get_list(&self, request: Request<BookRequest>) -> Result<Response<BooksResponse>, Status> {
        self.current_user(&request).await?;
        let books = self.catalog.list(&request.get_ref().search).await?;

        Ok(Response::new(BooksResponse {
            books: books.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update(&self, request: Request<Book>) -> Result<Response<CommonBookResponse>, Status> {
        let (caller, _) = self.current_user(&request).await?;
        let message = request.into_inner();

        let id = parse_id(&message.id, "book")?;
        let changes = BookChanges {
            name: non_empty(message.name),
            author_id: parse_optional_id(&message.author_id, "author")?,
            category_id: parse_optional_id(&message.category_id, "category")?,
        };
        self.catalog.update(&caller, id, changes).await?;

        Ok(Response::new(CommonBookResponse {
            message: "Book updated successfully".to_string(),
            id: id.to_string(),
        }))
    }

    async fn delete(&self, request: Request<Book>) -> Result<Response<CommonBookResponse>, Status> {
        self.current_user(&request).await?;
        let id = parse_id(&request.get_ref().id, "book")?;
        self.catalog.delete(id).await?;

        Ok(Response::new(CommonBookResponse {
            message: "Book deleted successfully".to_string(),
            id: id.to_string(),
        }))
    }

    async fn borrow_book(
        &self,
        request: Request<BorrowRecord>,
    ) -> Result<Response<CommonBorrowRecordResponse>, Status> {
        let user = self.borrower(&request).await?;
        let book_id = parse_id(&request.get_ref().book_id, "book")?;
        let record = self.circulation.borrow(book_id, user.id).await?;

        Ok(Response::new(CommonBorrowRecordResponse {
            message: "Book borrowed successfully".to_string(),
            record: Some(record.into()),
        }))
    }

    async fn return_book(
        &self,
        request: Request<BorrowRecord>,
    ) -> Result<Response<CommonBorrowRecordResponse>, Status> {
        let user = self.borrower(&request).await?;
        let book_id = parse_id(&request.get_ref().book_id, "book")?;
        let record = self.circulation.return_book(book_id, user.id).await?;

        Ok(Response::new(CommonBorrowRecordResponse {
            message: "Book returned successfully".to_string(),
            record: Some(record.into()),
        }))
    }

    async fn get_recommendation(
        &self,
        request: Request<BookRequest>,
    ) -> Result<Response<BooksResponse>, Status> {
        self.current_user(&request).await?;
        let books = self.catalog.recommend(&request.get_ref().search).await?;

        Ok(Response::new(BooksResponse {
            books: books.into_iter().map(Into::into).collect(),
        }))
    }
}
