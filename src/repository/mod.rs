//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod categories;
pub mod users;

pub use authors::AuthorsRepository;
pub use books::{BookStore, BooksRepository};
pub use categories::CategoriesRepository;
pub use users::UsersRepository;

/// Build an `ILIKE` pattern for a case-insensitive substring match.
/// Empty input means "no filter".
pub fn like_pattern(search: &str) -> Option<String> {
    let search = search.trim();
    if search.is_empty() {
        return None;
    }

    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// Postgres `unique_violation`
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|e| e.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
