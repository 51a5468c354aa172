//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, borrows, categories, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Alexandria API",
        version = "0.1.0",
        description = "Library Lending System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::register,
        users::get_user,
        users::update_user,
        users::get_penalty,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrows
        borrows::create_borrow,
        borrows::list_borrows,
        borrows::return_borrow,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::PenaltyResponse,
            // Categories
            crate::models::category::Category,
            crate::models::category::CategoryName,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            // Authors
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Borrows
            borrows::BorrowRequest,
            borrows::BorrowResponse,
            borrows::ReturnRequest,
            borrows::ReturnResponse,
            crate::models::borrow::Borrow,
            crate::models::borrow::BorrowDetails,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Account management"),
        (name = "categories", description = "Category management"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book catalog"),
        (name = "borrows", description = "Borrow and return workflow")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
