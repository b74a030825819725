//! Newsroom HTTP service
//!
//! Exposes the news generation pipeline plus the query and suggestion
//! helpers over a small JSON API:
//!
//! - `GET /`, `GET /agent/health`
//! - `POST /generate-news`
//! - `POST /agent/query`
//! - `POST /agent/suggestions`

pub mod error;
pub mod handlers;
pub mod responses;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use handlers::{app, create_router, AppState};
pub use responses::{GenerateNewsRequest, GenerateNewsResponse, HealthResponse};
pub use server::{bind_listener, wait_for_shutdown, NewsroomServer, ServerError};
