mod api_error;
mod app_error;

pub use api_error::{ApiError, Operation, WithOperation};
pub use app_error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
