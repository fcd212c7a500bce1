use error_stack::Report;

pub type AppResult<T> = Result<T, Report<AppError>>;

#[derive(Debug, thiserror::Error)]
#[error("paging demo failed")]
pub struct AppError;
