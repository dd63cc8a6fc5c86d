use thiserror::Error;

/// Errors from talking to the user through Telegram
///
/// Download failures never become an `AppError`: the request handler turns
/// them into a [`RequestOutcome`](crate::telegram::RequestOutcome). Janitor
/// failures have their own type, see [`crate::storage::SweepError`], because
/// they never reach a user.
///
/// # Example
///
/// ```no_run
/// use grabbot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors (e.g. the file to upload is unreadable)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
