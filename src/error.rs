pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Null pointer passed as '{0}'")]
    NullPointer(&'static str),
    #[error("Config error: {0}")]
    Config(#[from] crate::config::Error),
}
