use crate::error::{ChatError, Result};

pub trait ResultExt<T> {
    fn context(self, msg: impl Into<String>) -> Result<T>;
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ChatError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| ChatError::Context {
            message: msg.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ChatError::Context {
            message: f(),
            source: Box::new(e.into()),
        })
    }
}
