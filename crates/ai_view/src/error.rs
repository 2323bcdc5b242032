pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write view: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
