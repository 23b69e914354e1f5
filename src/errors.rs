//! Errors produced by the cache and its collaborators.

pub type Result<T> = ::std::result::Result<T, ::failure::Error>;

/// Errors raised by the cache itself, as opposed to the ones returned by concrete
/// resource kinds.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "{}", _0)]
    Json(::serde_json::Error),
    #[fail(display = "Resource {} panicked while loading: {}.", _0, _1)]
    LoadPanicked(String, String),
}

impl From<::serde_json::Error> for Error {
    fn from(err: ::serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl Error {
    /// Builds a `LoadPanicked` error from the payload of a caught panic.
    pub fn panicked<T: Into<String>>(id: T, payload: &(dyn ::std::any::Any + Send)) -> Self {
        let msg = if let Some(v) = payload.downcast_ref::<&'static str>() {
            (*v).to_owned()
        } else if let Some(v) = payload.downcast_ref::<String>() {
            v.clone()
        } else {
            "unknown panic".to_owned()
        };

        Error::LoadPanicked(id.into(), msg)
    }
}
