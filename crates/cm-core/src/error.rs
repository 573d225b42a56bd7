use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Malformed cell key: {key:?}")]
    MalformedKey { key: String },

    #[error("Unknown cell {key} in {target}")]
    UnknownCell { target: &'static str, key: String },

    #[error("Unknown marker: {id:?}")]
    UnknownMarker { id: String },

    #[error("Address out of bounds: {what} = {value} (valid 1..={max})")]
    OutOfBounds {
        what: &'static str,
        value: u32,
        max: u32,
    },
}
