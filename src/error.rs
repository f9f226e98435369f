#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("canvas must have a width and height greater than 0 (got {width}x{height})")]
    EmptyCanvas { width: f32, height: f32 },
    #[error("edge {from} -> {to} references a node that does not exist")]
    MissingEndpoint { from: String, to: String },
    #[error("unknown node: {id}")]
    UnknownNode { id: String },
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
