use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("start or end node not found: {0}")]
    NodeNotFound(String),
    #[error("no walkable route between {start} and {end}")]
    NoRoute { start: String, end: String },
    #[error("network has no nodes")]
    EmptyNetwork,
}
