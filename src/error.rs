use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("encountered unexpected EOF")]
    UnexpectedEof,

    #[error("error decoding message field: {0}")]
    MalformedField(&'static str),

    #[error("invalid compression pointer to offset {0}")]
    InvalidCompressionPointer(usize),

    #[error("compression too deep: exiting before infinite recursion")]
    CompressionTooDeep,

    #[error("label `{0}` is longer than 63 bytes")]
    LabelTooLong(String),

    #[error("name `{0}` contains an empty label")]
    EmptyLabel(String),

    #[error("name `{0}` is longer than 255 bytes")]
    NameTooLong(String),

    #[error("too many records in one section: {0}")]
    TooManyRecords(usize),

    #[error("unknown record type `{0}`")]
    UnknownType(String),
}

// Cursor IO over in-memory buffers only fails when input runs out.
impl From<std::io::Error> for PacketError {
    fn from(_: std::io::Error) -> Self {
        PacketError::UnexpectedEof
    }
}

pub type Result<T> = std::result::Result<T, PacketError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad packet: {0}")]
    Packet(#[from] PacketError),

    #[error("no response received from {server} within {timeout:?}")]
    NoResponse { server: SocketAddr, timeout: Duration },
}
