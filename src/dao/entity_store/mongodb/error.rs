use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB DAO operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failures raised by the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to write {kind} `{id}`")]
    Write {
        kind: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load {kind} `{id}`")]
    Load {
        kind: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list {kind}")]
    List {
        kind: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete {kind}")]
    Delete {
        kind: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to encode {kind} `{id}` as BSON: {message}")]
    Encode {
        kind: &'static str,
        id: Uuid,
        message: String,
    },
    #[error("{message}")]
    DuplicateKey { message: String },
}

/// Whether `err` is a unique index violation.
pub fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
