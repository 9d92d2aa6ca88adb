use std::fmt;

/// Result type used throughout the forktrace workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable error taxonomy for the conversation engine.
///
/// Every variant owns its message as a `String` rather than borrowing from a
/// caller-scoped buffer: an error must remain readable after any buffer the
/// caller used to build it has gone out of scope.
#[derive(Debug, Clone)]
pub enum Error {
    /// Transport or disk failure underneath the store.
    Io(String),
    /// A foreign key referenced a row that doesn't exist (unknown session,
    /// unknown agent, ...).
    ReferentialIntegrity(String),
    /// A feature is recognized but deliberately unimplemented.
    NotImplemented(String),
    /// Malformed `data` JSON on an event, or any other structured payload.
    Parse(String),
    /// Allocation failure surfaced from a bounded buffer.
    OutOfMemory(String),
    /// A state-machine transition was attempted out of turn (e.g. switching
    /// models while not `Idle`).
    Protocol(String),
    /// An operation was attempted by someone other than its owner (e.g.
    /// deleting another agent's mail).
    Authorization(String),
}

impl Error {
    pub fn io(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    pub fn referential_integrity(msg: impl Into<String>) -> Self {
        Error::ReferentialIntegrity(msg.into())
    }

    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Error::NotImplemented(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    pub fn out_of_memory(msg: impl Into<String>) -> Self {
        Error::OutOfMemory(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Error::Authorization(msg.into())
    }

    /// A short, stable tag for the variant, useful for logging and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::ReferentialIntegrity(_) => "referential_integrity",
            Error::NotImplemented(_) => "not_implemented",
            Error::Parse(_) => "parse",
            Error::OutOfMemory(_) => "out_of_memory",
            Error::Protocol(_) => "protocol",
            Error::Authorization(_) => "authorization",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(msg) => write!(f, "io error: {msg}"),
            Error::ReferentialIntegrity(msg) => write!(f, "referential integrity error: {msg}"),
            Error::NotImplemented(msg) => write!(f, "not implemented: {msg}"),
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
            Error::OutOfMemory(msg) => write!(f, "out of memory: {msg}"),
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Error::Authorization(msg) => write!(f, "authorization error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
