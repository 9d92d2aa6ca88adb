use forktrace_types::Error;

/// Maps a `rusqlite::Error` onto the stable taxonomy.
///
/// A `SQLITE_CONSTRAINT_FOREIGNKEY` failure becomes `ReferentialIntegrity`
/// with its own owned message so the caller can free anything it built the
/// query from — the error never borrows.
pub fn map_rusqlite(err: rusqlite::Error) -> Error {
    use rusqlite::ffi::ErrorCode;
    if let rusqlite::Error::SqliteFailure(e, ref msg) = err {
        if e.code == ErrorCode::ConstraintViolation {
            let detail = msg.clone().unwrap_or_else(|| err.to_string());
            return Error::referential_integrity(detail);
        }
    }
    Error::io(err.to_string())
}

pub(crate) trait MapRusqlite<T> {
    fn map_store_err(self) -> forktrace_types::Result<T>;
}

impl<T> MapRusqlite<T> for rusqlite::Result<T> {
    fn map_store_err(self) -> forktrace_types::Result<T> {
        self.map_err(map_rusqlite)
    }
}
