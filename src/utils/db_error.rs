/// Returns true when `e` is the unique index on `short_urls.slug` rejecting
/// an insert.
pub fn is_unique_violation_on_slug(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    // SQLite reports no constraint name, only "UNIQUE constraint failed: <table>.<column>".
    db_err.constraint() == Some("short_urls_slug_key")
        || db_err.message().contains("short_urls.slug")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_is_not_violation() {
        assert!(!is_unique_violation_on_slug(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation_on_slug(&sqlx::Error::PoolTimedOut));
    }
}
