//! Statement classification
//!
//! Labels a SQL statement by its leading keyword. Only a prefix test is
//! performed; the statement body is never parsed, so a statement that passes
//! here may still be rejected by SQLite at execution time.

/// Intent of a SQL statement, derived from its leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT ...`
    Read,
    /// `INSERT`, `UPDATE` or `DELETE`
    Write,
    /// `CREATE TABLE ...`
    CreateTable,
    /// Anything else
    Other,
}

impl StatementKind {
    /// Classify raw statement text
    pub fn of(statement: &str) -> Self {
        let normalized = statement.trim().to_uppercase();

        if normalized.starts_with("SELECT") {
            StatementKind::Read
        } else if normalized.starts_with("CREATE TABLE") {
            StatementKind::CreateTable
        } else if normalized.starts_with("INSERT")
            || normalized.starts_with("UPDATE")
            || normalized.starts_with("DELETE")
        {
            StatementKind::Write
        } else {
            StatementKind::Other
        }
    }

    /// Whether `read_query` accepts this statement
    pub fn is_read(self) -> bool {
        self == StatementKind::Read
    }

    /// Whether `write_query` accepts this statement (everything but reads)
    pub fn allows_write(self) -> bool {
        !self.is_read()
    }

    /// Whether `create_table` accepts this statement
    pub fn is_create_table(self) -> bool {
        self == StatementKind::CreateTable
    }
}
