use const_format::formatcp;
use rusqlite::{named_params, Connection, Error, OptionalExtension, Row};

const COLUMNS: &str = "name, path";

/// Low level type for interacting with category rows
#[derive(Debug)]
pub(crate) struct CategorySql {
    pub name: String,
    pub path: String,
}

impl CategorySql {
    pub fn create_table(conn: &Connection) -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    path TEXT NOT NULL UNIQUE
            )",
            [],
        )?;
        Ok(())
    }

    pub fn insert(&self, conn: &Connection) -> Result<i64, Error> {
        let mut stmt = conn.prepare(formatcp!(
            "INSERT INTO categories ({COLUMNS}) VALUES (:name, :path)"
        ))?;
        stmt.insert(named_params! {
            ":name": self.name,
            ":path": self.path,
        })
    }

    pub fn get_rows(conn: &Connection) -> Result<Vec<CategorySql>, Error> {
        let mut stmt =
            conn.prepare(formatcp!("SELECT {COLUMNS} FROM categories ORDER BY id"))?;
        let rows = stmt.query_map([], |row| CategorySql::try_from(row))?;
        rows.collect()
    }

    pub fn id_for_path(conn: &Connection, path: &str) -> Result<Option<i64>, Error> {
        conn.query_row(
            "SELECT id FROM categories WHERE path = :path",
            named_params! { ":path": path },
            |row| row.get(0),
        )
        .optional()
    }

    pub fn update_name(conn: &Connection, path: &str, name: &str) -> Result<usize, Error> {
        conn.execute(
            "UPDATE categories SET name = :name WHERE path = :path",
            named_params! { ":name": name, ":path": path },
        )
    }
}

impl TryFrom<&Row<'_>> for CategorySql {
    type Error = Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            name: row.get(0)?,
            path: row.get(1)?,
        })
    }
}
