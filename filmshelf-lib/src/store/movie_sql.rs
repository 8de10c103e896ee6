use const_format::formatcp;
use rusqlite::{named_params, Connection, Error, OptionalExtension, Row};

use super::converters::{ModDateSql, StringListSql};

const COLUMNS: &str = "cat, name, path, image, title, externalid, year, rating, \
                       genres, overview, directors, actors, moddate";

/// Low level type for interacting with movie rows
#[derive(Debug)]
pub(crate) struct MovieSql {
    pub cat: i64,
    pub name: String,
    pub path: String,
    pub image: Option<Vec<u8>>,
    pub title: String,
    pub external_id: String,
    pub year: String,
    pub rating: i64,
    pub genres: StringListSql,
    pub overview: String,
    pub directors: StringListSql,
    pub actors: StringListSql,
    pub moddate: ModDateSql,
}

impl MovieSql {
    pub fn create_table(conn: &Connection) -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS movies (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    cat INTEGER NOT NULL REFERENCES categories(id),
                    name TEXT NOT NULL,
                    path TEXT NOT NULL,
                    image BLOB,
                    title TEXT NOT NULL,
                    externalid TEXT NOT NULL,
                    year TEXT NOT NULL,
                    rating INTEGER NOT NULL,
                    genres TEXT NOT NULL,
                    overview TEXT NOT NULL,
                    directors TEXT NOT NULL,
                    actors TEXT NOT NULL,
                    moddate INTEGER NOT NULL,
                    UNIQUE (cat, path)
            )",
            [],
        )?;
        Ok(())
    }

    pub fn insert(&self, conn: &Connection) -> Result<i64, Error> {
        let mut stmt = conn.prepare(formatcp!(
            "INSERT INTO movies ({COLUMNS}) \
            VALUES (:cat, :name, :path, :image, :title, :externalid, :year, \
            :rating, :genres, :overview, :directors, :actors, :moddate)"
        ))?;
        let params = self.to_params();
        stmt.insert(params.as_slice())
    }

    pub fn update(&self, conn: &Connection) -> Result<usize, Error> {
        let mut stmt = conn.prepare(
            "UPDATE movies SET name = :name, image = :image, title = :title, \
            externalid = :externalid, year = :year, rating = :rating, \
            genres = :genres, overview = :overview, directors = :directors, \
            actors = :actors, moddate = :moddate \
            WHERE cat = :cat AND path = :path",
        )?;
        let params = self.to_params();
        stmt.execute(params.as_slice())
    }

    pub fn find(conn: &Connection, cat: i64, path: &str) -> Result<Option<MovieSql>, Error> {
        conn.query_row(
            formatcp!("SELECT {COLUMNS} FROM movies WHERE cat = :cat AND path = :path"),
            named_params! { ":cat": cat, ":path": path },
            |row| MovieSql::try_from(row),
        )
        .optional()
    }

    pub fn rows_for_category(conn: &Connection, cat: i64) -> Result<Vec<MovieSql>, Error> {
        let mut stmt = conn.prepare(formatcp!(
            "SELECT {COLUMNS} FROM movies WHERE cat = :cat ORDER BY id"
        ))?;
        let rows = stmt.query_map(named_params! { ":cat": cat }, |row| MovieSql::try_from(row))?;
        rows.collect()
    }

    pub fn delete(conn: &Connection, cat: i64, path: &str) -> Result<usize, Error> {
        conn.execute(
            "DELETE FROM movies WHERE cat = :cat AND path = :path",
            named_params! { ":cat": cat, ":path": path },
        )
    }

    fn to_params(&self) -> [(&'static str, &dyn rusqlite::ToSql); 13] {
        [
            (":cat", &self.cat),
            (":name", &self.name),
            (":path", &self.path),
            (":image", &self.image),
            (":title", &self.title),
            (":externalid", &self.external_id),
            (":year", &self.year),
            (":rating", &self.rating),
            (":genres", &self.genres),
            (":overview", &self.overview),
            (":directors", &self.directors),
            (":actors", &self.actors),
            (":moddate", &self.moddate),
        ]
    }
}

impl TryFrom<&Row<'_>> for MovieSql {
    type Error = Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            cat: row.get(0)?,
            name: row.get(1)?,
            path: row.get(2)?,
            image: row.get(3)?,
            title: row.get(4)?,
            external_id: row.get(5)?,
            year: row.get(6)?,
            rating: row.get(7)?,
            genres: row.get(8)?,
            overview: row.get(9)?,
            directors: row.get(10)?,
            actors: row.get(11)?,
            moddate: row.get(12)?,
        })
    }
}
