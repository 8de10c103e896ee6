//! Wrapper types for converting from higher level types to sql data types

use chrono::{DateTime, TimeZone, Utc};
use derive_more::{From, Into};

use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
    Error, ToSql,
};

use super::record::{split_list, LIST_SEPARATOR};

/// List-valued field stored as a single separator-joined TEXT column.
#[derive(Debug, From, Into)]
pub(crate) struct StringListSql(pub Vec<String>);

impl ToSql for StringListSql {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>, Error> {
        Ok(self.0.join(LIST_SEPARATOR).into())
    }
}

impl FromSql for StringListSql {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(StringListSql(split_list(value.as_str()?)))
    }
}

/// Modification timestamp stored as an INTEGER epoch column.
#[derive(Debug, From, Into)]
pub(crate) struct ModDateSql(pub DateTime<Utc>);

impl ToSql for ModDateSql {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>, Error> {
        Ok(self.0.timestamp().into())
    }
}

impl FromSql for ModDateSql {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let seconds = value.as_i64()?;
        Utc.timestamp_opt(seconds, 0)
            .single()
            .map(ModDateSql)
            .ok_or(FromSqlError::OutOfRange(seconds))
    }
}
