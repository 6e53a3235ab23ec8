use rusqlite::{params, Connection, OptionalExtension};

use super::{Database, DbResult};
use crate::models::{DayOfWeek, DayTitle};

/// The stored title, or an empty string for a day that has none yet.
pub(crate) fn day_title(conn: &Connection, day: DayOfWeek) -> DbResult<String> {
    let title: Option<String> = conn
        .query_row(
            "SELECT title FROM day_titles WHERE day_of_week = ?1",
            [day.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(title.unwrap_or_default())
}

pub(crate) fn upsert_day_title(conn: &Connection, day: DayOfWeek, title: &str) -> DbResult<()> {
    conn.execute(
        "INSERT INTO day_titles (day_of_week, title) VALUES (?1, ?2)
         ON CONFLICT(day_of_week) DO UPDATE SET title = excluded.title",
        params![day.as_str(), title],
    )?;
    Ok(())
}

impl Database {
    pub fn get_day_title(&self, day: DayOfWeek) -> DbResult<DayTitle> {
        self.with_connection(|conn| {
            Ok(DayTitle {
                day_of_week: day,
                title: day_title(conn, day)?,
            })
        })
    }

    pub fn set_day_title(&self, day: DayOfWeek, title: &str) -> DbResult<()> {
        self.with_connection(|conn| upsert_day_title(conn, day, title))
    }

    /// All seven days in weekday order, untitled days included.
    pub fn list_day_titles(&self) -> DbResult<Vec<DayTitle>> {
        self.with_connection(|conn| {
            DayOfWeek::ALL
                .into_iter()
                .map(|day| {
                    Ok(DayTitle {
                        day_of_week: day,
                        title: day_title(conn, day)?,
                    })
                })
                .collect()
        })
    }
}
