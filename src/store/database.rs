use crate::error::Result;
use crate::models::{compact_date, Observation, YearlySummary};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};
use std::path::Path;

/// Schema for the raw observation table. Rebuilt destructively on every
/// ingest run; `rowid` keeps the file's insertion order.
const CREATE_TABLES_SQL: &str = "
DROP TABLE IF EXISTS weather_data;
DROP TABLE IF EXISTS weather_summary;
CREATE TABLE weather_data (
    date                 TEXT,
    station_id           TEXT,
    max_temp             REAL,
    min_temp             REAL,
    precipitation_amount REAL
);
CREATE TABLE weather_summary (
    year                   TEXT,
    station_id             TEXT,
    avg_max_temp           REAL,
    avg_min_temp           REAL,
    total_precipitation_cm REAL
);
";

/// Duplicate rows keep the lowest rowid, i.e. the first occurrence in the file
const DEDUPLICATE_SQL: &str = "
DELETE FROM weather_data
WHERE rowid NOT IN (
    SELECT MIN(rowid)
    FROM weather_data
    GROUP BY date, station_id, max_temp, min_temp, precipitation_amount
)";

/// Yearly aggregation over the raw table. The `-9999` missing sentinel is
/// excluded per field, so a row missing only precipitation still contributes
/// its temperatures; AVG/SUM over an all-sentinel group yields NULL. The batch
/// summary build and the live stats endpoint both run this exact projection.
const YEARLY_STATS_SELECT: &str = "
SELECT substr(date, 1, 4) AS year,
       station_id,
       AVG(CASE WHEN max_temp != -9999 THEN max_temp END) AS avg_max_temp,
       AVG(CASE WHEN min_temp != -9999 THEN min_temp END) AS avg_min_temp,
       SUM(CASE WHEN precipitation_amount != -9999 THEN precipitation_amount / 10.0 END)
           AS total_precipitation_cm
FROM weather_data";

/// Equality filters for the raw observation listing
#[derive(Debug, Default, Clone)]
pub struct ObservationFilter {
    /// Exact match on the compact `YYYYMMDD` date
    pub date: Option<String>,
    pub station_id: Option<String>,
}

/// Filters for the live yearly statistics query
#[derive(Debug, Default, Clone)]
pub struct StatsFilter {
    /// Exact match on the derived four-character year
    pub year: Option<String>,
    pub station_id: Option<String>,
}

/// One page of raw observations plus the pagination envelope
#[derive(Debug)]
pub struct ObservationPage {
    pub observations: Vec<Observation>,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

/// SQLite-backed store shared by the ingest job and the query service
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Whether an ingest run has created the raw table yet
    pub fn is_ingested(&self) -> Result<bool> {
        let table: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'weather_data'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(table.is_some())
    }

    /// Drop and recreate both tables, then load the observations in file
    /// order inside a single transaction. Returns the number of rows inserted.
    pub fn replace_observations(&mut self, observations: &[Observation]) -> Result<usize> {
        self.conn.execute_batch(CREATE_TABLES_SQL)?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO weather_data (date, station_id, max_temp, min_temp, precipitation_amount)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for obs in observations {
                stmt.execute(params![
                    obs.date_string(),
                    obs.station_id,
                    obs.max_temp,
                    obs.min_temp,
                    obs.precipitation,
                ])?;
            }
        }
        tx.commit()?;

        Ok(observations.len())
    }

    /// Delete exact-duplicate rows, keeping the first occurrence of each
    /// tuple. Returns the number of rows removed.
    pub fn deduplicate(&self) -> Result<usize> {
        Ok(self.conn.execute(DEDUPLICATE_SQL, [])?)
    }

    /// Recompute the `weather_summary` table from the raw rows. Returns the
    /// number of station-year rows written.
    pub fn rebuild_summary(&self) -> Result<usize> {
        self.conn.execute("DELETE FROM weather_summary", [])?;

        let written = self.conn.execute(
            &format!(
                "INSERT INTO weather_summary {} GROUP BY year, station_id ORDER BY year, station_id",
                YEARLY_STATS_SELECT
            ),
            [],
        )?;

        Ok(written)
    }

    /// First rows of the batch-computed summary table, for the ingest report
    pub fn summary_preview(&self, limit: usize) -> Result<Vec<YearlySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT year, station_id, avg_max_temp, avg_min_temp, total_precipitation_cm
             FROM weather_summary ORDER BY year, station_id LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], map_summary_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// One page of raw observations in insertion order. A page past the end
    /// yields an empty list, never an error.
    pub fn observations(
        &self,
        filter: &ObservationFilter,
        page: u32,
        per_page: u32,
    ) -> Result<ObservationPage> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let (where_sql, filter_params) = build_where(&[
            ("date = ?", filter.date.as_deref()),
            ("station_id = ?", filter.station_id.as_deref()),
        ]);

        let total_items: u64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM weather_data{}", where_sql),
            params_from_iter(filter_params.clone()),
            |row| row.get::<_, i64>(0),
        )? as u64;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT date, station_id, max_temp, min_temp, precipitation_amount
             FROM weather_data{} ORDER BY rowid LIMIT ? OFFSET ?",
            where_sql
        ))?;

        let mut select_params = filter_params;
        select_params.push(Value::from(per_page as i64));
        select_params.push(Value::from((page as i64 - 1) * per_page as i64));

        let rows = stmt.query_map(params_from_iter(select_params), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
            ))
        })?;

        let mut observations = Vec::new();
        for row in rows {
            let (date, station_id, max_temp, min_temp, precipitation) = row?;
            let date = NaiveDate::parse_from_str(&date, compact_date::FORMAT)?;
            observations.push(Observation::new(
                date,
                station_id,
                max_temp,
                min_temp,
                precipitation,
            ));
        }

        let total_pages = (total_items.div_ceil(per_page as u64)) as u32;

        Ok(ObservationPage {
            observations,
            page,
            per_page,
            total_pages,
            total_items,
        })
    }

    /// Yearly statistics recomputed from the raw table at request time
    pub fn yearly_stats(&self, filter: &StatsFilter) -> Result<Vec<YearlySummary>> {
        let (where_sql, filter_params) = build_where(&[
            ("substr(date, 1, 4) = ?", filter.year.as_deref()),
            ("station_id = ?", filter.station_id.as_deref()),
        ]);

        let mut stmt = self.conn.prepare(&format!(
            "{}{} GROUP BY year, station_id ORDER BY year, station_id",
            YEARLY_STATS_SELECT, where_sql
        ))?;

        let rows = stmt.query_map(params_from_iter(filter_params), map_summary_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn map_summary_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<YearlySummary> {
    Ok(YearlySummary {
        year: row.get(0)?,
        station_id: row.get(1)?,
        avg_max_temp: row.get(2)?,
        avg_min_temp: row.get(3)?,
        total_precipitation_cm: row.get(4)?,
    })
}

/// Assemble a WHERE clause from the clauses whose value is present
fn build_where(candidates: &[(&str, Option<&str>)]) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    for (clause, value) in candidates {
        if let Some(value) = value {
            clauses.push(*clause);
            params.push(Value::from(value.to_string()));
        }
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    (where_sql, params)
}
