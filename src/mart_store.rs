use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Params, params};
use tracing::debug;

use crate::metric_table::{Cell, MetricTable};
use crate::stat_type::StatType;

const IDENTITY_COLUMNS: &str = "
    team_id INTEGER NOT NULL,
    team_name TEXT NOT NULL,
    season_id INTEGER NOT NULL,
    season_name TEXT NULL,
    season_year INTEGER NULL,
    matches_played INTEGER NOT NULL DEFAULT 0";

/// Opens an existing snapshot read-only.
pub fn open_db(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("open sqlite db {}", path.display()))
}

/// Creates `fact_match` and the `mart_team_*` tables if they are missing.
///
/// Each mart gets the identity columns plus a REAL column for every metric
/// the category plots or ranks.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS fact_match (
            match_id INTEGER PRIMARY KEY,
            season_id INTEGER NOT NULL,
            match_date TEXT NOT NULL,
            home_team_id INTEGER NOT NULL,
            away_team_id INTEGER NOT NULL,
            home_score INTEGER NULL,
            away_score INTEGER NULL
        );
        CREATE INDEX IF NOT EXISTS idx_fact_match_season ON fact_match(season_id);
        "#,
    )
    .context("create fact_match")?;

    for stat_type in StatType::ALL {
        let mut metrics: Vec<&str> = stat_type.radar_axes().iter().map(|(m, _)| *m).collect();
        for m in stat_type.lower_is_better() {
            if !metrics.contains(m) {
                metrics.push(*m);
            }
        }
        let metric_cols: String = metrics
            .iter()
            .map(|m| format!(",\n    {m} REAL NULL"))
            .collect();
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} ({IDENTITY_COLUMNS}{metric_cols},\n    PRIMARY KEY (team_id, season_id)\n);",
            table = stat_type.table_name(),
        );
        conn.execute_batch(&sql)
            .with_context(|| format!("create {}", stat_type.table_name()))?;
    }
    Ok(())
}

/// Every team's row of one category mart for a season, with the category's
/// metric directions attached.
pub fn load_season_table(
    conn: &Connection,
    stat_type: StatType,
    season_id: i64,
) -> Result<MetricTable> {
    let sql = format!(
        "SELECT * FROM {} WHERE season_id = ?1 ORDER BY team_id ASC",
        stat_type.table_name()
    );
    let table = query_table(conn, &sql, params![season_id])
        .with_context(|| format!("load {} for season {season_id}", stat_type.table_name()))?;
    debug!(stat_type = %stat_type, season_id, teams = table.len(), "loaded season table");
    Ok(table.with_directions(stat_type.directions()))
}

/// The team's fixtures in a season, oldest first.
pub fn load_team_matches(conn: &Connection, season_id: i64, team_id: i64) -> Result<MetricTable> {
    let table = query_table(
        conn,
        r#"
        SELECT *
        FROM fact_match
        WHERE season_id = ?1
          AND (home_team_id = ?2 OR away_team_id = ?2)
        ORDER BY match_date ASC, match_id ASC
        "#,
        params![season_id, team_id],
    )
    .with_context(|| format!("load matches for team {team_id} in season {season_id}"))?;
    debug!(season_id, team_id, matches = table.len(), "loaded team matches");
    Ok(table)
}

fn query_table<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<MetricTable> {
    let mut stmt = conn.prepare(sql).context("prepare query")?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params).context("run query")?;
    let mut out: Vec<Vec<Cell>> = Vec::new();
    while let Some(row) = rows.next().context("read row")? {
        let mut cells = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            let value = row.get_ref(idx).context("decode cell")?;
            cells.push(cell_from_sql(value));
        }
        out.push(cells);
    }
    Ok(MetricTable::from_rows(columns, out)?)
}

fn cell_from_sql(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Cell::Null,
        ValueRef::Integer(i) => Cell::from(i),
        ValueRef::Real(f) => Cell::from(f),
        ValueRef::Text(bytes) => Cell::from(String::from_utf8_lossy(bytes).into_owned()),
    }
}
