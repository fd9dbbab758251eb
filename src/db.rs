use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, Row};

use crate::parser::record::Record;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS topics (
            id                      INTEGER PRIMARY KEY,
            code                    TEXT NOT NULL,
            title                   TEXT,
            budget_per_project      INTEGER,
            indicative_total_budget INTEGER,
            number_of_projects      INTEGER,
            type_of_action          TEXT,
            trl                     TEXT,
            call                    TEXT,
            expected_outcome        TEXT,
            scope                   TEXT,
            opening_date            TEXT,
            deadline1               TEXT,
            deadline1_label         TEXT,
            deadline2               TEXT,
            deadline2_label         TEXT,
            destination             TEXT,
            description             TEXT NOT NULL,
            source                  TEXT NOT NULL,
            version                 TEXT NOT NULL,
            parsed_at               TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_topics_code ON topics(code);
        CREATE INDEX IF NOT EXISTS idx_topics_source ON topics(source, version);
        ",
    )?;
    Ok(())
}

const SELECT_COLUMNS: &str = "code, title, budget_per_project, indicative_total_budget,
    number_of_projects, type_of_action, trl, call, expected_outcome, scope,
    opening_date, deadline1, deadline1_label, deadline2, deadline2_label,
    destination, description, source, version, parsed_at";

/// Store records, replacing earlier rows of the same source and version.
/// Duplicate codes within one document are kept as separate rows.
pub fn save_records(conn: &Connection, records: &[Record]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut del = tx.prepare("DELETE FROM topics WHERE source = ?1 AND version = ?2")?;
        let mut cleared = std::collections::HashSet::new();
        for r in records {
            if cleared.insert((r.source.as_str(), r.version.as_str())) {
                del.execute(rusqlite::params![r.source, r.version])?;
            }
        }

        let mut stmt = tx.prepare(&format!(
            "INSERT INTO topics ({})
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20)",
            SELECT_COLUMNS
        ))?;
        for r in records {
            count += stmt.execute(rusqlite::params![
                r.code, r.title, to_sql_amount(r.budget_per_project),
                to_sql_amount(r.indicative_total_budget), to_sql_amount(r.number_of_projects),
                r.type_of_action, r.trl, r.call, r.expected_outcome, r.scope,
                r.opening_date, r.deadline1, r.deadline1_label, r.deadline2, r.deadline2_label,
                r.destination, r.description, r.source, r.version, r.parsed_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

fn to_sql_amount(v: Option<u64>) -> Option<i64> {
    v.and_then(|n| i64::try_from(n).ok())
}

fn from_sql_amount(v: Option<i64>) -> Option<u64> {
    v.and_then(|n| u64::try_from(n).ok())
}

fn record_from_row(row: &Row) -> rusqlite::Result<Record> {
    Ok(Record {
        code: row.get(0)?,
        title: row.get(1)?,
        budget_per_project: from_sql_amount(row.get(2)?),
        indicative_total_budget: from_sql_amount(row.get(3)?),
        number_of_projects: from_sql_amount(row.get(4)?),
        type_of_action: row.get(5)?,
        trl: row.get(6)?,
        call: row.get(7)?,
        expected_outcome: row.get(8)?,
        scope: row.get(9)?,
        opening_date: row.get(10)?,
        deadline1: row.get(11)?,
        deadline1_label: row.get(12)?,
        deadline2: row.get(13)?,
        deadline2_label: row.get(14)?,
        destination: row.get(15)?,
        description: row.get(16)?,
        source: row.get(17)?,
        version: row.get(18)?,
        parsed_at: row.get(19)?,
    })
}

// ── Search ──

/// Case-insensitive keyword search over the text columns, in insertion order.
/// The keyword is matched literally.
pub fn search_records(conn: &Connection, keyword: &str, limit: usize) -> Result<Vec<Record>> {
    let pattern = format!("%{}%", escape_like(keyword.trim()));
    let sql = format!(
        "SELECT {}
         FROM topics
         WHERE code LIKE ?1 ESCAPE '\\' OR title LIKE ?1 ESCAPE '\\'
            OR call LIKE ?1 ESCAPE '\\' OR destination LIKE ?1 ESCAPE '\\'
            OR expected_outcome LIKE ?1 ESCAPE '\\' OR scope LIKE ?1 ESCAPE '\\'
            OR description LIKE ?1 ESCAPE '\\'
         ORDER BY id
         LIMIT {}",
        SELECT_COLUMNS, limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([pattern], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ── Stats ──

pub struct Stats {
    pub topics: usize,
    pub sources: usize,
    pub calls: usize,
    pub with_deadline: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let topics: usize = conn.query_row("SELECT COUNT(*) FROM topics", [], |r| r.get(0))?;
    let sources: usize = conn.query_row(
        "SELECT COUNT(*) FROM (SELECT DISTINCT source, version FROM topics)",
        [],
        |r| r.get(0),
    )?;
    let calls: usize = conn.query_row(
        "SELECT COUNT(DISTINCT call) FROM topics WHERE call IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let with_deadline: usize = conn.query_row(
        "SELECT COUNT(*) FROM topics WHERE deadline1 IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats {
        topics,
        sources,
        calls,
        with_deadline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn record(code: &str, source: &str, scope: Option<&str>) -> Record {
        Record {
            code: code.to_string(),
            title: Some(format!("Title of {}", code)),
            budget_per_project: Some(2_500_000),
            scope: scope.map(str::to_string),
            description: format!("{}: body", code),
            source: source.to_string(),
            version: "v1".to_string(),
            parsed_at: "2025-06-01T10:00:00+00:00".to_string(),
            ..Record::default()
        }
    }

    #[test]
    fn roundtrip_and_search() {
        let conn = memory_db();
        let records = vec![
            record("HORIZON-A-2025-01", "wp.pdf", Some("Hydrogen valleys")),
            record("HORIZON-A-2025-02", "wp.pdf", Some("Offshore wind")),
        ];
        assert_eq!(save_records(&conn, &records).unwrap(), 2);

        let found = search_records(&conn, "HYDROGEN", 10).unwrap();
        assert_eq!(found, vec![records[0].clone()]);
        assert_eq!(search_records(&conn, "horizon-a", 10).unwrap().len(), 2);
        assert_eq!(search_records(&conn, "horizon-a", 1).unwrap().len(), 1);
        assert!(search_records(&conn, "fusion", 10).unwrap().is_empty());
    }

    #[test]
    fn wildcards_match_literally() {
        let conn = memory_db();
        let records = vec![
            record("HORIZON-A-2025-01", "wp.pdf", Some("Cut emissions by 50% in ports")),
            record("HORIZON-A-2025-02", "wp.pdf", Some("Offshore wind")),
        ];
        save_records(&conn, &records).unwrap();

        assert!(search_records(&conn, "_", 10).unwrap().is_empty());
        assert!(search_records(&conn, "5_%", 10).unwrap().is_empty());
        let found = search_records(&conn, "50%", 10).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "HORIZON-A-2025-01");
        assert_eq!(escape_like(r"a\b_c%"), r"a\\b\_c\%");
    }

    #[test]
    fn resave_replaces_same_source() {
        let conn = memory_db();
        save_records(&conn, &[record("HORIZON-A-2025-01", "wp.pdf", None)]).unwrap();
        save_records(&conn, &[record("HORIZON-A-2025-01", "wp.pdf", None)]).unwrap();
        save_records(&conn, &[record("HORIZON-A-2025-01", "other.pdf", None)]).unwrap();
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.topics, 2);
        assert_eq!(stats.sources, 2);
    }

    #[test]
    fn duplicate_codes_stored_separately() {
        let conn = memory_db();
        let records = vec![
            record("HORIZON-A-2025-01", "wp.pdf", None),
            record("HORIZON-A-2025-01", "wp.pdf", None),
        ];
        save_records(&conn, &records).unwrap();
        assert_eq!(get_stats(&conn).unwrap().topics, 2);
    }

    #[test]
    fn empty_stats() {
        let stats = get_stats(&memory_db()).unwrap();
        assert_eq!(stats.topics, 0);
        assert_eq!(stats.calls, 0);
        assert_eq!(stats.with_deadline, 0);
    }
}
