use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;

use crate::models::PICK_COUNT;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    date    TEXT PRIMARY KEY,
    n1      INTEGER NOT NULL,
    n2      INTEGER NOT NULL,
    n3      INTEGER NOT NULL,
    n4      INTEGER NOT NULL,
    n5      INTEGER NOT NULL,
    n6      INTEGER NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("datalotto.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Insère un tirage, identifié par sa date. Retourne false si la date
/// existait déjà (doublon ignoré).
pub fn insert_draw(conn: &Connection, date: NaiveDate, numbers: &[u8; PICK_COUNT]) -> Result<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO draws (date, n1, n2, n3, n4, n5, n6)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                date.to_string(),
                numbers[0],
                numbers[1],
                numbers[2],
                numbers[3],
                numbers[4],
                numbers[5],
            ],
        )
        .context("Échec de l'insertion")?;
    Ok(changed > 0)
}

/// Vide la table des tirages (l'archive est toujours remplacée en bloc).
pub fn clear_draws(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM draws", [])
        .context("Échec de la purge des tirages")?;
    Ok(())
}

/// Tous les tirages, par date croissante. L'attribution des identifiants
/// séquentiels revient à l'archive, pas à la base.
pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<(NaiveDate, [u8; PICK_COUNT])>> {
    let mut stmt = conn.prepare(
        "SELECT date, n1, n2, n3, n4, n5, n6
         FROM draws ORDER BY date ASC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let date_str: String = row.get(0)?;
            Ok((
                date_str,
                [
                    row.get::<_, u8>(1)?,
                    row.get::<_, u8>(2)?,
                    row.get::<_, u8>(3)?,
                    row.get::<_, u8>(4)?,
                    row.get::<_, u8>(5)?,
                    row.get::<_, u8>(6)?,
                ],
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(date_str, numbers)| {
            let date = date_str
                .parse::<NaiveDate>()
                .with_context(|| format!("Date invalide en base : '{}'", date_str))?;
            Ok((date, numbers))
        })
        .collect()
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}
