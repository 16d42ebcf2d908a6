use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use datalotto_db::rusqlite::Connection;

use datalotto_db::db::insert_draw;
use datalotto_db::models::{PICK_COUNT, validate_numbers};

/// Accepte JJ/MM/AAAA (format historique des exports) ou AAAA-MM-JJ.
fn parse_date(raw: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Ok(date);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Format de date invalide: '{}'", raw))
}

fn parse_record(record: &csv::StringRecord) -> Result<(NaiveDate, [u8; PICK_COUNT])> {
    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .map(|s| s.trim())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let date = parse_date(get(0)?)?;

    let mut numbers = [0u8; PICK_COUNT];
    for (i, slot) in numbers.iter_mut().enumerate() {
        let s = get(i + 1)?;
        *slot = s
            .parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, i + 1))?;
    }

    validate_numbers(&numbers)?;
    Ok((date, numbers))
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Importe un CSV `date;n1;..;n6`. Les enregistrements invalides sont
/// ignorés individuellement, l'import continue.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record) {
                Ok((date, numbers)) => match insert_draw(&tx, date, &numbers) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        log::warn!("Erreur insertion ligne {}: {}", result.total_records, e);
                        result.errors += 1;
                    }
                },
                Err(e) => {
                    log::warn!("Ligne {} ignorée: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                log::warn!("Erreur lecture ligne {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;

    if result.total_records == 0 {
        bail!("Fichier vide: {:?}", path);
    }
    Ok(result)
}
