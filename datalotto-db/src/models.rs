use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Taille du pool : numéros de 1 à 49.
pub const POOL_SIZE: u8 = 49;
/// Nombre de numéros d'une combinaison ordinaire.
pub const PICK_COUNT: usize = 6;

/// Un tirage historique. Immuable après création : l'archive est toujours
/// remplacée en bloc, jamais corrigée tirage par tirage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    /// Identifiant séquentiel, contigu de 1 à N, attribué par date croissante.
    pub id: u32,
    pub date: NaiveDate,
    /// Toujours triés par ordre croissant.
    pub numbers: [u8; PICK_COUNT],
    pub sum: u32,
}

impl Draw {
    pub fn new(id: u32, date: NaiveDate, mut numbers: [u8; PICK_COUNT]) -> Self {
        numbers.sort_unstable();
        let sum = numbers.iter().map(|&n| n as u32).sum();
        Draw {
            id,
            date,
            numbers,
            sum,
        }
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }
}

/// Valide une combinaison brute avant ingestion : plage 1-49, pas de doublon.
/// C'est la responsabilité du collaborateur d'ingestion, l'archive suppose
/// ses entrées déjà valides.
pub fn validate_numbers(numbers: &[u8; PICK_COUNT]) -> Result<()> {
    for &n in numbers {
        if n < 1 || n > POOL_SIZE {
            bail!("Numéro {} hors limites (1-{})", n, POOL_SIZE);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    Ok(())
}

/// Formatage d'une combinaison pour l'affichage : "01 - 02 - ...".
pub fn format_combination(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}
