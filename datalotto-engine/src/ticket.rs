//! Boletos : sortie du moteur de recherche, validation a posteriori contre
//! un tirage gagnant, explosion des multiples en combinaisons simples et
//! persistance JSON (même mécanique que la sauvegarde de calibration du
//! reste de l'écosystème).

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::archive::DrawArchive;
use crate::combin::all_k_combinations;
use datalotto_db::models::PICK_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Simple,
    Winning,
    Multiple,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Simple => write!(f, "Simple"),
            Strategy::Winning => write!(f, "Gagnante"),
            Strategy::Multiple => write!(f, "Multiple"),
        }
    }
}

/// Résultat de validation : numéros gagnants et nombre de bons numéros par
/// combinaison brute. Pour un boleto multiple, `hits` compte les bons
/// numéros dans le superensemble ; la ventilation par sous-combinaison est
/// recalculée à la demande par `system_breakdown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub winning: Vec<u8>,
    pub hits: Vec<u8>,
}

/// Ventilation d'un multiple validé : bons numéros dans le superensemble et
/// répartition des sous-combinaisons par nombre de bons numéros (0 à 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemBreakdown {
    pub superset_hits: u8,
    pub total_bets: usize,
    pub buckets: [usize; PICK_COUNT + 1],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub created: DateTime<Local>,
    /// Exactement un élément de cardinalité > 6 pour un boleto multiple.
    pub combinations: Vec<Vec<u8>>,
    pub strategy: Strategy,
    /// Date de tirage visée, optionnelle.
    pub draw_date: Option<NaiveDate>,
    /// Ajoutée a posteriori, jamais retirée sauf suppression du boleto.
    pub validation: Option<Validation>,
}

impl Ticket {
    pub fn new(combinations: Vec<Vec<u8>>, strategy: Strategy) -> Ticket {
        let combinations = combinations
            .into_iter()
            .map(|mut c| {
                c.sort_unstable();
                c
            })
            .collect();
        Ticket {
            created: Local::now(),
            combinations,
            strategy,
            draw_date: None,
            validation: None,
        }
    }

    /// Boleto multiple : une seule combinaison, de plus de 6 numéros.
    pub fn is_system(&self) -> bool {
        self.combinations.len() == 1 && self.combinations[0].len() > PICK_COUNT
    }

    /// Valide contre un tirage gagnant : bons numéros par combinaison brute
    /// (pour un multiple, contre le superensemble).
    pub fn validate(&mut self, winning: &[u8]) {
        let hits = self
            .combinations
            .iter()
            .map(|combo| combo.iter().filter(|n| winning.contains(n)).count() as u8)
            .collect();
        self.validation = Some(Validation {
            winning: winning.to_vec(),
            hits,
        });
    }

    /// Explose un multiple en toutes ses combinaisons simples de 6. Pour un
    /// boleto ordinaire, retourne les combinaisons telles quelles.
    pub fn explode(&self) -> Vec<Vec<u8>> {
        if self.is_system() {
            all_k_combinations(&self.combinations[0], PICK_COUNT)
        } else {
            self.combinations.clone()
        }
    }

    /// Ventilation d'un multiple contre un tirage gagnant. None pour un
    /// boleto ordinaire.
    pub fn system_breakdown(&self, winning: &[u8]) -> Option<SystemBreakdown> {
        if !self.is_system() {
            return None;
        }
        let superset = &self.combinations[0];
        let superset_hits = superset.iter().filter(|n| winning.contains(n)).count() as u8;

        let exploded = all_k_combinations(superset, PICK_COUNT);
        let mut buckets = [0usize; PICK_COUNT + 1];
        for combo in &exploded {
            let hits = combo.iter().filter(|n| winning.contains(n)).count();
            buckets[hits] += 1;
        }

        Some(SystemBreakdown {
            superset_hits,
            total_bets: exploded.len(),
            buckets,
        })
    }
}

/// Formate des combinaisons pour un bulletin de jeu : une ligne par
/// combinaison, numéros sur deux chiffres séparés par des espaces.
pub fn format_for_play(combinations: &[Vec<u8>]) -> String {
    combinations
        .iter()
        .map(|combo| {
            combo
                .iter()
                .map(|n| format!("{:02}", n))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Valide automatiquement les boletos non validés contre l'archive : par
/// date de tirage si elle est renseignée, sinon contre le premier tirage à
/// la date de création ou après. Retourne le nombre de boletos validés.
pub fn auto_validate(tickets: &mut [Ticket], archive: &DrawArchive) -> usize {
    let mut validated = 0;
    for ticket in tickets.iter_mut() {
        if ticket.validation.is_some() {
            continue;
        }
        let draw = match ticket.draw_date {
            Some(date) => archive.winning_on(date),
            None => archive.first_draw_on_or_after(ticket.created.date_naive()),
        };
        if let Some(draw) = draw {
            let winning = draw.numbers.to_vec();
            ticket.validate(&winning);
            validated += 1;
        }
    }
    validated
}

pub fn save_tickets(tickets: &[Ticket], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(tickets).context("Échec de la sérialisation")?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

pub fn load_tickets(path: &Path) -> Result<Vec<Ticket>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let tickets = serde_json::from_str(&json).context("Fichier de boletos invalide")?;
    Ok(tickets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_normalizes_ascending() {
        let ticket = Ticket::new(vec![vec![40, 3, 21, 8, 15, 34]], Strategy::Simple);
        assert_eq!(ticket.combinations[0], vec![3, 8, 15, 21, 34, 40]);
    }

    #[test]
    fn test_is_system() {
        let ordinary = Ticket::new(vec![vec![1, 2, 3, 4, 5, 6]], Strategy::Simple);
        assert!(!ordinary.is_system());

        let system = Ticket::new(vec![vec![1, 2, 3, 4, 5, 6, 7, 8]], Strategy::Multiple);
        assert!(system.is_system());

        // Plusieurs combinaisons de 6 : pas un multiple
        let batch = Ticket::new(
            vec![vec![1, 2, 3, 4, 5, 6], vec![7, 8, 9, 10, 11, 12]],
            Strategy::Winning,
        );
        assert!(!batch.is_system());
    }

    #[test]
    fn test_validate_hit_counts() {
        let mut ticket = Ticket::new(
            vec![vec![1, 2, 3, 4, 5, 6], vec![4, 5, 6, 7, 8, 9]],
            Strategy::Winning,
        );
        ticket.validate(&[4, 5, 6, 40, 41, 42]);
        let validation = ticket.validation.as_ref().unwrap();
        assert_eq!(validation.hits, vec![3, 3]);
        assert_eq!(validation.winning, vec![4, 5, 6, 40, 41, 42]);
    }

    #[test]
    fn test_explode_system() {
        let ticket = Ticket::new(vec![vec![1, 2, 3, 4, 5, 6, 7]], Strategy::Multiple);
        let bets = ticket.explode();
        assert_eq!(bets.len(), 7); // C(7,6)
        for bet in &bets {
            assert_eq!(bet.len(), 6);
        }
    }

    #[test]
    fn test_explode_ordinary_identity() {
        let ticket = Ticket::new(vec![vec![1, 2, 3, 4, 5, 6]], Strategy::Simple);
        assert_eq!(ticket.explode(), ticket.combinations);
    }

    #[test]
    fn test_system_breakdown() {
        // Superensemble de 7 contenant exactement les 6 gagnants : une
        // sous-combinaison à 6 bons numéros, six à 5.
        let ticket = Ticket::new(vec![vec![1, 2, 3, 4, 5, 6, 7]], Strategy::Multiple);
        let breakdown = ticket.system_breakdown(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(breakdown.superset_hits, 6);
        assert_eq!(breakdown.total_bets, 7);
        assert_eq!(breakdown.buckets[6], 1);
        assert_eq!(breakdown.buckets[5], 6);
        assert_eq!(breakdown.buckets[0..5].iter().sum::<usize>(), 0);
    }

    #[test]
    fn test_breakdown_none_for_ordinary() {
        let ticket = Ticket::new(vec![vec![1, 2, 3, 4, 5, 6]], Strategy::Simple);
        assert!(ticket.system_breakdown(&[1, 2, 3, 4, 5, 6]).is_none());
    }

    #[test]
    fn test_format_for_play() {
        let lines = format_for_play(&[vec![1, 2, 3, 14, 25, 36], vec![7, 8, 9, 10, 11, 12]]);
        assert_eq!(lines, "01 02 03 14 25 36\n07 08 09 10 11 12");
    }

    #[test]
    fn test_auto_validate_by_draw_date() {
        let archive = DrawArchive::ingest(vec![
            (date("2024-01-01"), [1, 2, 3, 4, 5, 6]),
            (date("2024-01-05"), [7, 8, 9, 10, 11, 12]),
        ]);

        let mut ticket = Ticket::new(vec![vec![7, 8, 9, 20, 30, 40]], Strategy::Simple);
        ticket.draw_date = Some(date("2024-01-05"));
        let mut tickets = vec![ticket];

        assert_eq!(auto_validate(&mut tickets, &archive), 1);
        let validation = tickets[0].validation.as_ref().unwrap();
        assert_eq!(validation.hits, vec![3]);

        // Déjà validé : la seconde passe ne touche à rien
        assert_eq!(auto_validate(&mut tickets, &archive), 0);
    }

    #[test]
    fn test_auto_validate_unknown_date_skipped() {
        let archive = DrawArchive::ingest(vec![(date("2024-01-01"), [1, 2, 3, 4, 5, 6])]);
        let mut ticket = Ticket::new(vec![vec![1, 2, 3, 20, 30, 40]], Strategy::Simple);
        ticket.draw_date = Some(date("2024-02-01"));
        let mut tickets = vec![ticket];

        assert_eq!(auto_validate(&mut tickets, &archive), 0);
        assert!(tickets[0].validation.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut path = std::env::temp_dir();
        path.push(format!("datalotto_tickets_test_{}.json", std::process::id()));

        let mut ticket = Ticket::new(vec![vec![1, 2, 3, 4, 5, 6, 7, 8]], Strategy::Multiple);
        ticket.validate(&[1, 2, 3, 40, 41, 42]);
        let tickets = vec![ticket];

        save_tickets(&tickets, &path).unwrap();
        let loaded = load_tickets(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, tickets);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let path = std::path::PathBuf::from("/nonexistent/datalotto_tickets.json");
        assert!(load_tickets(&path).unwrap().is_empty());
    }
}
