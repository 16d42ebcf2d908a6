//! Archive des tirages historiques : statistiques de fréquence et de
//! récence, classification chaud/froid/absent, test de biais du chi-deux.
//! L'archive est remplacée en bloc à chaque ré-ingestion et ne détient
//! aucun état caché : toute l'analyse se recalcule à la demande.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use datalotto_db::models::{Draw, PICK_COUNT, POOL_SIZE};

/// Seuil critique du chi-deux pour df = 48, p = 0,05.
pub const CHI_SQUARE_CRITICAL: f64 = 65.17;
/// Nombre minimal de tirages pour que le test de biais soit significatif.
pub const BIAS_MIN_DRAWS: usize = 50;
/// Nombre de numéros marqués absents.
const ABSENT_COUNT: usize = 5;

/// Statistique d'un numéro, recalculée intégralement à chaque demande.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberStat {
    pub number: u8,
    /// Occurrences dans la fenêtre d'analyse glissante.
    pub frequency: u32,
    /// Plus grand id de tirage contenant le numéro, 0 si jamais vu.
    pub last_seen: u32,
}

/// Ensembles chaud/froid/absent, maintenus indépendamment : un numéro peut
/// appartenir à la fois aux chauds et aux froids si les seuils coïncident.
/// La résolution de priorité (chaud > absent > froid) revient à l'affichage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub hot: BTreeSet<u8>,
    pub cold: BTreeSet<u8>,
    pub absent: BTreeSet<u8>,
}

/// Résultat du test de biais.
#[derive(Debug, Clone, PartialEq)]
pub enum BiasReport {
    /// Moins de 50 tirages : pas de statistique plutôt qu'une statistique
    /// trompeuse.
    InsufficientData { draws: usize },
    Computed {
        statistic: f64,
        critical: f64,
        biased: bool,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DrawArchive {
    draws: Vec<Draw>,
}

impl DrawArchive {
    /// Remplace le contenu en bloc : tri par date croissante, identifiants
    /// contigus de 1 à N. Les enregistrements invalides doivent avoir été
    /// écartés en amont par le collaborateur d'ingestion.
    pub fn ingest(mut records: Vec<(NaiveDate, [u8; PICK_COUNT])>) -> DrawArchive {
        records.sort_by_key(|(date, _)| *date);
        let draws = records
            .into_iter()
            .enumerate()
            .map(|(i, (date, numbers))| Draw::new(i as u32 + 1, date, numbers))
            .collect();
        DrawArchive { draws }
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    /// Id du tirage le plus récent (0 si l'archive est vide).
    pub fn last_id(&self) -> u32 {
        self.draws.last().map(|d| d.id).unwrap_or(0)
    }

    /// Statistiques par numéro : fréquence sur les `window` tirages les plus
    /// récents (ou tous s'il y en a moins), dernier tirage vu sur toute
    /// l'archive. Recalcul complet, jamais de mise à jour partielle.
    pub fn number_stats(&self, window: usize) -> Vec<NumberStat> {
        let mut stats: Vec<NumberStat> = (1..=POOL_SIZE)
            .map(|n| NumberStat {
                number: n,
                frequency: 0,
                last_seen: 0,
            })
            .collect();

        for draw in &self.draws {
            for &n in &draw.numbers {
                stats[(n - 1) as usize].last_seen = draw.id;
            }
        }

        let start = self.draws.len().saturating_sub(window);
        for draw in &self.draws[start..] {
            for &n in &draw.numbers {
                stats[(n - 1) as usize].frequency += 1;
            }
        }

        stats
    }

    /// Classification chaud/froid/absent sur la fenêtre donnée.
    ///
    /// Seuils : fréquences triées croissantes, chaud = valeur à l'indice
    /// ⌊0,7×49⌋, froid = valeur à l'indice ⌊0,3×49⌋. Absents : les 5 plus
    /// grands écarts (id du dernier tirage − dernier vu) parmi les numéros
    /// déjà apparus, égalités départagées par ordre naturel du numéro.
    pub fn classify(&self, window: usize) -> Classification {
        if self.draws.is_empty() {
            return Classification::default();
        }

        let stats = self.number_stats(window);

        let mut sorted_freqs: Vec<u32> = stats.iter().map(|s| s.frequency).collect();
        sorted_freqs.sort_unstable();
        let hot_threshold = sorted_freqs[(sorted_freqs.len() as f64 * 0.7) as usize];
        let cold_threshold = sorted_freqs[(sorted_freqs.len() as f64 * 0.3) as usize];

        let mut class = Classification::default();
        for stat in &stats {
            if stat.frequency >= hot_threshold {
                class.hot.insert(stat.number);
            }
            if stat.frequency <= cold_threshold {
                class.cold.insert(stat.number);
            }
        }

        let last_id = self.last_id();
        let mut absences: Vec<(u8, u32)> = stats
            .iter()
            .filter(|s| s.last_seen > 0)
            .map(|s| (s.number, last_id - s.last_seen))
            .collect();
        // Tri stable : à écart égal, l'ordre naturel des numéros est conservé
        absences.sort_by(|a, b| b.1.cmp(&a.1));
        for &(number, _) in absences.iter().take(ABSENT_COUNT) {
            class.absent.insert(number);
        }

        class
    }

    /// Test du chi-deux sur l'ensemble de l'archive : Σ(fᵢ−E)²/E avec
    /// E = 6N/49, comparé au seuil critique (df = 48, p = 0,05).
    pub fn bias_test(&self) -> BiasReport {
        if self.draws.len() < BIAS_MIN_DRAWS {
            return BiasReport::InsufficientData {
                draws: self.draws.len(),
            };
        }

        let mut frequencies = [0u32; POOL_SIZE as usize];
        for draw in &self.draws {
            for &n in &draw.numbers {
                frequencies[(n - 1) as usize] += 1;
            }
        }

        let expected = (self.draws.len() * PICK_COUNT) as f64 / POOL_SIZE as f64;
        let statistic: f64 = frequencies
            .iter()
            .map(|&f| {
                let diff = f as f64 - expected;
                diff * diff / expected
            })
            .sum();

        BiasReport::Computed {
            statistic,
            critical: CHI_SQUARE_CRITICAL,
            biased: statistic > CHI_SQUARE_CRITICAL,
        }
    }

    /// Occurrences de chaque numéro dans les `depth` tirages les plus
    /// récents. Support de l'heuristique de récence.
    pub fn recent_counts(&self, depth: usize) -> [u32; POOL_SIZE as usize] {
        let mut counts = [0u32; POOL_SIZE as usize];
        let start = self.draws.len().saturating_sub(depth);
        for draw in &self.draws[start..] {
            for &n in &draw.numbers {
                counts[(n - 1) as usize] += 1;
            }
        }
        counts
    }

    /// Tirage à une date exacte.
    pub fn winning_on(&self, date: NaiveDate) -> Option<&Draw> {
        self.draws.iter().find(|d| d.date == date)
    }

    /// Premier tirage à la date donnée ou après (pour la validation
    /// automatique des boletos sans date de tirage).
    pub fn first_draw_on_or_after(&self, date: NaiveDate) -> Option<&Draw> {
        self.draws.iter().find(|d| d.date >= date)
    }
}
