//! Configuration des filtres et prédicat d'acceptation d'une combinaison.
//! Le prédicat est pur : il combine tous les contrôles par ET logique et
//! s'arrête au premier échec, sans effet de bord.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::grid;
use crate::metrics::{distinct_endings, Metrics};
use datalotto_db::models::{PICK_COUNT, POOL_SIZE};

/// Plage inclusive [min, max]. Aucune validation min ≤ max : une plage
/// inversée n'accepte simplement aucune combinaison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd> Range<T> {
    pub fn new(min: T, max: T) -> Self {
        Range { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Motifs géométriques sur la grille 7x7. Triangles, cercles et croix sont
/// des tags reconnus mais jamais détectés à l'exclusion (non implémenté
/// dans la source d'origine, conservé tel quel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometricPattern {
    Lines,
    Diagonals,
    Triangles,
    Circles,
    Crosses,
    Spaced,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometricOptions {
    #[serde(default)]
    pub exclude: Vec<GeometricPattern>,
    #[serde(default)]
    pub favor: Vec<GeometricPattern>,
}

/// Paramètres des heuristiques prédictives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicParams {
    /// Profondeur de la fenêtre de récence ("Markov").
    pub recency_depth: usize,
    /// Poids de la pénalité de popularité ("Nash").
    pub popularity_weight: f64,
    /// Bonus de régression vers la moyenne.
    pub regression_bonus: f64,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        HeuristicParams {
            recency_depth: 5,
            popularity_weight: 1.0,
            regression_bonus: 3.0,
        }
    }
}

/// Configuration complète des filtres. Les listes catégorielles vides
/// signifient « sans contrainte ».
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Terminaisons bannies de l'univers (appliquées en amont de la
    /// recherche, pas par le prédicat).
    pub banned_endings: Vec<u8>,
    /// Nombres de terminaisons distinctes admis.
    pub distinct_endings: Vec<u8>,
    pub sum: Range<u32>,
    /// Étiquettes "pairs/impairs" admises, ex. "3/3".
    pub parity: Vec<String>,
    /// Étiquettes "bas/hauts" admises, ex. "4/2".
    pub low_high: Vec<String>,
    pub primes: Range<u8>,
    /// Signatures de suites consécutives admises, ex. "2/1/1/1/1".
    pub consecutive: Vec<String>,
    /// Écart entre numéros adjacents (combinaison triée).
    pub adjacent_gap: Range<u8>,
    /// Signatures de regroupement par dizaines admises.
    pub decades: Vec<String>,
    pub digit_sum: Range<u32>,
    pub std_dev: Range<f64>,
    pub entropy: Range<f64>,
    pub geometric: GeometricOptions,
    pub use_recency: bool,
    pub use_popularity: bool,
    pub use_regression: bool,
    pub heuristics: HeuristicParams,
}

impl Default for Filters {
    fn default() -> Self {
        Filters {
            banned_endings: Vec::new(),
            distinct_endings: vec![4, 5, 6],
            sum: Range::new(121, 190),
            parity: Vec::new(),
            low_high: Vec::new(),
            primes: Range::new(1, 3),
            consecutive: Vec::new(),
            adjacent_gap: Range::new(1, 25),
            decades: Vec::new(),
            digit_sum: Range::new(28, 45),
            std_dev: Range::new(12.0, 18.0),
            entropy: Range::new(2.3, 2.6),
            geometric: GeometricOptions::default(),
            use_recency: false,
            use_popularity: false,
            use_regression: false,
            heuristics: HeuristicParams::default(),
        }
    }
}

impl Filters {
    /// Prédicat d'acceptation d'une combinaison de 6 numéros.
    pub fn accept(&self, numbers: &[u8]) -> bool {
        if numbers.len() != PICK_COUNT {
            return false;
        }

        let endings = distinct_endings(numbers) as u8;
        if !self.distinct_endings.is_empty() && !self.distinct_endings.contains(&endings) {
            return false;
        }

        let m = Metrics::compute(numbers);

        if !self.sum.contains(m.sum) {
            return false;
        }
        if !self.parity.is_empty() && !self.parity.contains(&m.parity) {
            return false;
        }
        if !self.low_high.is_empty() && !self.low_high.contains(&m.low_high) {
            return false;
        }
        if !self.primes.contains(m.primes) {
            return false;
        }
        if !self.consecutive.is_empty() && !self.consecutive.contains(&m.consecutive) {
            return false;
        }

        let mut sorted = numbers.to_vec();
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            let gap = pair[1] - pair[0];
            if !self.adjacent_gap.contains(gap) {
                return false;
            }
        }

        if !self.decades.is_empty() && !self.decades.contains(&m.decades) {
            return false;
        }
        if !self.digit_sum.contains(m.digit_sum) {
            return false;
        }
        if !self.std_dev.contains(m.std_dev) {
            return false;
        }
        if !self.entropy.contains(m.entropy) {
            return false;
        }
        if !self.geometric.exclude.is_empty() && has_excluded_pattern(&sorted, &self.geometric.exclude)
        {
            return false;
        }

        true
    }

    /// Univers admissible : 1..=49 moins les numéros exclus et les
    /// terminaisons bannies. Les stratégies de recherche reçoivent ce
    /// résultat déjà calculé.
    pub fn available_universe(&self, excluded: &BTreeSet<u8>) -> Vec<u8> {
        (1..=POOL_SIZE)
            .filter(|n| !excluded.contains(n))
            .filter(|n| self.banned_endings.is_empty() || !self.banned_endings.contains(&(n % 10)))
            .collect()
    }
}

/// Vrai si la combinaison présente un des motifs exclus. Seuls lignes et
/// diagonales sont détectables.
fn has_excluded_pattern(numbers: &[u8], patterns: &[GeometricPattern]) -> bool {
    patterns.iter().any(|pattern| match pattern {
        GeometricPattern::Lines => grid::is_line(numbers),
        GeometricPattern::Diagonals => grid::is_diagonal(numbers),
        GeometricPattern::Triangles | GeometricPattern::Circles | GeometricPattern::Crosses => {
            false
        }
        GeometricPattern::Spaced => false,
    })
}
