//! Score heuristique de désirabilité d'une combinaison. Fonction pure,
//! exposée telle quelle aux couches de présentation : pondérations
//! illustratives, pas un modèle prédictif.

use crate::archive::{Classification, DrawArchive};
use crate::filters::{Filters, GeometricPattern};
use crate::grid;

/// Points par numéro chaud.
const HOT_BONUS: f64 = 2.0;
/// Malus par numéro froid quand la régression est désactivée.
const COLD_PENALTY: f64 = 1.0;
/// Bonus si la combinaison est entièrement espacée sur la grille.
const SPACED_BONUS: f64 = 15.0;
/// Multiplicateur du bonus de régression pour les absents.
const ABSENT_FACTOR: f64 = 1.5;

/// Score composite d'une combinaison selon la classification courante et
/// les heuristiques activées dans les filtres.
pub fn score(
    numbers: &[u8],
    archive: &DrawArchive,
    class: &Classification,
    filters: &Filters,
) -> f64 {
    let mut score = 0.0;

    for &n in numbers {
        if class.hot.contains(&n) {
            score += HOT_BONUS;
        }
        // Les froids ne sont pénalisés que si la régression ne les favorise pas
        if !filters.use_regression && class.cold.contains(&n) {
            score -= COLD_PENALTY;
        }
    }

    if filters.geometric.favor.contains(&GeometricPattern::Spaced) && grid::is_spaced(numbers) {
        score += SPACED_BONUS;
    }

    if filters.use_recency {
        score += recency_score(numbers, archive, filters.heuristics.recency_depth);
    }

    if filters.use_popularity {
        score -= filters.heuristics.popularity_weight * popularity_penalty(numbers);
    }

    if filters.use_regression {
        for &n in numbers {
            if class.absent.contains(&n) {
                score += filters.heuristics.regression_bonus * ABSENT_FACTOR;
            } else if class.cold.contains(&n) {
                score += filters.heuristics.regression_bonus;
            }
        }
    }

    score
}

/// Somme des occurrences de chaque membre dans les `depth` tirages les plus
/// récents, 0 si l'archive en compte moins que `depth`.
fn recency_score(numbers: &[u8], archive: &DrawArchive, depth: usize) -> f64 {
    if archive.len() < depth {
        return 0.0;
    }
    let counts = archive.recent_counts(depth);
    numbers
        .iter()
        .map(|&n| counts[(n - 1) as usize] as f64)
        .sum()
}

/// Pénalité de popularité : les numéros jouables en date (≤ 31) et les
/// bords de grille sont surjoués par le public, les alignements complets
/// encore plus.
fn popularity_penalty(numbers: &[u8]) -> f64 {
    let mut penalty = 0.0;
    for &n in numbers {
        if n <= 31 {
            penalty += 2.0;
        }
        if grid::is_edge(n) {
            penalty += 1.0;
        }
    }
    if grid::is_line(numbers) {
        penalty += 10.0;
    }
    penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(numbers: &[u8]) -> BTreeSet<u8> {
        numbers.iter().copied().collect()
    }

    fn empty_archive() -> DrawArchive {
        DrawArchive::ingest(Vec::new())
    }

    #[test]
    fn test_two_hot_members_all_heuristics_off() {
        // Exemple de référence : 2 chauds, aucune heuristique → score 4
        let class = Classification {
            hot: set(&[10, 20]),
            cold: BTreeSet::new(),
            absent: BTreeSet::new(),
        };
        let filters = Filters::default();
        let s = score(&[10, 20, 33, 41, 45, 49], &empty_archive(), &class, &filters);
        assert_eq!(s, 4.0);
    }

    #[test]
    fn test_cold_penalty_only_without_regression() {
        let class = Classification {
            hot: BTreeSet::new(),
            cold: set(&[5, 6]),
            absent: BTreeSet::new(),
        };
        let mut filters = Filters::default();

        let s = score(&[5, 6, 20, 30, 40, 45], &empty_archive(), &class, &filters);
        assert_eq!(s, -2.0);

        // Avec la régression, le malus disparaît et le bonus s'applique
        filters.use_regression = true;
        let s = score(&[5, 6, 20, 30, 40, 45], &empty_archive(), &class, &filters);
        assert_eq!(s, 2.0 * filters.heuristics.regression_bonus);
    }

    #[test]
    fn test_regression_absent_weighs_more_than_cold() {
        let class = Classification {
            hot: BTreeSet::new(),
            cold: set(&[5]),
            absent: set(&[6]),
        };
        let mut filters = Filters::default();
        filters.use_regression = true;
        // 1 absent (×1,5) + 1 froid (×1) avec bonus 3 → 4,5 + 3
        let s = score(&[5, 6, 20, 30, 40, 45], &empty_archive(), &class, &filters);
        assert!((s - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_spaced_bonus() {
        let class = Classification::default();
        let mut filters = Filters::default();
        filters.geometric.favor = vec![GeometricPattern::Spaced];

        let s = score(&[1, 3, 5, 15, 17, 19], &empty_archive(), &class, &filters);
        assert_eq!(s, 15.0);

        // 1 et 2 adjacents : pas de bonus
        let s = score(&[1, 2, 20, 30, 40, 45], &empty_archive(), &class, &filters);
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_recency_requires_enough_draws() {
        let archive = crate::archive::tests::rotating_archive(3);
        let class = Classification::default();
        let mut filters = Filters::default();
        filters.use_recency = true;
        filters.heuristics.recency_depth = 5;

        // 3 tirages < profondeur 5 → terme nul
        let s = score(&[1, 2, 3, 4, 5, 6], &archive, &class, &filters);
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_recency_counts_occurrences() {
        let archive = crate::archive::tests::rotating_archive(5);
        let class = Classification::default();
        let mut filters = Filters::default();
        filters.use_recency = true;
        filters.heuristics.recency_depth = 5;

        // Les 5 tirages couvrent les numéros 1..30, chacun une fois
        let s = score(&[1, 2, 3, 4, 5, 6], &archive, &class, &filters);
        assert_eq!(s, 6.0);

        let s = score(&[31, 35, 40, 43, 46, 49], &archive, &class, &filters);
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_popularity_penalty() {
        let class = Classification::default();
        let mut filters = Filters::default();
        filters.use_popularity = true;
        filters.heuristics.popularity_weight = 1.0;

        // 33, 39 (hors date, hors bord), 40 (hors date, hors bord ?)...
        // calcul direct : tous > 31 et intérieurs → pénalité nulle
        let s = score(&[33, 39, 40, 25, 26, 32], &empty_archive(), &class, &filters);
        // 25 et 26 sont ≤ 31 → 2+2 ; aucun sur un bord ; pas d'alignement
        assert_eq!(s, -4.0);

        // Doubler le poids double la pénalité
        filters.heuristics.popularity_weight = 2.0;
        let s = score(&[33, 39, 40, 25, 26, 32], &empty_archive(), &class, &filters);
        assert_eq!(s, -8.0);
    }

    #[test]
    fn test_popularity_line_penalty() {
        let class = Classification::default();
        let mut filters = Filters::default();
        filters.use_popularity = true;

        // Première ligne : 6 numéros ≤ 31 (12), tous sur le bord (6),
        // alignés (10) → pénalité 28
        let s = score(&[1, 2, 3, 4, 5, 6], &empty_archive(), &class, &filters);
        assert_eq!(s, -28.0);
    }
}
