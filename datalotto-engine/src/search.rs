//! Moteur de recherche : tirage aléatoire borné de candidats contre le
//! prédicat de filtre, selon trois stratégies (simple, gagnante classée,
//! multiple tolérante).
//!
//! Exécution coopérative mono-contexte : les boucles invoquent un rappel de
//! progression à cadence fixe, sans jamais altérer l'état de recherche.
//! Les entrées (univers, filtres, archive, classification) sont capturées
//! par référence au départ et jamais modifiées pendant la recherche.
//! Pas d'annulation : une recherche court jusqu'au succès ou à l'épuisement
//! de son budget de tentatives.

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::archive::{Classification, DrawArchive};
use crate::combin::all_k_combinations;
use crate::filters::Filters;
use crate::scoring;
use datalotto_db::models::PICK_COUNT;

/// Budget de tentatives des stratégies à combinaison simple.
pub const SIMPLE_BUDGET: u64 = 500_000;
/// Budget de tentatives de la recherche de multiple.
pub const SYSTEM_BUDGET: u64 = 50_000;
/// Cadence du rappel de progression pour les combinaisons simples.
const CHECKPOINT: u64 = 500;
/// Cadence du rappel de progression pour les multiples (chaque tentative
/// énumère des centaines de sous-combinaisons).
const SYSTEM_CHECKPOINT: u64 = 100;

/// Fraction minimale des sous-combinaisons d'un superensemble qui doivent
/// passer le prédicat, par taille de multiple.
pub fn tolerance(size: usize) -> Option<f64> {
    match size {
        7 => Some(0.70),
        8 => Some(0.50),
        9 => Some(0.35),
        10 => Some(0.25),
        11 => Some(0.20),
        _ => None,
    }
}

/// Entrée rejetée avant tout échantillonnage. « Rien trouvé » n'est pas une
/// erreur : les stratégies retournent Ok(None) dans ce cas.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("une recherche est déjà en cours")]
    Busy,
    #[error("univers insuffisant : {available} numéros disponibles, {needed} requis")]
    UniverseTooSmall { needed: usize, available: usize },
    #[error("taille de multiple non supportée : {0} (attendu 7 à 11)")]
    UnsupportedSystemSize(usize),
}

/// État de progression transmis au rappel à chaque point de contrôle.
#[derive(Debug, Clone, Copy)]
pub struct SearchProgress {
    pub attempts: u64,
    pub budget: u64,
    pub found: usize,
}

/// Combinaison acceptée puis notée par les heuristiques.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCombination {
    pub numbers: Vec<u8>,
    pub score: f64,
}

pub struct SearchEngine {
    rng: StdRng,
    busy: bool,
}

impl SearchEngine {
    /// Moteur avec graine optionnelle pour la reproductibilité.
    pub fn new(seed: Option<u64>) -> SearchEngine {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        SearchEngine { rng, busy: false }
    }

    /// Stratégie « simple » : première combinaison de 6 acceptée par le
    /// prédicat, ou Ok(None) après épuisement du budget.
    pub fn find_simple(
        &mut self,
        universe: &[u8],
        filters: &Filters,
        mut progress: impl FnMut(SearchProgress),
    ) -> Result<Option<Vec<u8>>, SearchError> {
        self.acquire()?;
        let result = self.run_simple(universe, filters, &mut progress);
        self.busy = false;
        result
    }

    fn run_simple(
        &mut self,
        universe: &[u8],
        filters: &Filters,
        progress: &mut impl FnMut(SearchProgress),
    ) -> Result<Option<Vec<u8>>, SearchError> {
        check_universe(universe, PICK_COUNT)?;

        for attempt in 0..SIMPLE_BUDGET {
            if attempt % CHECKPOINT == 0 {
                progress(SearchProgress {
                    attempts: attempt,
                    budget: SIMPLE_BUDGET,
                    found: 0,
                });
            }
            let candidate = self.sample(universe, PICK_COUNT);
            if filters.accept(&candidate) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Stratégie « gagnante » : collecte jusqu'à `generate_count`
    /// combinaisons acceptées, les note, puis retourne les `play_count`
    /// meilleures (tri stable décroissant, les ex æquo gardent leur ordre
    /// de découverte). Ok(None) si aucune candidate n'a été acceptée.
    pub fn find_ranked(
        &mut self,
        universe: &[u8],
        filters: &Filters,
        archive: &DrawArchive,
        class: &Classification,
        generate_count: usize,
        play_count: usize,
        mut progress: impl FnMut(SearchProgress),
    ) -> Result<Option<Vec<ScoredCombination>>, SearchError> {
        self.acquire()?;
        let result = self.run_ranked(
            universe,
            filters,
            archive,
            class,
            generate_count,
            play_count,
            &mut progress,
        );
        self.busy = false;
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn run_ranked(
        &mut self,
        universe: &[u8],
        filters: &Filters,
        archive: &DrawArchive,
        class: &Classification,
        generate_count: usize,
        play_count: usize,
        progress: &mut impl FnMut(SearchProgress),
    ) -> Result<Option<Vec<ScoredCombination>>, SearchError> {
        check_universe(universe, PICK_COUNT)?;

        let budget = SIMPLE_BUDGET.max(generate_count as u64 * 100);
        let mut accepted: Vec<Vec<u8>> = Vec::new();

        let mut attempt = 0u64;
        while attempt < budget && accepted.len() < generate_count {
            if attempt % CHECKPOINT == 0 {
                progress(SearchProgress {
                    attempts: attempt,
                    budget,
                    found: accepted.len(),
                });
            }
            let candidate = self.sample(universe, PICK_COUNT);
            if filters.accept(&candidate) {
                accepted.push(candidate);
            }
            attempt += 1;
        }

        if accepted.is_empty() {
            return Ok(None);
        }

        let mut scored: Vec<ScoredCombination> = accepted
            .into_iter()
            .map(|numbers| {
                let score = scoring::score(&numbers, archive, class, filters);
                ScoredCombination { numbers, score }
            })
            .collect();

        // sort_by est stable : les scores égaux conservent l'ordre de découverte
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(play_count);

        Ok(Some(scored))
    }

    /// Stratégie « multiple » : cherche un superensemble de `size` numéros
    /// dont au moins ⌈C(size,6)×tolérance⌉ sous-combinaisons de 6 passent
    /// le prédicat — le même que pour les combinaisons ordinaires.
    pub fn find_system(
        &mut self,
        universe: &[u8],
        filters: &Filters,
        size: usize,
        mut progress: impl FnMut(SearchProgress),
    ) -> Result<Option<Vec<u8>>, SearchError> {
        self.acquire()?;
        let result = self.run_system(universe, filters, size, &mut progress);
        self.busy = false;
        result
    }

    fn run_system(
        &mut self,
        universe: &[u8],
        filters: &Filters,
        size: usize,
        progress: &mut impl FnMut(SearchProgress),
    ) -> Result<Option<Vec<u8>>, SearchError> {
        let tolerance = tolerance(size).ok_or(SearchError::UnsupportedSystemSize(size))?;
        check_universe(universe, size)?;

        for attempt in 0..SYSTEM_BUDGET {
            if attempt % SYSTEM_CHECKPOINT == 0 {
                progress(SearchProgress {
                    attempts: attempt,
                    budget: SYSTEM_BUDGET,
                    found: 0,
                });
            }

            let superset = self.sample(universe, size);
            let subsets = all_k_combinations(&superset, PICK_COUNT);
            let required = (subsets.len() as f64 * tolerance).ceil() as usize;

            let valid = subsets.iter().filter(|s| filters.accept(s)).count();
            if valid >= required {
                return Ok(Some(superset));
            }
        }
        Ok(None)
    }

    /// Échantillonnage uniforme sans remise par indices, résultat trié.
    fn sample(&mut self, universe: &[u8], count: usize) -> Vec<u8> {
        let picked = rand::seq::index::sample(&mut self.rng, universe.len(), count);
        let mut numbers: Vec<u8> = picked.iter().map(|i| universe[i]).collect();
        numbers.sort_unstable();
        numbers
    }

    /// Garde de réentrance : une seule recherche en vol, les suivantes sont
    /// rejetées sans mise en file.
    fn acquire(&mut self) -> Result<(), SearchError> {
        if self.busy {
            return Err(SearchError::Busy);
        }
        self.busy = true;
        Ok(())
    }
}

fn check_universe(universe: &[u8], needed: usize) -> Result<(), SearchError> {
    if universe.len() < needed {
        return Err(SearchError::UniverseTooSmall {
            needed,
            available: universe.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::tests::permissive;

    fn full_universe() -> Vec<u8> {
        (1..=49).collect()
    }

    #[test]
    fn test_tolerance_table() {
        assert_eq!(tolerance(7), Some(0.70));
        assert_eq!(tolerance(11), Some(0.20));
        assert_eq!(tolerance(6), None);
        assert_eq!(tolerance(12), None);
        // ⌈C(7,6)×0,70⌉ = ⌈4,9⌉ = 5 sous-combinaisons sur 7
        assert_eq!((7.0f64 * 0.70).ceil() as usize, 5);
    }

    #[test]
    fn test_simple_finds_valid_combination() {
        let mut engine = SearchEngine::new(Some(42));
        let filters = permissive();
        let found = engine
            .find_simple(&full_universe(), &filters, |_| {})
            .unwrap()
            .expect("une combinaison aurait dû être trouvée");
        assert_eq!(found.len(), 6);
        assert!(found.windows(2).all(|w| w[0] < w[1]));
        assert!(filters.accept(&found));
    }

    #[test]
    fn test_simple_respects_universe() {
        let mut engine = SearchEngine::new(Some(7));
        let filters = permissive();
        let universe: Vec<u8> = vec![4, 9, 16, 23, 31, 38, 44, 47];
        let found = engine
            .find_simple(&universe, &filters, |_| {})
            .unwrap()
            .unwrap();
        for n in &found {
            assert!(universe.contains(n), "{} hors univers", n);
        }
    }

    #[test]
    fn test_simple_deterministic_with_seed() {
        let filters = permissive();
        let a = SearchEngine::new(Some(123))
            .find_simple(&full_universe(), &filters, |_| {})
            .unwrap();
        let b = SearchEngine::new(Some(123))
            .find_simple(&full_universe(), &filters, |_| {})
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_simple_universe_too_small() {
        let mut engine = SearchEngine::new(Some(1));
        let filters = permissive();
        let err = engine
            .find_simple(&[1, 2, 3, 4, 5], &filters, |_| {})
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::UniverseTooSmall {
                needed: 6,
                available: 5
            }
        );
    }

    #[test]
    fn test_simple_infeasible_returns_none() {
        let mut engine = SearchEngine::new(Some(1));
        let mut filters = permissive();
        // Aucune combinaison n'a 0 terminaison distincte : le budget s'épuise
        filters.distinct_endings = vec![0];
        let result = engine.find_simple(&full_universe(), &filters, |_| {}).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_progress_checkpoints() {
        let mut engine = SearchEngine::new(Some(1));
        let mut filters = permissive();
        filters.distinct_endings = vec![0];
        let mut calls = 0u64;
        let mut last_budget = 0u64;
        engine
            .find_simple(&full_universe(), &filters, |p| {
                calls += 1;
                last_budget = p.budget;
            })
            .unwrap();
        assert_eq!(calls, SIMPLE_BUDGET / 500);
        assert_eq!(last_budget, SIMPLE_BUDGET);
    }

    #[test]
    fn test_ranked_returns_play_count_sorted() {
        let mut engine = SearchEngine::new(Some(42));
        let filters = permissive();
        let archive = crate::archive::tests::rotating_archive(60);
        let class = archive.classify(30);

        let results = engine
            .find_ranked(&full_universe(), &filters, &archive, &class, 30, 8, |_| {})
            .unwrap()
            .expect("des combinaisons auraient dû être trouvées");

        assert_eq!(results.len(), 8);
        for pair in results.windows(2) {
            assert!(
                pair[0].score >= pair[1].score,
                "tri décroissant violé : {} < {}",
                pair[0].score,
                pair[1].score
            );
        }
    }

    #[test]
    fn test_ranked_none_when_nothing_accepted() {
        let mut engine = SearchEngine::new(Some(3));
        let mut filters = permissive();
        filters.distinct_endings = vec![0];
        let archive = DrawArchive::ingest(Vec::new());
        let class = Classification::default();

        let result = engine
            .find_ranked(&full_universe(), &filters, &archive, &class, 10, 5, |_| {})
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_system_finds_superset() {
        let mut engine = SearchEngine::new(Some(42));
        let filters = permissive();
        let found = engine
            .find_system(&full_universe(), &filters, 7, |_| {})
            .unwrap()
            .expect("un superensemble aurait dû être trouvé");
        assert_eq!(found.len(), 7);
        assert!(found.windows(2).all(|w| w[0] < w[1]));

        // Vérification de la tolérance : ≥ 5 des 7 sous-combinaisons passent
        let valid = all_k_combinations(&found, 6)
            .iter()
            .filter(|s| filters.accept(s))
            .count();
        assert!(valid >= 5, "{} sous-combinaisons valides sur 7", valid);
    }

    #[test]
    fn test_system_unsupported_size() {
        let mut engine = SearchEngine::new(Some(1));
        let filters = permissive();
        for size in [6usize, 12] {
            let err = engine
                .find_system(&full_universe(), &filters, size, |_| {})
                .unwrap_err();
            assert_eq!(err, SearchError::UnsupportedSystemSize(size));
        }
    }

    #[test]
    fn test_system_universe_too_small() {
        let mut engine = SearchEngine::new(Some(1));
        let filters = permissive();
        let universe: Vec<u8> = (1..=8).collect();
        let err = engine
            .find_system(&universe, &filters, 9, |_| {})
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::UniverseTooSmall {
                needed: 9,
                available: 8
            }
        );
    }

    #[test]
    fn test_engine_reusable_after_search() {
        // La garde se libère à la fin de chaque recherche
        let mut engine = SearchEngine::new(Some(5));
        let filters = permissive();
        assert!(engine.find_simple(&full_universe(), &filters, |_| {}).is_ok());
        assert!(engine.find_simple(&full_universe(), &filters, |_| {}).is_ok());
    }
}
