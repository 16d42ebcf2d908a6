//! Descripteurs statistiques d'une combinaison. Calcul pur : même entrée,
//! même résultat, indépendamment de l'archive. Jamais mis en cache.

/// Les 15 premiers sous 49.
pub const PRIMES: [u8; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

/// Résultat dérivé, en lecture seule, recalculé à chaque appel.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub sum: u32,
    /// "pairs/impairs", ex. "4/2".
    pub parity: String,
    /// "bas/hauts" avec bas = numéros ≤ 25, ex. "3/3".
    pub low_high: String,
    pub primes: u8,
    /// Longueurs des suites consécutives, triées décroissantes, ex. "3/2/1".
    pub consecutive: String,
    /// Effectifs des dizaines non vides, triés décroissants, ex. "4/2".
    pub decades: String,
    pub digit_sum: u32,
    /// Écart-type de population (division par l'effectif, pas n−1).
    pub std_dev: f64,
    /// Entropie de Shannon en bits de la distribution des occurrences par
    /// membre. Pour une combinaison de 6 numéros distincts elle vaut
    /// toujours log2(6) ≈ 2,585 — conservé tel quel, voir la note de filters.
    pub entropy: f64,
}

impl Metrics {
    pub fn compute(numbers: &[u8]) -> Metrics {
        let mut sorted = numbers.to_vec();
        sorted.sort_unstable();
        let len = sorted.len();

        let sum: u32 = sorted.iter().map(|&n| n as u32).sum();

        let evens = sorted.iter().filter(|&&n| n % 2 == 0).count();
        let parity = format!("{}/{}", evens, len - evens);

        let lows = sorted.iter().filter(|&&n| n <= 25).count();
        let low_high = format!("{}/{}", lows, len - lows);

        let primes = sorted.iter().filter(|&&n| PRIMES.contains(&n)).count() as u8;

        let consecutive = consecutive_signature(&sorted);
        let decades = decade_signature(&sorted);

        let digit_sum: u32 = sorted
            .iter()
            .map(|&n| {
                if n < 10 {
                    n as u32
                } else {
                    (n / 10) as u32 + (n % 10) as u32
                }
            })
            .sum();

        let mean = sum as f64 / len as f64;
        let variance = sorted
            .iter()
            .map(|&n| (n as f64 - mean).powi(2))
            .sum::<f64>()
            / len as f64;
        let std_dev = variance.sqrt();

        let entropy = occurrence_entropy(&sorted);

        Metrics {
            sum,
            parity,
            low_high,
            primes,
            consecutive,
            decades,
            digit_sum,
            std_dev,
            entropy,
        }
    }
}

/// Longueurs des suites d'entiers consécutifs (écart de 1) dans la
/// combinaison triée, puis tri décroissant et jonction par '/'.
fn consecutive_signature(sorted: &[u8]) -> String {
    let mut runs: Vec<usize> = Vec::new();
    let mut count = 1usize;
    for i in 1..sorted.len() {
        if sorted[i] == sorted[i - 1] + 1 {
            count += 1;
        } else {
            runs.push(count);
            count = 1;
        }
    }
    runs.push(count);
    runs.sort_unstable_by(|a, b| b.cmp(a));
    runs.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Effectif par dizaine (indice ⌊(n−1)/10⌋), dizaines non vides triées par
/// effectif décroissant, jonction par '/'.
fn decade_signature(sorted: &[u8]) -> String {
    let mut buckets = [0usize; 5];
    for &n in sorted {
        buckets[((n - 1) / 10) as usize] += 1;
    }
    let mut groups: Vec<usize> = buckets.iter().copied().filter(|&c| c > 0).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));
    groups
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// −Σ p·log2(p) sur la distribution des occurrences par membre.
fn occurrence_entropy(sorted: &[u8]) -> f64 {
    let len = sorted.len() as f64;
    let mut counts: Vec<usize> = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let mut count = 1;
        while i + count < sorted.len() && sorted[i + count] == sorted[i] {
            count += 1;
        }
        counts.push(count);
        i += count;
    }
    -counts
        .iter()
        .map(|&c| {
            let p = c as f64 / len;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Nombre de terminaisons (derniers chiffres) distinctes.
pub fn distinct_endings(numbers: &[u8]) -> usize {
    let mut seen = [false; 10];
    for &n in numbers {
        seen[(n % 10) as usize] = true;
    }
    seen.iter().filter(|&&s| s).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTROPY_6: f64 = 2.584962500721156; // log2(6)

    #[test]
    fn test_deterministic_and_order_independent() {
        let a = Metrics::compute(&[3, 8, 15, 21, 34, 40]);
        let b = Metrics::compute(&[40, 34, 21, 15, 8, 3]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_prime_candidate_example() {
        // Exemple de référence : 6 premiers, somme 41
        let m = Metrics::compute(&[2, 3, 5, 7, 11, 13]);
        assert_eq!(m.primes, 6);
        assert_eq!(m.sum, 41);
        assert_eq!(m.parity, "1/5");
        assert_eq!(m.low_high, "6/0");
        assert_eq!(m.decades, "4/2");
    }

    #[test]
    fn test_consecutive_signature() {
        // 1,2,3 puis 10,11 puis 20 → "3/2/1"
        let m = Metrics::compute(&[1, 2, 3, 10, 11, 20]);
        assert_eq!(m.consecutive, "3/2/1");

        // Aucune suite
        let m = Metrics::compute(&[5, 9, 14, 23, 30, 41]);
        assert_eq!(m.consecutive, "1/1/1/1/1/1");

        // Suite complète
        let m = Metrics::compute(&[11, 12, 13, 14, 15, 16]);
        assert_eq!(m.consecutive, "6");
    }

    #[test]
    fn test_digit_sum() {
        // 5 + (1+2) + (2+3) + (3+1) + (4+0) + (4+9) = 5+3+5+4+4+13 = 34
        let m = Metrics::compute(&[5, 12, 23, 31, 40, 49]);
        assert_eq!(m.digit_sum, 34);
    }

    #[test]
    fn test_std_dev_population() {
        // Valeurs également espacées : moyenne 25, variance de population connue
        let m = Metrics::compute(&[10, 16, 22, 28, 34, 40]);
        let mean = 25.0;
        let variance: f64 = [10.0f64, 16.0, 22.0, 28.0, 34.0, 40.0]
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / 6.0;
        assert!((m.std_dev - variance.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_constant_for_distinct_members() {
        for combo in [
            [1u8, 2, 3, 4, 5, 6],
            [44, 45, 46, 47, 48, 49],
            [3, 11, 19, 27, 35, 43],
        ] {
            let m = Metrics::compute(&combo);
            assert!(
                (m.entropy - ENTROPY_6).abs() < 1e-9,
                "entropie attendue log2(6), obtenu {}",
                m.entropy
            );
        }
    }

    #[test]
    fn test_distinct_endings() {
        assert_eq!(distinct_endings(&[1, 11, 21, 31, 41, 2]), 2);
        assert_eq!(distinct_endings(&[2, 3, 5, 7, 11, 13]), 5);
        assert_eq!(distinct_endings(&[4, 15, 26, 37, 48, 9]), 6);
    }
}
