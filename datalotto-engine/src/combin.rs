//! Énumération de sous-ensembles, utilisée par la recherche de multiples
//! (vérification de tolérance) et par l'explosion des boletos multiples en
//! combinaisons simples.

/// Tous les sous-ensembles de taille `k` de `source`, chacun trié par ordre
/// croissant, sans doublon. Parcours itératif à pile explicite pour tolérer
/// des sources larges sans limite de profondeur de récursion.
///
/// Cas dégénérés : k == 0 ou k > |source| → vide ; k == |source| → l'ensemble
/// entier ; k == 1 → les singletons.
pub fn all_k_combinations(source: &[u8], k: usize) -> Vec<Vec<u8>> {
    if k == 0 || k > source.len() {
        return Vec::new();
    }

    let mut sorted = source.to_vec();
    sorted.sort_unstable();

    if k == sorted.len() {
        return vec![sorted];
    }
    if k == 1 {
        return sorted.iter().map(|&n| vec![n]).collect();
    }

    let mut result = Vec::new();
    // (index dans la source, combinaison partielle)
    let mut stack: Vec<(usize, Vec<u8>)> = vec![(0, Vec::new())];

    while let Some((index, current)) = stack.pop() {
        if current.len() == k {
            result.push(current);
            continue;
        }
        if index >= sorted.len() {
            continue;
        }

        let mut with_item = current.clone();
        with_item.push(sorted[index]);
        stack.push((index + 1, current));
        stack.push((index + 1, with_item));
    }

    result
}

/// Coefficient binomial C(n, k).
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u64 = 1;
    for i in 0..k {
        result = result * (n - i) / (i + 1);
    }
    result
}
