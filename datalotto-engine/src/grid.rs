//! Géométrie de la grille 7x7 sur laquelle les 49 numéros sont disposés.
//! Sert aux exclusions géométriques du prédicat de filtre et aux heuristiques
//! de score (espacement, popularité des bords).

pub const GRID_SIDE: u8 = 7;

/// Coordonnées (ligne, colonne) du numéro `n` sur la grille 7x7.
pub fn coords(n: u8) -> (u8, u8) {
    ((n - 1) / GRID_SIDE, (n - 1) % GRID_SIDE)
}

/// Tous les membres sur la même ligne ou la même colonne.
pub fn is_line(numbers: &[u8]) -> bool {
    if numbers.is_empty() {
        return false;
    }
    let (row0, col0) = coords(numbers[0]);
    let all_same_row = numbers.iter().all(|&n| coords(n).0 == row0);
    let all_same_col = numbers.iter().all(|&n| coords(n).1 == col0);
    all_same_row || all_same_col
}

/// Tous les membres sur une même diagonale (ligne − colonne constante) ou
/// anti-diagonale (ligne + colonne constante).
pub fn is_diagonal(numbers: &[u8]) -> bool {
    if numbers.is_empty() {
        return false;
    }
    let (row0, col0) = coords(numbers[0]);
    let main_value = row0 as i16 - col0 as i16;
    if numbers
        .iter()
        .all(|&n| {
            let (r, c) = coords(n);
            r as i16 - c as i16 == main_value
        })
    {
        return true;
    }
    let anti_value = row0 as i16 + col0 as i16;
    numbers.iter().all(|&n| {
        let (r, c) = coords(n);
        r as i16 + c as i16 == anti_value
    })
}

/// Aucune paire de membres mutuellement adjacents sur la grille,
/// diagonales comprises.
pub fn is_spaced(numbers: &[u8]) -> bool {
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            let (ri, ci) = coords(numbers[i]);
            let (rj, cj) = coords(numbers[j]);
            if (ri as i16 - rj as i16).abs() <= 1 && (ci as i16 - cj as i16).abs() <= 1 {
                return false;
            }
        }
    }
    true
}

/// Le numéro est sur la ligne ou la colonne extérieure de la grille.
pub fn is_edge(n: u8) -> bool {
    let (row, col) = coords(n);
    row == 0 || row == GRID_SIDE - 1 || col == 0 || col == GRID_SIDE - 1
}
