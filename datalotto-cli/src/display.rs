use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::import::ImportResult;
use datalotto_db::models::{Draw, format_combination};
use datalotto_engine::archive::{BiasReport, Classification, NumberStat};
use datalotto_engine::metrics::Metrics;
use datalotto_engine::search::ScoredCombination;
use datalotto_engine::ticket::{SystemBreakdown, Ticket};

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = base_table();
    table.set_header(vec!["Date", "Numéros", "Somme"]);

    for draw in draws {
        table.add_row(vec![
            &draw.date.to_string(),
            &format_combination(&draw.numbers),
            &draw.sum.to_string(),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

/// Tag affiché d'un numéro. Les ensembles sont indépendants, la priorité
/// d'affichage est chaud > absent > froid.
fn tag_for(number: u8, class: &Classification) -> (&'static str, Color) {
    if class.hot.contains(&number) {
        ("Chaud", Color::Green)
    } else if class.absent.contains(&number) {
        ("Absent", Color::Yellow)
    } else if class.cold.contains(&number) {
        ("Froid", Color::Red)
    } else {
        ("—", Color::White)
    }
}

pub fn display_stats(stats: &[NumberStat], class: &Classification, window: usize) {
    println!("\n📊 Statistiques sur les {} derniers tirages\n", window);

    let mut table = base_table();
    table.set_header(vec!["Numéro", "Fréquence", "Vu au tirage", "Tag"]);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    for stat in &sorted {
        let (tag, color) = tag_for(stat.number, class);
        let last_seen = if stat.last_seen == 0 {
            "jamais".to_string()
        } else {
            format!("#{}", stat.last_seen)
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", stat.number)),
            Cell::new(stat.frequency.to_string()),
            Cell::new(last_seen),
            Cell::new(tag).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_bias(report: &BiasReport) {
    match report {
        BiasReport::InsufficientData { draws } => {
            println!(
                "Test du chi-deux : données insuffisantes ({} tirages, 50 requis).",
                draws
            );
        }
        BiasReport::Computed {
            statistic,
            critical,
            biased,
        } => {
            let verdict = if *biased {
                "écart significatif de l'uniformité"
            } else {
                "compatible avec l'uniformité"
            };
            println!(
                "Test du chi-deux : χ² = {:.2} (seuil {:.2}) → {}.",
                statistic, critical, verdict
            );
        }
    }
}

pub fn display_metrics(numbers: &[u8], metrics: &Metrics) {
    let mut table = base_table();
    table.set_header(vec!["Indicateur", "Valeur"]);
    table.add_row(vec!["Combinaison".to_string(), format_combination(numbers)]);
    table.add_row(vec!["Somme".to_string(), metrics.sum.to_string()]);
    table.add_row(vec!["Parité (pairs/impairs)".to_string(), metrics.parity.clone()]);
    table.add_row(vec!["Bas/Haut".to_string(), metrics.low_high.clone()]);
    table.add_row(vec!["Premiers".to_string(), metrics.primes.to_string()]);
    table.add_row(vec!["Consécutifs".to_string(), metrics.consecutive.clone()]);
    table.add_row(vec!["Dizaines".to_string(), metrics.decades.clone()]);
    table.add_row(vec!["Somme des chiffres".to_string(), metrics.digit_sum.to_string()]);
    table.add_row(vec!["Écart-type".to_string(), format!("{:.2}", metrics.std_dev)]);
    table.add_row(vec!["Entropie".to_string(), format!("{:.3}", metrics.entropy)]);
    println!("{table}");
}

pub fn display_scored(scored: &[ScoredCombination]) {
    let mut table = base_table();
    table.set_header(vec!["#", "Combinaison", "Score"]);

    for (i, entry) in scored.iter().enumerate() {
        table.add_row(vec![
            &format!("{}", i + 1),
            &format_combination(&entry.numbers),
            &format!("{:.1}", entry.score),
        ]);
    }
    println!("{table}");
}

pub fn display_tickets(tickets: &[Ticket]) {
    if tickets.is_empty() {
        println!("Aucun boleto enregistré.");
        return;
    }

    let mut table = base_table();
    table.set_header(vec!["#", "Créé le", "Stratégie", "Combinaisons", "Validation"]);

    for (i, ticket) in tickets.iter().enumerate() {
        let combos = ticket
            .combinations
            .iter()
            .map(|c| format_combination(c))
            .collect::<Vec<_>>()
            .join("\n");

        let validation = match &ticket.validation {
            None => Cell::new("en attente").fg(Color::Yellow),
            Some(v) => {
                let best = v.hits.iter().copied().max().unwrap_or(0);
                let color = if best >= 3 { Color::Green } else { Color::White };
                Cell::new(format!(
                    "{} — max {} bons numéros",
                    format_combination(&v.winning),
                    best
                ))
                .fg(color)
            }
        };

        table.add_row(vec![
            Cell::new(format!("{}", i + 1)),
            Cell::new(ticket.created.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(ticket.strategy.to_string()),
            Cell::new(combos),
            validation,
        ]);
    }
    println!("{table}");
}

pub fn display_breakdown(breakdown: &SystemBreakdown) {
    println!(
        "\nMultiple : {} bons numéros dans le superensemble, {} combinaisons jouées.",
        breakdown.superset_hits, breakdown.total_bets
    );

    let mut table = base_table();
    table.set_header(vec!["Bons numéros", "Combinaisons"]);

    for (hits, count) in breakdown.buckets.iter().enumerate().rev() {
        if *count == 0 {
            continue;
        }
        let color = if hits >= 3 { Color::Green } else { Color::White };
        table.add_row(vec![
            Cell::new(hits.to_string()).fg(color),
            Cell::new(count.to_string()),
        ]);
    }
    println!("{table}");
}
