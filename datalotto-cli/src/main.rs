mod display;
mod import;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::display::{
    display_bias, display_breakdown, display_draws, display_import_summary, display_metrics,
    display_scored, display_stats, display_tickets,
};
use datalotto_db::db::{clear_draws, count_draws, db_path, fetch_all_draws, insert_draw, migrate, open_db};
use datalotto_db::models::{PICK_COUNT, POOL_SIZE, validate_numbers};
use datalotto_engine::archive::DrawArchive;
use datalotto_engine::filters::Filters;
use datalotto_engine::metrics::Metrics;
use datalotto_engine::scoring;
use datalotto_engine::search::{SearchEngine, SearchProgress};
use datalotto_engine::ticket::{
    Strategy, Ticket, auto_validate, format_for_play, load_tickets, save_tickets,
};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StrategyArg {
    #[default]
    Simple,
    Winning,
    Multiple,
}

#[derive(Parser)]
#[command(name = "datalotto", about = "Générateur de combinaisons Lotto 6/49")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier CSV (date;n1;..;n6)
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Remplacer la base par un historique synthétique uniforme
    Simulate {
        /// Nombre de tirages à générer
        #[arg(short, long, default_value = "500")]
        draws: u32,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Afficher les statistiques (fréquences, retards, test de biais)
    Stats {
        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: usize,
    },

    /// Générer un boleto selon une stratégie
    Generate {
        /// Stratégie de recherche
        #[arg(short, long, default_value = "simple")]
        strategy: StrategyArg,

        /// Candidates à collecter avant notation (stratégie gagnante)
        #[arg(long, default_value = "100")]
        generate_count: usize,

        /// Combinaisons retenues parmi les mieux notées (stratégie gagnante)
        #[arg(long, default_value = "10")]
        play_count: usize,

        /// Taille du superensemble (stratégie multiple, 7 à 11)
        #[arg(long, default_value = "7")]
        size: usize,

        /// Fichier JSON de filtres (défauts raisonnables sinon)
        #[arg(short, long)]
        filters: Option<PathBuf>,

        /// Numéros exclus de l'univers, séparés par des virgules
        #[arg(short, long, value_delimiter = ',')]
        exclude: Vec<u8>,

        /// Fenêtre de classification chaud/froid/absent
        #[arg(short, long, default_value = "100")]
        window: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Date de tirage visée (AAAA-MM-JJ)
        #[arg(long)]
        draw_date: Option<NaiveDate>,

        /// Enregistrer le boleto
        #[arg(long)]
        save: bool,

        /// Fichier des boletos enregistrés
        #[arg(long, default_value = "data/tickets.json")]
        tickets: PathBuf,
    },

    /// Lister les boletos enregistrés
    Tickets {
        /// Fichier des boletos enregistrés
        #[arg(long, default_value = "data/tickets.json")]
        tickets: PathBuf,
    },

    /// Valider un boleto contre un tirage gagnant
    Validate {
        /// Numéro du boleto (voir `datalotto tickets`)
        #[arg(short, long)]
        index: usize,

        /// Les 6 numéros gagnants
        #[arg(short, long, num_args = 6)]
        numbers: Vec<u8>,

        /// Fichier des boletos enregistrés
        #[arg(long, default_value = "data/tickets.json")]
        tickets: PathBuf,
    },

    /// Valider les boletos en attente contre l'archive
    AutoValidate {
        /// Fichier des boletos enregistrés
        #[arg(long, default_value = "data/tickets.json")]
        tickets: PathBuf,
    },

    /// Afficher les combinaisons simples d'un boleto multiple
    Explode {
        /// Numéro du boleto (voir `datalotto tickets`)
        #[arg(short, long)]
        index: usize,

        /// Fichier des boletos enregistrés
        #[arg(long, default_value = "data/tickets.json")]
        tickets: PathBuf,
    },

    /// Indicateurs et score heuristique d'une combinaison
    Score {
        /// Les 6 numéros de la combinaison
        #[arg(short, long, num_args = 6)]
        numbers: Vec<u8>,

        /// Fenêtre de classification chaud/froid/absent
        #[arg(short, long, default_value = "100")]
        window: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::Simulate { draws, seed } => cmd_simulate(&conn, draws, seed),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window } => cmd_stats(&conn, window),
        Command::Generate {
            strategy,
            generate_count,
            play_count,
            size,
            filters,
            exclude,
            window,
            seed,
            draw_date,
            save,
            tickets,
        } => cmd_generate(
            &conn,
            GenerateArgs {
                strategy,
                generate_count,
                play_count,
                size,
                filters,
                exclude,
                window,
                seed,
                draw_date,
                save,
                tickets,
            },
        ),
        Command::Tickets { tickets } => cmd_tickets(&tickets),
        Command::Validate {
            index,
            numbers,
            tickets,
        } => cmd_validate(index, &numbers, &tickets),
        Command::AutoValidate { tickets } => cmd_auto_validate(&conn, &tickets),
        Command::Explode { index, tickets } => cmd_explode(index, &tickets),
        Command::Score { numbers, window } => cmd_score(&conn, &numbers, window),
    }
}

fn load_archive(conn: &datalotto_db::rusqlite::Connection) -> Result<DrawArchive> {
    let records = fetch_all_draws(conn)?;
    Ok(DrawArchive::ingest(records))
}

fn load_filters(path: Option<&Path>) -> Result<Filters> {
    match path {
        None => Ok(Filters::default()),
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Impossible de lire {:?}", path))?;
            serde_json::from_str(&json).with_context(|| format!("Filtres invalides: {:?}", path))
        }
    }
}

fn search_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

fn cmd_import(conn: &datalotto_db::rusqlite::Connection, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_simulate(conn: &datalotto_db::rusqlite::Connection, draws: u32, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    // Tirages espacés de 3 à 4 jours, le plus récent aujourd'hui
    let mut dates = Vec::with_capacity(draws as usize);
    let mut date = chrono::Local::now().date_naive();
    for _ in 0..draws {
        dates.push(date);
        date = date - chrono::Duration::days(rng.random_range(3..=4));
    }
    dates.reverse();

    clear_draws(conn)?;
    let mut inserted = 0u32;
    for date in dates {
        let picked = rand::seq::index::sample(&mut rng, POOL_SIZE as usize, PICK_COUNT);
        let mut numbers = [0u8; PICK_COUNT];
        for (slot, i) in numbers.iter_mut().zip(picked.iter()) {
            *slot = (i + 1) as u8;
        }
        numbers.sort_unstable();
        if insert_draw(conn, date, &numbers)? {
            inserted += 1;
        }
    }

    log::info!("Historique synthétique généré");
    println!("Base remplacée par {} tirages simulés.", inserted);
    Ok(())
}

fn cmd_list(conn: &datalotto_db::rusqlite::Connection, last: usize) -> Result<()> {
    if count_draws(conn)? == 0 {
        println!("Base vide. Lancez d'abord : datalotto import");
        return Ok(());
    }
    let archive = load_archive(conn)?;
    let draws = archive.draws();
    let start = draws.len().saturating_sub(last);
    display_draws(&draws[start..]);
    Ok(())
}

fn cmd_stats(conn: &datalotto_db::rusqlite::Connection, window: usize) -> Result<()> {
    let archive = load_archive(conn)?;
    if archive.is_empty() {
        println!("Base vide. Lancez d'abord : datalotto import");
        return Ok(());
    }
    let effective_window = window.min(archive.len());

    let stats = archive.number_stats(effective_window);
    let class = archive.classify(effective_window);
    display_stats(&stats, &class, effective_window);
    display_bias(&archive.bias_test());
    Ok(())
}

struct GenerateArgs {
    strategy: StrategyArg,
    generate_count: usize,
    play_count: usize,
    size: usize,
    filters: Option<PathBuf>,
    exclude: Vec<u8>,
    window: usize,
    seed: Option<u64>,
    draw_date: Option<NaiveDate>,
    save: bool,
    tickets: PathBuf,
}

fn cmd_generate(conn: &datalotto_db::rusqlite::Connection, args: GenerateArgs) -> Result<()> {
    let archive = load_archive(conn)?;
    if archive.is_empty() {
        println!("Base vide. Lancez d'abord : datalotto import");
        return Ok(());
    }

    let filters = load_filters(args.filters.as_deref())?;
    let excluded: BTreeSet<u8> = args.exclude.iter().copied().collect();
    let universe = filters.available_universe(&excluded);
    let class = archive.classify(args.window.min(archive.len()));

    let mut engine = SearchEngine::new(args.seed);
    let pb = search_progress_bar();
    let progress = |p: SearchProgress| {
        pb.set_length(p.budget);
        pb.set_position(p.attempts);
        if p.found > 0 {
            pb.set_message(format!("{} retenues", p.found));
        }
    };

    let mut ticket = match args.strategy {
        StrategyArg::Simple => {
            let found = engine.find_simple(&universe, &filters, progress)?;
            pb.finish_and_clear();
            match found {
                None => {
                    println!("Aucune combinaison trouvée dans le budget imparti.");
                    return Ok(());
                }
                Some(numbers) => {
                    display_metrics(&numbers, &Metrics::compute(&numbers));
                    Ticket::new(vec![numbers], Strategy::Simple)
                }
            }
        }
        StrategyArg::Winning => {
            let found = engine.find_ranked(
                &universe,
                &filters,
                &archive,
                &class,
                args.generate_count,
                args.play_count,
                progress,
            )?;
            pb.finish_and_clear();
            match found {
                None => {
                    println!("Aucune combinaison trouvée dans le budget imparti.");
                    return Ok(());
                }
                Some(scored) => {
                    display_scored(&scored);
                    let combinations = scored.into_iter().map(|s| s.numbers).collect();
                    Ticket::new(combinations, Strategy::Winning)
                }
            }
        }
        StrategyArg::Multiple => {
            let found = engine.find_system(&universe, &filters, args.size, progress)?;
            pb.finish_and_clear();
            match found {
                None => {
                    println!("Aucun superensemble trouvé dans le budget imparti.");
                    return Ok(());
                }
                Some(superset) => {
                    let ticket = Ticket::new(vec![superset], Strategy::Multiple);
                    println!(
                        "Superensemble de {} numéros, {} combinaisons jouées :",
                        args.size,
                        ticket.explode().len()
                    );
                    println!("{}", format_for_play(&ticket.combinations));
                    ticket
                }
            }
        }
    };

    ticket.draw_date = args.draw_date;

    if args.save {
        let mut tickets = load_tickets(&args.tickets)?;
        tickets.push(ticket);
        save_tickets(&tickets, &args.tickets)?;
        println!("Boleto enregistré (n° {}).", tickets.len());
    }

    Ok(())
}

fn cmd_tickets(path: &Path) -> Result<()> {
    let tickets = load_tickets(path)?;
    display_tickets(&tickets);
    Ok(())
}

fn ticket_index(len: usize, index: usize) -> Result<usize> {
    if index == 0 || index > len {
        bail!("Boleto n° {} introuvable ({} enregistrés)", index, len);
    }
    Ok(index - 1)
}

fn cmd_validate(index: usize, numbers: &[u8], path: &Path) -> Result<()> {
    if numbers.len() != PICK_COUNT {
        bail!("Il faut exactement {} numéros gagnants", PICK_COUNT);
    }
    let mut winning = [0u8; PICK_COUNT];
    winning.copy_from_slice(numbers);
    validate_numbers(&winning)?;
    winning.sort_unstable();

    let mut tickets = load_tickets(path)?;
    let i = ticket_index(tickets.len(), index)?;

    tickets[i].validate(&winning);
    if let Some(breakdown) = tickets[i].system_breakdown(&winning) {
        display_breakdown(&breakdown);
    } else {
        let validation = &tickets[i].validation;
        if let Some(v) = validation {
            for (combo, hits) in tickets[i].combinations.iter().zip(&v.hits) {
                println!(
                    "{} : {} bons numéros",
                    datalotto_db::models::format_combination(combo),
                    hits
                );
            }
        }
    }

    save_tickets(&tickets, path)?;
    Ok(())
}

fn cmd_auto_validate(conn: &datalotto_db::rusqlite::Connection, path: &Path) -> Result<()> {
    let archive = load_archive(conn)?;
    if archive.is_empty() {
        println!("Base vide. Lancez d'abord : datalotto import");
        return Ok(());
    }

    let mut tickets = load_tickets(path)?;
    let validated = auto_validate(&mut tickets, &archive);
    save_tickets(&tickets, path)?;

    println!("{} boleto(s) validé(s).", validated);
    display_tickets(&tickets);
    Ok(())
}

fn cmd_explode(index: usize, path: &Path) -> Result<()> {
    let tickets = load_tickets(path)?;
    let i = ticket_index(tickets.len(), index)?;

    if !tickets[i].is_system() {
        bail!("Le boleto n° {} n'est pas un multiple", index);
    }

    let bets = tickets[i].explode();
    println!("{} combinaisons :", bets.len());
    println!("{}", format_for_play(&bets));
    Ok(())
}

fn cmd_score(conn: &datalotto_db::rusqlite::Connection, numbers: &[u8], window: usize) -> Result<()> {
    if numbers.len() != PICK_COUNT {
        bail!("Il faut exactement {} numéros", PICK_COUNT);
    }
    let mut combination = [0u8; PICK_COUNT];
    combination.copy_from_slice(numbers);
    validate_numbers(&combination)?;
    combination.sort_unstable();

    display_metrics(&combination, &Metrics::compute(&combination));

    let archive = load_archive(conn)?;
    let class = archive.classify(window.min(archive.len()));
    let filters = Filters::default();
    let s = scoring::score(&combination, &archive, &class, &filters);
    println!("Score heuristique : {:.1}", s);

    if !filters.accept(&combination) {
        println!("Note : cette combinaison serait rejetée par les filtres par défaut.");
    }
    Ok(())
}
