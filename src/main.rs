// Version: 0.1.0
// Description: Command-line card browser for Arkham Horror: The Card Game.
//              Fetches the full card and pack catalog from the ArkhamDB public API,
//              normalizes expansion names and lets you browse by faction, type and
//              cycle, filter by name, expansion and XP, and export a snapshot.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use arkham_catalog::filter::MAX_XP;
use arkham_catalog::normalize::{clean_text, faction_name, type_icon};
use arkham_catalog::route::{resolve_view, View};
use arkham_catalog::snapshot::{export, Snapshot};
use arkham_catalog::{
    ArkhamDbClient, Card, CardSource, Catalog, CatalogCache, ExpansionSelection, Faction,
    FilterState, Result,
};

const DEFAULT_SNAPSHOT: &str = "arkham_catalog.json";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List factions with their card counts.
    Factions,
    /// List card types for a faction.
    Types { faction: Option<String> },
    /// List cards of one faction and type.
    Cards {
        faction: Option<String>,
        card_type: Option<String>,
        /// Case-insensitive name substring.
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=MAX_XP as i64))]
        xp: Option<u8>,
        /// Substring of the card traits, e.g. "weakness".
        #[arg(long)]
        subtype: Option<String>,
        /// Restrict to the saved expansion selection.
        #[arg(long)]
        expansions: bool,
    },
    /// List investigators.
    Investigators,
    /// List cycles and their packs.
    Cycles,
    /// Edit the saved expansion selection.
    Select {
        #[command(subcommand)]
        action: SelectAction,
    },
    /// Write a catalog snapshot (JSON, gzip and lz4).
    Export {
        #[arg(long, default_value = DEFAULT_SNAPSHOT)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum SelectAction {
    /// Add expansions by pack code or name.
    Add { keys: Vec<String> },
    /// Remove expansions by pack code or name.
    Remove { keys: Vec<String> },
    /// Deselect everything.
    Clear,
    /// Show the selection and the available expansions.
    List,
}

fn print_card(card: &Card) {
    let mut badges = Vec::new();
    if let Some(cost) = card.cost {
        badges.push(format!("💰 {cost}"));
    }
    if let Some(xp) = card.xp {
        badges.push(format!("⭐ {xp}"));
    }
    println!(
        "   {} [{}] {}",
        card.name,
        card.code,
        badges.join(" ")
    );
    if let Some(traits) = card.traits.as_deref() {
        println!("      {}", clean_text(Some(traits)));
    }
    if !card.skills.is_empty() {
        let skills: Vec<String> = [
            ("Willpower", card.skills.willpower),
            ("Intellect", card.skills.intellect),
            ("Combat", card.skills.combat),
            ("Agility", card.skills.agility),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| format!("{name}: {v}")))
        .collect();
        println!("      Skills: {}", skills.join(" "));
    }
    if card.health.is_some() || card.sanity.is_some() {
        let stats: Vec<String> = [("Health", card.health), ("Sanity", card.sanity)]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| format!("{name}: {v}")))
            .collect();
        println!("      Stats: {}", stats.join(" "));
    }
    if card.text.is_some() {
        println!("      {}", clean_text(card.text.as_deref()));
    }
}

fn show_factions(catalog: &Catalog) {
    println!("\n--- Factions ---");
    for faction in Faction::ALL {
        println!(
            "   {:<10} {} cards",
            faction_name(faction.code()),
            catalog.by_faction(faction).len()
        );
    }
}

fn show_types(catalog: &Catalog, faction: Faction) {
    println!("\n--- {} card types ---", faction_name(faction.code()));
    for group in catalog.type_summary(faction) {
        println!(
            "   {} {:<16} {}",
            type_icon(&group.type_code),
            group.type_name,
            group.count
        );
    }
}

fn run(args: Args) -> Result<()> {
    let config = arkham_catalog::config::Config::load();
    let cache = CatalogCache::new(ArkhamDbClient::new(&config)?);

    println!("\n--- Loading catalog from {} ---", cache.source().identity());
    let (_, catalog) = cache.load()?;
    println!(
        "   > ✅ {} cards, {} packs",
        catalog.cards().len(),
        catalog.packs().len()
    );

    match args.command {
        Command::Factions => show_factions(&catalog),
        Command::Types { faction } => match resolve_view(faction.as_deref(), None) {
            View::Types(faction) => show_types(&catalog, faction),
            _ => show_factions(&catalog),
        },
        Command::Cards {
            faction,
            card_type,
            name,
            xp,
            subtype,
            expansions,
        } => match resolve_view(faction.as_deref(), card_type.as_deref()) {
            View::Cards(faction, card_type) => {
                let mut facets = FilterState {
                    name,
                    xp,
                    subtype,
                    ..FilterState::default()
                }
                .with_type(card_type.clone());
                if expansions {
                    ExpansionSelection::open(&config.selection_path).apply(&mut facets);
                }

                let pool = catalog.by_faction(faction);
                let cards = arkham_catalog::filter_cards(pool, &facets);
                println!(
                    "\n--- {} {} ({} shown) ---",
                    faction_name(faction.code()),
                    card_type,
                    cards.len()
                );
                if cards.is_empty() {
                    println!("   No cards found matching the current filters.");
                }
                for card in cards {
                    print_card(card);
                }
            }
            View::Types(faction) => show_types(&catalog, faction),
            View::Factions => show_factions(&catalog),
        },
        Command::Investigators => {
            println!("\n--- Investigators ---");
            for card in catalog.investigators() {
                print_card(card);
            }
        }
        Command::Cycles => {
            println!("\n--- Cycles ---");
            for cycle in catalog.cycles_and_packs() {
                println!("   {} ({})", cycle.name, cycle.code);
                for pack in &cycle.packs {
                    println!("      - {} [{}]", pack.name, pack.code);
                }
            }
        }
        Command::Select { action } => {
            let mut selection = ExpansionSelection::open(&config.selection_path);
            match action {
                SelectAction::Add { keys } => {
                    let change = selection.add_keys(&catalog, &keys)?;
                    for name in &change.added {
                        println!("   + {name}");
                    }
                    for key in &change.unknown {
                        println!("   ? unknown expansion '{key}'");
                    }
                }
                SelectAction::Remove { keys } => {
                    for name in selection.remove_keys(&catalog, &keys)? {
                        println!("   - {name}");
                    }
                }
                SelectAction::Clear => {
                    selection.clear()?;
                    println!("   Selection cleared");
                }
                SelectAction::List => {
                    println!("\n--- Expansions ---");
                    for name in catalog.canonical_expansions() {
                        let mark = if selection.contains(&name) { "x" } else { " " };
                        println!("   [{mark}] {name}");
                    }
                    if !selection.preferred_packs().is_empty() {
                        let packs: Vec<&str> =
                            selection.preferred_packs().iter().map(String::as_str).collect();
                        println!("   Picked packs: {}", packs.join(", "));
                    }
                }
            }
        }
        Command::Export { out } => {
            let snapshot = Snapshot::new(&catalog, vec![cache.source().identity()]);
            let report = export(&snapshot, &out)?;
            println!(
                "   > Snapshot saved to '{}' ({} KB, gzip {} KB, lz4 {} KB)",
                report.json_path.display(),
                report.json_bytes / 1024,
                report.gzip_bytes / 1024,
                report.lz4_bytes / 1024
            );
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    println!("🚀 Arkham card catalog");

    if let Err(e) = run(args) {
        eprintln!("\n❌ {e}");
        std::process::exit(1);
    }
}
