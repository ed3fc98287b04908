use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use arkham_catalog::{filter_cards, type_counts, CardType, Catalog, Faction, FilterState};

const FACTIONS: [&str; 6] = ["guardian", "seeker", "rogue", "mystic", "survivor", "neutral"];
const TYPES: [&str; 4] = ["asset", "event", "skill", "treachery"];
const PACKS: [(&str, &str); 4] = [
    ("01", "Core Set"),
    ("02", "Dunwich"),
    ("03", "Path to Carcosa"),
    ("rcore", "Revised Core Set"),
];

// Roughly the size of the live catalog, with every fourth card a reprint.
fn synthetic_catalog(size: usize) -> Catalog {
    let cards: Vec<Value> = (0..size)
        .map(|i| {
            let (pack_code, pack_name) = PACKS[i % PACKS.len()];
            let prefix = if i % 7 == 0 { "The " } else { "" };
            let type_code = if i % 50 == 0 { "investigator" } else { TYPES[i % TYPES.len()] };
            let traits = if i % 9 == 0 { "Item. Weakness." } else { "Item." };
            json!({
                "code": format!("{i:05}"),
                "name": format!("{prefix}Card {}", i / 4),
                "faction_code": FACTIONS[i % FACTIONS.len()],
                "type_code": type_code,
                "traits": traits,
                "pack_code": pack_code,
                "pack_name": pack_name,
                "xp": (i % 6) as u32,
            })
        })
        .collect();
    let packs = PACKS
        .iter()
        .map(|(code, name)| json!({ "code": code, "name": name }))
        .collect();
    Catalog::build(cards, packs)
}

fn benchmark_filter(c: &mut Criterion) {
    let catalog = synthetic_catalog(5000);

    c.bench_function("filter_unrestricted", |b| {
        let facets = FilterState::default();
        b.iter(|| black_box(filter_cards(black_box(catalog.cards()), &facets).len()))
    });

    c.bench_function("filter_all_facets", |b| {
        let facets = FilterState::default()
            .with_name("card 1")
            .with_expansions(["Revised Core Set", "The Dunwich Legacy"])
            .with_xp(0)
            .with_type(CardType::Asset)
            .with_subtype("item");
        b.iter(|| black_box(filter_cards(black_box(catalog.cards()), &facets).len()))
    });
}

fn benchmark_indices(c: &mut Criterion) {
    let catalog = synthetic_catalog(5000);

    c.bench_function("by_faction_type_counts", |b| {
        b.iter(|| black_box(type_counts(catalog.by_faction(black_box(Faction::Seeker)))))
    });

    c.bench_function("cycles_and_packs", |b| {
        b.iter(|| black_box(catalog.cycles_and_packs()))
    });
}

criterion_group!(benches, benchmark_filter, benchmark_indices);
criterion_main!(benches);
