// Catalog builder: fetches the raw lists once, normalizes pack names and
// derives the faction, type and cycle views.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

use crate::api::CardSource;
use crate::error::Result;
use crate::filter::display_order;
use crate::model::{ingest_cards, ingest_packs, Card, CardType, CardTypeGroup, Cycle, Faction, Pack};
use crate::normalize::{
    cycle_code, cycle_name, normalize_pack_name, normalize_pack_name_ignore_case, type_name,
};

/// Immutable snapshot of one fetch of the card and pack lists.
#[derive(Debug, Clone)]
pub struct Catalog {
    cards: Vec<Card>,
    packs: Vec<Pack>,
    fetched_at: DateTime<Utc>,
}

fn canonical(raw: &str) -> String {
    normalize_pack_name(Some(raw)).unwrap_or(raw).to_string()
}

/// Neutral locations, enemies and stories are scenario cards, not player cards.
fn excluded_from_faction(faction: Faction, card_type: &CardType) -> bool {
    faction == Faction::Neutral
        && matches!(card_type, CardType::Location | CardType::Enemy | CardType::Story)
}

impl Catalog {
    /// Fetches both lists from `source`. Any fetch failure aborts the load;
    /// there is no partial catalog.
    pub fn load<S: CardSource>(source: &S) -> Result<Self> {
        let raw_cards = source.fetch_cards()?;
        let raw_packs = source.fetch_packs()?;
        let catalog = Catalog::build(raw_cards, raw_packs);
        info!(
            "Catalog ready: {} cards, {} packs",
            catalog.cards.len(),
            catalog.packs.len()
        );
        Ok(catalog)
    }

    pub fn build(raw_cards: Vec<serde_json::Value>, raw_packs: Vec<serde_json::Value>) -> Self {
        let mut cards = ingest_cards(raw_cards);
        for card in &mut cards {
            card.expansion = normalize_pack_name(card.pack_name.as_deref()).map(str::to_string);
        }

        let packs = ingest_packs(raw_packs)
            .into_iter()
            .map(|(code, name)| Pack {
                expansion: canonical(&name),
                code,
                name,
            })
            .collect();

        Catalog {
            cards,
            packs,
            fetched_at: Utc::now(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn find(&self, code: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.code == code)
    }

    pub fn by_faction(&self, faction: Faction) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|card| card.faction == faction)
            .filter(|card| !excluded_from_faction(faction, &card.card_type))
            .collect()
    }

    pub fn by_faction_and_type(&self, faction: Faction, card_type: &CardType) -> Vec<&Card> {
        self.by_faction(faction)
            .into_iter()
            .filter(|card| &card.card_type == card_type)
            .collect()
    }

    /// Type picker entries for one faction.
    pub fn type_summary(&self, faction: Faction) -> Vec<CardTypeGroup> {
        type_counts(self.by_faction(faction))
    }

    pub fn investigators(&self) -> Vec<&Card> {
        let mut investigators: Vec<&Card> = self
            .cards
            .iter()
            .filter(|card| card.card_type.is_investigator())
            .collect();
        investigators.sort_by(|a, b| display_order(a, b));
        investigators
    }

    /// Every pack seen in the pack list or referenced by a card, grouped
    /// by cycle code. Cycles come out in code order, packs by name.
    pub fn cycles_and_packs(&self) -> Vec<Cycle> {
        let mut packs_by_code: BTreeMap<&str, Pack> = self
            .packs
            .iter()
            .map(|pack| (pack.code.as_str(), pack.clone()))
            .collect();

        for card in &self.cards {
            let (Some(code), Some(name)) = (card.pack_code.as_deref(), card.pack_name.as_deref())
            else {
                continue;
            };
            packs_by_code.entry(code).or_insert_with(|| Pack {
                code: code.to_string(),
                name: name.to_string(),
                expansion: canonical(name),
            });
        }

        let mut cycles: BTreeMap<String, Vec<Pack>> = BTreeMap::new();
        for (code, pack) in packs_by_code {
            cycles.entry(cycle_code(code).to_string()).or_default().push(pack);
        }

        cycles
            .into_iter()
            .map(|(code, mut packs)| {
                packs.sort_by(|a, b| by_name(&a.name, &b.name).then_with(|| a.code.cmp(&b.code)));
                Cycle {
                    name: cycle_name(&code).into_owned(),
                    code,
                    packs,
                }
            })
            .collect()
    }

    /// Packs from the pack list, sorted by display name.
    pub fn expansions(&self) -> Vec<&Pack> {
        let mut packs: Vec<&Pack> = self.packs.iter().collect();
        packs.sort_by(|a, b| by_name(&a.name, &b.name).then_with(|| a.code.cmp(&b.code)));
        packs
    }

    /// Distinct canonical expansion names across packs and cards.
    pub fn canonical_expansions(&self) -> BTreeSet<String> {
        self.packs
            .iter()
            .map(|pack| pack.expansion.clone())
            .chain(self.cards.iter().filter_map(|card| card.expansion.clone()))
            .collect()
    }

    /// Returns `key` as a pack code if the pack list or any card uses it.
    pub fn pack_code(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        self.packs
            .iter()
            .map(|pack| pack.code.as_str())
            .chain(self.cards.iter().filter_map(|card| card.pack_code.as_deref()))
            .find(|code| *code == key)
    }

    /// Resolves a user-supplied expansion key to the canonical expansion
    /// name. The key may be a pack code, a raw pack name or a canonical
    /// name; anything the catalog has never seen resolves to `None`.
    pub fn resolve_expansion(&self, key: &str) -> Option<String> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        if let Some(pack) = self.packs.iter().find(|pack| pack.code == key) {
            return Some(pack.expansion.clone());
        }
        if let Some(expansion) = self
            .cards
            .iter()
            .find(|card| card.pack_code.as_deref() == Some(key))
            .and_then(|card| card.expansion.clone())
        {
            return Some(expansion);
        }

        if let Some(pack) = self
            .packs
            .iter()
            .find(|pack| pack.name.eq_ignore_ascii_case(key))
        {
            return Some(pack.expansion.clone());
        }

        // Names are matched ignoring case, including the variant table.
        let name = normalize_pack_name_ignore_case(key).unwrap_or(key);
        self.canonical_expansions()
            .into_iter()
            .find(|known| known.eq_ignore_ascii_case(name))
    }
}

fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Groups cards by type code and counts them.
///
/// The investigator group always comes first; the rest are ordered by
/// display name. Each group takes its display name from the first card
/// of that type.
pub fn type_counts<'a, I>(cards: I) -> Vec<CardTypeGroup>
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut order: Vec<CardTypeGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for card in cards {
        let code = card.card_type.code();
        match index.get(code) {
            Some(&i) => order[i].count += 1,
            None => {
                index.insert(code.to_string(), order.len());
                order.push(CardTypeGroup {
                    type_code: code.to_string(),
                    type_name: card
                        .type_name
                        .clone()
                        .unwrap_or_else(|| type_name(code)),
                    count: 1,
                });
            }
        }
    }

    order.sort_by(|a, b| {
        let a_inv = a.type_code == CardType::Investigator.code();
        let b_inv = b.type_code == CardType::Investigator.code();
        b_inv
            .cmp(&a_inv)
            .then_with(|| by_name(&a.type_name, &b.type_name))
            .then_with(|| a.type_code.cmp(&b.type_code))
    });
    order
}
