// Faceted filter engine: narrows a working set by the active facets,
// collapses duplicate printings and sorts for display.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::model::{Card, CardType, Faction};

/// Highest XP level a card can carry.
pub const MAX_XP: u8 = 5;

/// The user's active facets. Every facet is optional; an empty name and an
/// empty expansion set both mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub name: String,
    /// Canonical expansion names.
    pub expansions: BTreeSet<String>,
    /// Pack codes the user picked directly. When two packs share a
    /// canonical name, their printings win de-duplication.
    pub preferred_packs: BTreeSet<String>,
    pub xp: Option<u8>,
    pub faction: Option<Faction>,
    pub card_type: Option<CardType>,
    /// Matched against `traits`, e.g. "weakness".
    pub subtype: Option<String>,
}

impl FilterState {
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_expansions<I, S>(mut self, expansions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expansions = expansions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preferred_packs<I, S>(mut self, packs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_packs = packs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_xp(mut self, xp: u8) -> Self {
        self.xp = Some(xp);
        self
    }

    pub fn with_faction(mut self, faction: Faction) -> Self {
        self.faction = Some(faction);
        self
    }

    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.card_type = Some(card_type);
        self
    }

    pub fn with_subtype(mut self, subtype: &str) -> Self {
        self.subtype = Some(subtype.to_string());
        self
    }

    fn matches(&self, card: &Card, name_needle: &str, subtype_needle: Option<&str>) -> bool {
        if !name_needle.is_empty() && !card.name.to_lowercase().contains(name_needle) {
            return false;
        }

        if !self.expansions.is_empty() {
            match card.expansion.as_deref() {
                Some(expansion) if self.expansions.contains(expansion) => {}
                _ => return false,
            }
        }

        // Investigators carry no deck-building XP.
        if let Some(xp) = self.xp {
            if !card.card_type.is_investigator() && card.xp_or_zero() != u32::from(xp) {
                return false;
            }
        }

        if self.faction.is_some_and(|faction| faction != card.faction) {
            return false;
        }

        if self
            .card_type
            .as_ref()
            .is_some_and(|card_type| card_type != &card.card_type)
        {
            return false;
        }

        if let Some(needle) = subtype_needle {
            let traits = card.traits.as_deref().unwrap_or_default().to_lowercase();
            if !traits.contains(needle) {
                return false;
            }
        }

        true
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct DuplicateKey {
    name: String,
    xp: Option<u32>,
}

impl DuplicateKey {
    fn of(card: &Card) -> Self {
        DuplicateKey {
            name: card.name.trim().to_lowercase(),
            xp: (!card.card_type.is_investigator()).then(|| card.xp_or_zero()),
        }
    }
}

/// Name used for ordering: leading "The " dropped, only letters and digits
/// kept, lowercased.
pub fn sort_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = lowered.strip_prefix("the ").unwrap_or(&lowered);
    stripped.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Display order: sort name, then XP ascending. Remaining ties fall back to
/// the full name and then the card code so the order is total.
pub fn display_order(a: &Card, b: &Card) -> Ordering {
    sort_name(&a.name)
        .cmp(&sort_name(&b.name))
        .then_with(|| a.xp_or_zero().cmp(&b.xp_or_zero()))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.code.cmp(&b.code))
}

/// Keeps one card of every (name, XP) pair; investigators collapse on name
/// alone. A printing from one of `preferred_packs` replaces an earlier
/// printing from any other pack, otherwise the first one seen is kept.
pub fn dedupe<'a, I>(cards: I, preferred_packs: &BTreeSet<String>) -> Vec<&'a Card>
where
    I: IntoIterator<Item = &'a Card>,
{
    let is_preferred =
        |card: &Card| card.pack_code.as_ref().is_some_and(|code| preferred_packs.contains(code));

    let mut kept: Vec<&'a Card> = Vec::new();
    let mut slots: HashMap<DuplicateKey, usize> = HashMap::new();
    for card in cards {
        let key = DuplicateKey::of(card);
        match slots.get(&key) {
            Some(&i) => {
                if is_preferred(card) && !is_preferred(kept[i]) {
                    kept[i] = card;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(card);
            }
        }
    }
    kept
}

/// Applies every facet in `facets` to `cards`, collapses duplicate
/// printings and returns the survivors in display order.
///
/// Facets are independent conjunctions. Duplicates are collapsed among
/// the cards that pass the facets, so a reprint outside the selected
/// expansions never hides the printing inside them.
pub fn filter_cards<'a, I>(cards: I, facets: &FilterState) -> Vec<&'a Card>
where
    I: IntoIterator<Item = &'a Card>,
{
    let name_needle = facets.name.trim().to_lowercase();
    let subtype_needle = facets
        .subtype
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let matching = cards
        .into_iter()
        .filter(|card| facets.matches(card, &name_needle, subtype_needle.as_deref()));

    let mut result = dedupe(matching, &facets.preferred_packs);
    result.sort_by(|a, b| display_order(a, b));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ingest_cards;
    use serde_json::json;

    fn cards() -> Vec<Card> {
        let mut cards = ingest_cards(vec![
            json!({ "code": "01001", "name": "Roland Banks", "faction_code": "guardian", "type_code": "investigator", "pack_code": "01", "pack_name": "Core Set" }),
            json!({ "code": "01030", "name": "Magnifying Glass", "faction_code": "seeker", "type_code": "asset", "xp": 0, "pack_code": "01", "pack_name": "Core Set", "traits": "Item. Tool." }),
            json!({ "code": "01040", "name": "Magnifying Glass", "faction_code": "seeker", "type_code": "asset", "xp": 1, "pack_code": "02", "pack_name": "Dunwich", "traits": "Item. Tool." }),
            json!({ "code": "01087", "name": "Flashlight", "faction_code": "neutral", "type_code": "asset", "pack_code": "01", "pack_name": "Core Set", "traits": "Item. Tool." }),
            json!({ "code": "01009", "name": "Cover Up", "faction_code": "neutral", "type_code": "treachery", "pack_code": "01", "pack_name": "Core Set", "traits": "Task." }),
            json!({ "code": "01097", "name": "Amnesia", "faction_code": "neutral", "type_code": "treachery", "pack_code": "01", "pack_name": "Core Set", "traits": "Madness." }),
            json!({ "code": "02003", "name": "The Necronomicon", "faction_code": "neutral", "type_code": "asset", "xp": 0, "pack_code": "02", "pack_name": "Dunwich", "traits": "Item. Tome. Weakness." }),
            json!({ "code": "01033", "name": "Necronomicon", "faction_code": "neutral", "type_code": "asset", "xp": 0, "pack_code": "01", "pack_name": "Core Set", "traits": "Item. Tome." }),
        ]);
        for card in &mut cards {
            card.expansion = crate::normalize::normalize_pack_name(card.pack_name.as_deref()).map(str::to_string);
        }
        cards
    }

    fn names(result: &[&Card]) -> Vec<String> {
        result.iter().map(|c| format!("{}/{}", c.name, c.xp_or_zero())).collect()
    }

    #[test]
    fn sort_ignores_leading_the_and_punctuation() {
        assert_eq!(sort_name("The Necronomicon"), "necronomicon");
        assert_eq!(sort_name(".45 Automatic"), "45automatic");
        assert_eq!(sort_name("Theodore"), "theodore");
        assert_eq!(sort_name("Evidence!"), "evidence");
    }

    #[test]
    fn no_facets_sorts_everything() {
        let cards = cards();
        let result = filter_cards(&cards, &FilterState::default());
        assert_eq!(
            names(&result),
            vec![
                "Amnesia/0",
                "Cover Up/0",
                "Flashlight/0",
                "Magnifying Glass/0",
                "Magnifying Glass/1",
                "Necronomicon/0",
                "The Necronomicon/0",
                "Roland Banks/0",
            ]
        );
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let cards = cards();
        let result = filter_cards(&cards, &FilterState::default().with_name("NECRO"));
        assert_eq!(names(&result), vec!["Necronomicon/0", "The Necronomicon/0"]);
    }

    #[test]
    fn duplicates_collapse_to_first_seen() {
        let mut cards = cards();
        let mut reprint = cards[1].clone();
        reprint.code = "50001".to_string();
        cards.push(reprint);

        let result = filter_cards(&cards, &FilterState::default().with_name("magnifying"));
        let codes: Vec<&str> = result.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["01030", "01040"]);
    }

    #[test]
    fn picked_pack_wins_over_same_named_expansion() {
        let roland = |code: &str, pack_code: &str, pack_name: &str| {
            json!({ "code": code, "name": "Roland Banks", "faction_code": "guardian", "type_code": "investigator", "pack_code": pack_code, "pack_name": pack_name })
        };
        let mut cards = ingest_cards(vec![
            roland("01501", "rcore", "Revised Core Set"),
            roland("01001", "01", "Core Set"),
        ]);
        for card in &mut cards {
            card.expansion = crate::normalize::normalize_pack_name(card.pack_name.as_deref()).map(str::to_string);
        }

        let facets = FilterState::default().with_expansions(["Revised Core Set"]);
        let result = filter_cards(&cards, &facets);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].pack_code.as_deref(), Some("rcore"));

        let result = filter_cards(&cards, &facets.with_preferred_packs(["01"]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].pack_code.as_deref(), Some("01"));
    }

    #[test]
    fn investigators_collapse_on_name_alone() {
        let mut cards = cards();
        let mut parallel = cards[0].clone();
        parallel.code = "90024".to_string();
        parallel.xp = Some(3);
        cards.push(parallel);

        let result = filter_cards(&cards, &FilterState::default().with_type(CardType::Investigator));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code, "01001");
    }

    #[test]
    fn xp_filter_skips_investigators() {
        let cards = cards();
        let result = filter_cards(&cards, &FilterState::default().with_xp(1));
        assert_eq!(names(&result), vec!["Magnifying Glass/1", "Roland Banks/0"]);
    }

    #[test]
    fn xp_zero_matches_missing_xp() {
        let cards = cards();
        let result = filter_cards(
            &cards,
            &FilterState::default().with_xp(0).with_type(CardType::Treachery),
        );
        assert_eq!(names(&result), vec!["Amnesia/0", "Cover Up/0"]);
    }

    #[test]
    fn expansion_filter_uses_canonical_names() {
        let cards = cards();
        let result = filter_cards(
            &cards,
            &FilterState::default().with_expansions(["The Dunwich Legacy"]),
        );
        assert_eq!(names(&result), vec!["Magnifying Glass/1", "The Necronomicon/0"]);
    }

    #[test]
    fn empty_expansion_set_means_unrestricted() {
        let cards = cards();
        let unrestricted = filter_cards(&cards, &FilterState::default());
        let empty = filter_cards(
            &cards,
            &FilterState::default().with_expansions(Vec::<String>::new()),
        );
        assert_eq!(unrestricted, empty);
    }

    #[test]
    fn subtype_matches_traits() {
        let cards = cards();
        let result = filter_cards(
            &cards,
            &FilterState::default()
                .with_type(CardType::Asset)
                .with_subtype("Weakness"),
        );
        assert_eq!(names(&result), vec!["The Necronomicon/0"]);

        let blank = filter_cards(&cards, &FilterState::default().with_subtype("  "));
        assert_eq!(blank.len(), cards.len());
    }

    #[test]
    fn faction_facet() {
        let cards = cards();
        let result = filter_cards(&cards, &FilterState::default().with_faction(Faction::Seeker));
        assert_eq!(names(&result), vec!["Magnifying Glass/0", "Magnifying Glass/1"]);
    }

    #[test]
    fn adding_facets_never_grows_the_result() {
        let cards = cards();
        let steps = [
            FilterState::default(),
            FilterState::default().with_type(CardType::Asset),
            FilterState::default().with_type(CardType::Asset).with_xp(0),
            FilterState::default()
                .with_type(CardType::Asset)
                .with_xp(0)
                .with_name("glass"),
            FilterState::default()
                .with_type(CardType::Asset)
                .with_xp(0)
                .with_name("glass")
                .with_expansions(["The Dunwich Legacy"]),
        ];
        let sizes: Vec<usize> = steps.iter().map(|f| filter_cards(&cards, f).len()).collect();
        assert!(sizes.windows(2).all(|w| w[1] <= w[0]), "{sizes:?}");
        assert_eq!(sizes.last(), Some(&0));
    }

    #[test]
    fn filtering_is_deterministic() {
        let cards = cards();
        let facets = FilterState::default().with_name("a");
        let first: Vec<String> = filter_cards(&cards, &facets).iter().map(|c| c.code.clone()).collect();
        let mut reversed: Vec<Card> = cards.clone();
        reversed.reverse();
        let second: Vec<String> = filter_cards(&reversed, &facets).iter().map(|c| c.code.clone()).collect();
        assert_eq!(first, second);
    }
}
