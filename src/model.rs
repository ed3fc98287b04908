// Typed card and pack records, plus the ingestion boundary that turns the
// untyped upstream JSON into them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::CatalogError;

const IMAGE_HOST: &str = "https://arkhamdb.com";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Guardian,
    Seeker,
    Rogue,
    Mystic,
    Survivor,
    Neutral,
    Mythos,
}

impl Faction {
    pub const ALL: [Faction; 7] = [
        Faction::Guardian,
        Faction::Seeker,
        Faction::Rogue,
        Faction::Mystic,
        Faction::Survivor,
        Faction::Neutral,
        Faction::Mythos,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Faction::Guardian => "guardian",
            Faction::Seeker => "seeker",
            Faction::Rogue => "rogue",
            Faction::Mystic => "mystic",
            Faction::Survivor => "survivor",
            Faction::Neutral => "neutral",
            Faction::Mythos => "mythos",
        }
    }
}

impl FromStr for Faction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Faction::ALL
            .into_iter()
            .find(|f| f.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown faction '{s}'"))
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Card type as reported by `type_code`. Scenario-only types the browser never
/// facets on (acts, agendas, scenarios, keys) are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardType {
    Investigator,
    Asset,
    Event,
    Skill,
    Treachery,
    Enemy,
    Location,
    Story,
    Weakness,
    BasicWeakness,
    Other(String),
}

impl CardType {
    pub fn code(&self) -> &str {
        match self {
            CardType::Investigator => "investigator",
            CardType::Asset => "asset",
            CardType::Event => "event",
            CardType::Skill => "skill",
            CardType::Treachery => "treachery",
            CardType::Enemy => "enemy",
            CardType::Location => "location",
            CardType::Story => "story",
            CardType::Weakness => "weakness",
            CardType::BasicWeakness => "basic_weakness",
            CardType::Other(code) => code,
        }
    }

    pub fn is_investigator(&self) -> bool {
        matches!(self, CardType::Investigator)
    }
}

impl FromStr for CardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        let card_type = match code.as_str() {
            "" => return Err("empty type code".to_string()),
            "investigator" => CardType::Investigator,
            "asset" => CardType::Asset,
            "event" => CardType::Event,
            "skill" => CardType::Skill,
            "treachery" => CardType::Treachery,
            "enemy" => CardType::Enemy,
            "location" => CardType::Location,
            "story" => CardType::Story,
            "weakness" => CardType::Weakness,
            "basic_weakness" => CardType::BasicWeakness,
            _ => CardType::Other(code),
        };
        Ok(card_type)
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for CardType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for CardType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Skills {
    pub willpower: Option<i32>,
    pub intellect: Option<i32>,
    pub combat: Option<i32>,
    pub agility: Option<i32>,
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        self.willpower.is_none()
            && self.intellect.is_none()
            && self.combat.is_none()
            && self.agility.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Card {
    pub code: String,
    pub name: String,
    pub subname: Option<String>,
    pub faction: Faction,
    pub faction_name: Option<String>,
    pub card_type: CardType,
    pub type_name: Option<String>,
    pub traits: Option<String>,
    pub pack_code: Option<String>,
    /// Upstream pack name, as received.
    pub pack_name: Option<String>,
    /// Canonical expansion name, filled in by the catalog builder.
    pub expansion: Option<String>,
    pub cost: Option<i32>,
    pub xp: Option<u32>,
    pub health: Option<i32>,
    pub sanity: Option<i32>,
    pub skills: Skills,
    pub text: Option<String>,
    pub flavor: Option<String>,
    pub imagesrc: Option<String>,
}

impl Card {
    /// XP with an absent value counted as level 0.
    pub fn xp_or_zero(&self) -> u32 {
        self.xp.unwrap_or(0)
    }

    pub fn cycle_code(&self) -> Option<&str> {
        self.pack_code.as_deref().map(crate::normalize::cycle_code)
    }

    pub fn image_url(&self) -> Option<String> {
        self.imagesrc
            .as_deref()
            .map(|src| format!("{IMAGE_HOST}{src}"))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Pack {
    pub code: String,
    pub name: String,
    /// Canonical expansion name the pack belongs to.
    pub expansion: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub code: String,
    pub name: String,
    pub packs: Vec<Pack>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CardTypeGroup {
    pub type_code: String,
    pub type_name: String,
    pub count: usize,
}

// --- Wire records ---
// Field names follow the upstream JSON. Every field is optional here; the
// conversions below decide what is actually required.

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawCard {
    code: Option<String>,
    name: Option<String>,
    subname: Option<String>,
    faction_code: Option<String>,
    faction_name: Option<String>,
    type_code: Option<String>,
    type_name: Option<String>,
    traits: Option<String>,
    pack_code: Option<String>,
    pack_name: Option<String>,
    cost: Option<i32>,
    xp: Option<u32>,
    health: Option<i32>,
    sanity: Option<i32>,
    skill_willpower: Option<i32>,
    skill_intellect: Option<i32>,
    skill_combat: Option<i32>,
    skill_agility: Option<i32>,
    text: Option<String>,
    flavor: Option<String>,
    imagesrc: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawPack {
    code: Option<String>,
    name: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("missing {field}")),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<RawCard> for Card {
    type Error = String;

    fn try_from(raw: RawCard) -> Result<Self, Self::Error> {
        let code = required(raw.code, "code")?;
        let name = required(raw.name, "name")?;
        let faction = required(raw.faction_code, "faction_code")?.parse()?;
        let card_type = required(raw.type_code, "type_code")?.parse()?;

        Ok(Card {
            code,
            name,
            subname: non_empty(raw.subname),
            faction,
            faction_name: non_empty(raw.faction_name),
            card_type,
            type_name: non_empty(raw.type_name),
            traits: non_empty(raw.traits),
            pack_code: non_empty(raw.pack_code),
            pack_name: non_empty(raw.pack_name),
            expansion: None,
            cost: raw.cost,
            xp: raw.xp,
            health: raw.health,
            sanity: raw.sanity,
            skills: Skills {
                willpower: raw.skill_willpower,
                intellect: raw.skill_intellect,
                combat: raw.skill_combat,
                agility: raw.skill_agility,
            },
            text: non_empty(raw.text),
            flavor: non_empty(raw.flavor),
            imagesrc: non_empty(raw.imagesrc),
        })
    }
}

fn decode<T: for<'de> Deserialize<'de>>(
    index: usize,
    value: serde_json::Value,
) -> Result<T, CatalogError> {
    if value.is_null() {
        return Err(CatalogError::MalformedRecord {
            index,
            reason: "null record".to_string(),
        });
    }
    serde_json::from_value(value).map_err(|e| CatalogError::MalformedRecord {
        index,
        reason: e.to_string(),
    })
}

fn card_from_value(index: usize, value: serde_json::Value) -> Result<Card, CatalogError> {
    let raw: RawCard = decode(index, value)?;
    Card::try_from(raw).map_err(|reason| CatalogError::MalformedRecord { index, reason })
}

fn pack_from_value(index: usize, value: serde_json::Value) -> Result<(String, String), CatalogError> {
    let raw: RawPack = decode(index, value)?;
    let malformed = |reason| CatalogError::MalformedRecord { index, reason };
    let code = required(raw.code, "code").map_err(malformed)?;
    let name = required(raw.name, "name").map_err(malformed)?;
    Ok((code, name))
}

/// Converts upstream card records, skipping any that are null or lack the
/// fields a card cannot exist without.
pub fn ingest_cards(values: Vec<serde_json::Value>) -> Vec<Card> {
    let total = values.len();
    let cards: Vec<Card> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match card_from_value(index, value) {
            Ok(card) => Some(card),
            Err(e) => {
                debug!("skipping card: {e}");
                None
            }
        })
        .collect();
    if cards.len() < total {
        debug!("ingested {} of {} card records", cards.len(), total);
    }
    cards
}

/// Converts upstream pack records into `(code, raw name)` pairs. Packs
/// without a name are dropped.
pub fn ingest_packs(values: Vec<serde_json::Value>) -> Vec<(String, String)> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match pack_from_value(index, value) {
            Ok(pack) => Some(pack),
            Err(e) => {
                debug!("skipping pack: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_full_card_record() {
        let cards = ingest_cards(vec![json!({
            "code": "01001",
            "name": "Roland Banks",
            "subname": "The Fed",
            "faction_code": "guardian",
            "faction_name": "Guardian",
            "type_code": "investigator",
            "type_name": "Investigator",
            "traits": "Agency. Detective.",
            "pack_code": "core",
            "pack_name": "Core Set",
            "health": 9,
            "sanity": 5,
            "skill_willpower": 3,
            "skill_intellect": 3,
            "skill_combat": 4,
            "skill_agility": 2,
            "imagesrc": "/bundles/cards/01001.png"
        })]);

        assert_eq!(cards.len(), 1);
        let roland = &cards[0];
        assert_eq!(roland.faction, Faction::Guardian);
        assert_eq!(roland.card_type, CardType::Investigator);
        assert_eq!(roland.skills.combat, Some(4));
        assert_eq!(roland.xp, None);
        assert_eq!(roland.xp_or_zero(), 0);
        assert_eq!(
            roland.image_url().as_deref(),
            Some("https://arkhamdb.com/bundles/cards/01001.png")
        );
        assert_eq!(roland.cycle_code(), Some("co"));
    }

    #[test]
    fn skips_null_and_incomplete_records() {
        let cards = ingest_cards(vec![
            serde_json::Value::Null,
            json!({ "code": "01002", "faction_code": "guardian", "type_code": "asset" }),
            json!({ "code": "01003", "name": "Bad", "faction_code": "purple", "type_code": "asset" }),
            json!("not an object"),
            json!({ "code": "01006", "name": ".45 Automatic", "faction_code": "guardian", "type_code": "asset", "xp": 0 }),
        ]);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].code, "01006");
    }

    #[test]
    fn unknown_type_codes_are_kept() {
        let cards = ingest_cards(vec![json!({
            "code": "01104", "name": "Trapped", "faction_code": "mythos", "type_code": "scenario"
        })]);
        assert_eq!(cards[0].card_type, CardType::Other("scenario".to_string()));
        assert_eq!(cards[0].card_type.code(), "scenario");
    }

    #[test]
    fn packs_without_names_are_dropped() {
        let packs = ingest_packs(vec![
            json!({ "code": "core", "name": "Core Set" }),
            json!({ "code": "dwl" }),
            json!({ "code": "x", "name": "" }),
            serde_json::Value::Null,
        ]);
        assert_eq!(packs, vec![("core".to_string(), "Core Set".to_string())]);
    }

    #[test]
    fn faction_codes_parse_case_insensitively() {
        assert_eq!("Seeker".parse::<Faction>(), Ok(Faction::Seeker));
        assert!("multi".parse::<Faction>().is_err());
        assert_eq!(Faction::Mythos.to_string(), "mythos");
    }
}
