// In-memory deck draft. Nothing here is persisted or checked for legality.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::model::Card;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub card_code: String,
    pub quantity: u32,
}

#[derive(Serialize, Debug, Clone)]
pub struct DeckDraft {
    pub name: String,
    pub description: Option<String>,
    pub investigator_code: Option<String>,
    entries: Vec<DeckEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeckDraft {
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        DeckDraft {
            name: name.to_string(),
            description: None,
            investigator_code: None,
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn set_investigator(&mut self, card: &Card) {
        self.investigator_code = Some(card.code.clone());
        self.touch();
    }

    pub fn quantity(&self, card_code: &str) -> u32 {
        self.entries
            .iter()
            .find(|entry| entry.card_code == card_code)
            .map_or(0, |entry| entry.quantity)
    }

    /// Sets the copies of `card_code`; zero removes the entry.
    pub fn set_quantity(&mut self, card_code: &str, quantity: u32) {
        match self.entries.iter().position(|e| e.card_code == card_code) {
            Some(i) if quantity == 0 => {
                self.entries.remove(i);
            }
            Some(i) => self.entries[i].quantity = quantity,
            None if quantity == 0 => return,
            None => self.entries.push(DeckEntry {
                card_code: card_code.to_string(),
                quantity,
            }),
        }
        debug!("deck '{}': {card_code} x{quantity}", self.name);
        self.touch();
    }

    pub fn add(&mut self, card_code: &str, copies: u32) {
        let quantity = self.quantity(card_code).saturating_add(copies);
        self.set_quantity(card_code, quantity);
    }

    pub fn remove(&mut self, card_code: &str, copies: u32) {
        let quantity = self.quantity(card_code).saturating_sub(copies);
        self.set_quantity(card_code, quantity);
    }

    pub fn total_cards(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Entries paired with their catalog cards, in display order. Entries
    /// whose code the catalog does not know are left out.
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Vec<(&'a Card, u32)> {
        let mut resolved: Vec<(&Card, u32)> = self
            .entries
            .iter()
            .filter_map(|e| catalog.find(&e.card_code).map(|card| (card, e.quantity)))
            .collect();
        resolved.sort_by(|(a, _), (b, _)| crate::filter::display_order(a, b));
        resolved
    }
}
