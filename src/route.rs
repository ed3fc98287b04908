// Faction/type route parameters. A missing or unknown parameter sends the
// user back to the faction picker instead of showing an error.

use tracing::info;

use crate::error::{CatalogError, Result};
use crate::model::{CardType, Faction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Factions,
    Types(Faction),
    Cards(Faction, CardType),
}

pub fn parse_faction(faction: Option<&str>) -> Result<Faction> {
    faction
        .filter(|f| !f.trim().is_empty())
        .and_then(|f| f.parse().ok())
        .ok_or(CatalogError::MissingFacetParameter("faction"))
}

pub fn parse_type(card_type: Option<&str>) -> Result<CardType> {
    card_type
        .filter(|t| !t.trim().is_empty())
        .and_then(|t| t.parse().ok())
        .ok_or(CatalogError::MissingFacetParameter("type"))
}

/// Picks the view for the given parameters, falling back to the faction
/// picker when the faction is missing. A missing type shows the type
/// picker for that faction.
pub fn resolve_view(faction: Option<&str>, card_type: Option<&str>) -> View {
    let faction = match parse_faction(faction) {
        Ok(faction) => faction,
        Err(e) => {
            info!("{e}, showing factions");
            return View::Factions;
        }
    };
    match card_type {
        None => View::Types(faction),
        Some(_) => match parse_type(card_type) {
            Ok(card_type) => View::Cards(faction, card_type),
            Err(e) => {
                info!("{e}, showing factions");
                View::Factions
            }
        },
    }
}
