//! Card catalog pipeline for the ArkhamDB public API.
//!
//! The raw card and pack lists are fetched once, pack names are normalized
//! to canonical expansion names and the result is indexed by faction, type
//! and cycle. [`filter::filter_cards`] then applies the user's facets (name,
//! expansions, XP, faction, type/subtype) to produce a de-duplicated,
//! display-ordered card list.
//!
//! ```text
//! CardSource ──▶ Catalog (normalize + index) ──▶ filter_cards ──▶ display
//!                   ▲
//!             CatalogCache (single-flight, reload tickets)
//! ```

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod deck;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod route;
pub mod selection;
pub mod snapshot;

pub use api::{ArkhamDbClient, CardSource, StaticSource};
pub use cache::{CatalogCache, Ticket};
pub use catalog::{type_counts, Catalog};
pub use error::{CatalogError, Result};
pub use filter::{filter_cards, FilterState};
pub use model::{Card, CardType, CardTypeGroup, Cycle, Faction, Pack};
pub use normalize::{cycle_name, normalize_pack_name};
pub use selection::ExpansionSelection;
