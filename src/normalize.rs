// Static lookup tables: pack name normalization, cycle names, display names.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Canonical expansion names, in release order.
pub const CANONICAL_EXPANSIONS: &[&str] = &[
    "Revised Core Set",
    "The Dunwich Legacy",
    "The Path To Carcosa",
    "The Forgotten Age",
    "The Circle Undone",
    "The Dream Eaters",
    "The Innsmouth Conspiracy",
    "Edge Of The Earth",
    "The Scarlet Keys",
    "The Feast Of Hemlock Vale",
];

// Canonical expansion name followed by every upstream spelling that maps to it.
const PACK_NAME_VARIANTS: &[(&str, &[&str])] = &[
    ("Revised Core Set", &["Core Set", "Revised Core", "Revised Core Set"]),
    (
        "The Dunwich Legacy",
        &["Dunwich", "Dunwich Legacy", "The Dunwich Legacy", "Dunwich Horror"],
    ),
    (
        "Return to The Dunwich Legacy",
        &[
            "Return to the Dunwich Legacy",
            "Return to Dunwich Legacy",
            "Return To The Dunwich Legacy",
        ],
    ),
    (
        "The Path To Carcosa",
        &["Carcosa", "Path to Carcosa", "The Path to Carcosa", "Path To Carcosa"],
    ),
    (
        "Return to The Path to Carcosa",
        &[
            "Return to the Path to Carcosa",
            "Return to Path to Carcosa",
            "Return To The Path to Carcosa",
        ],
    ),
    ("The Forgotten Age", &["Forgotten", "Forgotten Age", "The Forgotten Age"]),
    (
        "Return to The Forgotten Age",
        &["Return to the Forgotten Age", "Return To The Forgotten Age"],
    ),
    ("The Circle Undone", &["Circle", "Circle Undone", "The Circle Undone"]),
    (
        "Return to The Circle Undone",
        &["Return to the Circle Undone", "Return To The Circle Undone"],
    ),
    (
        "The Dream Eaters",
        &["Dream", "Dream Eaters", "Dream-Eaters", "The Dream-Eaters", "The Dream Eaters"],
    ),
    (
        "The Innsmouth Conspiracy",
        &["Innsmouth", "Innsmouth Conspiracy", "The Innsmouth Conspiracy"],
    ),
    (
        "Edge Of The Earth",
        &["Edge", "Edge of Earth", "Edge of the Earth", "Edge Of Earth", "Edge Of The Earth"],
    ),
    (
        "The Scarlet Keys",
        &[
            "Scarlet",
            "Scarlet Keys",
            "The Scarlet Keys",
            "The Scarlet Keys Campaign Expansion",
            "The Scarlet Keys Investigator Expansion",
        ],
    ),
    (
        "The Feast Of Hemlock Vale",
        &[
            "Hemlock",
            "Hemlock Vale",
            "Feast of Hemlock",
            "Feast of Hemlock Vale",
            "The Feast of Hemlock Vale",
            "The Feast Of Hemlock Vale",
            "The Feast of Hemlock Vale Campaign Expansion",
            "The Feast of Hemlock Vale Investigator Expansion",
        ],
    ),
];

fn lookup_variant(raw: &str, matches: impl Fn(&str, &str) -> bool) -> Option<&'static str> {
    PACK_NAME_VARIANTS
        .iter()
        .find(|(_, variants)| variants.iter().any(|variant| matches(variant, raw)))
        .map(|(canonical, _)| *canonical)
}

/// Maps a raw upstream pack name to its canonical expansion name.
///
/// Names missing from the table pass through unchanged, and an absent or
/// empty name stays absent. Every canonical name maps to itself, so the
/// function is idempotent.
pub fn normalize_pack_name(raw: Option<&str>) -> Option<&str> {
    let raw = raw.filter(|name| !name.is_empty())?;
    Some(lookup_variant(raw, |variant, raw| variant == raw).unwrap_or(raw))
}

/// Like [`normalize_pack_name`], but matches the variant table ignoring
/// ASCII case. Meant for user input, not upstream data.
pub fn normalize_pack_name_ignore_case(raw: &str) -> Option<&'static str> {
    lookup_variant(raw.trim(), |variant, raw| variant.eq_ignore_ascii_case(raw))
}

/// Cycle/box code of a pack: its first two characters.
pub fn cycle_code(pack_code: &str) -> &str {
    match pack_code.char_indices().nth(2) {
        Some((end, _)) => &pack_code[..end],
        None => pack_code,
    }
}

/// Human-readable cycle name. Unknown codes get a synthetic label.
pub fn cycle_name(code: &str) -> Cow<'static, str> {
    let name = match code {
        "01" => "Core Set",
        "02" => "The Dunwich Legacy",
        "03" => "The Path to Carcosa",
        "04" => "The Forgotten Age",
        "05" => "The Circle Undone",
        "06" => "The Dream-Eaters",
        "07" => "The Innsmouth Conspiracy",
        "08" => "Edge of the Earth",
        "09" => "The Scarlet Keys",
        "10" => "The Feast of Hemlock Vale",
        "pt" => "Promotional",
        "ro" => "Return to",
        "si" => "Standalone",
        _ => return Cow::Owned(format!("Cycle {code}")),
    };
    Cow::Borrowed(name)
}

pub fn faction_name(code: &str) -> &str {
    match code {
        "guardian" => "Guardian",
        "seeker" => "Seeker",
        "rogue" => "Rogue",
        "mystic" => "Mystic",
        "survivor" => "Survivor",
        "neutral" => "Neutral",
        "mythos" => "Mythos",
        other => other,
    }
}

/// Display name for a type code, used when a record carries no `type_name`.
pub fn type_name(code: &str) -> String {
    match code {
        "basic_weakness" => "Basic Weakness".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

pub fn type_icon(code: &str) -> &'static str {
    match code {
        "asset" => "💠",
        "event" => "⚡",
        "skill" => "✨",
        "treachery" => "☠️",
        "enemy" => "👿",
        "investigator" => "🔍",
        "location" => "🏛️",
        "story" => "📖",
        "basic_weakness" => "💀",
        "weakness" => "☠️",
        _ => "❓",
    }
}

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("valid regex"));

/// Strips `<b>`-style markup and unwraps `[[Trait]]` links from card text.
pub fn clean_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let without_tags = HTML_TAG.replace_all(text, "");
    WIKI_LINK.replace_all(&without_tags, "$1").into_owned()
}
