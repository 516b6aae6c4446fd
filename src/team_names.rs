use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::league_config::League;

/// Normalized alias -> normalized canonical name.
pub type AliasTable = HashMap<String, String>;

static BASKETBALL_ALIASES: Lazy<AliasTable> = Lazy::new(|| {
    [
        ("uconn", "connecticut"),
        ("olemiss", "mississippi"),
        ("penn", "pennsylvania"),
        ("upenn", "pennsylvania"),
        ("stmarys", "saintmarys"),
        ("stmarysca", "saintmarys"),
        ("statemarys", "saintmarys"),
        ("statejohns", "saintjohns"),
        ("umkc", "kansascity"),
        ("fullerton", "calstfullerton"),
        ("longbeachstate", "calstlongbeach"),
        ("northridge", "calstnorthridge"),
        ("bakersfield", "calstbakersfield"),
        ("stthomasmn", "stthomas"),
        ("ulmonroe", "louisianamonroe"),
        ("louisiana", "louisianalafayette"),
        ("appstate", "appalachianstate"),
        ("westerncaro", "westerncarolina"),
        ("southerncaro", "southcarolina"),
        ("eastcaro", "eastcarolina"),
        ("coastalcaro", "coastalcarolina"),
        ("ncstate", "northcarolinastate"),
        ("armypowers", "army"),
        ("armywestpoint", "army"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
});

pub const NBA_TRICODES: &[(&str, &str)] = &[
    ("ATL", "Atlanta Hawks"),
    ("BOS", "Boston Celtics"),
    ("BKN", "Brooklyn Nets"),
    ("CHA", "Charlotte Hornets"),
    ("CHI", "Chicago Bulls"),
    ("CLE", "Cleveland Cavaliers"),
    ("DAL", "Dallas Mavericks"),
    ("DEN", "Denver Nuggets"),
    ("DET", "Detroit Pistons"),
    ("GSW", "Golden State Warriors"),
    ("HOU", "Houston Rockets"),
    ("IND", "Indiana Pacers"),
    ("LAC", "LA Clippers"),
    ("LAL", "Los Angeles Lakers"),
    ("MEM", "Memphis Grizzlies"),
    ("MIA", "Miami Heat"),
    ("MIL", "Milwaukee Bucks"),
    ("MIN", "Minnesota Timberwolves"),
    ("NOP", "New Orleans Pelicans"),
    ("NYK", "New York Knicks"),
    ("OKC", "Oklahoma City Thunder"),
    ("ORL", "Orlando Magic"),
    ("PHI", "Philadelphia 76ers"),
    ("PHX", "Phoenix Suns"),
    ("POR", "Portland Trail Blazers"),
    ("SAC", "Sacramento Kings"),
    ("SAS", "San Antonio Spurs"),
    ("TOR", "Toronto Raptors"),
    ("UTA", "Utah Jazz"),
    ("WAS", "Washington Wizards"),
];

pub const EURO_TRICODES: &[(&str, &str)] = &[
    ("ALB", "ALBA Berlin"),
    ("EFS", "Anadolu Efes Istanbul"),
    ("ASM", "AS Monaco"),
    ("BKN", "Baskonia Vitoria-Gasteiz"),
    ("CZV", "Crvena Zvezda Meridianbet Belgrade"),
    ("MIL", "EA7 Emporio Armani Milan"),
    ("BAR", "FC Barcelona"),
    ("BAY", "FC Bayern Munich"),
    ("FBB", "Fenerbahce Beko Istanbul"),
    ("ASV", "LDLC ASVEL Villeurbanne"),
    ("MTA", "Maccabi Playtika Tel Aviv"),
    ("OLY", "Olympiacos Piraeus"),
    ("PAO", "Panathinaikos Aktor Athens"),
    ("PAR", "Paris Basketball"),
    ("PTZ", "Partizan Mozzart Bet Belgrade"),
    ("RMB", "Real Madrid"),
    ("VIR", "Virtus Segafredo Bologna"),
    ("ZAL", "Zalgiris Kaunas"),
];

pub const EUROCUP_TRICODES: &[(&str, &str)] = &[
    ("BES", "Besiktas Fibabanka Istanbul"),
    ("BUD", "Buducnost VOLI Podgorica"),
    ("CED", "Cedevita Olimpija Ljubljana"),
    ("GAL", "Dreamland Gran Canaria"),
    ("HTA", "Hapoel Tel Aviv"),
    ("JER", "Hapoel Jerusalem"),
    ("LIE", "Lietkabelis Panevezys"),
    ("BRE", "Bahcesehir College Istanbul"),
    ("TRE", "Dolomiti Energia Trento"),
    ("TUR", "Turk Telekom Ankara"),
    ("ULM", "ratiopharm Ulm"),
    ("VAL", "Valencia Basket"),
    ("VEN", "Umana Reyer Venice"),
    ("WOL", "Wolves Twinsbet Vilnius"),
    ("ARI", "Aris Midea Thessaloniki"),
    ("BOU", "JL Bourg-en-Bresse"),
    ("CLU", "U-BT Cluj-Napoca"),
    ("HAM", "Veolia Towers Hamburg"),
    ("SAB", "Slask Wroclaw"),
    ("BAH", "Manresa"),
];

pub fn basketball_aliases() -> &'static AliasTable {
    &BASKETBALL_ALIASES
}

pub fn tricodes(league: League) -> &'static [(&'static str, &'static str)] {
    match league {
        League::Nba => NBA_TRICODES,
        League::Euro => EURO_TRICODES,
        League::EuroCup => EUROCUP_TRICODES,
        League::Ncaa | League::Nbl | League::Acb => &[],
    }
}

/// Full team name for a league tricode, or the input unchanged.
pub fn expand_tricode(league: League, code: &str) -> &str {
    let trimmed = code.trim();
    tricodes(league)
        .iter()
        .find(|(tri, _)| tri.eq_ignore_ascii_case(trimmed))
        .map(|(_, full)| *full)
        .unwrap_or(code)
}

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("St.", "State"),
    ("N.", "North"),
    ("S.", "South"),
    ("E.", "East"),
    ("W.", "West"),
    ("Fla.", "Florida"),
    ("Pa.", "Pennsylvania"),
    ("Ga.", "Georgia"),
    ("Ky.", "Kentucky"),
    ("Tenn.", "Tennessee"),
    ("Ill.", "Illinois"),
    ("Mich.", "Michigan"),
    ("Ala.", "Alabama"),
    ("Miss.", "Mississippi"),
    ("Ariz.", "Arizona"),
    ("Colo.", "Colorado"),
    ("Wash.", "Washington"),
    ("Calif.", "California"),
    ("Ind.", "Indiana"),
    ("La.", "Louisiana"),
    ("Ark.", "Arkansas"),
    ("Okla.", "Oklahoma"),
    ("Tex.", "Texas"),
    ("Ore.", "Oregon"),
    ("Va.", "Virginia"),
    ("Conn.", "Connecticut"),
    ("Mass.", "Massachusetts"),
    ("Neb.", "Nebraska"),
    ("Kan.", "Kansas"),
];

fn expand_token(token: &str) -> Option<&'static str> {
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == token)
        .map(|(_, full)| *full)
}

/// "St.John's" style tokens where the abbreviation runs into a word.
fn expand_token_prefix(token: &str) -> Option<(&'static str, &str)> {
    ABBREVIATIONS.iter().find_map(|(abbr, full)| {
        let rest = token.strip_prefix(abbr)?;
        let joined_word = rest.starts_with(|c: char| c.is_alphabetic()) && !rest.contains('.');
        joined_word.then_some((*full, rest))
    })
}

/// Lowercased, punctuation-free form used for every comparison stage.
pub fn normalize_team_name(name: &str) -> String {
    let mut expanded = String::with_capacity(name.len() + 8);
    for token in name.split_whitespace() {
        let inner = token.trim_start_matches('(').trim_end_matches(')');
        if let Some(full) = expand_token(inner) {
            expanded.push_str(full);
        } else if let Some((full, rest)) = expand_token_prefix(inner) {
            expanded.push_str(full);
            expanded.push_str(rest);
        } else {
            expanded.push_str(token);
        }
    }
    expanded
        .chars()
        .filter(|c| !matches!(c, '.' | '(' | ')' | '\'' | '\u{2019}' | '-') && !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Resolve a raw team name to a key of `mapping`.
///
/// Stages, first hit wins: exact key, normalized equality, alias lookup, then
/// bidirectional substring containment. Ties go to the first candidate in the
/// map's insertion order, so "Miami" against both "Miami (OH)" and "Miami (FL)"
/// resolves to whichever was inserted first.
pub fn resolve_team_name<'a, V>(
    raw: &str,
    mapping: &'a IndexMap<String, V>,
    aliases: Option<&AliasTable>,
) -> Option<&'a str> {
    if raw.trim().is_empty() || mapping.is_empty() {
        return None;
    }
    if let Some((key, _)) = mapping.get_key_value(raw) {
        return Some(key.as_str());
    }

    let query = normalize_team_name(raw);
    if query.is_empty() {
        return None;
    }
    let candidates: Vec<(&'a str, String)> = mapping
        .keys()
        .map(|k| (k.as_str(), normalize_team_name(k)))
        .collect();

    if let Some((key, _)) = candidates.iter().find(|(_, norm)| *norm == query) {
        return Some(*key);
    }

    let alias_target = aliases.and_then(|table| table.get(&query));
    if let Some(target) = alias_target
        && let Some((key, _)) = candidates.iter().find(|(_, norm)| norm == target)
    {
        return Some(*key);
    }

    let substring_hit = |needle: &str| {
        candidates
            .iter()
            .find(|(_, norm)| !norm.is_empty() && (needle.contains(norm.as_str()) || norm.contains(needle)))
            .map(|(key, _)| *key)
    };
    substring_hit(&query).or_else(|| alias_target.and_then(|target| substring_hit(target.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_expands() {
        assert_eq!(normalize_team_name("Saint Mary's (CA)"), "saintmarysca");
        assert_eq!(normalize_team_name("Miami (Fla.)"), "miamiflorida");
        assert_eq!(normalize_team_name("N. Carolina St."), "northcarolinastate");
        assert_eq!(normalize_team_name("Baskonia Vitoria-Gasteiz"), "baskoniavitoriagasteiz");
    }

    #[test]
    fn abbreviation_joined_to_a_word_is_expanded() {
        assert_eq!(normalize_team_name("St.John's"), "statejohns");
        assert_eq!(normalize_team_name("St.John's"), normalize_team_name("St. John's"));
        assert_eq!(normalize_team_name("(St.John's)"), "statejohns");
        assert_eq!(normalize_team_name("N.C. State"), "ncstate");
        assert_eq!(normalize_team_name("Stanford"), "stanford");
    }

    #[test]
    fn expand_tricode_is_case_insensitive() {
        assert_eq!(expand_tricode(League::Nba, "bos"), "Boston Celtics");
        assert_eq!(expand_tricode(League::Euro, "BKN"), "Baskonia Vitoria-Gasteiz");
        assert_eq!(expand_tricode(League::Ncaa, "DUKE"), "DUKE");
    }
}
