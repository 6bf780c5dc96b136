//! Station Registry: the canonical ordered list of reporting stations for a
//! document type, plus the name-matching policy used during extraction.
//!
//! ## Why aliases are first-class
//!
//! The same station is spelled differently across report years and report
//! kinds: `Cox's Bazar`, `CoxsBazar`, and `Cox' Bazar` all denote one
//! station; `Bogura` appears as `Bogra` in older crop reports. Inline string
//! comparisons against a single spelling silently drop those rows; the
//! dominant source of data loss in ad-hoc extraction scripts. Here every
//! canonical station carries an explicit alias table, and matching resolves
//! any known spelling to the one canonical entry and its registry position.

use serde::{Deserialize, Serialize};

/// One canonical reporting station.
///
/// The registry position of a station defines its row position in the final
/// output table; the alias list covers the spelling drift observed in real
/// documents. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Canonical name, used verbatim in the output's Station column.
    pub name: String,
    /// Alternative spellings that resolve to this station.
    pub aliases: Vec<String>,
}

impl Station {
    /// A station with no known alternative spellings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    /// A station with alternative spellings.
    pub fn with_aliases<I, S>(name: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }
}

/// How a raw extracted token is compared against canonical names and aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPolicy {
    /// Byte-for-byte equality after trimming surrounding whitespace.
    Exact,
    /// Case-insensitive equality after trimming. The default: report
    /// typesetting flips casing freely (`chandpur` vs `Chandpur`).
    #[default]
    CaseInsensitive,
    /// The canonical name or an alias is contained inside the raw token,
    /// case-insensitively. Used for table cells that embed extra words
    /// (`Tangail Region`, `Greater Dhaka`).
    Substring,
}

/// Canonical ordered station list plus matching policy for one document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRegistry {
    stations: Vec<Station>,
    policy: MatchPolicy,
}

impl StationRegistry {
    pub fn new(stations: Vec<Station>, policy: MatchPolicy) -> Self {
        Self { stations, policy }
    }

    /// Number of canonical stations, and therefore the exact row count of
    /// every reconciled output table.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Stations in canonical output order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Canonical name at a registry position.
    pub fn name(&self, index: usize) -> &str {
        &self.stations[index].name
    }

    /// Strip surrounding whitespace from a raw token before matching.
    pub fn normalize(raw: &str) -> &str {
        raw.trim()
    }

    /// Resolve a raw extracted token to a registry position.
    ///
    /// Returns `None` when the token matches no canonical name or alias.
    /// Unmatched tokens are expected (page headers, totals rows, and the
    /// Year column all flow through here), so the caller drops them silently.
    pub fn match_token(&self, raw: &str) -> Option<usize> {
        let raw = Self::normalize(raw);
        if raw.is_empty() {
            return None;
        }
        self.stations
            .iter()
            .position(|station| self.matches(station, raw))
    }

    fn matches(&self, station: &Station, raw: &str) -> bool {
        let candidates = std::iter::once(station.name.as_str())
            .chain(station.aliases.iter().map(String::as_str));
        match self.policy {
            MatchPolicy::Exact => candidates.into_iter().any(|c| c == raw),
            MatchPolicy::CaseInsensitive => {
                let raw = raw.to_lowercase();
                candidates.into_iter().any(|c| c.to_lowercase() == raw)
            }
            MatchPolicy::Substring => {
                let raw = raw.to_lowercase();
                candidates
                    .into_iter()
                    .any(|c| raw.contains(&c.to_lowercase()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(policy: MatchPolicy) -> StationRegistry {
        StationRegistry::new(
            vec![
                Station::with_aliases("Cox's Bazar", ["CoxsBazar", "Cox' Bazar"]),
                Station::new("Dhaka"),
                Station::with_aliases("Bogura", ["Bogra"]),
            ],
            policy,
        )
    }

    #[test]
    fn exact_match_requires_identical_spelling() {
        let reg = registry(MatchPolicy::Exact);
        assert_eq!(reg.match_token("Dhaka"), Some(1));
        assert_eq!(reg.match_token("dhaka"), None);
    }

    #[test]
    fn alias_resolves_to_canonical_position() {
        let reg = registry(MatchPolicy::Exact);
        assert_eq!(reg.match_token("CoxsBazar"), Some(0));
        assert_eq!(reg.match_token("Cox' Bazar"), Some(0));
        assert_eq!(reg.match_token("Bogra"), Some(2));
    }

    #[test]
    fn case_insensitive_tolerates_casing_drift() {
        let reg = registry(MatchPolicy::CaseInsensitive);
        assert_eq!(reg.match_token("DHAKA"), Some(1));
        assert_eq!(reg.match_token("coxsbazar"), Some(0));
    }

    #[test]
    fn substring_matches_embedded_names() {
        let reg = registry(MatchPolicy::Substring);
        assert_eq!(reg.match_token("Greater Dhaka District"), Some(1));
        assert_eq!(reg.match_token("bogra region"), Some(2));
    }

    #[test]
    fn unmatched_tokens_return_none() {
        let reg = registry(MatchPolicy::CaseInsensitive);
        assert_eq!(reg.match_token("Station"), None);
        assert_eq!(reg.match_token("2017"), None);
        assert_eq!(reg.match_token(""), None);
        assert_eq!(reg.match_token("   "), None);
    }

    #[test]
    fn normalize_trims_whitespace() {
        let reg = registry(MatchPolicy::Exact);
        assert_eq!(reg.match_token("  Dhaka  "), Some(1));
    }

    #[test]
    fn first_matching_station_wins_on_overlap() {
        // "Cox's Bazar" and "Dhaka" cannot overlap, but with Substring a raw
        // token could contain two canonical names; registry order decides.
        let reg = StationRegistry::new(
            vec![Station::new("Rangpur"), Station::new("Rang")],
            MatchPolicy::Substring,
        );
        assert_eq!(reg.match_token("Rangpur"), Some(0));
    }
}
