//! Stop name resolution.
//!
//! Timetable headers and user queries name stops loosely: "Civic Ctr",
//! "Adderley St", "Bellville Stn". Resolution first tries an exact match on
//! the normalized name or stop code, then falls back to scoring token
//! overlap against each stop's name, address, code and route tokens.

use std::collections::{HashMap, HashSet};

use crate::domain::Stop;

/// Split a label into canonical upper-case tokens.
///
/// ```
/// use transit_server::network::tokenize;
///
/// assert_eq!(tokenize("Main Rd & 5th St."), vec!["MAIN", "ROAD", "5TH", "STREET"]);
/// ```
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.to_uppercase()
        .replace('&', " ")
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| canonical_token(part).to_string())
        .collect()
}

/// Fold common street and place abbreviations onto one spelling.
fn canonical_token(token: &str) -> &str {
    match token {
        "RD" | "ROAD" => "ROAD",
        "DRV" | "DRIVE" | "DR" => "DRIVE",
        "ST" | "STREET" | "STR" => "STREET",
        "STN" | "STATION" => "STATION",
        "CTR" | "CNTR" | "CENTRE" => "CENTRE",
        "AVE" | "AVENUE" => "AVENUE",
        "PK" | "PARK" => "PARK",
        "PKY" | "PKWY" | "PARKWAY" => "PARKWAY",
        other => other,
    }
}

/// Key used for exact matches: the canonical tokens joined by spaces.
fn exact_key(raw: &str) -> String {
    tokenize(raw).join(" ")
}

/// Name and token lookup over a stop slice.
#[derive(Debug, Clone, Default)]
pub struct StopResolver {
    exact: HashMap<String, usize>,
    tokens: Vec<HashSet<String>>,
}

impl StopResolver {
    pub fn new(stops: &[impl AsRef<Stop>]) -> Self {
        let mut exact = HashMap::new();
        let mut tokens = Vec::with_capacity(stops.len());

        for (idx, stop) in stops.iter().enumerate() {
            let stop = stop.as_ref();
            exact.entry(exact_key(stop.name())).or_insert(idx);
            if let Some(code) = stop.code() {
                exact.entry(exact_key(code)).or_insert(idx);
            }

            let mut set: HashSet<String> = tokenize(stop.name()).into_iter().collect();
            set.extend(stop.address().map(tokenize).unwrap_or_default());
            set.extend(stop.code().map(tokenize).unwrap_or_default());
            for route in stop.route_codes() {
                set.extend(tokenize(route));
            }
            tokens.push(set);
        }

        Self { exact, tokens }
    }

    /// Resolve a label to a stop index.
    ///
    /// An exact name or code match wins. Otherwise the first stop matching
    /// every query token is returned, or failing that the stop matching the
    /// most tokens.
    pub fn resolve(&self, label: &str) -> Option<usize> {
        let key = exact_key(label);
        if key.is_empty() {
            return None;
        }
        if let Some(&idx) = self.exact.get(&key) {
            return Some(idx);
        }

        let query = query_tokens(label);
        let mut best: Option<(usize, usize)> = None;

        for (idx, stop_tokens) in self.tokens.iter().enumerate() {
            let score = query.iter().filter(|t| stop_tokens.contains(*t)).count();
            if score == query.len() {
                return Some(idx);
            }
            if score > best.map_or(0, |(s, _)| s) {
                best = Some((score, idx));
            }
        }

        best.map(|(_, idx)| idx)
    }

    /// Rank stops against a free-text query for autocomplete.
    ///
    /// Whole-token matches score above prefix matches; an exact name or code
    /// match is always first. Ties keep stop order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<usize> {
        let query = query_tokens(query);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        let exact = self.exact.get(&query.join(" ")).copied();

        let mut scored: Vec<(usize, usize)> = self
            .tokens
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != exact)
            .filter_map(|(idx, stop_tokens)| {
                let score: usize = query
                    .iter()
                    .map(|q| {
                        if stop_tokens.contains(q) {
                            2
                        } else if stop_tokens.iter().any(|t| t.starts_with(q.as_str())) {
                            1
                        } else {
                            0
                        }
                    })
                    .sum();
                (score > 0).then_some((score, idx))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        exact
            .into_iter()
            .chain(scored.into_iter().map(|(_, idx)| idx))
            .take(limit)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Query tokens with duplicates removed, in order.
fn query_tokens(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(raw)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
