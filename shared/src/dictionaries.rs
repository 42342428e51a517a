/// Static facts about one state-level jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    pub name: &'static str,
    pub abbr: &'static str,
    /// Two-digit FIPS code, kept as text so the leading zero survives.
    pub fips: &'static str,
    /// Voting congressional districts. At-large states have 1, non-voting
    /// jurisdictions 0.
    pub districts: u32,
}

const fn state(
    name: &'static str,
    abbr: &'static str,
    fips: &'static str,
    districts: u32,
) -> StateInfo {
    StateInfo {
        name,
        abbr,
        fips,
        districts,
    }
}

/// States plus DC and Puerto Rico, ordered by FIPS code.
pub const STATES: &[StateInfo] = &[
    state("Alabama", "AL", "01", 7),
    state("Alaska", "AK", "02", 1),
    state("Arizona", "AZ", "04", 9),
    state("Arkansas", "AR", "05", 4),
    state("California", "CA", "06", 53),
    state("Colorado", "CO", "08", 7),
    state("Connecticut", "CT", "09", 5),
    state("Delaware", "DE", "10", 1),
    state("District of Columbia", "DC", "11", 0),
    state("Florida", "FL", "12", 27),
    state("Georgia", "GA", "13", 14),
    state("Hawaii", "HI", "15", 2),
    state("Idaho", "ID", "16", 2),
    state("Illinois", "IL", "17", 18),
    state("Indiana", "IN", "18", 9),
    state("Iowa", "IA", "19", 4),
    state("Kansas", "KS", "20", 4),
    state("Kentucky", "KY", "21", 6),
    state("Louisiana", "LA", "22", 6),
    state("Maine", "ME", "23", 2),
    state("Maryland", "MD", "24", 8),
    state("Massachusetts", "MA", "25", 9),
    state("Michigan", "MI", "26", 14),
    state("Minnesota", "MN", "27", 8),
    state("Mississippi", "MS", "28", 4),
    state("Missouri", "MO", "29", 8),
    state("Montana", "MT", "30", 1),
    state("Nebraska", "NE", "31", 3),
    state("Nevada", "NV", "32", 4),
    state("New Hampshire", "NH", "33", 2),
    state("New Jersey", "NJ", "34", 12),
    state("New Mexico", "NM", "35", 3),
    state("New York", "NY", "36", 27),
    state("North Carolina", "NC", "37", 13),
    state("North Dakota", "ND", "38", 1),
    state("Ohio", "OH", "39", 16),
    state("Oklahoma", "OK", "40", 5),
    state("Oregon", "OR", "41", 5),
    state("Pennsylvania", "PA", "42", 18),
    state("Rhode Island", "RI", "44", 2),
    state("South Carolina", "SC", "45", 7),
    state("South Dakota", "SD", "46", 1),
    state("Tennessee", "TN", "47", 9),
    state("Texas", "TX", "48", 36),
    state("Utah", "UT", "49", 4),
    state("Vermont", "VT", "50", 1),
    state("Virginia", "VA", "51", 11),
    state("Washington", "WA", "53", 10),
    state("West Virginia", "WV", "54", 3),
    state("Wisconsin", "WI", "55", 8),
    state("Wyoming", "WY", "56", 1),
    state("Puerto Rico", "PR", "72", 0),
];

pub fn state_by_abbr(abbr: &str) -> Option<&'static StateInfo> {
    STATES.iter().find(|s| s.abbr == abbr)
}

pub fn state_by_name(name: &str) -> Option<&'static StateInfo> {
    STATES.iter().find(|s| s.name == name)
}

/// Full state name (as found in the boundary GeoJSON) to postal abbreviation.
pub fn state_abbr(name: &str) -> Option<&'static str> {
    state_by_name(name).map(|s| s.abbr)
}

pub fn fips(abbr: &str) -> Option<&'static str> {
    state_by_abbr(abbr).map(|s| s.fips)
}

pub fn num_of_districts(abbr: &str) -> Option<u32> {
    state_by_abbr(abbr).map(|s| s.districts)
}

/// Pad a district number to the two-digit width used in district GEOIDs.
pub fn zero_padding(district: u32) -> String {
    format!("{district:02}")
}
