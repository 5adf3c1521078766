//! Static airport code directory
//!
//! The weather provider is queried by city name, while the flight search
//! only knows location codes.

const CITY_NAMES: &[(&str, &str)] = &[
    ("ATL", "Atlanta"),
    ("AUS", "Austin"),
    ("BNA", "Nashville"),
    ("BOS", "Boston"),
    ("BWI", "Baltimore"),
    ("CHS", "Charleston"),
    ("CUN", "Cancun"),
    ("DCA", "Washington D.C."),
    ("DEN", "Denver"),
    ("DFW", "Dallas"),
    ("EWR", "Newark"),
    ("FLL", "Fort Lauderdale"),
    ("IAD", "Washington D.C."),
    ("JFK", "New York"),
    ("LAS", "Las Vegas"),
    ("LAX", "Los Angeles"),
    ("LGA", "New York"),
    ("MCO", "Orlando"),
    ("MIA", "Miami"),
    ("MSY", "New Orleans"),
    ("NYC", "New York"),
    ("ORD", "Chicago"),
    ("PHX", "Phoenix"),
    ("SAN", "San Diego"),
    ("SEA", "Seattle"),
    ("SFO", "San Francisco"),
    ("SJU", "San Juan"),
    ("TPA", "Tampa"),
];

/// City name for a location code, or the code itself when unknown
#[must_use]
pub fn city_name_for_code(code: &str) -> &str {
    CITY_NAMES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map_or(code, |(_, city)| city)
}
