pub mod cities;
pub mod states;

pub use cities::{extract_city_state_lines, extract_linked_city_state_lines};
pub use states::{extract_state_abbreviations, extract_state_names};

// ── Tests ──
