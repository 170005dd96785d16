mod impact;
mod time;

pub use impact::{classify_impact, classify_impact_none_as_degradation};
pub use time::{clean_timestamp, normalize_time, parse_time_span, TimeSpan};
