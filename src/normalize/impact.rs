use crate::core::Impact;

/// Status-page severity labels: `none` carries no signal, `minor` is a
/// degradation and anything heavier is an outage.
pub fn classify_impact(label: &str) -> Option<Impact> {
    match label.trim().to_ascii_lowercase().as_str() {
        "" | "none" => None,
        "minor" => Some(Impact::Degradation),
        _ => Some(Impact::Outage),
    }
}

/// For pages that tag every real disruption `none` unless it is a full outage.
pub fn classify_impact_none_as_degradation(label: &str) -> Option<Impact> {
    match label.trim().to_ascii_lowercase().as_str() {
        "" => None,
        "none" => Some(Impact::Degradation),
        _ => Some(Impact::Outage),
    }
}
