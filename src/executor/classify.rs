//! Semantic classification of signing-tool output.
//!
//! The game contract reports most blockers (jail, cooldown, wrong district)
//! as message text, sometimes on a zero exit status. Classification is an
//! ordered substring scan over lowercased output; the rule tables are plain
//! data so marker drift in the external tool is a config change, not a
//! scheduler change.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeClass {
    Success,
    Jailed,
    Cooldown,
    WrongLocation,
    GasTooHigh,
    Reverted,
    TransientNetwork,
    UnknownError,
}

impl OutcomeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Jailed => "jailed",
            Self::Cooldown => "cooldown",
            Self::WrongLocation => "not_active",
            Self::GasTooHigh => "gas_too_high",
            Self::Reverted => "reverted",
            Self::TransientNetwork => "transient_network",
            Self::UnknownError => "unknown_error",
        }
    }
}

/// Ordered marker tables, checked top to bottom; first hit wins.
///
/// `default()` is the v1 table matching the current signing tool. Operators
/// can append markers per class via `CLASSIFY_EXTRA_{JAIL,COOLDOWN,NOT_ACTIVE,
/// REVERT,TRANSIENT}_MARKERS` (comma-separated, matched lowercased).
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    jail: Vec<String>,
    cooldown: Vec<String>,
    not_active: Vec<String>,
    revert: Vec<String>,
    transient: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            jail: to_owned(&["jail"]),
            cooldown: to_owned(&["cooldown"]),
            not_active: to_owned(&["not active", "wrong location", "must travel"]),
            revert: to_owned(&["revert"]),
            transient: to_owned(&[
                "-32000",
                "internal_error",
                "failed to send transaction",
                "timed out",
                "connection refused",
                "connection reset",
                "dns error",
            ]),
        }
    }
}

fn to_owned(markers: &[&str]) -> Vec<String> {
    markers.iter().map(|m| (*m).to_string()).collect()
}

fn extra_markers(key: &str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ClassifierRules {
    pub fn from_env() -> Self {
        let mut rules = Self::default();
        rules.jail.extend(extra_markers("CLASSIFY_EXTRA_JAIL_MARKERS"));
        rules
            .cooldown
            .extend(extra_markers("CLASSIFY_EXTRA_COOLDOWN_MARKERS"));
        rules
            .not_active
            .extend(extra_markers("CLASSIFY_EXTRA_NOT_ACTIVE_MARKERS"));
        rules
            .revert
            .extend(extra_markers("CLASSIFY_EXTRA_REVERT_MARKERS"));
        rules
            .transient
            .extend(extra_markers("CLASSIFY_EXTRA_TRANSIENT_MARKERS"));
        rules
    }

    /// Classify the combined output of a failed invocation.
    pub fn classify_failure_text(&self, text: &str) -> OutcomeClass {
        let msg = text.to_ascii_lowercase();
        if hits(&msg, &self.jail) {
            return OutcomeClass::Jailed;
        }
        if hits(&msg, &self.cooldown) || matches_cannot_yet(&msg) {
            return OutcomeClass::Cooldown;
        }
        if hits(&msg, &self.not_active) {
            return OutcomeClass::WrongLocation;
        }
        if hits(&msg, &self.revert) {
            return OutcomeClass::Reverted;
        }
        if hits(&msg, &self.transient) {
            return OutcomeClass::TransientNetwork;
        }
        OutcomeClass::UnknownError
    }

    /// Scan exit-code-0 output for blockers the tool reports without failing.
    /// Returns `None` when the output looks like a genuine success.
    pub fn scan_success_output(&self, text: &str) -> Option<OutcomeClass> {
        let msg = text.to_ascii_lowercase();
        if hits(&msg, &self.jail) {
            return Some(OutcomeClass::Jailed);
        }
        if hits(&msg, &self.cooldown) || matches_cannot_yet(&msg) {
            return Some(OutcomeClass::Cooldown);
        }
        if hits(&msg, &self.not_active) {
            return Some(OutcomeClass::WrongLocation);
        }
        None
    }
}

fn hits(msg: &str, markers: &[String]) -> bool {
    markers.iter().any(|needle| msg.contains(needle.as_str()))
}

/// `cannot <anything> yet` — the tool phrases premature attempts this way
/// ("cannot commit crime yet", "cannot nick a car yet").
fn matches_cannot_yet(msg: &str) -> bool {
    let Some(start) = msg.find("cannot") else {
        return false;
    };
    msg[start..].contains("yet")
}

/// Best-effort travel-wait parser. The tool reports the required relocation
/// as e.g. `must travel to Docklands (travel time: 180s)`; we only use this
/// as a retry *hint*, so unparseable output degrades to the long fallback.
pub fn parse_travel_wait_ms(text: &str) -> Option<u64> {
    let msg = text.to_ascii_lowercase();
    let start = msg.find("travel")?;
    let tail = &msg[start..];

    let mut digits = String::new();
    let mut found_any = false;
    for ch in tail.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            found_any = true;
            continue;
        }
        if found_any {
            break;
        }
    }
    let value: u64 = digits.parse().ok()?;

    let unit_hint = tail
        .split_once(&digits)
        .map(|(_, suffix)| suffix.trim_start())
        .unwrap_or("");
    if unit_hint.starts_with("ms") || unit_hint.starts_with("millis") {
        return Some(value);
    }
    if unit_hint.starts_with("min") {
        return Some(value.saturating_mul(60_000));
    }
    if unit_hint.starts_with('h') {
        return Some(value.saturating_mul(3_600_000));
    }
    // Tool output uses seconds when the unit is bare or ambiguous.
    Some(value.saturating_mul(1_000))
}
