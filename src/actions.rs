//! Catalog of automatable game actions and their on-cadence parameters.

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 60 * MINUTE_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Repeatable in-game crime for cash/experience.
    Crime,
    /// Vehicle theft.
    NickCar,
    /// Skill training; location-bound.
    KillSkill,
    /// Relocation between game districts.
    Travel,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        ActionType::Crime,
        ActionType::NickCar,
        ActionType::KillSkill,
        ActionType::Travel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crime => "crime",
            Self::NickCar => "nickcar",
            Self::KillSkill => "killskill",
            Self::Travel => "travel",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "crime" => Some(Self::Crime),
            "nickcar" => Some(Self::NickCar),
            "killskill" => Some(Self::KillSkill),
            "travel" => Some(Self::Travel),
            _ => None,
        }
    }

    /// Minimum wait the game enforces between successful attempts.
    pub fn nominal_cooldown_ms(self) -> u64 {
        match self {
            Self::Crime => HOUR_MS,
            Self::NickCar => 3 * HOUR_MS,
            Self::KillSkill => 24 * HOUR_MS,
            Self::Travel => 2 * HOUR_MS,
        }
    }

    /// Whether a wrong-location failure can self-correct by travelling
    /// (the game reports the required travel wait in the tool output).
    pub fn supports_auto_travel(self) -> bool {
        matches!(self, Self::Crime | Self::NickCar)
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ActionType;

    #[test]
    fn test_action_parse_round_trips_all_variants() {
        for action in ActionType::ALL {
            assert_eq!(ActionType::parse(action.as_str()), Some(action));
        }
        assert_eq!(ActionType::parse(" NickCar "), Some(ActionType::NickCar));
        assert_eq!(ActionType::parse("mugging"), None);
    }

    #[test]
    fn test_nominal_cooldowns_are_game_scale() {
        // Every cooldown is at least the shortest game cadence (one hour).
        for action in ActionType::ALL {
            assert!(action.nominal_cooldown_ms() >= 60 * 60 * 1000);
        }
        assert!(
            ActionType::KillSkill.nominal_cooldown_ms()
                > ActionType::Crime.nominal_cooldown_ms()
        );
    }
}
