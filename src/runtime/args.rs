use crate::actions::ActionType;

const DEFAULT_AUTOSTART_ACTIONS: [ActionType; 3] = [
    ActionType::Crime,
    ActionType::NickCar,
    ActionType::KillSkill,
];

#[derive(Debug, Clone)]
pub struct RuntimeArgs {
    /// Actions auto-started for every wallet at boot. Travel stays manual
    /// unless explicitly listed.
    pub autostart_actions: Vec<ActionType>,
    /// Restrict the boot to a single wallet name when set.
    pub pinned_wallet: Option<String>,
    pub explain_config: bool,
}

fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_autostart_actions_from_env() -> anyhow::Result<Vec<ActionType>> {
    let raw = match std::env::var("FLEET_ACTIONS") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(DEFAULT_AUTOSTART_ACTIONS.to_vec()),
    };

    let mut actions = Vec::new();
    for item in raw.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let action = ActionType::parse(item).ok_or_else(|| {
            anyhow::anyhow!(
                "invalid FLEET_ACTIONS entry `{}` (known actions: crime, nickcar, killskill, travel)",
                item
            )
        })?;
        if !actions.contains(&action) {
            actions.push(action);
        }
    }
    if actions.is_empty() {
        return Ok(DEFAULT_AUTOSTART_ACTIONS.to_vec());
    }
    Ok(actions)
}

fn parse_runtime_args_from_iter<I, S>(args: I) -> anyhow::Result<RuntimeArgs>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let supplied_args = args
        .into_iter()
        .map(|arg| arg.as_ref().to_string())
        .collect::<Vec<_>>();
    if !supplied_args.is_empty() {
        let joined = supplied_args.join(" ");
        return Err(anyhow::anyhow!(
            "CLI arguments are disabled in this build. Configure .env keys instead (FLEET_ACTIONS, FLEET_WALLET, FLEET_EXPLAIN_CONFIG). Received args: {}",
            joined
        ));
    }

    let autostart_actions = parse_autostart_actions_from_env()?;
    let pinned_wallet = std::env::var("FLEET_WALLET")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let explain_config = std::env::var("FLEET_EXPLAIN_CONFIG")
        .ok()
        .and_then(|raw| parse_bool_flag(&raw))
        .unwrap_or(false);

    Ok(RuntimeArgs {
        autostart_actions,
        pinned_wallet,
        explain_config,
    })
}

pub fn parse_runtime_args() -> anyhow::Result<RuntimeArgs> {
    parse_runtime_args_from_iter(std::env::args().skip(1))
}
