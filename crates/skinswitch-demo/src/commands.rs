//! Scripted actions given on the command line.

use anyhow::{Result, bail};

use skinswitch_core::coordinator::TransitionResult;
use skinswitch_core::instance::Region;
use skinswitch_core::{GlobalCoordinator, Transition};

/// One `verb:target[:arg]` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select { target: String, skin: String },
    Reset { target: String },
    Remember { target: String },
    Click { target: String, key: String },
    Open { target: String },
    Leave { target: String },
    Destroy { target: String },
}

impl Command {
    pub fn parse(arg: &str) -> Result<Self> {
        let mut parts = arg.splitn(3, ':');
        let verb = parts.next().unwrap_or_default();
        let target = match parts.next() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => bail!("'{arg}': missing target (expected verb:target[:arg])"),
        };
        let rest = parts.next().map(str::to_string);

        let cmd = match (verb, rest) {
            ("select", Some(skin)) => Self::Select { target, skin },
            ("click", Some(key)) => Self::Click { target, key },
            ("reset", None) => Self::Reset { target },
            ("remember", None) => Self::Remember { target },
            ("open", None) => Self::Open { target },
            ("leave", None) => Self::Leave { target },
            ("destroy", None) => Self::Destroy { target },
            _ => bail!("'{arg}': unknown action"),
        };
        Ok(cmd)
    }

    /// Run against `coord`. A veto is reported, not treated as a failure.
    pub fn run(&self, coord: &mut GlobalCoordinator) {
        let outcome: TransitionResult = match self {
            Self::Select { target, skin } => coord.select_by_name(target, skin),
            Self::Reset { target } => coord.reset(target),
            Self::Remember { target } => coord.toggle_remember(target),
            Self::Click { target, key } => coord.click(target, key).map(|o| o.transition),
            Self::Open { target } => {
                coord.header_click(target);
                Ok(Transition::Unchanged)
            },
            Self::Leave { target } => {
                coord.pointer_leave(target, Region::Widget);
                Ok(Transition::Unchanged)
            },
            Self::Destroy { target } => {
                if !coord.destroy(target) {
                    log::warn!("No switcher on '{target}'");
                }
                Ok(Transition::Unchanged)
            },
        };
        match outcome {
            Ok(Transition::Committed) => log::info!("{self:?}: committed"),
            Ok(Transition::Unchanged) => log::debug!("{self:?}: unchanged"),
            Err(veto) => log::info!("{self:?}: {veto}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_actions() {
        assert_eq!(
            Command::parse("select:top:Dark Hive").unwrap(),
            Command::Select {
                target: "top".into(),
                skin: "Dark Hive".into()
            }
        );
        assert_eq!(
            Command::parse("reset:side").unwrap(),
            Command::Reset {
                target: "side".into()
            }
        );
        assert_eq!(
            Command::parse("click:top:skinswitch-remember").unwrap(),
            Command::Click {
                target: "top".into(),
                key: "skinswitch-remember".into()
            }
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(Command::parse("select").is_err());
        assert!(Command::parse("select:top").is_err());
        assert!(Command::parse("reset:top:extra").is_err());
        assert!(Command::parse("jump:top").is_err());
    }
}
