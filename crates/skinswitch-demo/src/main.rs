//! skinswitch command-line demo.
//!
//! Builds a page with two switchers, runs the given actions against it and
//! prints the resulting stylesheet links and page state. The chosen skin is
//! remembered across runs in a JSON state file.
//!
//! ```text
//! skinswitch-demo [--catalog FILE] [--defaults FILE] [--state FILE]
//!                 [--linked HREF] [--deny SKIN] [ACTION...]
//! ```
//!
//! Actions are `verb:target[:arg]`: `select:switcher-top:Dark Hive`,
//! `reset:switcher-side`, `remember:switcher-top`, `click:switcher-top:sunny`,
//! `open:switcher-top`, `leave:switcher-top`, `destroy:switcher-side`.

mod commands;
mod page;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use skinswitch_core::GlobalCoordinator;
use skinswitch_core::catalog::Catalog;
use skinswitch_core::config::{ConfigOverrides, SwitcherConfiguration};
use skinswitch_core::hooks::{SwitcherHooks, Veto};
use skinswitch_core::marker;
use skinswitch_core::persistence::FileStore;

use commands::Command;

/// Default state file, overridable with `SKINSWITCH_STATE`.
const DEFAULT_STATE_FILE: &str = "skinswitch-state.json";

#[derive(Debug, Default)]
struct Args {
    catalog: Option<PathBuf>,
    defaults: Option<PathBuf>,
    state: Option<PathBuf>,
    linked: Option<String>,
    deny: Vec<String>,
    actions: Vec<Command>,
}

fn parse_args(mut it: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--catalog" => args.catalog = Some(PathBuf::from(value("--catalog")?)),
            "--defaults" => args.defaults = Some(PathBuf::from(value("--defaults")?)),
            "--state" => args.state = Some(PathBuf::from(value("--state")?)),
            "--linked" => args.linked = Some(value("--linked")?),
            "--deny" => args.deny.push(value("--deny")?),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            action => args.actions.push(Command::parse(action)?),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::builtin(),
    };
    log::info!("Catalog has {} entries", catalog.len());

    let mut defaults = SwitcherConfiguration::default();
    if let Some(path) = &args.defaults {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        defaults = ConfigOverrides::from_toml(&text)?.apply(defaults);
    }

    // Hooks: refuse any skin named with --deny.
    let denied = args.deny.clone();
    let hooks = SwitcherHooks::default()
        .on_select(move |new, _, _| {
            if denied.iter().any(|d| d == new) {
                Err(Veto)
            } else {
                Ok(())
            }
        })
        .on_load(|new, previous| log::info!("Loaded '{new}' (was {previous:?})"));
    let defaults = defaults.with_hooks(hooks);

    let state_path = args
        .state
        .clone()
        .or_else(|| std::env::var_os("SKINSWITCH_STATE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));
    let store = FileStore::new(&state_path, "skin");

    let document = page::build(args.linked.as_deref());
    let mut coord = GlobalCoordinator::new(document, catalog).with_persistence(store);
    for target in page::TARGETS {
        coord.create_with_view(target, defaults.clone(), Some(Box::new(page::LogView)))?;
    }

    for action in &args.actions {
        action.run(&mut coord);
    }

    print_state(&coord);
    Ok(())
}

fn print_state(coord: &GlobalCoordinator) {
    println!("Stylesheets:");
    for record in coord.stylesheets().records(coord.document()) {
        let tag = match &record.skin_name {
            Some(name) => format!("  [managed: {name}]"),
            None => String::new(),
        };
        println!("  {}{tag}", record.href);
    }

    let current = coord.current_skin().map_or("(none)", |s| s.name.as_str());
    println!("Current skin: {current}");
    println!(
        "Page marker:  {}",
        marker::current_marker(coord.document()).unwrap_or_else(|| "(none)".into())
    );
    println!("Remembering:  {}", coord.remembering());
    println!("Switchers:    {}", coord.instance_count());
    for instance in coord.instances() {
        let display = instance.display();
        println!(
            "  {}: \"{}\" active={}",
            instance.target(),
            display.label,
            display.active_entry.as_deref().unwrap_or("-")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_flags_and_actions() {
        let parsed = args(&[
            "--state",
            "/tmp/s.json",
            "--deny",
            "Vader",
            "select:switcher-top:Sunny",
            "reset:switcher-side",
        ])
        .unwrap();
        assert_eq!(parsed.state, Some(PathBuf::from("/tmp/s.json")));
        assert_eq!(parsed.deny, vec!["Vader"]);
        assert_eq!(parsed.actions.len(), 2);
    }

    #[test]
    fn missing_flag_value_is_an_error() {
        assert!(args(&["--catalog"]).is_err());
        assert!(args(&["--bogus"]).is_err());
    }

    #[test]
    fn bundled_data_files_parse() {
        let catalog = Catalog::from_toml(include_str!("../data/catalog.toml")).unwrap();
        let overrides = ConfigOverrides::from_toml(include_str!("../data/switcher.toml")).unwrap();
        let cfg = overrides.apply(SwitcherConfiguration::default());
        let registry = skinswitch_core::registry::SkinRegistry::resolve(&catalog, &cfg);
        assert_eq!(registry.len(), 23);
        assert_eq!(registry.by_class_token("brand").unwrap().name, "Site Brand");
        assert!(registry.get("Vader").is_none());
        assert!(cfg.show_reset);
        assert_eq!(cfg.text.prompt, "Pick a skin");
    }
}
