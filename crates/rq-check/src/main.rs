//! Offline check of a custom entities configuration
//!
//! ```text
//! rq-check [FILE] [ENTITY COMMAND]
//! ```
//!
//! Validates FILE (by default the custom entities file of the driver in
//! `UC_CONFIG_HOME`) and prints every entity with its features and
//! normalized simple commands. With ENTITY and COMMAND it also shows which
//! configured command a `send_cmd` of COMMAND would run.
//!
//! `UC_LOG_LEVEL` sets the log filter (default `debug`).

use anyhow::{bail, Context, Result};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rq_config::{config_home, validate, CustomEntities, Settings};
use rq_core::CommandSpec;
use rq_remote::resolve;

const LOG_LEVEL_ENV: &str = "UC_LOG_LEVEL";
const DEFAULT_LOG_LEVEL: &str = "debug";
const USAGE: &str = "usage: rq-check [FILE] [ENTITY COMMAND]";

fn main() -> Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let home = config_home();
    let settings = Settings::load(&home)?;

    let (path, lookup) = match args.as_slice() {
        [] => (settings.custom_entities_path(&home), None),
        [file] if file == "-h" || file == "--help" => {
            println!("{}", USAGE);
            return Ok(());
        }
        [file] => (PathBuf::from(file), None),
        [file, entity, command] => (PathBuf::from(file), Some((entity, command))),
        _ => bail!(USAGE),
    };

    info!("Checking {}", path.display());
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entities = validate(&text)
        .with_context(|| format!("{} is not a valid custom entities configuration", path.display()))?;

    print!("{}", Summary::new(&entities, &settings.id_prefix));

    if let Some((name, command)) = lookup {
        let Some(entity) = entities.get(name) else {
            bail!("Entity '{}' is not configured", name);
        };
        let spec = resolve(entity, command)?;
        println!();
        println!("{} {}: {}", entity.name, command, describe(spec));
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    let filter = EnvFilter::try_new(level.to_lowercase())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Log filter set from {}={}", LOG_LEVEL_ENV, level);
    Ok(())
}

fn describe(spec: &CommandSpec) -> String {
    format!("{} {}", spec.command_type, spec.parameter)
}

/// Human readable listing of validated entities
struct Summary<'a> {
    entities: &'a CustomEntities,
    id_prefix: &'a str,
}

impl<'a> Summary<'a> {
    fn new(entities: &'a CustomEntities, id_prefix: &'a str) -> Self {
        Self {
            entities,
            id_prefix,
        }
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entity in self.entities.iter() {
            writeln!(f, "{} ({})", entity.name, entity.entity_id(self.id_prefix))?;
            for (title, commands) in [
                (rq_core::FEATURES, &entity.features),
                (rq_core::SIMPLE_COMMANDS, &entity.simple_commands),
            ] {
                if commands.is_empty() {
                    continue;
                }
                writeln!(f, "  {}:", title)?;
                for (name, spec) in commands {
                    writeln!(f, "    {:<20} {}", name, describe(spec))?;
                }
            }
        }
        writeln!(f, "{} custom entities", self.entities.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_normalized_commands() {
        let text = r#"
variables:
  host: 10.0.0.2
Living Room TV:
  features:
    on:
      type: wol
      parameter: "AA:BB:CC:DD:EE:FF"
  Simple Commands:
    "volume up":
      type: get
      parameter: "http://${host}/vol+"
Fan:
"#;
        let entities = validate(text).unwrap();
        let summary = Summary::new(&entities, "remote-").to_string();
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines[0], "Living Room TV (remote-living room tv)");
        assert_eq!(lines[1], "  Features:");
        assert!(lines[2].starts_with("    On "));
        assert!(lines[2].ends_with("wol AA:BB:CC:DD:EE:FF"));
        assert_eq!(lines[3], "  Simple Commands:");
        assert!(lines[4].starts_with("    VOLUME_UP "));
        assert!(lines[4].ends_with("get http://10.0.0.2/vol+"));
        assert_eq!(lines[5], "Fan (remote-fan)");
        assert_eq!(lines[6], "2 custom entities");
    }
}
