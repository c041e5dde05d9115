use clap::Subcommand;
use ptaw_core::storage::presets::{builtin_presets, DEFAULT_PRESET};
use ptaw_core::{Config, Preset, PresetError, PresetStore, Rgba, ValidationError, PHASE_COUNT};

#[derive(Subcommand)]
pub enum PresetAction {
    /// List preset names
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one preset as JSON
    Show {
        /// Preset name
        name: String,
    },
    /// Save a preset from explicit timings
    Save {
        /// Preset name
        name: String,
        /// Five duration ranges in seconds, "MIN-MAX" or a single fixed value
        #[arg(long, value_delimiter = ',', required = true)]
        durations: Vec<String>,
        /// Hit count range, "MIN-MAX" or a single value
        #[arg(long)]
        hits: String,
        /// Five phase colors (rgba(), rgb() or #hex)
        #[arg(long, num_args = PHASE_COUNT)]
        colors: Option<Vec<String>>,
        /// Preset to take colors from when --colors is not given
        #[arg(long)]
        base: Option<String>,
        /// Overwrite an existing preset
        #[arg(long)]
        force: bool,
    },
    /// Delete a preset
    Delete {
        /// Preset name
        name: String,
    },
    /// Print the preset document location
    Path,
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let open = || PresetStore::open(&config);

    match action {
        PresetAction::List { json } => {
            let store = open()?;
            if json {
                let names: Vec<&str> = store.names().collect();
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else if store.is_empty() {
                println!("no presets");
            } else {
                let initial = store.initial_preset(Some(config.presets.default_preset.as_str()));
                for name in store.names() {
                    let marker = if Some(name) == initial { "*" } else { " " };
                    println!("{marker} {name}");
                }
            }
        }
        PresetAction::Show { name } => {
            let store = open()?;
            let preset = store
                .get(&name)
                .ok_or_else(|| PresetError::NotFound(name.clone()))?;
            println!("{}", serde_json::to_string_pretty(preset)?);
        }
        PresetAction::Save {
            name,
            durations,
            hits,
            colors,
            base,
            force,
        } => {
            let mut store = open()?;
            let durations = durations
                .iter()
                .enumerate()
                .map(|(i, text)| parse_range(&format!("duration {}", i + 1), text))
                .collect::<Result<Vec<(f64, f64)>, _>>()?;
            if durations.len() != PHASE_COUNT {
                return Err(PresetError::ShapeMismatch {
                    expected: PHASE_COUNT,
                    actual: durations.len(),
                }
                .into());
            }
            let (min, max) = parse_range("hits", &hits)?;
            let hit_count = (to_count("hits", min)?, to_count("hits", max)?);

            let colors = match colors {
                Some(colors) => colors
                    .iter()
                    .map(|c| c.parse::<Rgba>())
                    .collect::<Result<Vec<_>, _>>()?,
                None => base_colors(&store, base.as_deref().unwrap_or(name.as_str()))?,
            };

            let preset = Preset::from_parts(&durations, &colors, hit_count)?;
            let name = name.trim();
            if store.contains(name) && !force {
                return Err(format!("preset '{name}' exists; pass --force to overwrite").into());
            }
            let replaced = store.upsert(name, preset)?;
            println!("{} '{name}'", if replaced { "updated" } else { "saved" });
        }
        PresetAction::Delete { name } => {
            let mut store = open()?;
            store.delete(&name)?;
            println!("deleted '{name}'");
            if store.is_empty() {
                println!("no presets left");
            }
        }
        PresetAction::Path => println!("{}", config.presets_path().display()),
    }
    Ok(())
}

/// Parse "MIN-MAX" or a single value meaning MIN = MAX.
fn parse_range(field: &str, text: &str) -> Result<(f64, f64), ValidationError> {
    let invalid = || ValidationError::InvalidRange {
        field: field.to_string(),
        min: text.to_string(),
        max: text.to_string(),
    };
    let parse = |s: &str| s.trim().parse::<f64>().map_err(|_| invalid());

    let (min, max) = match text.split_once('-') {
        Some((min, max)) => (parse(min)?, parse(max)?),
        None => {
            let value = parse(text)?;
            (value, value)
        }
    };
    if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
        return Err(ValidationError::InvalidRange {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok((min, max))
}

fn to_count(field: &str, value: f64) -> Result<u32, ValidationError> {
    if value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("{value} is not a whole number"),
        });
    }
    Ok(value as u32)
}

/// Colors of `name` if it is a valid preset, else of the built-in default.
fn base_colors(store: &PresetStore, name: &str) -> Result<Vec<Rgba>, PresetError> {
    let from_store = store
        .get(name.trim())
        .filter(|p| p.phases.len() == PHASE_COUNT)
        .map(|p| p.phases.iter().map(|s| s.color).collect());
    if let Some(colors) = from_store {
        return Ok(colors);
    }
    builtin_presets()
        .remove(DEFAULT_PRESET)
        .map(|p| p.phases.into_iter().map(|s| s.color).collect())
        .ok_or_else(|| PresetError::NotFound(DEFAULT_PRESET.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranges_and_fixed_values() {
        assert_eq!(parse_range("d", "120-240").unwrap(), (120.0, 240.0));
        assert_eq!(parse_range("d", " 5 ").unwrap(), (5.0, 5.0));
        assert_eq!(parse_range("d", "0.5-1.5").unwrap(), (0.5, 1.5));
    }

    #[test]
    fn rejects_inverted_and_garbage() {
        assert!(matches!(
            parse_range("d", "20-10"),
            Err(ValidationError::InvalidRange { .. })
        ));
        assert!(parse_range("d", "abc").is_err());
        assert!(parse_range("d", "1-").is_err());
    }

    #[test]
    fn hit_counts_must_be_whole() {
        assert_eq!(to_count("hits", 3.0).unwrap(), 3);
        assert!(to_count("hits", 1.5).is_err());
    }
}
