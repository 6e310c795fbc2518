//! Map command - print the static territory catalog

use anyhow::Result;
use clap::Args;

use conquest_core::catalog::{self, Continent};

#[derive(Args)]
pub struct MapArgs {
    /// Limit output to one continent (e.g. "europe")
    #[arg(long)]
    pub continent: Option<String>,
}

pub fn run(args: MapArgs) -> Result<()> {
    let filter = match args.continent.as_deref() {
        Some(name) => Some(parse_continent(name)?),
        None => None,
    };

    for continent in Continent::ALL {
        if filter.is_some_and(|f| f != continent) {
            continue;
        }
        let count = catalog::territories_in(continent).count();
        println!("{} (bonus {}, {} territories)", continent.name(), continent.bonus(), count);
        for def in catalog::territories_in(continent) {
            println!("  {:<24} borders {}", def.id, def.neighbors.join(", "));
        }
    }

    Ok(())
}

fn parse_continent(name: &str) -> Result<Continent> {
    let normalized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    Continent::ALL
        .into_iter()
        .find(|c| {
            c.name()
                .chars()
                .filter(|ch| ch.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
                == normalized
        })
        .ok_or_else(|| anyhow::anyhow!("unknown continent: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_continent() {
        assert_eq!(parse_continent("europe").unwrap(), Continent::Europe);
        assert_eq!(parse_continent("North America").unwrap(), Continent::NorthAmerica);
        assert_eq!(parse_continent("north-america").unwrap(), Continent::NorthAmerica);
        assert!(parse_continent("pangaea").is_err());
    }
}
