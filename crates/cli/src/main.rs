use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use psb_core::{
    connector_from_config, CoreConfig, IngredientService, IngredientUpdate, NewSandwich,
    NonEmptyText, SandwichService, SandwichUpdate, StoreConnector,
};
use psb_scraper::{Confirmation, MenuScraper, DEFAULT_MENU_URL, DEFAULT_WEBDRIVER_URL};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tag put on sandwiches saved from a scrape.
const SCRAPED_TAG: &str = "scraped";

#[derive(Parser)]
#[command(name = "psb")]
#[command(about = "Premade sandwich catalogue CLI")]
struct Cli {
    /// WebDriver server used for menu extraction
    #[arg(long, global = true, env = "PSB_WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
    webdriver_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a catalogue page is the deli subs category
    Confirm {
        /// Catalogue page URL
        #[arg(env = "PSB_MENU_URL", default_value = DEFAULT_MENU_URL)]
        url: String,
    },
    /// Read item names from a catalogue page with a headless browser
    Scrape {
        /// Catalogue page URL
        #[arg(env = "PSB_MENU_URL", default_value = DEFAULT_MENU_URL)]
        url: String,
        /// Store each scraped name as a sandwich
        #[arg(long)]
        save: bool,
    },
    /// Manage ingredients
    Ingredients {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Manage premade sandwiches
    Subs {
        #[command(subcommand)]
        action: RecordAction,
    },
}

#[derive(Subcommand)]
enum RecordAction {
    /// List all records
    List,
    /// Show one record
    Get {
        /// Store identifier
        id: String,
    },
    /// Delete one record
    Delete {
        /// Store identifier
        id: String,
    },
    /// Mark a record available or unavailable
    Availability {
        /// Store identifier
        id: String,
        /// `true` or `false`
        #[arg(action = clap::ArgAction::Set)]
        available: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "psb_scraper=info,psb_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Confirm { url }) => {
            let scraper = MenuScraper::new(url, cli.webdriver_url);
            match scraper.confirm_search().await {
                Confirmation::Confirmed => println!("Confirmed: {}", scraper.url()),
                Confirmation::NotConfirmed => println!("Not confirmed: {}", scraper.url()),
                Confirmation::Ambiguous(breadcrumbs) => {
                    println!("Page is in another category. Breadcrumbs:");
                    println!("{}", serde_json::to_string_pretty(&breadcrumbs)?);
                }
            }
        }
        Some(Commands::Scrape { url, save }) => {
            let scraper = MenuScraper::new(url, cli.webdriver_url);
            let Some(items) = scraper.menu_items().await else {
                anyhow::bail!("Menu extraction failed for {}", scraper.url());
            };
            println!("{}", serde_json::to_string_pretty(&items)?);

            if save {
                let sandwiches = SandwichService::new(connect_store().await?);
                for (position, name) in &items {
                    let Some(sandwich) = sandwich_from_scraped(*position, name) else {
                        continue;
                    };
                    let id = sandwiches
                        .add(sandwich)
                        .await
                        .context("Failed to add sandwich")?;
                    println!("Saved sandwich {id}");
                }
            }
        }
        Some(Commands::Ingredients { action }) => {
            let service = IngredientService::new(connect_store().await?);
            run_ingredient_action(&service, action).await?;
        }
        Some(Commands::Subs { action }) => {
            let service = SandwichService::new(connect_store().await?);
            run_sandwich_action(&service, action).await?;
        }
        None => {
            println!("Use 'psb --help' for commands");
        }
    }

    Ok(())
}

async fn connect_store() -> anyhow::Result<Arc<dyn StoreConnector>> {
    let cfg = CoreConfig::from_env()?;
    Ok(connector_from_config(&cfg)?)
}

async fn run_ingredient_action(
    service: &IngredientService,
    action: RecordAction,
) -> anyhow::Result<()> {
    match action {
        RecordAction::List => {
            let ingredients = service
                .list_all()
                .await
                .context("Failed to retrieve ingredients")?;
            if ingredients.is_empty() {
                println!("No ingredients found.");
            }
            for ingredient in ingredients {
                println!(
                    "ID: {}, Name: {}, Type: {}, Available: {}",
                    ingredient.id, ingredient.name, ingredient.kind, ingredient.is_available
                );
            }
        }
        RecordAction::Get { id } => match service.get_by_id(&id).await? {
            Some(ingredient) => println!("{}", serde_json::to_string_pretty(&ingredient)?),
            None => println!("No ingredient with ID: {id}"),
        },
        RecordAction::Delete { id } => match service.delete(&id).await? {
            0 => println!("No ingredient with ID: {id}"),
            _ => println!("Deleted ingredient {id}"),
        },
        RecordAction::Availability { id, available } => {
            let update = IngredientUpdate {
                is_available: Some(available),
                ..Default::default()
            };
            report_update("ingredient", &id, service.update(&id, update).await?);
        }
    }
    Ok(())
}

async fn run_sandwich_action(
    service: &SandwichService,
    action: RecordAction,
) -> anyhow::Result<()> {
    match action {
        RecordAction::List => {
            let sandwiches = service
                .list_all()
                .await
                .context("Failed to retrieve sandwiches")?;
            if sandwiches.is_empty() {
                println!("No sandwiches found.");
            }
            for sandwich in sandwiches {
                println!(
                    "ID: {}, Name: {}, Ingredients: {}, Available: {}",
                    sandwich.id,
                    sandwich.name,
                    sandwich.ingredients.len(),
                    sandwich.is_available
                );
            }
        }
        RecordAction::Get { id } => match service.get_by_id(&id).await? {
            Some(sandwich) => println!("{}", serde_json::to_string_pretty(&sandwich)?),
            None => println!("No sandwich with ID: {id}"),
        },
        RecordAction::Delete { id } => match service.delete(&id).await? {
            0 => println!("No sandwich with ID: {id}"),
            _ => println!("Deleted sandwich {id}"),
        },
        RecordAction::Availability { id, available } => {
            let update = SandwichUpdate {
                is_available: Some(available),
                ..Default::default()
            };
            report_update("sandwich", &id, service.update(&id, update).await?);
        }
    }
    Ok(())
}

/// Build the record saved for one scraped item, or `None` if its name is blank.
fn sandwich_from_scraped(position: usize, name: &str) -> Option<NewSandwich> {
    let Ok(name) = NonEmptyText::new(name) else {
        tracing::warn!(position, "skipping scraped item with a blank name");
        return None;
    };
    Some(NewSandwich {
        name,
        description: String::new(),
        ingredients: Vec::new(),
        tags: vec![SCRAPED_TAG.to_string()],
        is_available: None,
    })
}

fn report_update(kind: &str, id: &str, modified: u64) {
    if modified == 0 {
        println!("No {kind} changed for ID: {id}");
    } else {
        println!("Updated {kind} {id}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_availability_flag() {
        let cli = Cli::try_parse_from([
            "psb",
            "subs",
            "availability",
            "65a1f0c2e4b0a1b2c3d4e5f6",
            "false",
        ])
        .expect("arguments should parse");

        let Some(Commands::Subs {
            action: RecordAction::Availability { id, available },
        }) = cli.command
        else {
            panic!("expected subs availability");
        };
        assert_eq!(id, "65a1f0c2e4b0a1b2c3d4e5f6");
        assert!(!available);
    }

    #[test]
    fn test_scrape_save_flag() {
        let cli = Cli::try_parse_from(["psb", "scrape", "https://example.test/deli", "--save"])
            .expect("arguments should parse");

        let Some(Commands::Scrape { url, save }) = cli.command else {
            panic!("expected scrape");
        };
        assert_eq!(url, "https://example.test/deli");
        assert!(save);
    }

    #[test]
    fn test_scraped_item_becomes_tagged_sandwich() {
        let sandwich = sandwich_from_scraped(0, "  Italian Sub ").expect("named item");
        assert_eq!(sandwich.name.as_str(), "Italian Sub");
        assert_eq!(sandwich.tags, vec![SCRAPED_TAG.to_string()]);
        assert!(sandwich.ingredients.is_empty());
    }

    #[test]
    fn test_blank_scraped_name_is_skipped() {
        assert!(sandwich_from_scraped(3, "   ").is_none());
        assert!(sandwich_from_scraped(4, "").is_none());
    }
}
