use hero_arena::mcp_interface::{display_roster, display_statistics, execute_simulation};
use hero_arena::{BattleService, BattleSetup, EngineConfig, InMemoryArchive, RosterCatalog, Side, UserId};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hero_arena=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("Error loading engine config: {}", e);
            return;
        }
    };
    let catalog = match RosterCatalog::from_env() {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            println!("Error loading roster: {}", e);
            return;
        }
    };

    println!("{}", display_roster(&catalog));

    let service = BattleService::new(catalog, Arc::new(InMemoryArchive::new()), config);
    let owner = UserId::from("demo");

    // One battle per initiator so both sides get to open.
    for initiator in [Side::Hero, Side::Villain] {
        let setup = BattleSetup::new(vec![1, 2, 3], vec![1, 2, 3], initiator);
        println!("=== {} strike first ===", initiator);
        println!("{}", execute_simulation(&service, &setup, &owner));
    }

    match service.get_statistics() {
        Ok(stats) => println!("{}", display_statistics(&stats)),
        Err(e) => println!("Error reading statistics: {}", e),
    }
}
