use fitdesk_core::{Config, Paths};
use fitdesk_storage::RecordStore;

pub async fn run() -> anyhow::Result<()> {
    let paths = Paths::new();

    println!("fitdesk status");
    println!("==============");
    println!();

    let config_path = paths.config_file();
    let config_exists = config_path.exists();
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_exists { "✓" } else { "✗ (defaults in effect)" }
    );

    let config = Config::load_or_default(&paths)?;
    let db_path = config.database_path(&paths);
    let db_exists = db_path.exists();
    println!(
        "Database:  {} {}",
        db_path.display(),
        if db_exists { "✓" } else { "✗ (created on first serve)" }
    );
    println!("Listen:    {}:{}", config.server.host, config.server.port);

    if db_exists {
        let store = RecordStore::open(&db_path)?;
        let stats = store.stats()?;
        println!();
        println!("Members:          {}", stats["members"]);
        println!("Workout sessions: {}", stats["workout_sessions"]);
    }

    Ok(())
}
