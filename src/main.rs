use forgeweb::{
    config::{app, database},
    core::{
        admin::SiteAdmin,
        generator::GenerationReport,
        legacy::{LegacyDocuments, migrate_from_legacy},
        store::ConfigStore,
    },
    errors::{Error, Result},
};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: forgeweb [generate | navigation | migrate]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = app::load_default_config()
        .inspect_err(|e| error!("Failed to load application configuration: {}", e))?;
    info!(
        "Admin documents in {}, website output in {}",
        app_config.admin_dir.display(),
        app_config.website_root.display()
    );

    // 4. Open the store, degrading to JSON documents if that fails
    let store = open_store(&app_config.database_url).await;

    // 5. Run the requested command
    let command = std::env::args().nth(1).unwrap_or_else(|| "generate".to_string());
    match command.as_str() {
        "generate" => {
            let admin = SiteAdmin::new(&app_config, store);
            let report = admin.generate_site().await?;
            log_report(&report);
            if !report.success {
                return Err(Error::Config {
                    message: "some artifacts could not be generated".to_string(),
                });
            }
        }
        "navigation" => {
            let admin = SiteAdmin::new(&app_config, store);
            for entry in admin.resolved_config().await?.navigation {
                info!("{} -> {} ({} children)", entry.title, entry.url, entry.children.len());
            }
        }
        "migrate" => {
            let docs = LegacyDocuments::from_config(&app_config);
            let migrated = migrate_from_legacy(&store, &docs).await?;
            info!("Migrated {} records: {}", migrated.len(), migrated.join(", "));
        }
        other => {
            error!("Unknown command {:?}; {}", other, USAGE);
            return Err(Error::Config {
                message: format!("unknown command {other:?}"),
            });
        }
    }

    Ok(())
}

async fn open_store(database_url: &str) -> ConfigStore {
    let db = match database::create_connection(database_url).await {
        Ok(db) => db,
        Err(e) => {
            warn!("Configuration store unavailable ({}), using JSON documents only", e);
            return ConfigStore::unavailable();
        }
    };

    match database::create_tables(&db).await {
        Ok(()) => {
            info!("Database initialized successfully.");
            ConfigStore::new(db)
        }
        Err(e) => {
            warn!("Could not prepare database tables ({}), using JSON documents only", e);
            ConfigStore::unavailable()
        }
    }
}

fn log_report(report: &GenerationReport) {
    for path in report.written() {
        info!("Wrote {}", path);
    }
    for (path, error) in report.failures() {
        error!("Failed to write {}: {}", path, error);
    }
}
