use clap::Parser;
use definery_client::domain::model::{CollectionId, ListScope, NewParameter};
use definery_client::domain::ports::ParameterStore;
use definery_client::utils::error::ErrorSeverity;
use definery_client::utils::{logger, validation::Validate};
use definery_client::{
    BatchUploader, ClientConfig, Cli, Command, DefineryClient, DefineryError, ImportPolicy,
    LocalDocuments, Pager, ParameterBrowser,
};
use std::fs::File;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging first, so config errors are reported through it.
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI args: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // Exit code follows error severity.
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<(), DefineryError> {
    tracing::info!("📁 Loading configuration from: {}", cli.config.display());
    let config = ClientConfig::from_file(&cli.config)?;
    config.validate()?;

    let mut client = DefineryClient::new(&config.server.base_url, config.timeout())?;
    let username = client
        .authenticate(&config.server.username, &config.server.password)
        .await?
        .name
        .clone();

    match cli.command {
        Command::List { collection, page } => {
            let scope = match collection {
                Some(id) => ListScope::Collection(CollectionId(id)),
                None => ListScope::User(username),
            };
            let pager = Pager::new(config.items_per_page())?;
            let mut browser = ParameterBrowser::new(client, pager, scope);
            browser.load().await?;
            if page > 1 {
                browser.go_to(page - 1).await?;
            }

            for param in browser.parameters() {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    param.id, param.guid, param.name, param.data_type, param.group
                );
            }
            println!("{}", browser.pager().status_text());
        }
        Command::Collections => {
            for collection in client.list_collections().await? {
                println!("{}\t{}\t{}", collection.id, collection.name, collection.description);
            }
        }
        Command::NewCollection { name, description } => {
            client.create_collection(&name, &description).await?;
            println!("✅ The collection '{}' was successfully created.", name);
        }
        Command::AddToCollection {
            collection,
            parameter_ids,
        } => {
            let collection = CollectionId(collection);
            for id in &parameter_ids {
                client.add_to_collection(id, &collection).await?;
            }
            println!(
                "✅ Added {} parameters to collection {}.",
                parameter_ids.len(),
                collection
            );
        }
        Command::NewParameter {
            name,
            data_type,
            collection,
            group,
            description,
            guid,
            hidden,
            locked,
        } => {
            let parameter = NewParameter {
                name,
                guid,
                data_type,
                group,
                description,
                visible: !hidden,
                user_modifiable: !locked,
            };
            let record = client
                .create_parameter(parameter, &CollectionId(collection))
                .await?;
            println!("✅ Created {} ({}).", record.name, record.guid);
        }
        Command::Upload {
            file,
            collection,
            strict,
            dry_run,
            report,
        } => {
            let policy = if strict {
                ImportPolicy::Strict
            } else {
                config.import_policy()
            };
            let uploader =
                BatchUploader::new(client, LocalDocuments::new(), policy).dry_run(dry_run);
            let summary = uploader.upload(&file, &CollectionId(collection)).await?;

            if let Some(path) = report {
                summary.write_report(File::create(&path)?)?;
                println!("📁 Report saved to: {}", path.display());
            }
            println!(
                "✅ Batch {}: {} created, {} skipped, {} rejected{}",
                summary.batch_id,
                summary.created(),
                summary.skipped(),
                summary.rejected.len(),
                if summary.dry_run { " (dry run)" } else { "" }
            );
        }
    }

    Ok(())
}
