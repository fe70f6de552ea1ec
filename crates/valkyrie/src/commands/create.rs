use crate::progress::ProgressLogger;
use crate::utils;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use valkyrie_cloud::ConfigStore;
use valkyrie_config::{CreateDefaults, UserSettings};
use valkyrie_core::{ProvisionRequest, Provisioner};

pub struct CreateArgs {
    pub name: Option<String>,
    pub environment: String,
    pub region: Option<String>,
    pub description: String,
    pub memory_size: i32,
    pub timeout: i32,
    pub runtime: String,
    pub handler: String,
    pub path: PathBuf,
    pub revert: bool,
    pub profile: Option<String>,
}

pub async fn handle(args: CreateArgs) -> anyhow::Result<()> {
    let settings = UserSettings::load()?;
    let project_dir = args.path.canonicalize().map_err(|e| {
        anyhow::anyhow!("Project directory {} is not usable: {}", args.path.display(), e)
    })?;

    let store = ConfigStore::new(&project_dir);
    let existing = store.load().await?;

    let region = args
        .region
        .or_else(|| existing.as_ref().map(|c| c.region().to_string()))
        .or_else(|| settings.region.clone())
        .unwrap_or_else(|| CreateDefaults::REGION.to_string());

    let name = args
        .name
        .or_else(|| valkyrie_config::project_name_from_dir(&project_dir))
        .ok_or_else(|| anyhow::anyhow!("Cannot derive a project name, pass --name"))?;

    println!(
        "{}",
        format!("Creating {} ({}) in {}...", name, args.environment, region)
            .yellow()
            .bold()
    );
    println!("Directory: {}", project_dir.display().to_string().cyan());
    println!();

    let providers = utils::connect(&region, args.profile, &settings).await?;
    let logger = Arc::new(ProgressLogger::new());

    let request = ProvisionRequest {
        project_name: name,
        environment: args.environment,
        description: args.description,
        memory_size: args.memory_size,
        timeout: args.timeout,
        runtime: args.runtime,
        handler: args.handler,
        project_dir,
        revert_on_failure: args.revert,
    };

    match Provisioner::new(providers, store)
        .with_observer(logger.clone())
        .provision(&request)
        .await
    {
        Ok(report) => {
            logger.print_provision_summary(&report);
            println!();
            println!("{}", "✓ Environment created".green().bold());
            println!("  {}", report.invoke_url.cyan());
            Ok(())
        }
        Err(e) => {
            if let Some(rollback) = e.rollback() {
                logger.print_teardown_summary(rollback);
            } else if e.step().is_some() {
                println!(
                    "{}",
                    "Partial resources were kept; run `valkyrie delete` to remove them".yellow()
                );
            }
            Err(e.into())
        }
    }
}
