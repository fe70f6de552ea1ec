use crate::progress::ProgressLogger;
use crate::prompt::StdinConfirm;
use crate::utils;
use colored::Colorize;
use std::sync::Arc;
use valkyrie_cloud::ConfigStore;
use valkyrie_config::UserSettings;
use valkyrie_core::{AssumeYes, Confirm, Deprovisioner, PipelineOutcome};

pub async fn handle(yes: bool, profile: Option<String>) -> anyhow::Result<()> {
    let project_root = valkyrie_config::find_project_root()?;
    let store = ConfigStore::new(&project_root);
    let config = store.load_required().await?;
    utils::print_project(&project_root, &config);

    let environments = config.environment_names().collect::<Vec<_>>();
    println!(
        "{}",
        format!("Environments ({}):", environments.len()).bold()
    );
    for environment in &environments {
        println!("  • {}", environment.cyan());
    }
    println!();

    let settings = UserSettings::load()?;
    let providers = utils::connect(config.region(), profile, &settings).await?;
    let logger = Arc::new(ProgressLogger::new());
    let deprovisioner = Deprovisioner::new(providers).with_observer(logger.clone());

    let confirm: &dyn Confirm = if yes { &AssumeYes } else { &StdinConfirm };
    let report = match deprovisioner.teardown_confirmed(&config, confirm).await {
        PipelineOutcome::Completed(report) => report,
        PipelineOutcome::Cancelled => {
            println!("{}", "Process aborted".yellow());
            return Ok(());
        }
    };

    logger.print_teardown_summary(&report);

    // Forget environments that were fully removed
    let mut remaining = config.clone();
    for environment in config.environment_names() {
        let clean = report
            .results
            .iter()
            .filter(|r| r.environment == environment)
            .all(|r| r.outcome.is_success());
        if clean {
            remaining = remaining.without_environment(environment);
        }
    }
    store.save(&remaining).await?;

    if report.is_clean() {
        println!("{}", "✓ Deletion completed".green().bold());
    } else {
        println!(
            "{}",
            "Deletion finished with warnings; run `valkyrie delete` again to retry".yellow()
        );
    }
    Ok(())
}
