use crate::prompt::StdinConfirm;
use crate::utils;
use colored::Colorize;
use valkyrie_cloud::ConfigStore;
use valkyrie_config::UserSettings;
use valkyrie_core::{AssumeYes, Confirm, PipelineOutcome, UpdateKinds, UpdateRequest, Updater};

pub async fn handle(
    environment: Option<String>,
    code: bool,
    config: bool,
    yes: bool,
    profile: Option<String>,
) -> anyhow::Result<()> {
    let project_root = valkyrie_config::find_project_root()?;
    let store = ConfigStore::new(&project_root);
    let project = store.load_required().await?;
    utils::print_project(&project_root, &project);

    let environment = utils::determine_environment(environment, &project)?;
    let kinds = if !code && !config {
        UpdateKinds::code()
    } else {
        UpdateKinds { code, config }
    };

    println!(
        "{}",
        format!("Updating {} Lambda {}...", environment, kinds)
            .yellow()
            .bold()
    );

    let settings = UserSettings::load()?;
    let providers = utils::connect(project.region(), profile, &settings).await?;
    let updater =
        Updater::new(providers).with_protected_environments(settings.protected_environments);

    let request = UpdateRequest {
        environment,
        kinds,
        project_dir: project_root,
    };
    let confirm: &dyn Confirm = if yes { &AssumeYes } else { &StdinConfirm };

    match updater.update(&project, &request, confirm).await? {
        PipelineOutcome::Completed(report) => {
            println!(
                "{} {} Lambda {} updated ({})",
                "✓".green().bold(),
                report.environment.cyan(),
                request.kinds,
                report.function_name
            );
            if let Some(info) = &report.config {
                println!("{}", serde_json::to_string_pretty(info)?);
            }
        }
        PipelineOutcome::Cancelled => {
            println!("{}", "Process aborted".yellow());
        }
    }
    Ok(())
}
