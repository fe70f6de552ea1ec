use colored::Colorize;
use valkyrie_cloud::{ProjectConfiguration, Providers};
use valkyrie_cloud_aws::AwsSettings;
use valkyrie_config::UserSettings;

/// Pick the environment to act on (shared by commands)
pub fn determine_environment(
    environment: Option<String>,
    config: &ProjectConfiguration,
) -> anyhow::Result<String> {
    if let Some(env) = environment {
        return Ok(env);
    }

    let mut names = config.environment_names();
    match (names.next(), names.next()) {
        (Some(only), None) => Ok(only.to_string()),
        (None, _) => Err(anyhow::anyhow!(
            "This project has no environments; run `valkyrie create` first"
        )),
        _ => Err(anyhow::anyhow!(
            "Select an environment: valkyrie update --staging | --production | --env <name>\nAvailable environments: {}",
            config.environment_names().collect::<Vec<_>>().join(", ")
        )),
    }
}

/// Connect to AWS in `region`, preferring the command line profile
pub async fn connect(
    region: &str,
    profile: Option<String>,
    settings: &UserSettings,
) -> anyhow::Result<Providers> {
    let profile = profile.or_else(|| settings.profile.clone());
    let aws = AwsSettings::new(region).with_profile(profile);
    Ok(valkyrie_cloud_aws::connect(&aws).await?)
}

/// Print the project file in use
pub fn print_project(project_root: &std::path::Path, config: &ProjectConfiguration) {
    println!(
        "📄 {} ({})",
        project_root
            .join(valkyrie_cloud::CONFIG_FILE)
            .display()
            .to_string()
            .cyan(),
        config.region()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use valkyrie_cloud::EnvironmentRecord;

    #[test]
    fn test_determine_environment_explicit() {
        let config = ProjectConfiguration::new("eu-west-1");
        assert_eq!(
            determine_environment(Some("qa".to_string()), &config).unwrap(),
            "qa"
        );
    }

    #[test]
    fn test_determine_environment_single() {
        let config = ProjectConfiguration::new("eu-west-1")
            .with_environment("staging", EnvironmentRecord::default());
        assert_eq!(determine_environment(None, &config).unwrap(), "staging");
    }

    #[test]
    fn test_determine_environment_ambiguous() {
        let config = ProjectConfiguration::new("eu-west-1")
            .with_environment("staging", EnvironmentRecord::default())
            .with_environment("production", EnvironmentRecord::default());
        let err = determine_environment(None, &config).unwrap_err();
        assert!(err.to_string().contains("production, staging"));
    }

    #[test]
    fn test_determine_environment_empty() {
        let config = ProjectConfiguration::new("eu-west-1");
        assert!(determine_environment(None, &config).is_err());
    }
}
