use anyhow::Context;
use clap::{Parser, Subcommand};
use notify_fhir::config::{bundle_profile_from_env_value, full_url_base_from_env_value};
use notify_fhir::{AssemblerConfig, IdentifiabilityTier, NotificationCase};
use notify_uuid::Generators;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "notify")]
#[command(about = "Assemble and redact FHIR disease notifications")]
struct Cli {
    /// Base URL for entry fullUrls (overrides NOTIFY_FULL_URL_BASE)
    #[arg(long, global = true)]
    full_url_base: Option<String>,
    /// Bundle profile URL (overrides NOTIFY_BUNDLE_PROFILE)
    #[arg(long, global = true)]
    bundle_profile: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a notification bundle from a case file and print it as JSON
    Bundle {
        /// Path to the YAML case file
        case: PathBuf,
        /// Identifiability of the notified person
        #[arg(long, default_value = "by-name", value_parser = parse_tier)]
        tier: IdentifiabilityTier,
    },
    /// Print the notified person of a case file redacted to a tier
    Redact {
        /// Path to the YAML case file
        case: PathBuf,
        /// Identifiability of the notified person
        #[arg(long, value_parser = parse_tier)]
        tier: IdentifiabilityTier,
    },
}

fn parse_tier(value: &str) -> Result<IdentifiabilityTier, String> {
    IdentifiabilityTier::parse(value).ok_or_else(|| {
        let known: Vec<&str> = IdentifiabilityTier::ALL.iter().map(|t| t.as_str()).collect();
        format!("unknown tier '{value}', expected one of: {}", known.join(", "))
    })
}

/// Resolves the assembler configuration: flags win over environment, environment over defaults.
fn resolve_config(
    full_url_base: Option<String>,
    bundle_profile: Option<String>,
) -> anyhow::Result<AssemblerConfig> {
    let base = full_url_base_from_env_value(
        full_url_base.or_else(|| std::env::var("NOTIFY_FULL_URL_BASE").ok()),
    )?;
    let profile = bundle_profile_from_env_value(
        bundle_profile.or_else(|| std::env::var("NOTIFY_BUNDLE_PROFILE").ok()),
    )?;
    Ok(AssemblerConfig::new(&base, &profile)?)
}

fn load_case(path: &Path) -> anyhow::Result<NotificationCase> {
    NotificationCase::from_path(path)
        .with_context(|| format!("failed to load case file {}", path.display()))
}

fn bundle_json(
    case: &Path,
    tier: IdentifiabilityTier,
    generators: &Generators,
    config: &AssemblerConfig,
) -> anyhow::Result<String> {
    let bundle = load_case(case)?.assemble(tier, generators, config)?;
    tracing::info!(
        bundle_id = bundle.id(),
        entries = bundle.entries().len(),
        tier = %tier,
        "assembled notification bundle"
    );
    Ok(bundle.to_json_pretty()?)
}

fn redact_json(
    case: &Path,
    tier: IdentifiabilityTier,
    generators: &Generators,
) -> anyhow::Result<String> {
    let patient = load_case(case)?
        .redacted_person(tier, generators)?
        .context("case file has no notified person")?;
    Ok(serde_json::to_string_pretty(&patient)?)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("notify=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.full_url_base, cli.bundle_profile)?;
    let generators = Generators::system();

    let output = match cli.command {
        Commands::Bundle { case, tier } => bundle_json(&case, tier, &generators, &config)?,
        Commands::Redact { case, tier } => redact_json(&case, tier, &generators)?,
    };
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_uuid::{FixedClock, SequentialIdGenerator};
    use std::io::Write;

    const CASE: &str = r#"
composition:
  id: c1
notifier:
  organization:
    id: o1
    name: Labor Berlin
notified_person:
  id: p1
  name:
    given: [Max]
    family: Mustermann
  birth_date: "1980-05-17"
  addresses:
    - use: primary
      postal_code: "80331"
      city: München
      country: DE
"#;

    fn generators() -> Generators {
        Generators::new(
            SequentialIdGenerator::new(),
            FixedClock::parse("2024-03-01T10:00:00Z").unwrap(),
        )
    }

    fn case_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write case");
        file
    }

    #[test]
    fn bundle_command_prints_fhir_json() {
        let file = case_file(CASE);
        let json = bundle_json(
            file.path(),
            IdentifiabilityTier::ByName,
            &generators(),
            &AssemblerConfig::default(),
        )
        .expect("bundle");

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["resourceType"], "Bundle");
        assert_eq!(value["entry"][0]["resource"]["id"], "c1");
        assert_eq!(value["entry"][2]["resource"]["id"], "o1");
        assert_eq!(value["entry"][3]["resource"]["name"][0]["family"], "Mustermann");
    }

    #[test]
    fn redact_command_prints_reduced_patient() {
        let file = case_file(CASE);
        let json = redact_json(file.path(), IdentifiabilityTier::NonNominal, &generators())
            .expect("patient");

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["birthDate"], "1980-05");
        assert_eq!(value["address"][0]["postalCode"], "803");
        assert!(value.get("name").is_none());
    }

    #[test]
    fn redact_without_person_fails() {
        let file = case_file("notifier:\n  organization:\n    id: o1\n");
        let err = redact_json(file.path(), IdentifiabilityTier::Anonymous, &generators())
            .expect_err("no person");
        assert!(err.to_string().contains("no notified person"));
    }

    #[test]
    fn missing_case_file_names_the_path() {
        let err = bundle_json(
            Path::new("/definitely/not/here.yaml"),
            IdentifiabilityTier::ByName,
            &generators(),
            &AssemblerConfig::default(),
        )
        .expect_err("missing file");
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }

    #[test]
    fn flags_override_defaults() {
        let config = resolve_config(
            Some("https://fhir.example.org/".into()),
            Some("urn:profile".into()),
        )
        .expect("config");
        assert_eq!(config.full_url_base(), "https://fhir.example.org");
        assert_eq!(config.bundle_profile(), "urn:profile");
    }

    #[test]
    fn tier_parser_lists_known_tiers() {
        assert_eq!(parse_tier("anonymous"), Ok(IdentifiabilityTier::Anonymous));
        let err = parse_tier("secret").expect_err("unknown tier");
        assert!(err.contains("not-by-name"));
    }
}
