//! Command-line interface.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::Client;
use crate::observer::{DryRunObserver, PublishObserver, WetRunObserver};
use crate::site::Site;
use crate::sync::{SyncSummary, create_or_update_posts, delete_posts};
use crate::target::Target;

/// Technical documentation importer for Wordepress.
#[derive(Parser, Debug)]
#[command(name = "wordepress", author, version, about, long_about = None)]
pub struct Cli {
    /// Site URL.
    #[arg(long, global = true, env = "WORDEPRESS_URL", default_value = "http://wordpress.local")]
    pub url: String,

    /// Username for site authentication.
    #[arg(long, global = true, env = "WORDEPRESS_USER")]
    pub user: Option<String>,

    /// Password for site authentication.
    #[arg(long, global = true, env = "WORDEPRESS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Log what would change without touching the site.
    #[arg(long, global = true, env = "WORDEPRESS_DRY_RUN")]
    pub dry_run: bool,

    /// Append `Added|Updated|Deleted <slug>` lines to this file.
    #[arg(long, global = true, env = "WORDEPRESS_REPORT")]
    pub report: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish a source tree into the site.
    Publish {
        #[command(subcommand)]
        kind: PublishCommand,
    },
    /// Delete published posts from the site.
    Delete {
        #[command(subcommand)]
        kind: DeleteCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PublishCommand {
    /// Publish documentation for one product release.
    Documentation {
        /// Value for the product field.
        #[arg(long)]
        product: String,
        /// Value for the version field.
        #[arg(long)]
        version: String,
        /// Value for the tag field.
        #[arg(long)]
        tag: String,
        /// Root of the markdown tree.
        dir: PathBuf,
    },
    /// Publish tutorials.
    Tutorials {
        #[arg(long, default_value = "latest")]
        tag: String,
        dir: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeleteCommand {
    /// Delete documentation for one product tag.
    Documentation {
        #[arg(long)]
        product: String,
        #[arg(long)]
        tag: String,
    },
    /// Delete tutorials for one tag.
    Tutorials {
        #[arg(long, default_value = "latest")]
        tag: String,
    },
}

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> Result<SyncSummary> {
    let (Some(user), Some(password)) = (cli.user.as_deref(), cli.password.as_deref()) else {
        bail!("--user and --password are required");
    };
    if user.is_empty() || password.is_empty() {
        bail!("--user and --password must not be empty");
    }

    let client = Client::new(&cli.url, user, password).context("failed to build HTTP client")?;

    let report = cli
        .report
        .as_ref()
        .map(|path| {
            File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open report file {}", path.display()))
        })
        .transpose()?;

    let mut dry = DryRunObserver;
    let mut wet = WetRunObserver::new(report);
    let observer: &mut dyn PublishObserver = if cli.dry_run { &mut dry } else { &mut wet };

    match cli.command {
        Command::Publish { kind } => {
            let (target, dir) = match kind {
                PublishCommand::Documentation {
                    product,
                    version,
                    tag,
                    dir,
                } => (Target::documentation(product, version, tag), dir),
                PublishCommand::Tutorials { tag, dir } => (Target::tutorials(tag), dir),
            };
            info!(url = %cli.url, rest_base = target.rest_base(), dir = %dir.display(), "Publishing");

            let site = Site::load(&target, &dir).context("error parsing site")?;
            create_or_update_posts(&client, &target, &site, observer)
                .await
                .context("error publishing documents")
        }
        Command::Delete { kind } => {
            let target = match kind {
                DeleteCommand::Documentation { product, tag } => {
                    Target::documentation(product, String::new(), tag)
                }
                DeleteCommand::Tutorials { tag } => Target::tutorials(tag),
            };
            info!(url = %cli.url, rest_base = target.rest_base(), tag = target.tag(), "Deleting");

            delete_posts(&client, &target, observer)
                .await
                .context("error deleting documents")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_publish_documentation() {
        let cli = Cli::try_parse_from([
            "wordepress",
            "--user",
            "admin",
            "--password",
            "pw",
            "publish",
            "documentation",
            "--product",
            "net",
            "--version",
            "1.0",
            "--tag",
            "latest",
            "site",
        ])
        .unwrap();
        assert_eq!(cli.url, "http://wordpress.local");
        assert!(!cli.dry_run);
        match cli.command {
            Command::Publish {
                kind: PublishCommand::Documentation { product, dir, .. },
            } => {
                assert_eq!(product, "net");
                assert_eq!(dir, PathBuf::from("site"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommands_and_tag_defaults() {
        let cli = Cli::try_parse_from(["wordepress", "delete", "tutorials", "--dry-run"]).unwrap();
        assert!(cli.dry_run);
        match cli.command {
            Command::Delete {
                kind: DeleteCommand::Tutorials { tag },
            } => assert_eq!(tag, "latest"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn documentation_requires_product_and_tag() {
        assert!(Cli::try_parse_from(["wordepress", "delete", "documentation", "--tag", "x"]).is_err());
        assert!(
            Cli::try_parse_from(["wordepress", "publish", "tutorials"]).is_err(),
            "source directory is required"
        );
    }

    #[tokio::test]
    async fn credentials_are_required() {
        let cli = Cli::try_parse_from(["wordepress", "delete", "tutorials", "--user", "admin"]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("--user and --password"));
    }
}
