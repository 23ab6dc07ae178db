//! CLI interface for teamsctl - manage Microsoft Teams through Microsoft Graph.

use std::env;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow, bail};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use env_logger::fmt::WriteStyle;
use log::{LevelFilter, debug};
use serde::Serialize;
use teamsctl_core::graph::{Channel, Member, Team, TeamsApp};
use teamsctl_core::paths::write_default_config;
use teamsctl_core::{AppConfig, AppPaths, GraphResponse, GraphService, REPO_URL, generate_schema};

const APP_NAME: &str = "teamsctl";

fn main() -> anyhow::Result<()> {
    try_main()
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = RuntimeContext::new(cli.common.clone())?;
    ctx.init_logging()?;
    debug!("resolved paths: {}", ctx.paths);

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Command::Channels { subcommand } => rt.block_on(handle_channels(&ctx, subcommand)),
        Command::Apps { subcommand } => rt.block_on(handle_apps(&ctx, subcommand)),
        Command::Me { subcommand } => rt.block_on(handle_me(&ctx, subcommand)),
        Command::Teams { subcommand } => rt.block_on(handle_teams(&ctx, subcommand)),
        Command::Messages { subcommand } => rt.block_on(handle_messages(&ctx, subcommand)),
        Command::Members { subcommand } => rt.block_on(handle_members(&ctx, subcommand)),
        Command::Init(cmd) => handle_init(&ctx, cmd),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Completions { shell } => {
            handle_completions(shell);
            Ok(())
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "teamsctl",
    author,
    version,
    about = "Manage Microsoft Teams through Microsoft Graph",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

/// Common CLI options shared across all subcommands.
#[derive(Debug, Clone, Args)]
pub struct CommonOpts {
    /// Override the config file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
    /// Graph access token.
    #[arg(
        long,
        env = "TEAMSCTL_ACCESS_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub token: Option<String>,
    /// Reduce output to only errors.
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    pub quiet: bool,
    /// Increase logging verbosity (stackable).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,
    /// Enable trace logging.
    #[arg(long, global = true)]
    pub trace: bool,
    /// Output machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,
    /// Disable ANSI colors in output.
    #[arg(long = "no-color", global = true, conflicts_with = "color")]
    pub no_color: bool,
    /// Control color output.
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    pub color: ColorOption,
    /// Do not change anything on disk.
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,
    /// Assume "yes" for interactive prompts.
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
    /// Detect terminal capabilities automatically.
    Auto,
    /// Always emit ANSI color codes.
    Always,
    /// Never emit ANSI color codes.
    Never,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List or create channels in a team.
    Channels {
        #[command(subcommand)]
        subcommand: ChannelsSubcommand,
    },
    /// List apps installed in a team.
    Apps {
        #[command(subcommand)]
        subcommand: AppsSubcommand,
    },
    /// The signed-in user.
    Me {
        #[command(subcommand)]
        subcommand: MeSubcommand,
    },
    /// List, create, enable or update teams.
    Teams {
        #[command(subcommand)]
        subcommand: TeamsSubcommand,
    },
    /// Post channel messages.
    Messages {
        #[command(subcommand)]
        subcommand: MessagesSubcommand,
    },
    /// Manage team membership.
    Members {
        #[command(subcommand)]
        subcommand: MembersSubcommand,
    },
    /// Create config directories and default files.
    Init(InitCommand),
    /// Inspect and manage configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum ChannelsSubcommand {
    /// List channels in a team.
    List {
        /// Team ID.
        team_id: String,
    },
    /// Create a channel.
    Create {
        /// Team ID.
        team_id: String,
        /// Channel name.
        name: String,
        /// Channel description.
        #[arg(short, long, default_value = "")]
        description: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum AppsSubcommand {
    /// List apps in a team.
    List {
        /// Team ID.
        team_id: String,
    },
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum MeSubcommand {
    /// Print your user object ID.
    Id,
}

#[derive(Debug, Clone, Subcommand)]
enum TeamsSubcommand {
    /// List your teams.
    List,
    /// Create a group, join it, and turn it into a team.
    Create {
        /// Team display name.
        display_name: String,
        /// Mail alias for the backing group.
        mail_nickname: String,
        /// Team description.
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Enable Teams on an existing group.
    Enable {
        /// Group ID.
        group_id: String,
    },
    /// Allow guests to create and update channels.
    Update {
        /// Team ID.
        team_id: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum MessagesSubcommand {
    /// Start a thread in a channel.
    Post {
        /// Team ID.
        team_id: String,
        /// Channel ID.
        channel_id: String,
        /// Message content.
        message: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum MembersSubcommand {
    /// Add a user to a team by UPN.
    Add {
        /// Team ID.
        team_id: String,
        /// User principal name (e.g. alice@contoso.com).
        upn: String,
        /// Also make the user an owner.
        #[arg(long)]
        owner: bool,
    },
}

#[derive(Debug, Clone, Copy, Args)]
struct InitCommand {
    /// Recreate configuration even if it already exists.
    #[arg(long = "force")]
    force: bool,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Output the effective configuration.
    Show,
    /// Print the resolved config file path.
    Path,
    /// Print the JSON schema.
    Schema,
    /// Regenerate the default configuration file.
    Reset,
}

// ─── Runtime ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct RuntimeContext {
    common: CommonOpts,
    paths: AppPaths,
    config: AppConfig,
}

impl RuntimeContext {
    fn new(common: CommonOpts) -> Result<Self> {
        let paths = AppPaths::discover(common.config.as_deref())?;
        let config = AppConfig::load(&paths, common.dry_run)?;
        Ok(Self {
            common,
            paths,
            config,
        })
    }

    fn init_logging(&self) -> Result<()> {
        if self.common.quiet {
            log::set_max_level(LevelFilter::Off);
            return Ok(());
        }
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
        builder.filter_level(self.effective_log_level());

        if let Some(ref file) = self.config.logging.file {
            let target = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .with_context(|| format!("opening log file {file}"))?;
            builder.target(env_logger::Target::Pipe(Box::new(target)));
            builder.write_style(WriteStyle::Never);
        } else {
            let force_color = matches!(self.common.color, ColorOption::Always)
                || env::var_os("FORCE_COLOR").is_some();
            let disable_color = self.common.no_color
                || matches!(self.common.color, ColorOption::Never)
                || env::var_os("NO_COLOR").is_some()
                || (!force_color && !io::stderr().is_terminal());

            if disable_color {
                builder.write_style(WriteStyle::Never);
            } else if force_color {
                builder.write_style(WriteStyle::Always);
            } else {
                builder.write_style(WriteStyle::Auto);
            }
        }

        builder.try_init().or_else(|err| {
            if self.common.verbose > 0 {
                eprintln!("logger already initialized: {err}");
            }
            Ok(())
        })
    }

    /// Flags win; without any, the configured level applies.
    const fn effective_log_level(&self) -> LevelFilter {
        if self.common.trace {
            LevelFilter::Trace
        } else if self.common.debug {
            LevelFilter::Debug
        } else {
            match self.common.verbose {
                0 => self.config.logging.level.as_filter(),
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    fn access_token(&self) -> Result<&str> {
        self.common
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("no access token: pass --token or set TEAMSCTL_ACCESS_TOKEN"))
    }

    fn graph(&self) -> Result<GraphService> {
        Ok(GraphService::from_config(&self.config)?)
    }
}

// ─── Handlers ────────────────────────────────────────────────────────

async fn handle_channels(ctx: &RuntimeContext, cmd: ChannelsSubcommand) -> Result<()> {
    let token = ctx.access_token()?;
    let graph = ctx.graph()?;

    match cmd {
        ChannelsSubcommand::List { team_id } => {
            let channels = graph.get_channels(token, &team_id).await;
            if ctx.common.json {
                println!("{}", serde_json::to_string_pretty(&channels)?);
                return Ok(());
            }
            print_channels(&channels);
            Ok(())
        }
        ChannelsSubcommand::Create {
            team_id,
            name,
            description,
        } => {
            let response = graph
                .create_channel(token, &team_id, &name, &description)
                .await?;
            report_response(ctx, &response)
        }
    }
}

async fn handle_apps(ctx: &RuntimeContext, cmd: AppsSubcommand) -> Result<()> {
    let token = ctx.access_token()?;
    let graph = ctx.graph()?;

    match cmd {
        AppsSubcommand::List { team_id } => {
            let apps = graph.get_apps(token, &team_id).await;
            if ctx.common.json {
                println!("{}", serde_json::to_string_pretty(&apps)?);
                return Ok(());
            }
            print_apps(&apps);
            Ok(())
        }
    }
}

async fn handle_me(ctx: &RuntimeContext, cmd: MeSubcommand) -> Result<()> {
    let token = ctx.access_token()?;
    let graph = ctx.graph()?;

    match cmd {
        MeSubcommand::Id => {
            let id = graph.get_my_id(token).await;
            if id.is_empty() {
                bail!("could not read your user id (run with -v for details)");
            }
            if ctx.common.json {
                println!("{}", serde_json::json!({ "id": id }));
            } else {
                println!("{id}");
            }
            Ok(())
        }
    }
}

async fn handle_teams(ctx: &RuntimeContext, cmd: TeamsSubcommand) -> Result<()> {
    let token = ctx.access_token()?;
    let graph = ctx.graph()?;

    match cmd {
        TeamsSubcommand::List => {
            let teams = graph.get_my_teams(token).await;
            if ctx.common.json {
                println!("{}", serde_json::to_string_pretty(&teams)?);
                return Ok(());
            }
            print_teams(&teams);
            Ok(())
        }
        TeamsSubcommand::Create {
            display_name,
            mail_nickname,
            description,
        } => {
            let group = graph
                .create_team_and_group(token, &display_name, &mail_nickname, &description)
                .await?
                .ok_or_else(|| anyhow!("Graph refused to create group '{mail_nickname}'"))?;
            if ctx.common.json {
                println!("{}", serde_json::to_string_pretty(&group)?);
            } else {
                println!("  {}", group.display_name);
                println!("    ID: {}", group.id.as_deref().unwrap_or("?"));
            }
            Ok(())
        }
        TeamsSubcommand::Enable { group_id } => {
            let reason = graph.add_team_to_group(token, &group_id).await?;
            println!("{reason}");
            Ok(())
        }
        TeamsSubcommand::Update { team_id } => {
            let reason = graph.update_team(token, &team_id).await?;
            println!("{reason}");
            Ok(())
        }
    }
}

async fn handle_messages(ctx: &RuntimeContext, cmd: MessagesSubcommand) -> Result<()> {
    let token = ctx.access_token()?;
    let graph = ctx.graph()?;

    match cmd {
        MessagesSubcommand::Post {
            team_id,
            channel_id,
            message,
        } => {
            let response = graph
                .post_message(token, &team_id, &channel_id, &message)
                .await?;
            report_response(ctx, &response)
        }
    }
}

async fn handle_members(ctx: &RuntimeContext, cmd: MembersSubcommand) -> Result<()> {
    let token = ctx.access_token()?;
    let graph = ctx.graph()?;

    match cmd {
        MembersSubcommand::Add {
            team_id,
            upn,
            owner,
        } => {
            let member = Member::new(upn, owner);
            graph.add_member(token, &team_id, &member).await?;
            let role = if member.owner { "owner" } else { "member" };
            println!("added {} to {team_id} as {role}", member.upn);
            Ok(())
        }
    }
}

fn handle_init(ctx: &RuntimeContext, cmd: InitCommand) -> Result<()> {
    if ctx.paths.config_file.exists() && !(cmd.force || ctx.common.assume_yes) {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            ctx.paths.config_file.display()
        ));
    }
    if ctx.common.dry_run {
        log::info!(
            "dry-run: would write default config to {}",
            ctx.paths.config_file.display()
        );
        return Ok(());
    }
    write_default_config(&ctx.paths.config_file)
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if ctx.common.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ctx.config)
                        .context("serializing config to JSON")?
                );
            } else {
                println!("{:#?}", ctx.config);
            }
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", ctx.paths.config_file.display());
            Ok(())
        }
        ConfigCommand::Schema => {
            println!("{}", generate_schema(APP_NAME, REPO_URL)?);
            Ok(())
        }
        ConfigCommand::Reset => {
            if ctx.common.dry_run {
                log::info!(
                    "dry-run: would reset config at {}",
                    ctx.paths.config_file.display()
                );
                return Ok(());
            }
            write_default_config(&ctx.paths.config_file)
        }
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}

// ─── Formatting helpers ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ResponseSummary<'a> {
    status: u16,
    reason: &'a str,
    body: Option<serde_json::Value>,
}

/// Print a raw Graph response; a non-success status becomes the error.
fn report_response(ctx: &RuntimeContext, response: &GraphResponse) -> Result<()> {
    if ctx.common.json {
        let summary = ResponseSummary {
            status: response.status,
            reason: &response.reason,
            body: serde_json::from_str(&response.body).ok(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{} {}", response.status, response.reason);
    }

    if response.is_success() {
        Ok(())
    } else {
        Err(anyhow!("Graph returned {} {}", response.status, response.reason))
    }
}

fn print_channels(channels: &[Channel]) {
    for ch in channels {
        println!("  {}", ch.display_name.as_deref().unwrap_or("?"));
        if let Some(desc) = ch.description.as_deref().filter(|d| !d.is_empty()) {
            println!("    {}", truncate(desc, 80));
        }
        println!("    ID: {}", ch.id.as_deref().unwrap_or("?"));
    }
}

fn print_apps(apps: &[TeamsApp]) {
    for app in apps {
        println!("  {}", app.display_name.as_deref().unwrap_or("?"));
        println!("    ID: {}", app.id.as_deref().unwrap_or("?"));
    }
}

fn print_teams(teams: &[Team]) {
    for team in teams {
        println!("  {}", team.display_name.as_deref().unwrap_or("?"));
        if let Some(desc) = team.description.as_deref().filter(|d| !d.is_empty()) {
            println!("    {}", truncate(desc, 80));
        }
        println!("    ID: {}", team.id.as_deref().unwrap_or("?"));
        println!();
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_member_add_with_owner_flag() {
        let cli = Cli::try_parse_from([
            "teamsctl",
            "--token",
            "abc",
            "members",
            "add",
            "t-1",
            "alice@contoso.com",
            "--owner",
        ])
        .unwrap();
        assert_eq!(cli.common.token.as_deref(), Some("abc"));
        match cli.command {
            Command::Members {
                subcommand: MembersSubcommand::Add {
                    team_id,
                    upn,
                    owner,
                },
            } => {
                assert_eq!(team_id, "t-1");
                assert_eq!(upn, "alice@contoso.com");
                assert!(owner);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn channel_description_defaults_to_empty() {
        let cli = Cli::try_parse_from(["teamsctl", "channels", "create", "t-1", "Ops"]).unwrap();
        match cli.command {
            Command::Channels {
                subcommand: ChannelsSubcommand::Create { description, .. },
            } => assert_eq!(description, ""),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 3), "éé…");
    }
}
