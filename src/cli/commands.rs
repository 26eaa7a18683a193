use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::config::{CONFIG_FILE_NAME, ProjectOverrides, SiteConfig};
use crate::git::{GitRepo, normalize_remote_url};
use crate::site::{BuildReport, BuildRequest, DEFAULT_PORT, build_site, serve};
use crate::utils::format_path_with_tilde;

#[derive(Parser)]
#[command(name = "hypertransparency")]
#[command(version)]
#[command(about = "Publish AI coding sessions as a browsable static site", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the static site from recorded sessions and git history
    Build(BuildArgs),
    /// Write a default config file for a repository
    Init(InitArgs),
    /// Serve a built site on localhost
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Repository root
    #[arg(default_value = ".")]
    pub repo: PathBuf,
    /// Output directory [default: <REPO>/docs]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Config file [default: <REPO>/.hypertransparency.json]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Read session logs from this directory instead of ~/.claude/projects/<encoded repo>
    #[arg(long)]
    pub sessions_dir: Option<PathBuf>,
    /// Project name
    #[arg(long)]
    pub name: Option<String>,
    /// Project description
    #[arg(long)]
    pub description: Option<String>,
    /// Repository URL used for commit links
    #[arg(long)]
    pub repo_url: Option<String>,
    /// Branch name shown in the site
    #[arg(long)]
    pub branch: Option<String>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Repository root
    #[arg(default_value = ".")]
    pub repo: PathBuf,
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
    /// Only write the config, skip the initial build
    #[arg(long)]
    pub no_build: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Directory of a built site
    #[arg(default_value = "docs")]
    pub dir: PathBuf,
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => run_build(args),
        Commands::Init(args) => run_init(args),
        Commands::Serve(args) => serve(args.dir, args.port),
    }
}

fn resolve_repo(repo: &Path) -> Result<PathBuf> {
    let repo = repo
        .canonicalize()
        .with_context(|| format!("Repository not found: {}", repo.display()))?;
    if !repo.is_dir() {
        bail!("Not a directory: {}", repo.display());
    }
    Ok(repo)
}

fn run_build(args: BuildArgs) -> Result<()> {
    let repo = resolve_repo(&args.repo)?;
    let config_path = args.config.unwrap_or_else(|| repo.join(CONFIG_FILE_NAME));

    let mut config = SiteConfig::load_or_default(&config_path)?;
    config.apply_overrides(ProjectOverrides {
        name: args.name,
        description: args.description,
        repository: args.repo_url,
        branch: args.branch,
    });
    config.resolve_for_repo(&repo);

    let mut request = BuildRequest::new(&repo);
    if let Some(output) = args.output {
        request.output_dir = output;
    }
    request.sessions_dir = args.sessions_dir;

    build_and_report(&request, &config)
}

fn build_and_report(request: &BuildRequest, config: &SiteConfig) -> Result<()> {
    println!("Building site for {}", format_path_with_tilde(&request.repo_path));
    let report = build_site(request, config)?;
    print_summary(&report, &request.output_dir);
    Ok(())
}

fn print_summary(report: &BuildReport, output_dir: &Path) {
    let stats = &report.stats;
    println!();
    println!("Site built: {}", format_path_with_tilde(output_dir));
    println!("================================");
    println!("Messages: {}", stats.total_messages);
    println!("  User: {}", stats.user_messages);
    println!("  Assistant: {}", stats.assistant_messages);
    println!("  Tool calls: {}", stats.tool_calls);
    println!("Commits: {} ({} turns correlated)", stats.total_commits, stats.correlated_turns);
    println!("Images: {} ({} historical versions)", stats.total_images, stats.image_versions);
    println!("Sessions: {} ({} pages)", stats.sessions, stats.pages);
    println!("Search terms: {}", stats.search_terms);

    if report.skipped_lines > 0 || report.failed_sessions > 0 {
        println!("Skipped: {} lines, {} session files", report.skipped_lines, report.failed_sessions);
    }
    if let Some(reason) = &report.git_unavailable {
        println!("Git history unavailable: {}", reason);
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let repo = resolve_repo(&args.repo)?;
    let config_path = repo.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", config_path.display());
    }

    let mut config = SiteConfig::default();
    config.resolve_for_repo(&repo);
    if let Some(url) = GitRepo::open(&repo).remote_url("origin") {
        config.project.repository = normalize_remote_url(&url);
    }

    let json = config.to_pretty_json()?;
    fs::write(&config_path, json + "\n")
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Wrote {}", format_path_with_tilde(&config_path));

    if args.no_build {
        return Ok(());
    }
    build_and_report(&BuildRequest::new(&repo), &config)
}
