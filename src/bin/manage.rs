//! Project management CLI for profiles-rest-api.

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use tokio::net::TcpListener;

use profiles_rest_api::apps::profiles_api::store::NewProfile;
use profiles_rest_api::config::settings::{Settings, get_settings};
use profiles_rest_api::config::urls::url_patterns;
use profiles_rest_api::core::logging::init_logging;
use profiles_rest_api::core::{HttpServer, ShutdownCoordinator};
use profiles_rest_api::{AppState, build_app};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "profiles-rest-api management interface", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Directory holding base.toml and the <profile>.toml overrides
	#[arg(long, global = true, default_value = "settings", value_name = "DIR")]
	settings_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the server
	Runserver {
		/// Server address (default: host and port from settings)
		#[arg(value_name = "ADDRESS")]
		address: Option<String>,

		/// Create a staff profile with this email before serving
		#[arg(long, value_name = "EMAIL", requires = "superuser_password")]
		superuser: Option<String>,

		#[arg(long, value_name = "PASSWORD", requires = "superuser")]
		superuser_password: Option<String>,
	},

	/// Load the settings and print them
	Check,

	/// Display all registered URL patterns
	Showurls,
}

fn load_settings(dir: &Path) -> Result<Settings, Box<dyn std::error::Error>> {
	Ok(get_settings(dir)?)
}

async fn run_runserver(
	settings: Settings,
	address: Option<String>,
	superuser: Option<(String, String)>,
) -> CliResult {
	init_logging(&settings).map_err(|e| e.to_string())?;

	let state = AppState::new();
	if let Some((email, password)) = superuser {
		let profile = state
			.profiles
			.create(NewProfile {
				name: email.clone(),
				email,
				password_hash: state.hasher.hash(&password)?,
				is_staff: true,
			})
			.await?;
		tracing::info!(profile_id = profile.id, "superuser created");
	}

	let address = address.unwrap_or_else(|| settings.bind_address());
	let listener = TcpListener::bind(&address).await?;
	println!(
		"{} http://{}/",
		style("Starting server at").green().bold(),
		listener.local_addr()?
	);
	if settings.debug {
		println!("{}", style("Debug mode is on; do not use in production.").yellow());
	}
	println!("Quit the server with CONTROL-C.");

	let coordinator = ShutdownCoordinator::new(Duration::from_secs(settings.shutdown_timeout));
	let signal = coordinator.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::info!("received ctrl-c");
			signal.shutdown();
		}
	});

	HttpServer::new(build_app(state))
		.serve(listener, coordinator)
		.await?;
	Ok(())
}

fn run_check(settings: &Settings) -> CliResult {
	println!("{}", style("Settings").cyan().bold());
	print!("{}", toml::to_string(settings)?);
	println!("{}", style("System check identified no issues.").green());
	Ok(())
}

fn run_showurls() {
	let router = url_patterns(&AppState::new());
	for route in router.routes() {
		println!("{:<28} {}", route.pattern(), style(route.name()).dim());
	}
}

async fn run() -> CliResult {
	let cli = Cli::parse();

	let result = match cli.command {
		Commands::Runserver {
			address,
			superuser,
			superuser_password,
		} => match load_settings(&cli.settings_dir) {
			Ok(settings) => run_runserver(settings, address, superuser.zip(superuser_password)).await,
			Err(e) => Err(e),
		},
		Commands::Check => load_settings(&cli.settings_dir).and_then(|s| run_check(&s)),
		Commands::Showurls => {
			run_showurls();
			Ok(())
		}
	};

	if let Err(e) = result {
		eprintln!("{} {}", style("Error:").red().bold(), e);
		process::exit(1);
	}

	Ok(())
}

#[tokio::main]
async fn main() -> CliResult {
	run().await
}
