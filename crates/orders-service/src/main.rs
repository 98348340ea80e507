//! Main entry point for the order desk.
//!
//! This binary drives the order list workflow from a terminal: it lists
//! orders, shows one order, creates, edits and deletes orders, uploads PDFs
//! for server-side extraction and prints the backend activity log. Every
//! command loads the collection first, performs one action, and exits.

use clap::{Parser, Subcommand};
use orders_api::OrderApiService;
use orders_config::{Config, BASE_URL_ENV};
use orders_core::{render_activity, MutationOutcome, OrderListView};
use orders_types::{OrderId, PdfFile, PDF_CONTENT_TYPE};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod terminal;

use terminal::{TerminalConfirmer, TerminalNotifier};

/// Command-line arguments for the order desk.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "orders.toml")]
	config: PathBuf,

	/// Base URL of the orders service, overriding the configuration file
	#[arg(long, env = BASE_URL_ENV)]
	api_url: Option<String>,

	/// API implementation to use (http, memory)
	#[arg(long)]
	backend: Option<String>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
	/// Show the order table
	List,
	/// Show the details of one order
	View { id: OrderId },
	/// Create an order
	Create {
		#[arg(long, default_value = "")]
		first_name: String,
		#[arg(long, default_value = "")]
		last_name: String,
		/// Date of birth as YYYY-MM-DD
		#[arg(long, default_value = "")]
		dob: String,
	},
	/// Edit an order; omitted fields keep their current value
	Edit {
		id: OrderId,
		#[arg(long)]
		first_name: Option<String>,
		#[arg(long)]
		last_name: Option<String>,
		#[arg(long)]
		dob: Option<String>,
	},
	/// Delete an order
	Delete {
		id: OrderId,
		/// Skip the confirmation prompt
		#[arg(short, long)]
		yes: bool,
	},
	/// Upload a PDF and create an order from its contents
	Upload { file: PathBuf },
	/// Show the backend activity log
	Logs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = load_config(&args).await?;
	tracing::info!(
		"Using {} order API at {}",
		config.api.implementation,
		config.api.base_url
	);

	let api = OrderApiService::from_config(&config)?;
	let mut ui = config.ui.clone();
	if let Command::Delete { yes: true, .. } = args.command {
		ui.confirm_deletes = false;
	}
	let view = OrderListView::with_config(
		api,
		&ui,
		Arc::new(TerminalNotifier),
		Arc::new(TerminalConfirmer),
	);

	run(&view, args.command).await
}

/// Loads the configuration file and applies command-line overrides.
async fn load_config(args: &Args) -> Result<Config, Box<dyn Error>> {
	let mut config = Config::from_file_or_default(&args.config).await?;
	if let Some(url) = &args.api_url {
		config = config.with_base_url(url.clone())?;
	}
	if let Some(backend) = &args.backend {
		config = config.with_implementation(backend.clone())?;
	}
	Ok(config)
}

/// Runs one command against the view.
async fn run(view: &OrderListView, command: Command) -> Result<(), Box<dyn Error>> {
	view.load().await;

	match command {
		Command::List => {
			println!("{}", view.render().await);
			match view.store().error().await {
				Some(e) => Err(e.into()),
				None => Ok(()),
			}
		},
		Command::View { id } => {
			view.view_order(id).await?;
			Ok(())
		},
		Command::Create {
			first_name,
			last_name,
			dob,
		} => {
			view.open_create();
			{
				let mut form = view.create_form();
				form.set_first_name(first_name);
				form.set_last_name(last_name);
				form.set_dob(dob);
			}
			let outcome = view.submit_create().await;
			if outcome.is_success() {
				println!("{}", view.render().await);
			}
			finish(outcome)
		},
		Command::Edit {
			id,
			first_name,
			last_name,
			dob,
		} => {
			let order = match view.row(id).await {
				Some(order) => order,
				None => view.api().get_order(id).await?,
			};
			view.open_edit(order);
			{
				let mut form = view.edit_form();
				if let Some(value) = first_name {
					form.set_first_name(value);
				}
				if let Some(value) = last_name {
					form.set_last_name(value);
				}
				if let Some(value) = dob {
					form.set_dob(value);
				}
			}
			let outcome = view.submit_edit().await;
			if outcome.is_success() {
				println!("{}", view.render().await);
			}
			finish(outcome)
		},
		Command::Delete { id, .. } => {
			let outcome = view.delete_order(id).await;
			if outcome.is_success() {
				println!("{}", view.render().await);
			}
			finish(outcome)
		},
		Command::Upload { file } => {
			let bytes = tokio::fs::read(&file).await?;
			let name = file
				.file_name()
				.map(|name| name.to_string_lossy().into_owned())
				.unwrap_or_default();
			view.select_file(Some(PdfFile::new(name, content_type_for(&file), bytes)))?;
			let outcome = view.submit_upload().await;
			if outcome.is_success() {
				println!("{}", view.render().await);
			}
			finish(outcome)
		},
		Command::Logs => {
			let logs = view.activity().await?;
			println!("{}", render_activity(&logs));
			Ok(())
		},
	}
}

/// Maps an outcome to the process result.
fn finish(outcome: MutationOutcome) -> Result<(), Box<dyn Error>> {
	match outcome {
		MutationOutcome::Succeeded => Ok(()),
		MutationOutcome::Declined => {
			println!("Cancelled.");
			Ok(())
		},
		MutationOutcome::Failed(e) => Err(e.into()),
		MutationOutcome::Rejected(e) => Err(e.into()),
		MutationOutcome::NotSubmitted(e) => Err(e.into()),
	}
}

/// Guesses a content type from the file extension.
fn content_type_for(path: &Path) -> &'static str {
	match path.extension().and_then(|ext| ext.to_str()) {
		Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_CONTENT_TYPE,
		_ => "application/octet-stream",
	}
}
