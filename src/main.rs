use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use jsonshelf::config::{Backend, Config};
use jsonshelf::files::page::{clamp_page, page_count, page_slice};
use jsonshelf::files::schema::FileListResponse;
use jsonshelf::files::{
    request_delete, selectors, AutoConfirm, Confirmation, Dismissed, FileTable, LocalFile,
    PersistenceSync, Store, TerminalConfirm, UploadFlow, UploadForm,
};
use std::io::Write as _;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jsonshelf", version, about = "Upload, list and delete JSON files")]
struct Cli {
    #[arg(long, global = true, help = "Config file (default: platform config dir)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory holding the file snapshot")]
    data_dir: Option<String>,
    #[arg(long, global = true, value_enum)]
    backend: Option<Backend>,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and store a JSON file
    Upload {
        path: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    /// List stored files a page at a time
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, help = "Output machine-readable JSON")]
        json: bool,
    },
    /// Print the stored content of a file
    Show { file_name: String },
    /// Delete a stored file after confirmation
    Delete {
        file_name: String,
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    let storage = config.open_storage()?;
    let mut store = PersistenceSync::new(storage, config.storage_key.clone()).boot();

    match cli.command {
        Commands::Upload {
            path,
            name,
            description,
        } => upload(&config, &mut store, path, name, description).await,
        Commands::List { page, json } => list(&config, &store, page, json),
        Commands::Show { file_name } => {
            let state = store.snapshot();
            let file = selectors::find(&state, &file_name)
                .with_context(|| format!("No file named \"{file_name}\""))?;
            println!("{}", file.content);
            Ok(())
        }
        Commands::Delete { file_name, yes } => {
            if !selectors::exists(&store.snapshot(), &file_name) {
                bail!("No file named \"{file_name}\"");
            }
            let confirmation: Box<dyn Confirmation> = if yes {
                Box::new(AutoConfirm)
            } else {
                Box::new(TerminalConfirm)
            };
            match request_delete(&mut store, confirmation.as_ref(), &file_name).await {
                Ok(()) => println!("Deleted {file_name}"),
                Err(Dismissed) => println!("Cancelled"),
            }
            Ok(())
        }
    }
}

async fn upload(
    config: &Config,
    store: &mut Store,
    path: PathBuf,
    name: String,
    description: String,
) -> Result<()> {
    let flow = UploadFlow::new(config.rules(), config.simulator());
    let form = UploadForm::new(LocalFile::new(path), name, description);

    let result = flow
        .submit(store, form, |p| {
            eprint!("\rUploading... {:>3}%", p.progress);
            let _ = std::io::stderr().flush();
        })
        .await;
    eprintln!();

    match result {
        Ok(item) => {
            let status = if item.valid { "valid" } else { "invalid" };
            println!("Stored {} ({status})", item.file_name);
            Ok(())
        }
        Err(errors) => {
            for (field, message) in errors.messages() {
                eprintln!("{field}: {message}");
            }
            bail!("upload rejected")
        }
    }
}

fn list(config: &Config, store: &Store, page: usize, json: bool) -> Result<()> {
    let state = store.snapshot();
    let rows = selectors::rows(&state);
    let total = selectors::count(&state);
    let page_size = config.page_size;
    let page = clamp_page(page.max(1), total, page_size);
    let slice = page_slice(&rows, page, page_size);

    if json {
        let response = FileListResponse {
            files: slice.to_vec(),
            total,
            page,
            page_size,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let offset = (page - 1) * page_size;
    let colored = console::colors_enabled();
    print!("{}", FileTable::new(slice).with_offset(offset).render(colored));
    if total > 0 {
        println!(
            "Page {page}/{} - {total} file(s)",
            page_count(total, page_size)
        );
    }
    Ok(())
}
