use anyhow::{Context, Result};
use blob_file_storage::{
    AdapterBuilder, AdapterOptions, AzureOptions, BlobName, BlobStorageAdapter, ContainerName,
    FileStorage, FileUpload, RandomFilenameGenerator, StoredFile,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "blob-storage-cli")]
#[command(about = "Upload, address and delete files in Azure Blob Storage", long_about = None)]
struct Cli {
    /// Container new uploads go to
    #[arg(long, env = "AZURE_STORAGE_CONTAINER")]
    container: Option<String>,

    /// Storage account name
    #[arg(long, env = "AZURE_STORAGE_ACCOUNT")]
    account_name: Option<String>,

    /// Storage account key
    #[arg(long, env = "AZURE_STORAGE_ACCESS_KEY", hide_env_values = true)]
    account_key: Option<String>,

    /// Connection string, used when no account name is given
    #[arg(long, env = "AZURE_STORAGE_CONNECTION_STRING", hide_env_values = true)]
    connection_string: Option<String>,

    /// Blob service endpoint override
    #[arg(long, env = "AZURE_STORAGE_HOST")]
    host: Option<String>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a local file under a generated name
    Upload {
        /// File path to upload
        file: PathBuf,
        /// MIME type stored with the blob
        #[arg(short = 't', long)]
        content_type: Option<String>,
        /// Virtual directory for the generated name
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Print the public URL of a blob
    Url {
        /// Blob name
        blob: String,
    },

    /// Delete a blob
    Delete {
        /// Blob name
        blob: String,
        /// Container the blob was recorded under
        #[arg(short = 'c', long = "from")]
        recorded_container: Option<String>,
    },
}

impl Cli {
    fn to_options(&self) -> AdapterOptions {
        AdapterOptions {
            azure: AzureOptions {
                account_name: self.account_name.clone(),
                connection_string: self.connection_string.clone(),
                account_key: self.account_key.clone(),
                host: self.host.clone(),
                container: self.container.clone(),
            },
            ..Default::default()
        }
    }

    fn init_logging(&self) -> Result<()> {
        let env_filter = match self.log_level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        };

        tracing_subscriber::registry()
            .with(EnvFilter::new(env_filter))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to initialize logging")?;

        Ok(())
    }
}

async fn upload(
    adapter: &BlobStorageAdapter,
    file: PathBuf,
    content_type: Option<String>,
    prefix: Option<String>,
) -> Result<()> {
    let metadata = tokio::fs::metadata(&file)
        .await
        .with_context(|| format!("Cannot read {}", file.display()))?;

    let mut upload = FileUpload::new(&file).with_size(metadata.len());
    if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
        upload = upload.with_original_name(name);
    }
    if let Some(content_type) = content_type {
        upload = upload.with_mimetype(content_type);
    }

    let mut generator = RandomFilenameGenerator::new();
    if let Some(prefix) = prefix {
        generator = generator.with_prefix(prefix);
    }

    let stored = adapter
        .store(&upload, &generator)
        .await
        .context("Upload failed")?;
    info!("Uploaded {} as {}", file.display(), stored.filename);

    let record = serde_json::Value::Object(adapter.persisted_fields(&stored));
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn stored_file(blob: String, recorded_container: Option<String>) -> Result<StoredFile> {
    let mut file = StoredFile::new(BlobName::new(blob).context("Invalid blob name")?);
    if let Some(container) = recorded_container {
        file = file.with_container(ContainerName::new(container).context("Invalid container")?);
    }
    Ok(file)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    let adapter = AdapterBuilder::new()
        .with_options(cli.to_options())
        .build()
        .context("Failed to configure blob storage")?;
    info!("Using container {}", adapter.container());

    match cli.command {
        Commands::Upload {
            file,
            content_type,
            prefix,
        } => upload(&adapter, file, content_type, prefix).await?,
        Commands::Url { blob } => {
            println!("{}", adapter.resolve_url(&stored_file(blob, None)?));
        }
        Commands::Delete {
            blob,
            recorded_container,
        } => {
            let file = stored_file(blob, recorded_container)?;
            adapter.remove(&file).await.context("Delete failed")?;
            info!("Deleted {}", file.filename);
        }
    }

    Ok(())
}
