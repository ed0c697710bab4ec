//! Command-line client for the EPGU e-services API.

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::CliConfig;
use epgu_client::Client;
use epgu_core::archive::{Archive, ArchiveFile};
use epgu_core::dict::{DictRequest, TreeFiltering};
use epgu_core::meta::OrderMeta;
use epgu_esia::{CryptoProProvider, Permission, Permissions, Sysname};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "epguctl")]
#[command(about = "Command-line client for the EPGU e-services API")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, env = "EPGU_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct MetaArgs {
    /// Interactive form code on the portal
    #[arg(long)]
    region: String,

    /// Target service code in the FRGU catalogue
    #[arg(long)]
    service_code: String,

    /// OKATO code of the user's location
    #[arg(long)]
    target_code: String,
}

impl MetaArgs {
    fn into_meta(self) -> OrderMeta {
        OrderMeta::new(self.region, self.service_code, self.target_code)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Application (order) commands
    Order {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// Look up a reference dictionary
    Dict {
        /// Dictionary code, e.g. EXTERNAL_BIC
        code: String,

        /// Request a hierarchical dictionary instead of a flat one
        #[arg(long)]
        subtree: bool,

        /// Code of the parent element
        #[arg(long)]
        parent: Option<String>,

        /// Page number to fetch
        #[arg(long)]
        page_num: Option<u32>,

        /// Number of items per page
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Download an attachment by its storage link
    Download {
        /// Storage link (terrabyte://...)
        link: String,

        /// Output file path
        #[arg(long, short)]
        output: PathBuf,
    },
    /// ESIA authorization helpers
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Subcommand)]
enum OrderCommands {
    /// Create an application
    Create {
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Create and submit an application with attachments in one request
    Push {
        #[command(flatten)]
        meta: MetaArgs,

        /// Attachment files to zip
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Archive name (defaults to the first file's stem)
        #[arg(long)]
        name: Option<String>,
    },
    /// Upload attachments for an existing application in chunks
    PushChunked {
        /// Order number
        order_id: u64,

        #[command(flatten)]
        meta: MetaArgs,

        /// Attachment files to zip
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Archive name (defaults to the first file's stem)
        #[arg(long)]
        name: Option<String>,

        /// Maximum chunk size in bytes
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Show application details
    Info {
        /// Order number
        order_id: u64,
    },
    /// Cancel an application
    Cancel {
        /// Order number
        order_id: u64,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Print the ESIA authorization link for the configured system
    Uri {
        /// Requested scope
        #[arg(long, default_value = "openid")]
        scope: String,

        /// Redirect URI registered for the system
        #[arg(long)]
        redirect_uri: String,

        /// Consent type mnemonic
        #[arg(long)]
        sysname: String,

        /// Action mnemonics
        #[arg(long = "action", default_value = "ALL_ACTIONS_TO_DATA")]
        actions: Vec<String>,

        /// Consent purpose mnemonics
        #[arg(long = "purpose", required = true)]
        purposes: Vec<String>,

        /// Access scope mnemonics
        #[arg(long = "scope-mnemonic")]
        scope_mnemonics: Vec<String>,

        /// Consent lifetime after approval, in minutes
        #[arg(long)]
        expire: Option<u32>,
    },
    /// Exchange an authorization code for a bearer token
    Exchange {
        /// Authorization code from the callback
        code: String,

        /// Scope used for the authorization link
        #[arg(long, default_value = "openid")]
        scope: String,

        /// Redirect URI used for the authorization link
        #[arg(long)]
        redirect_uri: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Order { command } => handle_order_command(command, &config).await,
        Commands::Dict {
            code,
            subtree,
            parent,
            page_num,
            page_size,
        } => {
            let client = Client::new(config.api_uri.clone());
            let request = DictRequest {
                tree_filtering: if subtree {
                    TreeFiltering::SubTree
                } else {
                    TreeFiltering::OneLevel
                },
                parent_ref_item_value: parent,
                page_num,
                page_size,
            };
            let dict = client
                .dict(config.require_token()?, &code, &request)
                .await?;
            println!("{}", serde_json::to_string_pretty(&dict)?);
            Ok(())
        }
        Commands::Download { link, output } => {
            let client = Client::new(config.api_uri.clone());
            let data = client
                .attachment_download(config.require_token()?, &link)
                .await?;
            tokio::fs::write(&output, &data)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Saved {} bytes to {}", data.len(), output.display());
            Ok(())
        }
        Commands::Auth { command } => handle_auth_command(command, &config).await,
    }
}

async fn handle_order_command(command: OrderCommands, config: &CliConfig) -> Result<()> {
    let client = Client::new(config.api_uri.clone());
    let token = config.require_token()?;

    match command {
        OrderCommands::Create { meta } => {
            let order_id = client.order_create(token, &meta.into_meta()).await?;
            println!("Created order {order_id}");
        }
        OrderCommands::Push { meta, files, name } => {
            let archive = read_archive(name, &files).await?;
            let order_id = client
                .order_push(token, &meta.into_meta(), &archive)
                .await?;
            println!("Created order {order_id}");
        }
        OrderCommands::PushChunked {
            order_id,
            meta,
            files,
            name,
            chunk_size,
        } => {
            let client = match chunk_size {
                Some(chunk_size) => client.with_chunk_size(chunk_size),
                None => client,
            };
            let archive = read_archive(name, &files).await?;
            client
                .order_push_chunked(token, order_id, &meta.into_meta(), &archive)
                .await?;
            println!("Uploaded archive for order {order_id}");
        }
        OrderCommands::Info { order_id } => {
            let info = client.order_info(token, order_id).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OrderCommands::Cancel { order_id } => {
            client.order_cancel(token, order_id).await?;
            println!("Cancelled order {order_id}");
        }
    }
    Ok(())
}

async fn handle_auth_command(command: AuthCommands, config: &CliConfig) -> Result<()> {
    let esia = config
        .esia
        .as_ref()
        .context("no [esia] section in the profile")?;
    let signer = CryptoProProvider::new(&esia.csptest_path, &esia.container, &esia.cert_hash);
    let client = epgu_esia::Client::new(config.esia_uri.clone(), esia.client_id.clone(), signer);

    match command {
        AuthCommands::Uri {
            scope,
            redirect_uri,
            sysname,
            actions,
            purposes,
            scope_mnemonics,
            expire,
        } => {
            let permissions = Permissions(vec![Permission {
                responsible_object: None,
                sysname,
                expire,
                actions: actions.into_iter().map(Sysname::new).collect(),
                purposes: purposes.into_iter().map(Sysname::new).collect(),
                scopes: scope_mnemonics.into_iter().map(Sysname::new).collect(),
            }]);
            let uri = client.auth_uri(&scope, &redirect_uri, &permissions)?;
            println!("{uri}");
        }
        AuthCommands::Exchange {
            code,
            scope,
            redirect_uri,
        } => {
            let token = client.token_exchange(&code, &scope, &redirect_uri).await?;
            println!("{}", serde_json::to_string_pretty(&token)?);
        }
    }
    Ok(())
}

async fn read_archive(name: Option<String>, paths: &[PathBuf]) -> Result<Archive> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("not a file path: {}", path.display()))?;
        files.push(ArchiveFile::new(filename, data));
    }

    let name = match name {
        Some(name) => name,
        None => paths[0]
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string()),
    };

    Ok(Archive::new(name, &files)?)
}
