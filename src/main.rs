//! Wallet-signing CLI
//!
//! A command-line interface over the signing client library. The seed
//! phrase is read from a local file; the node endpoint is a JSON-RPC URL.

use clap::{Parser, Subcommand};
use ever_signer::cli::{self, CliResult};
use ever_signer::client::Client;
use ever_signer::rpc::JsonRpcGateway;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ever-signer")]
#[command(version = "0.1.0")]
#[command(about = "Wallet-signing client for an account-based blockchain", long_about = None)]
struct Cli {
    /// File holding the mnemonic seed phrase
    #[arg(short, long, default_value = "seed.phrase")]
    seed_file: PathBuf,

    /// JSON-RPC endpoint of the node
    #[arg(short, long, default_value = "https://jrpc.everwallet.net/rpc")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new seed phrase and write it to the seed file
    Init,

    /// Show the wallet address and public key
    Address,

    /// Show an account balance (own wallet by default)
    Balance {
        /// Account to query instead of the own wallet
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Send native value to an address
    Send {
        /// Destination address
        #[arg(short, long)]
        to: String,

        /// Amount in the smallest unit
        #[arg(short, long)]
        amount: u64,
    },

    /// Invoke a contract method
    Call {
        /// Contract address
        #[arg(short, long)]
        to: String,

        /// Attached value in the smallest unit
        #[arg(short, long)]
        amount: u64,

        /// Path to the contract ABI (JSON)
        #[arg(long)]
        abi: PathBuf,

        /// Method name
        #[arg(short, long)]
        method: String,

        /// Method arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Build a call payload without submitting it (prints JSON)
    MakePayload {
        /// Contract address
        #[arg(short, long)]
        to: String,

        /// Attached value in the smallest unit
        #[arg(short, long)]
        amount: u64,

        /// Path to the contract ABI (JSON)
        #[arg(long)]
        abi: PathBuf,

        /// Method name
        #[arg(short, long)]
        method: String,

        /// Method arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Submit a batch of pre-built payloads as one transaction
    CallMulti {
        /// JSON file holding an array of prepared messages
        #[arg(short, long)]
        batch: PathBuf,
    },

    /// Verify a signature over a 32-byte data hash
    CheckSignature {
        /// Data hash, 64 hex characters
        #[arg(long)]
        hash: String,

        /// Signature, 128 hex characters
        #[arg(long)]
        signature: String,

        /// Verify under this public key instead of the own one
        #[arg(long)]
        public_key: Option<String>,

        /// Verify under the owner key of this deployed account
        #[arg(long)]
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    // Init does not need a client (or a reachable node)
    if let Commands::Init = cli.command {
        return cli::cmd_init(&cli.seed_file);
    }

    let phrase = cli::load_seed(&cli.seed_file)?;
    let gateway = Arc::new(JsonRpcGateway::new(&cli.endpoint)?);
    let client = Client::new(&phrase, gateway)?;

    match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Address => cli::cmd_address(&client),
        Commands::Balance { address } => cli::cmd_balance(&client, address.as_deref()).await,
        Commands::Send { to, amount } => cli::cmd_send(&client, &to, amount).await,
        Commands::Call {
            to,
            amount,
            abi,
            method,
            args,
        } => cli::cmd_call(&client, &to, amount, &abi, &method, &args).await,
        Commands::MakePayload {
            to,
            amount,
            abi,
            method,
            args,
        } => cli::cmd_make_payload(&client, &to, amount, &abi, &method, &args),
        Commands::CallMulti { batch } => cli::cmd_call_multi(&client, &batch).await,
        Commands::CheckSignature {
            hash,
            signature,
            public_key,
            address,
        } => {
            cli::cmd_check_signature(
                &client,
                &hash,
                &signature,
                public_key.as_deref(),
                address.as_deref(),
            )
            .await
        }
    }
}
