//! CLI command handlers
//!
//! Thin surface over the library: reads the seed phrase from a local file
//! (the library itself never loads or stores it), builds a client, and
//! prints results.

use std::fs;
use std::path::Path;

use crate::abi::AbiDefinition;
use crate::client::Client;
use crate::crypto::KeyPair;
use crate::message::PreparedMessage;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Generate a fresh seed phrase and write it to `seed_path`
///
/// Refuses to overwrite an existing file; losing a seed loses the wallet.
pub fn cmd_init(seed_path: &Path) -> CliResult<()> {
    if seed_path.exists() {
        println!("⚠️  Seed file already exists at {:?}", seed_path);
        println!("   Remove it manually first if you really want a new wallet");
        return Ok(());
    }

    let phrase = KeyPair::generate_phrase()?;
    let key_pair = KeyPair::derive_from_phrase(&phrase)?;
    fs::write(seed_path, format!("{}\n", phrase))?;

    println!("✅ New wallet created");
    println!("   📁 Seed file: {:?}", seed_path);
    println!("   🏠 Address: {}", key_pair.address());
    println!("   Keep the seed file secret; anyone holding it controls the wallet.");
    Ok(())
}

/// Read and trim the seed phrase from a file
pub fn load_seed(seed_path: &Path) -> CliResult<String> {
    let phrase = fs::read_to_string(seed_path)
        .map_err(|e| format!("cannot read seed file {:?}: {}", seed_path, e))?;
    Ok(phrase.trim().to_string())
}

/// Print the wallet address and public key
pub fn cmd_address(client: &Client) -> CliResult<()> {
    println!("Address:    {}", client.wallet_address());
    println!("Public key: {}", client.public_key_hex());
    Ok(())
}

/// Print the balance of an account (own wallet by default)
pub async fn cmd_balance(client: &Client, address: Option<&str>) -> CliResult<()> {
    let address = match address {
        Some(addr) => addr.to_string(),
        None => client.wallet_address().to_string(),
    };
    let balance = client.balance_of(&address).await?;
    println!("Balance of {}: {}", address, balance);
    Ok(())
}

/// Send native value
pub async fn cmd_send(client: &Client, to: &str, amount: u64) -> CliResult<()> {
    let hash = client.send_value(to, amount).await?;
    println!("✅ Sent {} to {}", amount, to);
    println!("   Transaction: {}", hash);
    Ok(())
}

/// Invoke a contract method
pub async fn cmd_call(
    client: &Client,
    to: &str,
    amount: u64,
    abi_path: &Path,
    method: &str,
    args_json: &str,
) -> CliResult<()> {
    let abi = load_abi(abi_path)?;
    let args: serde_json::Value = serde_json::from_str(args_json)?;
    let hash = client.call(to, amount, &abi, method, &args).await?;
    println!("✅ Called {} on {}", method, to);
    println!("   Transaction: {}", hash);
    Ok(())
}

/// Build a call payload and print it as JSON for later batching
pub fn cmd_make_payload(
    client: &Client,
    to: &str,
    amount: u64,
    abi_path: &Path,
    method: &str,
    args_json: &str,
) -> CliResult<()> {
    let abi = load_abi(abi_path)?;
    let args: serde_json::Value = serde_json::from_str(args_json)?;
    let payload = client.make_call_payload(to, amount, &abi, method, &args)?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

/// Submit a batch of pre-built payloads (a JSON array of prepared messages)
pub async fn cmd_call_multi(client: &Client, batch_path: &Path) -> CliResult<()> {
    let batch = fs::read_to_string(batch_path)?;
    let payloads: Vec<PreparedMessage> = serde_json::from_str(&batch)?;
    let count = payloads.len();
    let hash = client.call_multi(payloads).await?;
    println!("✅ Submitted batch of {} message(s)", count);
    println!("   Transaction: {}", hash);
    Ok(())
}

/// Verify a signature over a data hash
///
/// The key to verify under comes from, in priority order: an explicit hex
/// key, a deployed account's on-chain state, or the client's own key.
pub async fn cmd_check_signature(
    client: &Client,
    data_hash: &str,
    signature: &str,
    public_key: Option<&str>,
    address: Option<&str>,
) -> CliResult<()> {
    let valid = match (public_key, address) {
        (Some(_), _) => client.check_signature(data_hash, signature, public_key)?,
        (None, Some(addr)) => {
            client
                .check_signature_by_address(addr, signature, data_hash)
                .await?
        }
        (None, None) => client.check_signature(data_hash, signature, None)?,
    };

    if valid {
        println!("✅ Signature is valid");
    } else {
        println!("❌ Signature is NOT valid");
    }
    Ok(())
}

fn load_abi(abi_path: &Path) -> CliResult<AbiDefinition> {
    let json = fs::read_to_string(abi_path)
        .map_err(|e| format!("cannot read ABI file {:?}: {}", abi_path, e))?;
    Ok(AbiDefinition::from_json(&json)?)
}
