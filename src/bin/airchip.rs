#![forbid(unsafe_code)]
//! Runs a demo session against an in-process AirChip ledger.

use airchip::blockchain::{Blockchain, MineOutcome};
use airchip::config::{load_config, DEFAULT_CONFIG_PATH};
use airchip::crypto::{Secp256k1Provider, SignatureProvider};
use airchip::economics::token_value;
use airchip::miner::CancelToken;
use airchip::reward::ChallengeReward;
use airchip::transaction::{Transaction, GENESIS_ACCOUNT};
use clap::Parser;
use colored::*;
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "airchip", about = "AirChip ledger demo")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override the configured difficulty (leading hex zeros)
    #[arg(short, long)]
    difficulty: Option<usize>,

    /// Override the configured miner account
    #[arg(short, long)]
    miner: Option<String>,

    /// Pay the bonus reward, as if the miner solved the challenge
    #[arg(long)]
    bonus: bool,

    /// "Egg" market price for the token value metric
    #[arg(long, requires = "chicken_price")]
    egg_price: Option<f64>,

    /// "Chicken" market price for the token value metric
    #[arg(long, requires = "egg_price")]
    chicken_price: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(difficulty) = args.difficulty {
        config.chain.difficulty = difficulty;
    }
    if let Some(miner) = args.miner {
        config.miner.address = miner;
    }
    config.validate()?;
    info!("Loaded configuration from {}", args.config);

    let provider = Secp256k1Provider;
    let (alice_private, alice_public) = provider.generate_keypair()?;

    let mut chain = Blockchain::new(config.chain.clone())?;
    chain.register_public_key("alice", alice_public);

    chain.add_transaction(GENESIS_ACCOUNT, "alice", 100)?;
    let mut transfer = Transaction::new("alice", "bob", 30);
    transfer.sign_with(&provider, &alice_private)?;
    chain.submit_transaction(transfer)?;

    println!(
        "\n{}",
        "⛏️  Mining pending transactions...".bright_cyan().bold()
    );
    let policy = ChallengeReward::from_config(&config.miner, args.bonus);
    let start_time = Instant::now();
    match chain.mine(&config.miner.address, &policy, &CancelToken::new())? {
        MineOutcome::Mined { index, hash } => println!(
            "{} block {} ({}) in {:.3}s",
            "✅ Mined".bright_green().bold(),
            index,
            hash,
            start_time.elapsed().as_secs_f64()
        ),
        MineOutcome::NothingToMine => println!("{}", "No transactions to mine.".yellow()),
    }
    chain.validate_chain()?;

    println!("\n{}", "Blockchain:".bright_green().underline());
    for block in chain.blocks() {
        println!(
            "Block {} [{}]",
            block.index.to_string().bold(),
            block.timestamp
        );
        println!("  Hash:     {}", block.hash);
        println!("  Previous: {}", block.previous_hash);
        println!("  Nonce:    {}", block.nonce);
        for tx in &block.transactions {
            let signed = if tx.is_signed() { " (signed)" } else { "" };
            println!(
                "    {} -> {}: {}{}",
                tx.from,
                tx.to,
                tx.amount,
                signed.dimmed()
            );
        }
    }

    println!("\n{}", "Token Ledger:".bright_green().underline());
    for (account, balance) in chain.ledger_snapshot() {
        println!("  {:<12} {}", account, balance);
    }

    if let (Some(egg), Some(chicken)) = (args.egg_price, args.chicken_price) {
        let count = chain.transaction_count() as u64;
        let value = token_value(egg, chicken, count)?;
        println!(
            "\n{} {:.4} (egg {:.2}, chicken {:.2}, {} transactions)",
            "AirChip token value:".bright_cyan(),
            value,
            egg,
            chicken,
            count
        );
    }

    Ok(())
}
