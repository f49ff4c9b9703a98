//! Integration tests for staging, mining and settlement

use airchip::blockchain::{Block, Blockchain, MineOutcome};
use airchip::config::ChainConfig;
use airchip::crypto::{Secp256k1Provider, SignatureProvider};
use airchip::error::ChainError;
use airchip::miner::{mine_block, CancelToken};
use airchip::reward::{ChallengeReward, FixedReward, NoReward};
use airchip::transaction::{Transaction, GENESIS_ACCOUNT, SYSTEM_ACCOUNT};

/// Helper to create a chain with trivial difficulty
fn create_test_chain() -> Result<Blockchain, ChainError> {
    Blockchain::new(ChainConfig {
        difficulty: 1,
        ..ChainConfig::default()
    })
}

#[test]
fn test_alice_to_bob_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = create_test_chain()?;

    chain.add_transaction(GENESIS_ACCOUNT, "alice", 100)?;
    chain.add_transaction("alice", "bob", 30)?;
    let outcome = chain.mine("m1", &FixedReward(10), &CancelToken::new())?;

    assert!(matches!(outcome, MineOutcome::Mined { index: 1, .. }));
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.balance_of(GENESIS_ACCOUNT), 999_900);
    assert_eq!(chain.balance_of("alice"), 70);
    assert_eq!(chain.balance_of("bob"), 30);
    assert_eq!(chain.balance_of("m1"), 10);
    chain.validate_chain()?;

    Ok(())
}

#[test]
fn test_chain_linkage_over_many_blocks() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = create_test_chain()?;

    for round in 0..5u64 {
        chain.add_transaction(GENESIS_ACCOUNT, "alice", 10 + round)?;
        chain.mine("m1", &FixedReward(1), &CancelToken::new())?;
    }

    assert_eq!(chain.len(), 6);
    for pair in chain.blocks().windows(2) {
        assert_eq!(pair[1].previous_hash, pair[0].hash);
        assert_eq!(pair[1].index, pair[0].index + 1);
        assert!(pair[1].hash.starts_with('0'));
        assert_eq!(pair[1].hash, pair[1].compute_hash()?);
    }
    assert_eq!(chain.balance_of("alice"), 10 + 11 + 12 + 13 + 14);
    assert_eq!(chain.balance_of("m1"), 5);

    Ok(())
}

#[test]
fn test_stale_block_must_be_remined() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = create_test_chain()?;
    chain.add_transaction(GENESIS_ACCOUNT, "alice", 100)?;

    let stale = chain
        .prepare_block("m1", &FixedReward(10))
        .ok_or("pool should not be empty")?;
    let stale = mine_block(stale, chain.proof_of_work(), &CancelToken::new())?;

    // Another block lands first.
    chain.mine("m2", &FixedReward(10), &CancelToken::new())?;

    let proof = stale.hash.clone();
    let result = chain.add_block(stale, &proof);
    assert!(matches!(
        result,
        Err(ChainError::InvalidBlockLinkage { .. })
    ));
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.balance_of("m1"), 0);
    assert_eq!(chain.balance_of("m2"), 10);

    Ok(())
}

#[test]
fn test_crafted_block_cannot_mint() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = create_test_chain()?;
    let tip = chain.last_block().hash.clone();

    let forged = Block::new(
        1,
        vec![Transaction::new(SYSTEM_ACCOUNT, "mallory", 1_000)],
        tip,
    );
    let result = chain.add_block(forged, &"0".repeat(64));

    assert!(matches!(result, Err(ChainError::InvalidProofOfWork(_))));
    assert_eq!(chain.balance_of("mallory"), 0);
    assert_eq!(chain.len(), 1);

    Ok(())
}

#[test]
fn test_signed_transfer_flow() -> Result<(), Box<dyn std::error::Error>> {
    let provider = Secp256k1Provider;
    let (alice_private, alice_public) = provider.generate_keypair()?;

    let mut chain = Blockchain::new(ChainConfig {
        difficulty: 1,
        require_signatures: true,
        ..ChainConfig::default()
    })?;
    chain.register_public_key("alice", alice_public);
    chain.add_transaction(GENESIS_ACCOUNT, "alice", 100)?;

    let mut transfer = Transaction::new("alice", "bob", 30);
    transfer.sign_with(&provider, &alice_private)?;
    chain.submit_transaction(transfer.clone())?;

    // A signature cannot be replayed onto a different amount.
    let mut replay = transfer;
    replay.amount = 60;
    assert!(matches!(
        chain.submit_transaction(replay),
        Err(ChainError::InvalidSignature(_))
    ));

    let policy = ChallengeReward {
        solved: true,
        full: 30,
        reduced: 10,
    };
    chain.mine("m1", &policy, &CancelToken::new())?;

    assert_eq!(chain.balance_of("alice"), 70);
    assert_eq!(chain.balance_of("bob"), 30);
    assert_eq!(chain.balance_of("m1"), 30);
    chain.validate_chain()?;

    Ok(())
}

#[test]
fn test_signed_transfer_settles_once() -> Result<(), Box<dyn std::error::Error>> {
    let provider = Secp256k1Provider;
    let (alice_private, alice_public) = provider.generate_keypair()?;

    let mut chain = Blockchain::new(ChainConfig {
        difficulty: 1,
        require_signatures: true,
        ..ChainConfig::default()
    })?;
    chain.register_public_key("alice", alice_public);
    chain.add_transaction(GENESIS_ACCOUNT, "alice", 100)?;

    let mut transfer = Transaction::new("alice", "bob", 30);
    transfer.sign_with(&provider, &alice_private)?;
    chain.submit_transaction(transfer.clone())?;
    assert!(matches!(
        chain.submit_transaction(transfer.clone()),
        Err(ChainError::DoubleSpendDetected(_))
    ));
    chain.mine("m1", &NoReward, &CancelToken::new())?;

    assert!(matches!(
        chain.submit_transaction(transfer),
        Err(ChainError::DoubleSpendDetected(_))
    ));
    assert_eq!(
        chain.mine("m1", &NoReward, &CancelToken::new())?,
        MineOutcome::NothingToMine
    );
    assert_eq!(chain.balance_of("alice"), 70);
    assert_eq!(chain.balance_of("bob"), 30);
    chain.validate_chain()?;

    Ok(())
}

#[test]
fn test_ledger_snapshot_for_presentation() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = create_test_chain()?;
    chain.add_transaction(GENESIS_ACCOUNT, "bob", 5)?;
    chain.add_transaction(GENESIS_ACCOUNT, "alice", 7)?;
    chain.mine("m1", &FixedReward(10), &CancelToken::new())?;

    let snapshot = chain.ledger_snapshot();
    let accounts: Vec<&str> = snapshot.keys().map(String::as_str).collect();
    assert_eq!(accounts, vec!["alice", "bob", "genesis", "m1"]);
    assert_eq!(snapshot["genesis"], 999_988);

    Ok(())
}
