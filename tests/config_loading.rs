//! Integration tests for configuration files

use airchip::blockchain::Blockchain;
use airchip::config::load_config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config = load_config(temp_dir.path().join("absent.toml"))?;

    assert_eq!(config.chain.difficulty, 4);
    assert_eq!(config.miner.address, "miner1");

    Ok(())
}

#[test]
fn test_config_file_drives_chain() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("airchip.toml");
    fs::write(
        &path,
        r#"
[chain]
difficulty = 1
genesis_supply = 500

[miner]
address = "m1"
reward = 5
"#,
    )?;

    let config = load_config(&path)?;
    let chain = Blockchain::new(config.chain.clone())?;

    assert_eq!(chain.proof_of_work().difficulty(), 1);
    assert_eq!(chain.balance_of("genesis"), 500);
    assert_eq!(config.miner.reward, 5);
    assert_eq!(config.miner.bonus_reward, 30);

    Ok(())
}

#[test]
fn test_invalid_config_file_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("airchip.toml");
    fs::write(&path, "[chain]\ndifficulty = 99\n")?;

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("chain.difficulty"));

    Ok(())
}
