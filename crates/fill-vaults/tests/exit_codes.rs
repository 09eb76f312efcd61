use std::{fs, path::Path, process::Command};

use eyre::Result;

/// Runs the script in `dir` with a clean view of the variables it reads. The
/// network points at a closed port so that any connection attempt fails.
fn fill_vaults(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_fill-vaults"));
    command
        .current_dir(dir)
        .env_remove("FRONTEND_PATH")
        .env_remove("TENDERLY_URL")
        .env_remove("FORK_URL")
        .env_remove("DEPOSITORS")
        .env_remove("DEPOSITOR_KEYS")
        .env("HARDHAT_NETWORK", "localhost")
        .env("ETHEREUM_URL", "http://127.0.0.1:1")
        .env("RUST_LOG", "info");
    command
}

/// Writes an env file and a frontend with a deployment manifest to `dir`.
fn write_deployment(dir: &Path) -> Result<()> {
    let deploy = dir.join("frontend/src/deploy");
    fs::create_dir_all(&deploy)?;
    fs::write(
        deploy.join("contracts.json"),
        r#"{ "manager": "0x5FbDB2315678afecb367f032d93F642f64180aa3" }"#,
    )?;
    fs::write(
        dir.join(".env.hardhat"),
        format!("FRONTEND_PATH={}\n", dir.join("frontend").display()),
    )?;
    Ok(())
}

#[test]
fn test_missing_env_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = fill_vaults(dir.path()).output()?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains(".env.hardhat"), "{stderr}");
    Ok(())
}

#[test]
fn test_missing_frontend_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join(".env.hardhat"), "TENDERLY_URL=\n")?;
    let output = fill_vaults(dir.path()).output()?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("FRONTEND_PATH is not set"), "{stderr}");
    assert!(!stderr.contains("contracts.json"), "{stderr}");
    Ok(())
}

#[test]
fn test_missing_manifest() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let frontend = dir.path().join("frontend");
    fs::create_dir_all(&frontend)?;
    fs::write(
        dir.path().join(".env.hardhat"),
        format!("FRONTEND_PATH={}\n", frontend.display()),
    )?;
    let output = fill_vaults(dir.path()).output()?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("contracts.json"), "{stderr}");
    assert!(!stderr.contains("couldn't connect"), "{stderr}");
    assert!(!stderr.contains("connecting to remote node"), "{stderr}");
    Ok(())
}

#[test]
fn test_unreachable_node() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_deployment(dir.path())?;
    let output = fill_vaults(dir.path()).output()?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("couldn't connect"), "{stderr}");
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn test_fork_without_anvil() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_deployment(dir.path())?;
    let output = fill_vaults(dir.path())
        .env("HARDHAT_NETWORK", "hardhat")
        .env("PATH", dir.path().join("bin"))
        .output()?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "{stderr}");
    assert!(stderr.contains("couldn't spawn an anvil node"), "{stderr}");
    assert!(!stderr.contains("panicked"), "{stderr}");
    assert!(output.stdout.is_empty());
    Ok(())
}
