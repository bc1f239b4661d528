use log::{error, info};

use pow_ledger::Blockchain;
use pow_ledger::config::MinerConfig;

fn main() {
    if let Err(e) = run() {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> pow_ledger::Result<()> {
    let cfg = MinerConfig::from_env()?;
    env_logger::init();

    info!("⛓️ Mining {} block(s)", cfg.blocks);

    let mut ledger = Blockchain::new();
    let search = cfg.proof_search();
    for n in 0..cfg.blocks {
        ledger.submit_transaction("alice", "bob", n as i64 + 1)?;
        ledger.submit_transaction("bob", "carol", 0.5)?;
        ledger.mine_next_block_with(&search)?;
    }

    ledger.validate_chain()?;
    info!("chain valid (length={})", ledger.len());

    println!("{}", serde_json::to_string_pretty(ledger.chain())?);
    Ok(())
}
