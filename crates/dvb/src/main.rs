use std::sync::Arc;

use dvb_core::{config::Config, ports::Ledger, workflow::ConversionWorkflow};
use dvb_gdrive::DriveFetcher;
use dvb_ledger::SqliteLedger;

#[tokio::main]
async fn main() -> Result<(), dvb_core::Error> {
    dvb_core::logging::init("dvb")?;

    let cfg = Arc::new(Config::load()?);

    // Ledger init is best-effort: a failure here means individual appends
    // will fail (and be logged) later, not that the bot refuses to start.
    let ledger = Arc::new(SqliteLedger::new(cfg.db_path.clone()));
    if let Err(e) = ledger.init().await {
        tracing::error!("database error: {e}");
    }

    let fetcher = Arc::new(DriveFetcher::new(cfg.download_dir.clone())?);
    let workflow = Arc::new(ConversionWorkflow::new(fetcher, ledger));

    dvb_telegram::router::run_polling(cfg, workflow)
        .await
        .map_err(|e| dvb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
