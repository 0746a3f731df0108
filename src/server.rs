use crate::{
    config::{LedgerAppState, LedgerConfig},
    handlers::{
        append_block::append_block_handler,
        get_block::get_block_handler,
        get_chain_tip::get_chain_tip_handler,
        get_list_blocks::get_list_blocks_handler,
        get_order_block::get_order_block_handler,
        verify_chain::verify_chain_handler,
    },
    ledger::Ledger,
    storage::BlockStore,
};

use std::{
    net::SocketAddr,
    sync::{atomic::{AtomicBool, Ordering}, Arc},
};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tracing::info;

pub fn router(state: LedgerAppState) -> Router {
    Router::new()
        .route("/blocks", post(append_block_handler).get(get_list_blocks_handler))
        .route("/block", get(get_block_handler))
        .route("/block/by_order", get(get_order_block_handler))
        .route("/chain/tip", get(get_chain_tip_handler))
        .route("/verify", get(verify_chain_handler))
        .with_state(state)
}

pub fn build_state(cfg: &LedgerConfig) -> anyhow::Result<LedgerAppState> {
    let store = BlockStore::open(&cfg.db_path)
        .with_context(|| format!("opening block store at `{}`", cfg.db_path))?;
    let ledger = Ledger::open(store, cfg.difficulty)
        .context("initialising ledger")?
        .with_max_attempts(cfg.max_mining_attempts);

    Ok(LedgerAppState { cfg: cfg.clone(), ledger: Arc::new(ledger) })
}

pub async fn run(cfg: LedgerConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg)?;
    let cancel = state.ledger.cancel_handle();
    let app = router(state);

    let addr: SocketAddr = cfg.listen
        .parse()
        .context("invalid listen address")?;

    match &cfg.tls {
        #[cfg(feature = "tls")]
        Some(tls) => serve_tls(addr, tls, app, cancel).await?,
        #[cfg(not(feature = "tls"))]
        Some(_) => anyhow::bail!("`[tls]` configured but built without the `tls` feature"),
        None => {
            info!(%addr, "ledger listening (plain http)");
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal(cancel))
                .await?;
        }
    }

    Ok(())
}

#[cfg(feature = "tls")]
async fn serve_tls(
    addr: SocketAddr,
    tls: &crate::config::TlsConfig,
    app: Router,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    use crate::utils::{load_certs, load_key};
    use axum_server::tls_rustls::RustlsConfig;
    use rustls::ServerConfig as RustlsServerConfig;

    // a provider may already be installed by an embedding process
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cert_chain = load_certs(&tls.cert).context("reading server certificate")?;
    let priv_key   = load_key(&tls.key).context("reading server private key")?;

    let srv_cfg = RustlsServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, priv_key)
        .context("invalid TLS cert/key combo")?;
    let tls_config = RustlsConfig::from_config(Arc::new(srv_cfg));

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal(cancel).await;
        shutdown.graceful_shutdown(None);
    });

    info!(%addr, "ledger listening (tls)");
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

// ctrl-c stops the listener and aborts any block being mined
async fn shutdown_signal(cancel: Arc<AtomicBool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
    cancel.store(true, Ordering::Relaxed);
}
