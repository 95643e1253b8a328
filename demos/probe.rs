//! Probe a websockify endpoint through a mounted session.
//!
//! Opens the tunnel the page URL resolves to, reads the server's RFB
//! version banner, and prints what the view would render.
//!
//! Usage:
//!   cargo run --example probe -- "http://localhost:6080/?password=secret"
//!   cargo run --example probe -- "https://viewer.lan/?url=ws://10.0.0.5:5901/websockify" --debug

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use rfb_frontend::{
    ClientConnector, ClientEvent, ClientInit, CredentialsPayload, EventSink, MemoryHost,
    RemoteClient, Result, Session, SessionAction, Tunnel, View,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_PAGE_URL: &str = "http://localhost:6080/";
const BANNER_PREFIX: &[u8] = b"RFB ";
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// ProbeConnector
// ============================================================================

/// Connector that only performs the version exchange.
struct ProbeConnector;

struct ProbeClient {
    reader: JoinHandle<()>,
}

impl RemoteClient for ProbeClient {
    fn send_credentials(&mut self, credentials: &CredentialsPayload) -> Result<()> {
        info!(?credentials, "Credentials accepted by probe");
        Ok(())
    }

    fn disconnect(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl ClientConnector for ProbeConnector {
    async fn connect(&self, init: ClientInit, events: EventSink) -> Result<Box<dyn RemoteClient>> {
        let mut tunnel = Tunnel::open(&init.url, init.sub_protocol()).await?;

        let reader = tokio::spawn(async move {
            match tunnel.recv().await {
                Ok(Some(banner)) if banner.starts_with(BANNER_PREFIX) => {
                    info!(banner = %String::from_utf8_lossy(&banner).trim_end(), "Server banner");
                    events.emit(ClientEvent::connect());
                }
                Ok(Some(other)) => {
                    warn!(len = other.len(), "Unexpected greeting");
                    events.emit(ClientEvent::security_failure(None, Some("unexpected greeting")));
                    return;
                }
                Ok(None) => {
                    events.emit(ClientEvent::disconnect(false));
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "Tunnel read failed");
                    events.emit(ClientEvent::disconnect(false));
                    return;
                }
            }

            while let Ok(Some(frame)) = tunnel.recv().await {
                debug!(len = frame.len(), "Frame");
            }
            events.emit(ClientEvent::disconnect(true));
        });

        Ok(Box::new(ProbeClient { reader }))
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "rfb_frontend=debug,probe=debug"
    } else {
        "rfb_frontend=info,probe=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

fn render(view: &View) {
    match view {
        View::Surface { url, loading } => {
            println!("surface: {url} (loading: {loading})");
        }
        View::Failure {
            reason,
            can_switch_protocol,
        } => {
            println!("{}: {reason}", view.heading().unwrap_or_default());
            if *can_switch_protocol {
                println!("  [{}]", rfb_frontend::session::SWITCH_PROTOCOL_LABEL);
            }
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug = args.iter().any(|a| a == "--debug");
    let page_url = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map_or(DEFAULT_PAGE_URL, String::as_str);

    init_logging(debug);

    let host = MemoryHost::new();
    let mut session = Session::builder()
        .page_url(page_url)
        .connector(ProbeConnector)
        .host(host.clone())
        .allow_protocol_switch(true)
        .mount()
        .await?;

    println!("endpoint: {}", session.config().url());

    let mut states = session.subscribe();
    let (actions, action_rx) = mpsc::unbounded_channel::<SessionAction>();
    let runner = tokio::spawn(async move {
        session.run(action_rx).await;
        session
    });

    let settled = tokio::time::timeout(SETTLE_TIMEOUT, states.wait_for(|s| !s.is_connecting()))
        .await
        .is_ok();
    if !settled {
        println!("still connecting after {SETTLE_TIMEOUT:?}");
    }

    drop(actions);
    if let Ok(session) = runner.await {
        render(&session.view());
        if let Some(title) = host.title() {
            println!("title: {title}");
        }
    }

    Ok(())
}
