use anyhow::Result;
use messagemod_client::{EntryForm, MessageClient};
use messagemod_protocol::Notice;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Line-based submission client. Each line typed on stdin goes through
/// the entry form and, when non-empty after trimming, is sent to the
/// server. Notices print as they arrive.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("MESSAGEMOD_SERVER")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let token = std::env::var("MESSAGEMOD_TOKEN").ok();

    let mut client = MessageClient::connect(&addr, token).await?;
    info!(%addr, sender_id = %client.sender_id(), "connected");

    let mut form = EntryForm::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                form.set_text(&line);
                if let Some(text) = form.submit() {
                    client.submit(&text).await?;
                }
            }
            notice = client.next_notice() => {
                match notice? {
                    Some(Notice::Saved) => info!("message saved"),
                    Some(Notice::Failed { reason }) => {
                        error!(%reason, "message rejected");
                    }
                    None => {
                        info!("server closed the connection");
                        break;
                    }
                }
            }
        }
    }

    client.close().await?;
    Ok(())
}
