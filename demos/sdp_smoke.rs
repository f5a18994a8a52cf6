//! Manual smoke test against a live helpdesk and bot.
//!
//! Exercises the ServiceDesk Plus client with every listing filter the relay
//! uses, renders the `/recent` reply, and optionally checks the bot token.
//!
//! # Usage
//!
//! 1. Set `SDP_API_KEY` (and `SDP_URL` if not using the default instance).
//!
//! 2. Optionally set `BOT_TOKEN` to check `getUpdates` access. Note that
//!    this consumes nothing: no offset is acknowledged.
//!
//! 3. Optionally set `TEST_CHAT_ID` (with `BOT_TOKEN`) to send the rendered
//!    `/recent` reply to that chat.
//!
//! 4. Run: `cargo run --example sdp_smoke`

use std::env;

use chrono::{TimeDelta, Utc};

use helpdesk_relay::notify::{LinkTemplate, MessageFormatter};
use helpdesk_relay::sdp::{DEFAULT_SDP_URL, SdpClient, SdpConfig, TicketFilter, fetch_snapshots};
use helpdesk_relay::telegram::{BotClient, BotConfig, Messenger};
use helpdesk_relay::types::ChatId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,helpdesk_relay=debug".into()),
        )
        .init();

    let api_key = env::var("SDP_API_KEY")
        .map_err(|_| anyhow::anyhow!("SDP_API_KEY environment variable not set"))?;
    let url = env::var("SDP_URL").unwrap_or_else(|_| DEFAULT_SDP_URL.to_string());

    let test_chat: Option<ChatId> = env::var("TEST_CHAT_ID")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .map(ChatId);

    let client = SdpClient::new(SdpConfig {
        url: url.clone(),
        ..SdpConfig::new(api_key)
    })?;

    println!("\n=== Helpdesk Smoke Test ===\n");
    println!("Endpoint: {}", url);
    println!();

    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;

    // ─── Listings ────────────────────────────────────────────────────────────

    println!("--- Listings ---");

    let since = Utc::now() - TimeDelta::hours(1);
    let filters = [
        ("All", TicketFilter::All),
        ("NotClosed", TicketFilter::NotClosed),
        ("CreatedSince(1h)", TicketFilter::CreatedSince(since)),
    ];

    let mut recent = Vec::new();
    for (name, filter) in filters {
        match fetch_snapshots(&client, filter).await {
            Ok(tickets) => {
                println!("  [PASS] {} ({} tickets)", name, tickets.len());
                if let Some(first) = tickets.first() {
                    println!(
                        "         first: #{} {} [{}]",
                        first.id, first.subject, first.status_name
                    );
                }
                if matches!(filter, TicketFilter::CreatedSince(_)) {
                    recent = tickets;
                }
                passed += 1;
            }
            Err(e) => {
                println!("  [FAIL] {}: {}", name, e);
                failed += 1;
            }
        }
    }

    let formatter = MessageFormatter::new(LinkTemplate::default());
    let reply = formatter.format_recent_list(&recent);
    println!("\n--- /recent reply ---\n{}", reply);

    // ─── Bot API ─────────────────────────────────────────────────────────────

    println!("\n--- Bot API ---");

    match env::var("BOT_TOKEN") {
        Ok(token) => {
            let bot = BotClient::new(BotConfig {
                long_poll_secs: 0,
                ..BotConfig::new(token)
            })?;

            match bot.get_updates(None).await {
                Ok(updates) => {
                    println!("  [PASS] getUpdates ({} pending)", updates.len());
                    passed += 1;
                }
                Err(e) => {
                    println!("  [FAIL] getUpdates: {}", e);
                    failed += 1;
                }
            }

            if let Some(chat) = test_chat {
                match bot.send_message(chat, &reply).await {
                    Ok(()) => {
                        println!("  [PASS] sendMessage to {}", chat);
                        passed += 1;
                    }
                    Err(e) => {
                        println!("  [FAIL] sendMessage: {}", e);
                        failed += 1;
                    }
                }
            } else {
                println!("  [SKIP] sendMessage (no TEST_CHAT_ID set)");
                skipped += 1;
            }
        }
        Err(_) => {
            println!("  [SKIP] getUpdates (no BOT_TOKEN set)");
            println!("  [SKIP] sendMessage (no BOT_TOKEN set)");
            skipped += 2;
        }
    }

    println!(
        "\n=== Results: {} passed, {} failed, {} skipped ===\n",
        passed, failed, skipped
    );

    if failed > 0 {
        anyhow::bail!("{} check(s) failed", failed);
    }
    Ok(())
}
