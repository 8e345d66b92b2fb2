//! Command-line chat client.
//!
//! Connects to a running relay, subscribes to the shared topic (and its own
//! private queue), announces itself with JOIN, sends one chat line and
//! prints every frame that arrives until the listen window closes or
//! Ctrl-C is pressed.

use std::time::Duration;

use chat_relay::client::{ChatClient, describe};
use chat_relay::domain::ChatMessage;
use chat_relay::service::router::{ADD_USER, SEND_MESSAGE, SEND_PRIVATE};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Private queue every session may subscribe to.
const PRIVATE_QUEUE: &str = "/user/queue/messages";

/// CLI arguments for chat_client
#[derive(Parser, Debug)]
#[command(name = "chat-client")]
#[command(version, about = "Join the chat relay, say something and print what arrives")]
struct Cli {
    /// WebSocket endpoint of the relay
    #[arg(long, default_value = "ws://localhost:8080/ws")]
    url: String,

    /// Username announced with JOIN
    #[arg(short, long, default_value = "User1")]
    username: String,

    /// Chat line sent after joining
    #[arg(short, long, default_value = "Hello, WebSocket!")]
    message: String,

    /// Send the line privately to this user instead of the shared topic
    #[arg(long, value_name = "USER")]
    to: Option<String>,

    /// Shared topic to subscribe to
    #[arg(long, default_value = "/topic/public")]
    topic: String,

    /// Seconds to keep listening before disconnecting
    #[arg(long, default_value_t = 10)]
    listen_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut client = ChatClient::connect(&cli.url).await?;
    println!("Connected to {} ({})", cli.url, client.connection_id());

    client.subscribe("public", &cli.topic).await?;
    client.subscribe("private", PRIVATE_QUEUE).await?;
    client
        .send(ADD_USER, ChatMessage::join(cli.username.as_str()))
        .await?;

    let line = ChatMessage::chat(cli.username.as_str(), cli.message.as_str());
    match cli.to.as_deref() {
        Some(recipient) => {
            client
                .send(SEND_PRIVATE, line.with_recipient(recipient))
                .await?;
        }
        None => client.send(SEND_MESSAGE, line).await?,
    }

    let deadline = tokio::time::sleep(Duration::from_secs(cli.listen_secs));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            frame = client.next_frame() => match frame? {
                Some(frame) => println!("{}", describe(&frame)),
                None => {
                    println!("Server closed the connection");
                    return Ok(());
                }
            },
        }
    }

    client.disconnect().await?;
    println!("Disconnected");
    Ok(())
}
