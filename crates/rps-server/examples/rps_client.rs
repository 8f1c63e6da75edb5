//! Interactive line client for the round server.
//!
//! Sends each stdin line as one message and prints everything the
//! server pushes back (acks, countdowns, outcomes).

use std::env;
use std::io::{self, Write};

use rps_core::ClientMessage;
use rps_protocol::encode_client_message;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Where to connect: env override or default.
    let addr = env::var("RPS_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:5005".to_string());

    println!("Connecting to {}...", addr);
    let stream = TcpStream::connect(&addr).await?;
    println!("Connected.");
    println!("Type raw messages, or shortcuts:");
    println!("  connect <alias>");
    println!("  play <alias> <rock|paper|scissors>");
    println!("Type 'quit' or 'exit' to leave.\n");

    let (read_half, mut write_half) = stream.into_split();

    // Print server pushes as they arrive.
    tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => println!("<< {}", line),
                Ok(None) => {
                    println!("\nServer closed the connection.");
                    break;
                }
                Err(e) => {
                    eprintln!("\nRead error: {}", e);
                    break;
                }
            }
        }
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!(">> ");
        io::stdout().flush()?;

        let Some(line) = stdin.next_line().await? else {
            println!("\nEOF on stdin, exiting client.");
            break;
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            println!("Exiting client.");
            break;
        }

        let wire = expand_shortcut(trimmed).unwrap_or_else(|| trimmed.to_string());
        write_half.write_all(wire.as_bytes()).await?;
        write_half.flush().await?;
    }

    Ok(())
}

fn expand_shortcut(line: &str) -> Option<String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let msg = match tokens.as_slice() {
        ["connect", alias] => ClientMessage::Connect {
            alias: alias.to_string(),
        },
        ["play", alias, answer] => ClientMessage::Play {
            alias: alias.to_string(),
            answer: answer.to_string(),
        },
        _ => return None,
    };
    Some(encode_client_message(&msg))
}
