use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::{SinkExt, StreamExt};
use prediction_protocol::{connection, decode_response, encode, Connection, Request, Response};
use tokio::net::TcpStream;

#[derive(Parser)]
#[command(name = "predictctl", about = "Query a running prediction orchestrator")]
struct Cli {
    /// Orchestrator address.
    #[arg(long, default_value = "127.0.0.1:50056")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one prediction.
    Get { match_id: String },
    /// Stream predictions until Ctrl+C or `--count` records.
    Stream {
        match_id: String,
        #[arg(long)]
        count: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let socket = TcpStream::connect(&cli.addr)
        .await
        .with_context(|| format!("failed to connect to {}", cli.addr))?;
    let mut conn = connection(socket);

    match cli.command {
        Commands::Get { match_id } => {
            send(&mut conn, &Request::GetPrediction { match_id }).await?;
            let response = next_response(&mut conn).await?;
            print_response(&response)?;
            if let Response::Error { code, .. } = response {
                bail!("request failed: {:?}", code);
            }
        }
        Commands::Stream { match_id, count } => {
            send(&mut conn, &Request::StreamPrediction { match_id }).await?;
            let mut received = 0u64;
            let mut cancelled = false;

            loop {
                if !cancelled && count.is_some_and(|limit| received >= limit) {
                    send(&mut conn, &Request::Cancel).await?;
                    cancelled = true;
                }

                let response = tokio::select! {
                    _ = tokio::signal::ctrl_c(), if !cancelled => {
                        send(&mut conn, &Request::Cancel).await?;
                        cancelled = true;
                        continue;
                    }
                    r = next_response(&mut conn) => r?,
                };

                match &response {
                    Response::Prediction(_) if cancelled => {}
                    Response::Prediction(_) => {
                        received += 1;
                        print_response(&response)?;
                    }
                    Response::StreamEnd { .. } => {
                        print_response(&response)?;
                        break;
                    }
                    Response::Error { .. } => print_response(&response)?,
                }
            }
        }
    }

    Ok(())
}

async fn send(conn: &mut Connection<TcpStream>, request: &Request) -> Result<()> {
    let line = encode(request)?;
    conn.send(line).await.context("failed to send request")?;
    Ok(())
}

async fn next_response(conn: &mut Connection<TcpStream>) -> Result<Response> {
    let line = conn
        .next()
        .await
        .ok_or_else(|| anyhow!("connection closed by server"))?
        .context("failed to read response")?;
    Ok(decode_response(&line)?)
}

fn print_response(response: &Response) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
