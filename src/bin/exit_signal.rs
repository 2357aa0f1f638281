use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::UdpSocket;

use bully_election::Message;

/// Test-only knockout: sends `exit` to every peer port in `[port, port+num)`.
#[derive(Debug, Parser)]
struct Args {
    #[arg(short = 'n', long = "num_nodes")]
    num_nodes: u32,

    #[arg(short = 'p', long = "port", default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let socket = UdpSocket::bind(("127.0.0.1", 0)).await.context("binding signalling socket")?;
    for i in 0..args.num_nodes {
        let addr = ("127.0.0.1", args.port + i as u16);
        socket.send_to(Message::Exit.encode().as_bytes(), addr).await.context("sending exit datagram")?;
    }

    Ok(())
}
