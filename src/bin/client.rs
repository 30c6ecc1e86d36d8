//! Interactive terminal client for the academia server.
//!
//! Prints every line the server sends and forwards each line typed on stdin.

use std::io;
use std::net::SocketAddr;

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::runtime::Builder;
use tokio_util::codec::{Framed, FramedRead, LinesCodec};

/// `academia-client` arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "academia-client",
    about = "Connect to an academia server from the terminal",
    version
)]
struct CliArgs {
    /// Server address to connect to.
    #[arg(long, env = "ACADEMIA_SERVER", default_value = "127.0.0.1:8080")]
    server: SocketAddr,
}

fn main() -> io::Result<()> {
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    let result = runtime.block_on(async_main(args));
    // The stdin reader sits on a blocking thread that never returns on its own.
    runtime.shutdown_background();
    result
}

async fn async_main(args: CliArgs) -> io::Result<()> {
    let stream = TcpStream::connect(args.server)
        .await
        .map_err(|error| io::Error::other(format!("connect to {}: {error}", args.server)))?;
    eprintln!("Connected to server at {}", args.server);

    let (mut sink, mut lines) = Framed::new(stream, LinesCodec::new()).split::<String>();
    let mut stdin = FramedRead::new(tokio::io::stdin(), LinesCodec::new());

    loop {
        tokio::select! {
            line = lines.next() => match line {
                Some(Ok(line)) => println!("{line}"),
                Some(Err(error)) => return Err(io::Error::other(error)),
                None => break,
            },
            input = stdin.next() => match input {
                Some(Ok(input)) => sink.send(input).await.map_err(io::Error::other)?,
                Some(Err(error)) => return Err(io::Error::other(error)),
                None => break,
            },
        }
    }

    eprintln!("Disconnected from server");
    Ok(())
}
