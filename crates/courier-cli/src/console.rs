//! Interactive raw-TCP debug console
//!
//! Connects a `DebugLink` to the terminal: stdin lines go out to the device,
//! inbound lines print as they arrive. `/quit` (or end of stdin) closes the
//! session; a device hangup ends it too.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use courier_backend::{DebugLink, DebugLinkError};

use crate::error::Result;

pub async fn run(host: &str, port: u16, connect_timeout: Duration) -> Result<()> {
    let link = DebugLink::connect(host, port, connect_timeout).await?;
    println!("connected to {} (type /quit to leave)", link.address());
    let (mut writer, mut reader) = link.into_split();

    let mut printer = tokio::spawn(async move {
        loop {
            match reader.recv().await {
                Ok(line) => println!("< {}", line),
                Err(DebugLinkError::Closed) => {
                    println!("connection closed by device");
                    break;
                }
                Err(err) => {
                    println!("read error: {}", err);
                    break;
                }
            }
        }
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = stdin.next_line() => match line? {
                Some(line) if line.trim() == "/quit" => break,
                Some(line) => writer.send(&line).await?,
                None => break,
            },
            _ = &mut printer => break,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    debug!("closing debug console");
    writer.close().await?;
    printer.abort();
    Ok(())
}
