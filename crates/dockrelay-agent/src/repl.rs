//! Line-oriented chat loop: one user turn per line, one reply per turn.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use dockrelay_molecules::Dispatcher;

const PROMPT: &str = "dock> ";

pub async fn run<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    loop {
        writer.write_all(PROMPT.as_bytes()).await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let reply = dispatcher.handle_message(line).await;
        writer.write_all(format!("{reply}\n\n").as_bytes()).await?;
    }
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
