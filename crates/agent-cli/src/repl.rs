//! Interactive Loop

use agent_core::Agent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const BANNER: &str = "AI Code Assistant\n\
================\n\
A conversational AI agent that can read, list, and edit files.\n\
Type 'exit' or 'quit' to end the conversation.\n";

fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Prompt, read a line, reply; until `exit`, `quit` or end of input
pub async fn run<R, W>(agent: &mut Agent, input: R, mut out: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    out.write_all(BANNER.as_bytes()).await?;
    out.write_all(b"\n").await?;

    loop {
        out.write_all(b"You: ").await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            out.write_all(b"\nGoodbye!\n").await?;
            break;
        };
        let line = line.trim();

        if is_exit(line) {
            out.write_all(b"Goodbye!\n").await?;
            break;
        }
        if line.is_empty() {
            continue;
        }

        out.write_all(b"\nAssistant: ").await?;
        out.flush().await?;

        let reply = agent.chat(line).await;
        out.write_all(reply.as_bytes()).await?;
        out.write_all(b"\n\n").await?;
    }

    out.flush().await
}
