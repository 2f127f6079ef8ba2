//! Line-oriented console transport.
//!
//! Each input line carries the sender and the message:
//!
//! ```text
//! <user_id>|<handle>|<display name>|<message>
//! 42|alice|Alice Smith|/join
//! 7||No Handle User|/list
//! ```
//!
//! The message field may itself contain `|`. Every line gets one reply,
//! followed by a blank line.

use crate::commands::{Caller, CommandDispatcher};
use common::types::{Handle, HandleError, UserId};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why a console line could not be turned into a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleLineError {
    #[error("expected <user_id>|<handle>|<display name>|<message>")]
    MissingFields,

    #[error("user id {0:?} is not a number")]
    InvalidUserId(String),

    #[error("invalid handle: {0}")]
    InvalidHandle(#[from] HandleError),
}

/// Split a console line into the sender and the message text.
pub fn parse_line(line: &str) -> Result<(Caller, String), ConsoleLineError> {
    let mut fields = line.splitn(4, '|');
    let (Some(id), Some(handle), Some(display_name), Some(text)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(ConsoleLineError::MissingFields);
    };

    let id: UserId = id
        .parse()
        .map_err(|_| ConsoleLineError::InvalidUserId(id.trim().to_string()))?;

    let handle = match handle.trim() {
        "" => None,
        raw => Some(Handle::parse(raw)?),
    };

    let display_name = match display_name.trim() {
        "" => handle
            .as_ref()
            .map_or_else(|| format!("User {id}"), ToString::to_string),
        name => name.to_string(),
    };

    Ok((
        Caller {
            id,
            display_name,
            handle,
        },
        text.trim().to_string(),
    ))
}

/// Feed lines from `reader` through the dispatcher until EOF or cancellation.
pub async fn run<R, W>(
    dispatcher: &CommandDispatcher,
    reader: R,
    mut writer: W,
    cancel_token: CancellationToken,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled: u64 = 0;

    loop {
        let line = tokio::select! {
            () = cancel_token.cancelled() => {
                info!(target: "roster.console", "Console transport cancelled");
                break;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            debug!(target: "roster.console", "Console input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match parse_line(&line) {
            Ok((caller, text)) => dispatcher.handle(&caller, &text).await,
            Err(e) => {
                warn!(target: "roster.console", error = %e, "Malformed console line");
                format!("Error: {e}")
            }
        };

        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n\n").await?;
        writer.flush().await?;
        handled += 1;
    }

    info!(target: "roster.console", lines = handled, "Console transport stopped");
    Ok(())
}
