//! Per-connection session loop
//!
//! Owns the socket from accept to close: greeting, optional echo-suppressed
//! password challenge, then the command loop. Nothing a single session does
//! can take down the listener; errors end at this boundary.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

use hearth_core::auth::check_hashed_password;

use crate::dispatch::{Dispatch, Dispatcher};
use crate::telnet::{
    ACK_TIMEOUT, IAC_DONT_ECHO, IAC_DO_ECHO, IAC_WILL_ECHO, IAC_WONT_ECHO,
};

const HELP_HINT: &str = "Enter 'help' for a list of available commands.\n";
const COMMAND_PROMPT: &str = "> ";

/// One authenticated-or-challenged console connection
pub struct Session {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    source: String,
    version: String,
    credential: Option<String>,
    dispatcher: Dispatcher,
}

impl Session {
    pub fn new(
        stream: TcpStream,
        source: String,
        version: String,
        credential: Option<String>,
        dispatcher: Dispatcher,
    ) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            source,
            version,
            credential,
            dispatcher,
        }
    }

    /// Drive the session until quit, failed auth, or disconnect.
    pub async fn run(mut self) -> io::Result<()> {
        self.push(&format!("Hearth v{}\n", self.version)).await?;

        if let Some(credential) = self.credential.take() {
            if !self.challenge(&credential).await? {
                return Ok(());
            }
        }

        self.push(HELP_HINT).await?;
        self.push(COMMAND_PROMPT).await?;
        self.command_loop().await
    }

    /// Echo-suppressed password exchange. Returns false when the session
    /// must close (handshake failure or wrong password).
    async fn challenge(&mut self, credential: &str) -> io::Result<bool> {
        if !self.negotiate_echo(&IAC_WILL_ECHO, &IAC_DO_ECHO, "echo off").await? {
            return Ok(false);
        }
        self.push("Password: ").await?;

        let Some(entered) = self.read_line().await? else {
            return Ok(false);
        };

        if !self.negotiate_echo(&IAC_WONT_ECHO, &IAC_DONT_ECHO, "echo on").await? {
            return Ok(false);
        }
        self.push("\n").await?;

        if check_hashed_password(entered.trim(), credential) {
            tracing::debug!(source = %self.source, "authorization succeeded");
            Ok(true)
        } else {
            tracing::debug!(source = %self.source, "authorization failed");
            self.push("Authorization failed. Bye\n").await?;
            Ok(false)
        }
    }

    /// Send one telnet echo-control sequence and wait for the client's
    /// 3-byte acknowledgment. Any timeout, mismatch, or I/O error is fatal
    /// to the session; the handshake is never retried.
    async fn negotiate_echo(
        &mut self,
        announce: &[u8; 3],
        expect: &[u8; 3],
        stage: &str,
    ) -> io::Result<bool> {
        self.writer.write_all(announce).await?;
        self.writer.flush().await?;

        let mut ack = [0u8; 3];
        let read = timeout(ACK_TIMEOUT, self.reader.read_exact(&mut ack)).await;
        match read {
            Ok(Ok(_)) if ack == *expect => Ok(true),
            Ok(Ok(_)) => {
                tracing::error!(
                    source = %self.source,
                    "error at '{}': sent {:02x?}, expected reply {:02x?}, received {:02x?}",
                    stage,
                    announce,
                    expect,
                    ack
                );
                self.push(&format!("'{}' failed. Bye", stage)).await?;
                Ok(false)
            }
            Ok(Err(e)) => {
                tracing::error!(source = %self.source, error = %e, "exception at '{}'", stage);
                self.push(&format!("\nException at '{}'. See log for details.", stage))
                    .await?;
                Ok(false)
            }
            Err(_) => {
                tracing::error!(
                    source = %self.source,
                    "error at '{}': no acknowledgment within {:?}",
                    stage,
                    ACK_TIMEOUT
                );
                self.push(&format!("'{}' failed. Bye", stage)).await?;
                Ok(false)
            }
        }
    }

    async fn command_loop(&mut self) -> io::Result<()> {
        loop {
            let Some(line) = self.read_line().await? else {
                tracing::debug!(source = %self.source, "client disconnected");
                return Ok(());
            };
            let line = line.trim();

            if matches!(line, "quit" | "q" | "exit" | "x") {
                self.push("bye\n").await?;
                return Ok(());
            }

            match self.dispatcher.dispatch(line, &self.source) {
                Dispatch::Handled(output) => self.push(&output).await?,
                Dispatch::Unknown => {
                    self.push("Unknown command.\n").await?;
                    self.push(HELP_HINT).await?;
                }
            }
            self.push(COMMAND_PROMPT).await?;
        }
    }

    /// Read one newline-terminated line; None means the peer closed.
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    async fn push(&mut self, data: &str) -> io::Result<()> {
        self.writer.write_all(data.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
