//! Input loop
//!
//! One task owns the `Session` and performs every mutation. It waits on two
//! sources: input lines and finished image fetches. Fetches run on spawned
//! tasks and report back over an mpsc channel tagged with their generation;
//! the session drops results that are no longer current.
//!
//! Store change notifications are drained after each command and rendered in
//! the order they were published.

use crate::commands::{parse_command, Command};
use crate::render;
use crate::services::ImageFetcher;
use crate::session::{ImageResult, Session};
use smashpass_common::events::StoreEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

const IMAGE_CHANNEL_CAPACITY: usize = 16;

pub struct App<W> {
    session: Session,
    events: broadcast::Receiver<StoreEvent>,
    fetcher: Option<ImageFetcher>,
    image_tx: mpsc::Sender<ImageResult>,
    image_rx: mpsc::Receiver<ImageResult>,
    out: W,
}

impl<W: AsyncWrite + Unpin> App<W> {
    /// `events` must be subscribed to the bus the session's store publishes on.
    /// Without a fetcher, images are never requested.
    pub fn new(
        session: Session,
        events: broadcast::Receiver<StoreEvent>,
        fetcher: Option<ImageFetcher>,
        out: W,
    ) -> Self {
        let (image_tx, image_rx) = mpsc::channel(IMAGE_CHANNEL_CAPACITY);
        Self {
            session,
            events,
            fetcher,
            image_tx,
            image_rx,
            out,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Process input until end of input or `quit`
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> std::io::Result<()> {
        let mut lines = input.lines();
        self.show_entity().await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed");
                        break;
                    };
                    if !self.handle_line(&line).await? {
                        break;
                    }
                }
                Some(result) = self.image_rx.recv() => {
                    self.on_image(result).await?;
                }
            }
        }

        info!("Session ended");
        Ok(())
    }

    /// Returns `false` when the user asked to quit
    async fn handle_line(&mut self, line: &str) -> std::io::Result<bool> {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(e) => {
                self.write_line(&render::notice(&e)).await?;
                return Ok(true);
            }
        };
        debug!(?command, "Handling command");

        if command == Command::Quit {
            return Ok(false);
        }

        match self.execute(command).await {
            Ok(()) => {}
            Err(CommandError::User(e)) => self.write_line(&render::notice(&e)).await?,
            Err(CommandError::Output(e)) => return Err(e),
        }
        self.drain_events().await?;
        Ok(true)
    }

    async fn execute(&mut self, command: Command) -> std::result::Result<(), CommandError> {
        match command {
            Command::Next => {
                self.session.next();
                self.show_entity().await?;
            }
            Command::Previous => {
                self.session.previous();
                self.show_entity().await?;
            }
            Command::Goto(number) => {
                self.session.seek(number.saturating_sub(1));
                self.show_entity().await?;
            }
            Command::Toggle { character, verdict } => {
                self.session.toggle(&character, verdict)?;
            }
            Command::Add(name) => self.session.add_character(&name)?,
            Command::Remove(name) => self.session.remove_character(&name)?,
            Command::Import(path) => {
                self.write_line(&format!("Reading {}...", path.display())).await?;
                let summary = self.session.import(&path)?;
                self.write_line(&format!(
                    "Import done: {} character(s), {} row(s)",
                    summary.characters, summary.rows
                ))
                .await?;
            }
            Command::Drop(path) => {
                match self.session.drop_file(&path)? {
                    Some(summary) => {
                        self.write_line(&format!(
                            "Import done: {} character(s), {} row(s)",
                            summary.characters, summary.rows
                        ))
                        .await?
                    }
                    None => {
                        self.write_line(&format!("Ignored {} (not a .csv file)", path.display()))
                            .await?
                    }
                }
            }
            Command::Export(path) => {
                self.write_line("Writing to file...").await?;
                let written = self.session.export(path.as_deref())?;
                self.write_line(&format!("Writing done! Saved to {}", written.display()))
                    .await?;
            }
            Command::Stats => {
                let view = render::stats_view(&self.session);
                self.write_line(&view).await?;
            }
            Command::Show => {
                let view = render::entity_view(&self.session);
                self.write_line(&view).await?;
            }
            Command::Image => {
                let line = render::image_line(self.session.image());
                self.write_line(&format!("image: {}", line)).await?;
            }
            Command::Help => self.write_line(render::HELP).await?,
            Command::Quit => {}
        }
        Ok(())
    }

    /// Render the entity at the new position and request its image
    async fn show_entity(&mut self) -> std::io::Result<()> {
        if let Some(fetcher) = &self.fetcher {
            if let Some(request) = self.session.request_image() {
                let fetcher = fetcher.clone();
                let tx = self.image_tx.clone();
                tokio::spawn(async move {
                    let outcome = fetcher.fetch(&request.url).await;
                    let result = ImageResult {
                        generation: request.generation,
                        entity_id: request.entity_id,
                        outcome,
                    };
                    // Receiver gone means the loop has exited
                    let _ = tx.send(result).await;
                });
            }
        }

        let view = render::entity_view(&self.session);
        self.write_line(&view).await
    }

    async fn on_image(&mut self, result: ImageResult) -> std::io::Result<()> {
        if let Err(e) = &result.outcome {
            warn!(entity_id = %result.entity_id, error = %e, "Image fetch failed");
        }
        let entity_id = result.entity_id.clone();
        if self.session.apply_image(result) {
            let line = render::image_line(self.session.image());
            self.write_line(&format!("image for #{}: {}", entity_id, line))
                .await?;
        }
        Ok(())
    }

    async fn drain_events(&mut self) -> std::io::Result<()> {
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    debug!(event = event.event_type(), "Store changed");
                    self.write_line(&render::event_line(&event)).await?;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed store notifications");
                }
                Err(_) => return Ok(()),
            }
        }
    }

    async fn write_line(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }
}

/// Command failure: user-facing errors become notices, output errors end the loop
enum CommandError {
    User(smashpass_common::Error),
    Output(std::io::Error),
}

impl From<smashpass_common::Error> for CommandError {
    fn from(err: smashpass_common::Error) -> Self {
        CommandError::User(err)
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::Output(err)
    }
}
