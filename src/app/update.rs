use super::input::HELP;
use super::messages::Message;
use super::view::{render_json, render_text};
use super::{App, FrameKey, OutputMode};
use anyhow::Result;
use interlinear_core::cache::{save_bookmark, save_display_params};
use interlinear_core::{ReaderSnapshot, SessionCommand};
use std::io::{self, Write};
use std::time::Instant;
use tracing::{debug, info, warn};

pub(super) enum Effect {
    Render {
        action: &'static str,
        snapshot: ReaderSnapshot,
    },
    Print(String),
    SaveBookmark,
    SaveDisplay,
    Quit,
}

impl App {
    pub(super) fn update(&mut self, message: Message) -> Result<()> {
        for effect in self.reduce(message) {
            self.run_effect(effect)?;
        }
        Ok(())
    }

    fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();
        match message {
            Message::Command(command) => self.handle_command(command, &mut effects),
            Message::Tick(now) => self.handle_tick(now, &mut effects),
            Message::Help => effects.push(Effect::Print(HELP.to_string())),
            Message::Invalid { line, reason } => {
                warn!(%line, "Ignoring input: {reason}");
                effects.push(Effect::Print(format!("?? {line}: {reason}")));
            }
            Message::Quit | Message::InputClosed => {
                info!("Quit requested");
                effects.extend([Effect::SaveBookmark, Effect::SaveDisplay, Effect::Quit]);
            }
            Message::Interrupted => {
                self.session.close();
                effects.extend([Effect::SaveBookmark, Effect::SaveDisplay, Effect::Quit]);
            }
        }
        effects
    }

    fn handle_command(&mut self, command: SessionCommand, effects: &mut Vec<Effect>) {
        let page_before = self.session.current_page();
        let params_before = self.session.params();
        let event = self.session.apply_command(command, Instant::now());

        if event.snapshot.params != params_before {
            effects.push(Effect::SaveDisplay);
        }
        if event.snapshot.current_page != page_before {
            effects.push(Effect::SaveBookmark);
        }
        effects.push(Effect::Render {
            action: event.action,
            snapshot: event.snapshot,
        });
    }

    fn handle_tick(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        let page_before = self.session.current_page();
        let event = self.session.apply_command(SessionCommand::Tick, now);
        if event.snapshot.current_page != page_before {
            effects.push(Effect::SaveBookmark);
        }
        if self.last_frame.as_ref() != Some(&FrameKey::of(&event.snapshot)) {
            effects.push(Effect::Render {
                action: event.action,
                snapshot: event.snapshot,
            });
        }
    }

    fn run_effect(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::Render { action, snapshot } => {
                self.last_frame = Some(FrameKey::of(&snapshot));
                let frame = match self.output {
                    OutputMode::Text => render_text(&snapshot),
                    OutputMode::Json => render_json(action, &snapshot)? + "\n",
                };
                write_stdout(&frame)?;
            }
            Effect::Print(text) => {
                if self.output == OutputMode::Text {
                    write_stdout(&format!("{text}\n"))?;
                }
            }
            Effect::SaveBookmark => {
                let bookmark = self.session.to_bookmark();
                debug!(page = bookmark.page, pair_idx = ?bookmark.pair_idx, "Saving bookmark");
                save_bookmark(&self.config.cache_root(), &self.document_path, &bookmark);
            }
            Effect::SaveDisplay => {
                let params = self.session.params();
                self.config.set_display_params(params);
                save_display_params(&self.config.cache_root(), &self.document_path, &params);
            }
            Effect::Quit => {
                self.session.close();
                self.running = false;
            }
        }
        Ok(())
    }
}

fn write_stdout(frame: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(frame.as_bytes())?;
    stdout.flush()
}
