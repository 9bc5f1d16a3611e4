use anyhow::Result;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use ponder::providers::base::Provider;
use ponder::session::ChatSession;
use ponder::turn::{run_turn, TurnOutcome};

use crate::renderer::ConsoleRenderer;

const PROMPT: &str = "\x1b[1m\x1b[38;5;172m(~)> \x1b[0m";

/// The interactive chat loop: read a line, run a turn, render, repeat.
/// `/new` clears the session, `/quit` (or ctrl-c / ctrl-d) exits.
pub struct ChatLoop<P> {
    provider: P,
    session: ChatSession,
    renderer: ConsoleRenderer,
}

impl<P: Provider> ChatLoop<P> {
    pub fn new(provider: P, session: ChatSession) -> Self {
        ChatLoop {
            provider,
            session,
            renderer: ConsoleRenderer::new(),
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;

        println!(
            "ponder {}",
            style("- \"/new\" clears the session, \"/quit\" exits").dim()
        );
        println!();

        loop {
            let line = match editor.readline(PROMPT) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            let input = line.trim();
            match input {
                "/quit" | "/exit" => break,
                "/new" => {
                    self.session.reset();
                    println!("{}", style("Chat session cleared").green());
                    continue;
                }
                _ => {}
            }
            let _ = editor.add_history_entry(input);

            self.renderer.show_busy();
            match run_turn(&self.provider, &mut self.session, &mut self.renderer, input).await {
                Ok(TurnOutcome::Skipped) => {
                    self.renderer.hide_busy();
                }
                Ok(TurnOutcome::Completed { .. }) => {
                    println!("\n");
                }
                Err(e) => {
                    self.renderer.hide_busy();
                    println!("{} {}", style("Turn failed:").red().bold(), style(e).red());
                }
            }
        }

        Ok(())
    }
}
