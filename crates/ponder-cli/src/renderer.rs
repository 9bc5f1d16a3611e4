use std::io::{self, Write};

use cliclack::spinner;
use console::style;

use ponder::turn::Renderer;

/// Terminal implementation of the presentation port. The reasoning phase
/// streams dimmed; the "collapse" is a one-line completion banner, since a
/// scrollback terminal cannot literally fold the region away.
pub struct ConsoleRenderer {
    spinner: cliclack::ProgressBar,
    busy: bool,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        ConsoleRenderer {
            spinner: spinner(),
            busy: false,
        }
    }

    /// Spin while the first request is being established.
    pub fn show_busy(&mut self) {
        self.spinner.start("awaiting reply");
        self.busy = true;
    }

    /// Stop the spinner if a turn failed before any output arrived.
    pub fn hide_busy(&mut self) {
        if self.busy {
            self.spinner.stop("");
            self.busy = false;
        }
    }
}

impl Renderer for ConsoleRenderer {
    fn begin_collapsible(&mut self, label: &str) {
        self.hide_busy();
        println!("{}", style(label).dim().italic());
    }

    fn append_collapsible(&mut self, text: &str) {
        print!("{}", style(text).dim());
        let _ = io::stdout().flush();
    }

    fn collapse(&mut self, label: &str) {
        println!("\n{}\n", style(label).green().dim());
    }

    fn append_inline(&mut self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }
}
