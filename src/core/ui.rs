// ─── Console Presentation ───
// Coloured status markers and key-press prompts. Logging goes through
// `tracing`; this is only what the player sees.

use std::sync::atomic::{AtomicBool, Ordering};

use console::{Key, Style, Term};

use crate::core::error::UpdaterError;
use crate::core::sync::{AssetAction, AssetEntry, AssetFolder, EntryState, SyncListener};

pub struct ConsoleUi {
    term: Term,
    /// Fixed answer for every prompt (`--yes` / `--no`).
    assume: Option<bool>,
    /// An entry status line was started and still needs its marker.
    entry_open: AtomicBool,
}

impl ConsoleUi {
    pub fn new(assume: Option<bool>) -> Self {
        Self {
            term: Term::stdout(),
            assume,
            entry_open: AtomicBool::new(false),
        }
    }

    pub fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    pub fn blank(&self) {
        self.line("");
    }

    /// Start a status line; finish it with [`done`](Self::done),
    /// [`failed`](Self::failed) or [`error`](Self::error).
    pub fn step(&self, label: &str) {
        let _ = self.term.write_str(label);
    }

    pub fn done(&self) {
        self.marker("Done", Style::new().green());
    }

    pub fn failed(&self) {
        self.marker("Failed", Style::new().red());
    }

    pub fn error(&self) {
        self.marker("Error", Style::new().red());
    }

    fn marker(&self, text: &str, style: Style) {
        let _ = self
            .term
            .write_line(&format!(" {}", style.apply_to(format!("[{text}]"))));
    }

    pub fn header(&self, text: &str) {
        self.line(&Style::new().cyan().apply_to(text).to_string());
    }

    pub fn highlight(&self, text: &str) {
        self.line(&Style::new().yellow().apply_to(text).to_string());
    }

    pub fn alert(&self, text: &str) {
        self.line(&Style::new().red().apply_to(text).to_string());
    }

    pub fn fatal(&self, error: &UpdaterError) {
        self.blank();
        self.line(&Style::new().red().bold().apply_to(error.to_string()).to_string());
    }

    /// Ask a yes/no question answered by a single key press.
    ///
    /// `Y`, `S` (for Spanish keyboards) and Enter mean yes; `N` and Esc
    /// mean no. Without a terminal the answer is no unless `--yes` was set.
    pub fn confirm(&self, question: &str) -> bool {
        if let Some(answer) = self.assume {
            return answer;
        }
        if !self.term.is_term() {
            return false;
        }

        let _ = self.term.write_str(&format!("{question} [Y/n]: "));
        loop {
            match self.term.read_key() {
                Ok(Key::Enter) => return self.answer(true),
                Ok(Key::Escape) => return self.answer(false),
                Ok(Key::Char(c)) => match c.to_ascii_lowercase() {
                    'y' | 's' => return self.answer(true),
                    'n' => return self.answer(false),
                    _ => {}
                },
                Ok(_) => {}
                Err(_) => return self.answer(false),
            }
        }
    }

    fn answer(&self, yes: bool) -> bool {
        let _ = self.term.write_line(if yes { "yes" } else { "no" });
        yes
    }

    /// Wait for a key press before the window closes.
    pub fn pause(&self) {
        if !self.term.is_term() {
            return;
        }
        self.blank();
        self.line("Press any key to exit...");
        let _ = self.term.read_key();
    }
}

impl SyncListener for ConsoleUi {
    fn folder_started(&self, folder: AssetFolder) {
        self.header(&format!("=> Processing {folder}..."));
    }

    fn folder_failed(&self, folder: AssetFolder, error: &UpdaterError) {
        self.alert(&format!("    Cannot list {folder}: {error}"));
    }

    fn entry_started(&self, entry: &AssetEntry, action: &AssetAction) {
        let verb = match action {
            AssetAction::Download => "Installing",
            AssetAction::Delete(_) => "Deleting",
            AssetAction::Skip => return,
        };
        let stem = std::path::Path::new(&entry.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.name.clone());
        self.step(&format!("    {verb}: {stem}"));
        self.entry_open.store(true, Ordering::Relaxed);
    }

    fn entry_finished(&self, entry: &AssetEntry, state: &EntryState) {
        let open = self.entry_open.swap(false, Ordering::Relaxed);
        match state {
            EntryState::Installed | EntryState::Removed => self.done(),
            EntryState::Errored(_) => {
                if !open {
                    self.step(&format!("    {}", entry.name));
                }
                self.error();
            }
            EntryState::Skipped => {}
        }
    }
}
