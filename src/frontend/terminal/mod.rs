mod input;
mod render;

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor, event, execute,
    terminal::{self, ClearType},
};

use crate::state::{KeyOutcome, Workspace};

use super::runtime::Runtime;
use super::traits::{Frontend, FrontendError, FrontendEvent, MouseEventKind};

const IDLE_POLL: Duration = Duration::from_millis(100);

pub struct TerminalFrontend {
    stdout: Stdout,
    width: u16,
    height: u16,
    active: bool,
}

impl TerminalFrontend {
    pub fn new() -> Self {
        let (width, height) = terminal::size().unwrap_or((80, 24));
        Self {
            stdout: io::stdout(),
            width,
            height,
            active: false,
        }
    }

    fn poll_event(&mut self, timeout: Duration) -> Option<FrontendEvent> {
        if event::poll(timeout).ok()? {
            let event = event::read().ok()?;
            input::convert_event(event)
        } else {
            None
        }
    }

    fn poll_timeout(workspace: &Workspace, now: Instant) -> Duration {
        workspace
            .next_deadline()
            .map_or(IDLE_POLL, |due| due.saturating_duration_since(now).min(IDLE_POLL))
    }
}

impl Default for TerminalFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for TerminalFrontend {
    fn init(&mut self) -> Result<(), FrontendError> {
        terminal::enable_raw_mode()?;
        execute!(
            self.stdout,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        let (width, height) = terminal::size()?;
        self.width = width;
        self.height = height;
        self.active = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), FrontendError> {
        if !std::mem::take(&mut self.active) {
            return Ok(());
        }
        execute!(
            self.stdout,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn run(mut self, mut workspace: Workspace, runtime: Runtime) -> Result<(), FrontendError> {
        let now = Instant::now();
        let (width, height) = self.size();
        workspace.resize_screen(width, height, now);
        workspace.open(now);

        let mut title = String::new();
        loop {
            for effect in workspace.drain_effects() {
                log::trace!("spawning {:?}", effect);
                runtime.spawn(effect);
            }

            let path = workspace.history().current().path.clone();
            if path != title {
                self.set_title(&format!("livepad {}", path));
                title = path;
            }
            self.render(&workspace)?;

            let timeout = Self::poll_timeout(&workspace, Instant::now());
            if let Some(event) = self.poll_event(timeout) {
                let now = Instant::now();
                match event {
                    FrontendEvent::Key(key) => match workspace.handle_key(key, now) {
                        KeyOutcome::Quit => break,
                        KeyOutcome::Ignored => self.bell(),
                        KeyOutcome::Handled => {}
                    },
                    FrontendEvent::Resize(width, height) => {
                        self.width = width;
                        self.height = height;
                        execute!(self.stdout, terminal::Clear(ClearType::All))?;
                        workspace.resize_screen(width, height, now);
                    }
                    FrontendEvent::Mouse(mouse) => match mouse.kind {
                        MouseEventKind::Down => {
                            workspace.begin_drag(mouse.column);
                        }
                        MouseEventKind::Drag => workspace.drag_to(mouse.column, now),
                        MouseEventKind::Up => workspace.end_drag(),
                    },
                    FrontendEvent::Focus(_) => {}
                }
            }

            let now = Instant::now();
            while let Some(event) = runtime.try_recv() {
                workspace.handle_event(event, now);
            }
            workspace.tick(now);
        }
        Ok(())
    }

    fn render(&mut self, workspace: &Workspace) -> Result<(), FrontendError> {
        render::render(workspace, &mut self.stdout)?;
        self.stdout.flush()?;
        Ok(())
    }

    fn bell(&mut self) {
        let _ = self.stdout.write_all(b"\x07");
        let _ = self.stdout.flush();
    }

    fn set_title(&mut self, title: &str) {
        let _ = execute!(self.stdout, terminal::SetTitle(title));
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
