//! Debugger application state and logic.

use crate::cpu::decode;
use crate::cpu::Cpu;
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Pristine program image, re-deposited on reset.
    pub image: Vec<u16>,
    /// Address the image is deposited at.
    pub load_at: u16,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<u16>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Selected memory address (examine/deposit target).
    pub selected_addr: u16,
    /// Pending hex digits of a deposit edit, when in edit mode.
    pub input: Option<String>,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(image: Vec<u16>, load_at: u16, mem_words: usize) -> Self {
        let mut cpu = Cpu::new(mem_words);
        cpu.loadmem(&image, load_at);
        cpu.reset();

        Self {
            cpu,
            image,
            load_at,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            selected_addr: load_at,
            input: None,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        match self.cpu.step() {
            Ok(Some(trace)) => {
                self.status = format!("{}", trace);
            }
            Ok(None) => {
                self.status = "CPU halted. Press 'x' to reset.".into();
                self.running = false;
            }
            Err(err) => {
                self.status = format!("Fault: {}", err);
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or fault.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
        // Step off the current address first so resuming from a
        // breakpoint does not stop on it again. A fault or halt in
        // this step clears `running` again.
        if !self.cpu.halted() {
            self.step();
        }
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if self.cpu.halted() {
            self.running = false;
            self.status = format!("Halted after {} cycles", self.cpu.cycles);
            return;
        }

        // Check for breakpoint
        let pc = self.cpu.regs.pc;
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at {:04x}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at the current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.contains(&pc) {
            self.breakpoints.remove(&pc);
            self.status = format!("Removed breakpoint at {:04x}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at {:04x}", pc);
        }
    }

    /// Reset registers and re-deposit the pristine image.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.loadmem(&self.image, self.load_at);
        self.running = false;
        self.input = None;
        self.status = "Reset. Ready.".into();
    }

    /// Move the memory selection.
    pub fn select_offset(&mut self, delta: i32) {
        let capacity = self.cpu.mem.capacity() as i32;
        if capacity == 0 {
            return;
        }
        let addr = (self.selected_addr as i32 + delta).clamp(0, capacity - 1);
        self.selected_addr = addr as u16;
    }

    /// Begin a deposit edit at the selected address.
    pub fn begin_edit(&mut self) {
        self.running = false;
        self.input = Some(String::new());
        self.status = format!(
            "Deposit at {:04x}: type hex digits, Enter commits, Esc cancels",
            self.selected_addr
        );
    }

    /// Append a hex digit to the pending deposit.
    pub fn push_digit(&mut self, digit: char) {
        if let Some(buf) = &mut self.input {
            if digit.is_ascii_hexdigit() && buf.len() < 4 {
                buf.push(digit.to_ascii_lowercase());
            }
        }
    }

    /// Commit the pending deposit to memory.
    pub fn commit_edit(&mut self) {
        let Some(buf) = self.input.take() else {
            return;
        };
        if buf.is_empty() {
            self.status = "Deposit cancelled.".into();
            return;
        }
        // Buffer only ever holds hex digits
        let value = u16::from_str_radix(&buf, 16).unwrap_or(0);
        match self.cpu.mem.write(self.selected_addr, value) {
            Ok(()) => {
                self.status = format!("Deposited {:04x} at {:04x}", value, self.selected_addr);
            }
            Err(err) => {
                self.status = format!("Deposit failed: {}", err);
            }
        }
    }

    /// Abandon the pending deposit.
    pub fn cancel_edit(&mut self) {
        self.input = None;
        self.status = "Deposit cancelled.".into();
    }

    /// Whether a deposit edit is in progress.
    pub fn editing(&self) -> bool {
        self.input.is_some()
    }

    /// Width-aware disassembly starting at the current PC.
    pub fn disassembly(&self, lines: usize) -> Vec<(u16, String, bool)> {
        let mut out = Vec::new();
        let mut addr = self.cpu.regs.pc;

        for _ in 0..lines {
            let ir = match self.cpu.mem.read(addr) {
                Ok(word) => word,
                Err(_) => break,
            };
            let (opcode, _) = decode::split(ir);
            let operand = if decode::takes_operand_word(opcode) {
                self.cpu.mem.read(addr.wrapping_add(1)).unwrap_or(0)
            } else {
                0
            };
            let instr = decode::decode(ir, operand);
            out.push((addr, format!("{}", instr), addr == self.cpu.regs.pc));
            addr = addr.wrapping_add(instr.width());
        }

        out
    }
}

/// Run the debugger with a program image.
pub fn run_debugger(image: Vec<u16>, load_at: u16, mem_words: usize) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create app
    let mut app = DebuggerApp::new(image, load_at, mem_words);

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        // Handle input
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if app.editing() {
                        match key.code {
                            KeyCode::Enter => app.commit_edit(),
                            KeyCode::Esc => app.cancel_edit(),
                            KeyCode::Char(c) => app.push_digit(c),
                            _ => {}
                        }
                    } else {
                        match key.code {
                            KeyCode::Char('q') => app.should_quit = true,
                            KeyCode::Char('s') => {
                                app.running = false;
                                app.step();
                            }
                            KeyCode::Char('r') => app.run(),
                            KeyCode::Char('p') => {
                                app.running = false;
                                app.status = "Paused.".into();
                            }
                            KeyCode::Char('b') => app.toggle_breakpoint(),
                            KeyCode::Char('x') => app.reset(),
                            KeyCode::Char('e') => app.begin_edit(),
                            KeyCode::Up => app.select_offset(-1),
                            KeyCode::Down => app.select_offset(1),
                            KeyCode::PageUp => app.select_offset(-16),
                            KeyCode::PageDown => app.select_offset(16),
                            _ => {}
                        }
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
