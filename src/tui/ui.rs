//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(frame.area());

    // Left side: code, registers and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(9),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_disassembly(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(5)])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the disassembly view from the current PC.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let lines = (area.height as usize).saturating_sub(2);
    let disasm = app.disassembly(lines);

    let items: Vec<ListItem> = disasm
        .iter()
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) {
                "●"
            } else {
                " "
            };
            let text = format!("{} {}{:04x}: {}", bp, prefix, addr, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Disassembly ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(list, area);
}

/// Draw the register file: r0-r15 in four columns, then control state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.cpu.regs;

    let mut content: Vec<Line> = (0..4)
        .map(|row| {
            let cells: Vec<String> = (0..4)
                .map(|col| {
                    let idx = row * 4 + col;
                    format!("r{:<2}={:04x}", idx, regs.r[idx])
                })
                .collect();
            Line::from(cells.join("  "))
        })
        .collect();

    content.push(Line::from(vec![
        Span::raw("PC="),
        Span::styled(format!("{:04x}", regs.pc), Style::default().fg(Color::Yellow)),
        Span::raw(format!(
            "  FLAGS={} ({:04x})  SP={:04x} SPX={:04x}",
            regs.flags.summary(),
            regs.flags.bits(),
            regs.sp,
            regs.spx
        )),
    ]));

    content.push(Line::from(vec![
        Span::raw("Cycles: "),
        Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
        Span::raw("   State: "),
        Span::styled(
            format!("{:?}", app.cpu.state()),
            if app.cpu.halted() {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            },
        ),
    ]));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );

    frame.render_widget(paragraph, area);
}

/// Draw the memory view around the selected address.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2).max(1);
    let capacity = app.cpu.mem.capacity();
    let start = (app.selected_addr as usize)
        .saturating_sub(visible_rows / 2)
        .min(capacity.saturating_sub(visible_rows));
    let end = (start + visible_rows).min(capacity);

    let items: Vec<ListItem> = (start..end)
        .map(|idx| {
            let addr = idx as u16;
            let value = app.cpu.mem.read(addr).unwrap_or(0);
            let is_pc = addr == app.cpu.regs.pc;
            let is_selected = addr == app.selected_addr;

            let text = if is_selected && app.editing() {
                let buf = app.input.as_deref().unwrap_or("");
                format!("{:04x}: {:_<4}", addr, buf)
            } else {
                format!("{:04x}: {:04x}", addr, value)
            };

            let style = if is_selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else if is_pc {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if value != 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );

    frame.render_widget(list, area);
}

/// Draw the status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default().title(" Status ").borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw the help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint  x: Reset"),
        Line::from("e: Deposit  ↑↓/PgUp/PgDn: Select  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default().title(" Help ").borders(Borders::ALL));

    frame.render_widget(help, area);
}
