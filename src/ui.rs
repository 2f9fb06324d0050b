use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};

use crate::app::{App, FormField, View};
use crate::format::{format_clock, format_time, format_total, truncate};
use crate::playback::Phase;
use crate::playback::RepeatMode;
use crate::theme::Theme;
use crate::timer::TimerMode;

// ── Frame ──────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();
    f.render_widget(Block::default().style(Style::default().bg(app.theme.surface)), size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(f, chunks[0], app);
    draw_dock(f, chunks[1], app);
    match app.view {
        View::Home => draw_home(f, chunks[2], app),
        View::Playlist => draw_playlist(f, chunks[2], app),
        View::Poems => draw_poems(f, chunks[2], app),
        View::Affirmations => draw_affirmation(f, chunks[2], app),
        View::Goodbye => draw_goodbye(f, chunks[2], app),
    }
    draw_status_bar(f, chunks[3], app);

    if app.form.is_some() {
        draw_project_form(f, size, app);
    }
    if app.confirm_delete.is_some() {
        draw_confirm_overlay(f, size, app);
    }
    if app.add_song.is_some() {
        draw_add_song_overlay(f, size, app);
    }
    if app.open_poem.is_some() {
        draw_poem_overlay(f, size, app);
    }
    if app.show_help {
        draw_help_overlay(f, size, &app.theme);
    }
}

fn popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn panel<'a>(title: String, th: &Theme, focused: bool) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, Style::default().fg(th.text_dim).bold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused { th.accent } else { th.border }))
        .style(Style::default().bg(th.surface))
}

/// `━━━━●╌╌╌` sized to `width` cells.
fn bar_spans<'a>(ratio: f64, width: usize, th: &Theme) -> Vec<Span<'a>> {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let filled = ((ratio * width as f64) as usize).min(width.saturating_sub(1));
    let empty = width.saturating_sub(filled + 1);
    vec![
        Span::styled("━".repeat(filled), Style::default().fg(th.accent)),
        Span::styled("●", Style::default().fg(th.text).bold()),
        Span::styled("╌".repeat(empty), Style::default().fg(th.dim)),
    ]
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let title = " ♡ giftbox ";

    let amb = &app.ambience;
    let meter = if amb.is_muted() {
        " ♪ muted ".to_string()
    } else if !amb.is_playing() {
        " ♪ resting ".to_string()
    } else {
        let cells = 10;
        let filled = (amb.volume() * cells as f64).round() as usize;
        format!(
            " ♪ {}{} {:>3}% ",
            "█".repeat(filled),
            "░".repeat(cells - filled.min(cells)),
            (amb.volume() * 100.0).round() as u32
        )
    };
    let meter_color = if amb.is_muted() || !amb.is_playing() {
        th.dim
    } else if amb.is_fading() {
        th.yellow
    } else {
        th.green
    };
    let pad_len = area
        .width
        .saturating_sub(title.chars().count() as u16 + meter.chars().count() as u16)
        as usize;

    let header = Line::from(vec![
        Span::styled(title, Style::default().fg(th.glow).bold()),
        Span::styled(" ".repeat(pad_len), Style::default().bg(th.surface_light)),
        Span::styled(meter, Style::default().fg(meter_color)),
    ]);
    f.render_widget(
        Paragraph::new(header).style(Style::default().bg(th.surface_light)),
        area,
    );
}

fn draw_dock(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let mut spans = vec![Span::raw(" ")];
    for (i, view) in View::ALL.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, view.label());
        if *view == app.view {
            spans.push(Span::styled(
                label,
                Style::default().fg(th.accent).bg(th.highlight_bg).bold(),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(th.text_dim)));
        }
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let icon = match app.playback.phase() {
        Phase::Playing => "▶",
        Phase::Paused => "⏸",
        Phase::Loading => "◌",
        Phase::Idle => "○",
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}  {} ", icon, app.status),
            Style::default().fg(th.text_dim),
        )))
        .style(Style::default().bg(th.surface_light)),
        area,
    );
}

// ── Home ───────────────────────────────────────────────────────────

fn draw_home(f: &mut Frame, area: Rect, app: &mut App) {
    let wide = area.width >= 80;
    if wide {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(36), Constraint::Length(44)])
            .split(area);
        draw_timer(f, cols[0], app);
        draw_projects(f, cols[1], app);
    } else {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(4)])
            .split(area);
        draw_timer(f, rows[0], app);
        draw_projects(f, rows[1], app);
    }
}

fn draw_timer(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let session = app.focus.session();
    let block = panel(" Focus ".into(), th, session.is_running());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut modes = vec![Span::raw(" ")];
    for (i, mode) in TimerMode::ALL.iter().enumerate() {
        if i > 0 {
            modes.push(Span::styled(" · ", Style::default().fg(th.dim)));
        }
        let style = if *mode == session.mode() {
            Style::default().fg(th.accent).bold()
        } else {
            Style::default().fg(th.text_dim)
        };
        modes.push(Span::styled(mode.label().to_string(), style));
    }

    let state = if session.is_running() {
        Span::styled("● running", Style::default().fg(th.green))
    } else if session.session_start().is_some() {
        Span::styled("⏸ paused", Style::default().fg(th.yellow))
    } else {
        Span::styled("○ ready", Style::default().fg(th.dim))
    };

    let project = match app.focus.active_project() {
        Some(p) => Line::from(vec![
            Span::styled("Project  ", Style::default().fg(th.dim)),
            Span::styled(p.name.clone(), Style::default().fg(th.text).bold()),
        ]),
        None => Line::from(Span::styled(
            "No project selected",
            Style::default().fg(th.dim).italic(),
        )),
    };

    let bar_width = inner.width.saturating_sub(4) as usize;
    let mut bar = vec![Span::raw("  ")];
    bar.extend(bar_spans(session.progress(), bar_width, th));

    let lines = vec![
        Line::from(modes),
        Line::from(""),
        Line::from(Span::styled(
            format_clock(session.time_left()),
            Style::default().fg(th.text).bold(),
        ))
        .alignment(Alignment::Center),
        Line::from(Span::styled(
            session.mode().caption().to_string(),
            Style::default().fg(th.text_dim),
        ))
        .alignment(Alignment::Center),
        Line::from(state).alignment(Alignment::Center),
        Line::from(""),
        Line::from(bar),
        Line::from(""),
        project.alignment(Alignment::Center),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_projects(f: &mut Frame, area: Rect, app: &mut App) {
    let th = app.theme;
    let projects = app.focus.projects();
    let title = format!(
        " Projects ({}) · {} ",
        projects.len(),
        format_total(app.focus.total_time())
    );
    let block = panel(title, &th, false);

    if projects.is_empty() {
        f.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  No projects yet.",
                    Style::default().fg(th.dim),
                )),
                Line::from(Span::styled(
                    "  Press a to create one.",
                    Style::default().fg(th.dim),
                )),
            ])
            .block(block),
            area,
        );
        return;
    }

    let active = app.focus.active_project().map(|p| p.id.clone());
    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = projects
        .iter()
        .map(|p| {
            let is_active = active.as_deref() == Some(p.id.as_str());
            let marker = if is_active { "★ " } else { "  " };
            let name_style = if is_active {
                Style::default().fg(th.green).bold()
            } else {
                Style::default().fg(th.text)
            };
            let s = &p.custom_settings;
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, name_style),
                    Span::styled(truncate(&p.name, width.saturating_sub(2)), name_style),
                ]),
                Line::from(Span::styled(
                    format!("  {}", truncate(&p.goals, width.saturating_sub(2))),
                    Style::default().fg(th.text_dim).italic(),
                )),
                Line::from(vec![
                    Span::styled(
                        format!("  ● {} ", p.pomodoros_completed),
                        Style::default().fg(th.glow),
                    ),
                    Span::styled(
                        format!(
                            " {}m · {}m · {}m ",
                            s.pomodoro / 60,
                            s.short_break / 60,
                            s.long_break / 60
                        ),
                        Style::default().fg(th.dim),
                    ),
                    Span::styled(format_total(p.total_time), Style::default().fg(th.text_dim)),
                ]),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(th.highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸");
    f.render_stateful_widget(list, area, &mut app.project_list_state);
}

fn draw_project_form(f: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let th = &app.theme;
    let height = 10 + form.errors.len() as u16;
    let rect = popup(area, 56, height);
    f.render_widget(Clear, rect);

    let title = if form.editing.is_some() {
        " Edit Project "
    } else {
        " New Project "
    };
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(th.accent).bold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.accent))
        .style(Style::default().bg(th.surface));
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = field == form.field;
        let cursor = if focused { "▏" } else { "" };
        let label_style = if focused {
            Style::default().fg(th.accent).bold()
        } else {
            Style::default().fg(th.text_dim)
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<18}", field.label()), label_style),
            Span::styled(
                format!("{}{}", form.value(field), cursor),
                Style::default().fg(th.text),
            ),
        ]));
    }
    lines.push(Line::from(""));
    for err in &form.errors {
        lines.push(Line::from(Span::styled(
            format!(" • {err}"),
            Style::default().fg(th.red),
        )));
    }
    lines.push(Line::from(Span::styled(
        " Tab next field · Enter save · Esc cancel",
        Style::default().fg(th.dim),
    )));
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm_overlay(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let name = app
        .confirm_delete
        .as_deref()
        .and_then(|id| app.focus.projects().iter().find(|p| p.id == id))
        .map(|p| p.name.clone())
        .unwrap_or_default();
    let rect = popup(area, 48, 5);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .title(Span::styled(" Delete Project ", Style::default().fg(th.red).bold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.red))
        .style(Style::default().bg(th.surface));
    let lines = vec![
        Line::from(Span::styled(
            format!(" Delete \"{}\"?", truncate(&name, 30)),
            Style::default().fg(th.text),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y", Style::default().fg(th.red).bold()),
            Span::styled(" delete   ", Style::default().fg(th.text_dim)),
            Span::styled("n", Style::default().fg(th.accent).bold()),
            Span::styled(" keep", Style::default().fg(th.text_dim)),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

// ── Playlist ───────────────────────────────────────────────────────

fn draw_playlist(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(4),
        ])
        .horizontal_margin(1)
        .split(area);

    draw_now_playing(f, chunks[0], app);
    draw_progress_bar(f, chunks[1], app);
    draw_controls(f, chunks[2], app);
    draw_queue(f, chunks[3], app);
}

fn draw_now_playing(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.border))
        .style(Style::default().bg(th.surface));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let phase = app.playback.phase();
    let Some(song) = app.playback.current_song() else {
        let msg = if phase == Phase::Loading {
            "Loading songs..."
        } else {
            "No songs. Press a to add one."
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(msg, Style::default().fg(th.dim)))),
            inner,
        );
        return;
    };

    let width = inner.width as usize;
    let (state, color) = match phase {
        Phase::Playing => ("▶ Playing", th.green),
        _ => ("⏸ Paused", th.yellow),
    };
    let lines = vec![
        Line::from(Span::styled(
            truncate(&song.title, width),
            Style::default().fg(th.text).bold(),
        )),
        Line::from(Span::styled(
            truncate(&song.artist, width),
            Style::default().fg(th.text_dim),
        )),
        Line::from(Span::styled(
            truncate(&song.thumbnail, width),
            Style::default().fg(th.dim),
        )),
        Line::from(Span::styled(state, Style::default().fg(color))),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_progress_bar(f: &mut Frame, area: Rect, app: &mut App) {
    app.progress_bar_area = None;
    let th = &app.theme;
    let duration = app.playback.duration();
    let position = app.playback.current_time();

    if duration <= 0.0 {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "  ╌╌╌ no track ╌╌╌",
                Style::default().fg(th.dim),
            ))),
            area,
        );
        return;
    }

    let pos_str = format_time(position);
    let dur_str = format_time(duration);
    let bar_width =
        area.width.saturating_sub(pos_str.len() as u16 + dur_str.len() as u16 + 6) as usize;

    let label = format!("  {} ", pos_str);
    let bar_x = area.x + label.len() as u16;

    let mut spans = vec![Span::styled(label, Style::default().fg(th.text_dim))];
    spans.extend(bar_spans(position / duration, bar_width, th));
    spans.push(Span::styled(
        format!(" {} ", dur_str),
        Style::default().fg(th.text_dim),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);

    // Only the bar cells are clickable, not the time labels.
    app.progress_bar_area = Some(Rect::new(bar_x, area.y, bar_width as u16, 1));
}

fn draw_controls(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let mut spans = vec![Span::raw("  ")];

    if app.playback.shuffle() {
        spans.push(Span::styled("⇆ On ", Style::default().fg(th.green).bold()));
    } else {
        spans.push(Span::styled("⇆ Off ", Style::default().fg(th.dim)));
    }
    spans.push(Span::raw("   "));

    match app.playback.repeat() {
        RepeatMode::All => spans.push(Span::styled("↻ All ", Style::default().fg(th.green).bold())),
        RepeatMode::One => spans.push(Span::styled("↻ One ", Style::default().fg(th.yellow).bold())),
        RepeatMode::Off => spans.push(Span::styled("↻ Off ", Style::default().fg(th.dim))),
    }

    if app.pending_adds > 0 {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("◌ adding {}", app.pending_adds),
            Style::default().fg(th.text_dim),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_queue(f: &mut Frame, area: Rect, app: &mut App) {
    let th = app.theme;
    let title = format!(" Queue ({}) ", app.playback.queue().len());
    let block = panel(title, &th, true);

    if app.playback.queue().is_empty() {
        let msg = if app.playback.phase() == Phase::Loading {
            "  Loading songs..."
        } else {
            "  Nothing here yet"
        };
        f.render_widget(
            Paragraph::new(Span::styled(msg, Style::default().fg(th.dim))).block(block),
            area,
        );
        return;
    }

    let current = app.playback.current_song().map(|s| s.id);
    let playing = app.playback.is_playing();
    let max_width = area.width.saturating_sub(8) as usize;
    let items: Vec<ListItem> = app
        .playback
        .queue()
        .iter()
        .map(|song| {
            let is_current = Some(song.id) == current;
            let prefix = match (is_current, playing) {
                (true, true) => "▶ ",
                (true, false) => "⏸ ",
                _ => "  ",
            };
            // The live length is only known for the loaded song.
            let length = if is_current && app.playback.duration() > 0.0 {
                format_time(app.playback.duration())
            } else {
                song.duration.clone()
            };
            let name_max = max_width
                .saturating_sub(prefix.len() + song.artist.chars().count() + length.len() + 4);
            let style = if is_current {
                Style::default().fg(th.green)
            } else {
                Style::default().fg(th.text)
            };
            let dim = if is_current {
                Style::default().fg(th.green)
            } else {
                Style::default().fg(th.text_dim)
            };
            ListItem::new(Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(truncate(&song.title, name_max), style),
                Span::raw("  "),
                Span::styled(song.artist.clone(), dim),
                Span::styled(format!("  {length}"), dim),
            ]))
        })
        .collect();

    let total = items.len();
    let inner_height = area.height.saturating_sub(2) as usize;
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(th.highlight_bg)
                .fg(th.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    f.render_stateful_widget(list, area, &mut app.song_list_state);

    if total > inner_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(Style::default().fg(th.accent))
            .track_style(Style::default().fg(th.border));
        let mut state =
            ScrollbarState::new(total).position(app.song_list_state.selected().unwrap_or(0));
        let scroll_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(2),
        };
        f.render_stateful_widget(scrollbar, scroll_area, &mut state);
    }
}

fn draw_add_song_overlay(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let input = app.add_song.as_deref().unwrap_or_default();
    let rect = popup(area, 64, 5);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .title(Span::styled(" Add Song ", Style::default().fg(th.accent).bold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.accent))
        .style(Style::default().bg(th.surface));
    let lines = vec![
        Line::from(vec![
            Span::styled(" URL or id: ", Style::default().fg(th.text_dim)),
            Span::styled(format!("{input}▏"), Style::default().fg(th.text)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " Enter add · Esc cancel",
            Style::default().fg(th.dim),
        )),
    ];
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

// ── Poems, affirmations, goodbye ───────────────────────────────────

fn draw_poems(f: &mut Frame, area: Rect, app: &mut App) {
    let th = app.theme;
    let title = format!(" Poems ({}) ", app.poems.len());
    let block = panel(title, &th, true);

    if app.poems.is_empty() {
        let dir = app.config.poems_dir();
        f.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled("  No poems yet.", Style::default().fg(th.dim))),
                Line::from(Span::styled(
                    format!("  Drop .md files into {}", dir.display()),
                    Style::default().fg(th.dim),
                )),
            ])
            .block(block),
            area,
        );
        return;
    }

    let width = area.width.saturating_sub(8) as usize;
    let items: Vec<ListItem> = app
        .poems
        .iter()
        .map(|poem| {
            let first = poem.text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{:>3}. ", poem.id), Style::default().fg(th.dim)),
                    Span::styled(truncate(&poem.title, width), Style::default().fg(th.text).bold()),
                ]),
                Line::from(Span::styled(
                    format!("     {}", truncate(first.trim(), width)),
                    Style::default().fg(th.text_dim).italic(),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(th.highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸");
    f.render_stateful_widget(list, area, &mut app.poem_list_state);
}

fn draw_poem_overlay(f: &mut Frame, area: Rect, app: &App) {
    let Some(poem) = app.open_poem.and_then(|i| app.poems.get(i)) else {
        return;
    };
    let th = &app.theme;
    let rect = popup(area, 70, area.height.saturating_sub(4));
    f.render_widget(Clear, rect);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", poem.title),
            Style::default().fg(th.accent).bold(),
        ))
        .title_bottom(Span::styled(
            " j/k scroll · Esc close ",
            Style::default().fg(th.dim),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.accent))
        .style(Style::default().bg(th.surface));

    let lines: Vec<Line> = poem
        .text
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(th.text))))
        .collect();
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((app.poem_scroll, 0)),
        rect,
    );
}

fn draw_affirmation(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let a = app.affirmation;
    let rect = popup(area, 72, 14);
    let block = panel(" Today's Affirmation ".into(), th, true);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Soft daily words of love, just for you",
            Style::default().fg(th.text_dim),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("\"{}\"", a.text),
            Style::default().fg(th.text).bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("── ", Style::default().fg(th.yellow)),
            Span::styled("♥", Style::default().fg(th.glow)),
            Span::styled(" ──", Style::default().fg(th.yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled(a.subtext, Style::default().fg(th.text_dim))),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}

fn draw_goodbye(f: &mut Frame, area: Rect, app: &App) {
    let th = &app.theme;
    let rect = popup(area, 64, 16);
    let mut lines = vec![
        Line::from(Span::styled("A FINAL PAGE", Style::default().fg(th.dim))),
        Line::from(""),
        Line::from(Span::styled(
            "This Is For You",
            Style::default().fg(th.text).bold(),
        )),
        Line::from(""),
    ];
    if app.goodbye_revealed {
        lines.extend([
            Line::from(""),
            Line::from(Span::styled(
                "This place exists because you mattered to me",
                Style::default().fg(th.text_dim),
            )),
            Line::from(Span::styled(
                "in a way I wanted to preserve.",
                Style::default().fg(th.text_dim),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "\"Some things are meant to be felt, not held.\"",
                Style::default().fg(th.accent).italic(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Thank you for being part of my story. I love you.",
                Style::default().fg(th.text),
            )),
            Line::from(Span::styled("Goodbye.", Style::default().fg(th.text))),
        ]);
    }
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}

// ── Help ───────────────────────────────────────────────────────────

fn draw_help_overlay(f: &mut Frame, area: Rect, theme: &Theme) {
    let th = theme;
    let rect = popup(area, 52, 36);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Span::styled(
            " Keyboard Shortcuts ",
            Style::default().fg(th.accent).bold(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.accent))
        .style(Style::default().bg(th.surface));
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let sections: Vec<(&str, Vec<(&str, &str)>)> = vec![
        (
            "GLOBAL",
            vec![
                ("1-5", "Switch view"),
                ("Tab / S-Tab", "Next / previous view"),
                ("j / k / ↑↓", "Move up / down"),
                ("g / G", "Top / Bottom"),
                ("m", "Mute / unmute ambience"),
                ("t", "Cycle theme"),
                ("?", "Toggle this help"),
                ("q", "Quit"),
            ],
        ),
        (
            "HOME",
            vec![
                ("Space", "Start / pause timer"),
                ("r", "Reset timer"),
                ("w / s / l", "Pomodoro / short / long break"),
                ("Enter", "Work on selected project"),
                ("a / e / d", "Add / edit / delete project"),
            ],
        ),
        (
            "PLAYLIST",
            vec![
                ("Space", "Play / pause"),
                ("Enter", "Play selected song"),
                ("n  p", "Next / previous"),
                ("x", "Shuffle"),
                ("v", "Repeat (off → all → one)"),
                ("← / →", "Seek back / forward 10s"),
                ("a", "Add a song by URL or id"),
            ],
        ),
        ("POEMS", vec![("Enter", "Read poem"), ("Esc", "Close poem")]),
    ];

    let mut lines: Vec<Line> = Vec::new();
    for (i, (title, keys)) in sections.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            *title,
            Style::default().fg(th.accent).bold(),
        )));
        for (key, desc) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<14}", key), Style::default().fg(th.text).bold()),
                Span::styled(*desc, Style::default().fg(th.text_dim)),
            ]));
        }
    }
    f.render_widget(Paragraph::new(lines), inner);
}
