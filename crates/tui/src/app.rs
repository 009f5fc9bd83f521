use std::{
    cmp, io,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use arcade_core::{
    catalog::Catalog,
    chat::{respond_guarded, ChatSession, GeminiResponder, ResponderError, Role, SubmitRejected},
    leaderboard::{format_score, rank_tier, Leaderboard, RankTier},
    models::Game,
    view::{NavOrigin, NavTarget, View, ViewController},
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::widgets::{wrap_text, TextInput, TypingText};

const TICK_RATE: Duration = Duration::from_millis(100);
/// Terminals narrower than this get the compact header with a drop-down menu.
const COMPACT_WIDTH: u16 = 80;
const MAX_NAME_LEN: usize = 32;
const MAX_SCORE_LEN: usize = 13;
const MAX_CHAT_LEN: usize = 500;
const CARD_HEIGHT: u16 = 8;

const HEADLINE: &str = "LEVEL UP YOUR CHRISTMAS";
const SCHOOL: &str = "EXCEL CHERRY FORTE GROUP OF SCHOOLS";
const WELCOME: &str = "Welcome to the 3D project of the Programming/Coding class of the students of Excel Cherry Forte Group of Schools.";
const MENU_ITEMS: [(&str, NavTarget); 3] = [
    ("Home", NavTarget::Home),
    ("Games", NavTarget::Games),
    ("Leaderboards", NavTarget::Leaderboards),
];
const HERO_BUTTONS: [&str; 2] = ["▶ PLAY NOW", "✚ DAILY LOOT"];
const STATS: [(&str, &str); 3] = [("4K", "Resolution"), ("120", "FPS"), ("∞", "Cheer")];

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    neon_red: Color,
    neon_green: Color,
    muted: Color,
    selection_bg: Color,
    on_accent: Color,
    gold: Color,
    silver: Color,
    bronze: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            neon_red: Color::Rgb(255, 0, 60),
            neon_green: Color::Rgb(0, 255, 102),
            muted: Color::DarkGray,
            selection_bg: Color::Rgb(40, 40, 56),
            on_accent: Color::Black,
            gold: Color::Rgb(250, 204, 21),
            silver: Color::Rgb(209, 213, 219),
            bronze: Color::Rgb(217, 119, 6),
        }
    }
}

impl Theme {
    fn rank_color(&self, tier: RankTier) -> Color {
        match tier {
            RankTier::Gold => self.gold,
            RankTier::Silver => self.silver,
            RankTier::Bronze => self.bronze,
            RankTier::Standard => self.neon_green,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalFocus {
    Name,
    Score,
    Rows,
}

impl ModalFocus {
    fn next(self) -> Self {
        match self {
            ModalFocus::Name => ModalFocus::Score,
            ModalFocus::Score => ModalFocus::Rows,
            ModalFocus::Rows => ModalFocus::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            ModalFocus::Name => ModalFocus::Rows,
            ModalFocus::Score => ModalFocus::Name,
            ModalFocus::Rows => ModalFocus::Score,
        }
    }
}

struct LeaderboardModal {
    name: TextInput,
    score: TextInput,
    focus: ModalFocus,
    selected: usize,
}

impl LeaderboardModal {
    fn new() -> Self {
        Self {
            name: TextInput::new(MAX_NAME_LEN),
            score: TextInput::new(MAX_SCORE_LEN),
            focus: ModalFocus::Name,
            selected: 0,
        }
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            ModalFocus::Name => Some(&mut self.name),
            ModalFocus::Score => Some(&mut self.score),
            ModalFocus::Rows => None,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    ChatReply(Result<String, ResponderError>),
}

/// High-level application state for the arcade terminal front end.
pub struct ArcadeApp {
    view: ViewController,
    leaderboard: Leaderboard,
    modal: LeaderboardModal,
    chat: ChatSession,
    chat_input: TextInput,
    responder: Arc<GeminiResponder>,
    headline: TypingText,
    state: UiState,
    theme: Theme,
    event_tx: Option<mpsc::Sender<AppEvent>>,
}

impl ArcadeApp {
    pub fn new(leaderboard: Leaderboard, responder: GeminiResponder) -> Self {
        Self {
            view: ViewController::new(),
            leaderboard,
            modal: LeaderboardModal::new(),
            chat: ChatSession::new(),
            chat_input: TextInput::new(MAX_CHAT_LEN),
            responder: Arc::new(responder),
            headline: TypingText::new(HEADLINE),
            state: UiState::default(),
            theme: Theme::default(),
            event_tx: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal).await;

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);
        self.headline.restart();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
        }
        info!("Exiting");
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.state.set_status(format!("Error: {err:#}"));
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.state.tick = self.state.tick.wrapping_add(1);
                true
            }
            Some(AppEvent::ChatReply(outcome)) => {
                let failed = outcome.is_err();
                if self.chat.resolve(outcome).is_some() {
                    let status = if failed {
                        "Cyber-Santa lost connection"
                    } else {
                        "Cyber-Santa replied"
                    };
                    self.state.set_status(status.to_string());
                }
                true
            }
            None => false,
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            _ => Ok(()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Ok(());
        }

        if self.view.leaderboard_open() {
            return self.handle_leaderboard_key(key);
        }
        if self.view.chat_open() {
            self.handle_chat_key(key);
            return Ok(());
        }
        if self.view.mobile_menu_open() && self.state.compact {
            self.handle_menu_key(key);
            return Ok(());
        }
        if self.state.mode == Mode::Filter {
            self.handle_filter_key(key);
            return Ok(());
        }
        if self.handle_global_shortcut(&key) {
            return Ok(());
        }

        match self.view.current_view() {
            View::Home => self.handle_home_key(key),
            View::Games => self.handle_games_key(key),
        }
        Ok(())
    }

    fn handle_global_shortcut(&mut self, key: &KeyEvent) -> bool {
        if !(key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT) {
            return false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.state.should_quit = true,
            KeyCode::Char('h') | KeyCode::Char('1') => {
                self.navigate(NavTarget::Home, NavOrigin::Header)
            }
            KeyCode::Char('g') | KeyCode::Char('2') => {
                self.navigate(NavTarget::Games, NavOrigin::Header)
            }
            KeyCode::Char('l') | KeyCode::Char('3') => {
                self.navigate(NavTarget::Leaderboards, NavOrigin::Header)
            }
            KeyCode::Char('c') => {
                self.view.toggle_chat();
                self.state.set_status("Chatting with Cyber-Santa".to_string());
            }
            KeyCode::Char('m') if self.state.compact => {
                self.view.toggle_mobile_menu();
                self.state.menu_cursor = 0;
            }
            _ => return false,
        }
        true
    }

    fn navigate(&mut self, target: NavTarget, origin: NavOrigin) {
        let before = self.view.current_view();
        self.view.navigate(target, origin);
        match target {
            NavTarget::Home => {
                if before != View::Home {
                    self.headline.restart();
                }
                self.state.set_status("Home".to_string());
            }
            NavTarget::Games => {
                self.state.mode = Mode::Browse;
                self.state.set_status("Pick a game with the arrow keys".to_string());
            }
            NavTarget::Leaderboards => {
                self.modal.focus = ModalFocus::Name;
                self.modal.selected = 0;
                self.state
                    .set_status(format!("{} scores on the board", self.leaderboard.len()));
            }
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('m') => self.view.close_mobile_menu(),
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.menu_cursor = self.state.menu_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.menu_cursor = cmp::min(self.state.menu_cursor + 1, MENU_ITEMS.len() - 1);
            }
            KeyCode::Enter => {
                let (_, target) = MENU_ITEMS[self.state.menu_cursor.min(MENU_ITEMS.len() - 1)];
                self.navigate(target, NavOrigin::MobileMenu);
            }
            _ => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.state.hero_cursor = (self.state.hero_cursor + 1) % HERO_BUTTONS.len();
            }
            KeyCode::Enter => {
                if self.state.hero_cursor == 0 {
                    self.navigate(NavTarget::Games, NavOrigin::Hero);
                } else {
                    self.state
                        .set_status("Daily loot drops at midnight. Ho ho hold on!".to_string());
                }
            }
            _ => {}
        }
    }

    fn handle_games_key(&mut self, key: KeyEvent) {
        let total = Catalog::games_matching(&self.state.filter).len();
        let columns = self.state.grid_columns.max(1) as isize;
        match key.code {
            KeyCode::Left => self.state.move_game_cursor(-1, total),
            KeyCode::Right => self.state.move_game_cursor(1, total),
            KeyCode::Up | KeyCode::Char('k') => self.state.move_game_cursor(-columns, total),
            KeyCode::Down | KeyCode::Char('j') => self.state.move_game_cursor(columns, total),
            KeyCode::Char('/') => {
                self.state.mode = Mode::Filter;
                self.state.set_status("Type to filter games".to_string());
            }
            KeyCode::Esc if !self.state.filter.is_empty() => {
                self.state.filter.clear();
                self.state.game_cursor = 0;
            }
            KeyCode::Enter => {
                if let Some(game) = self.selected_game() {
                    info!(game_id = %game.id, title = %game.title, "Game launch requested");
                    self.state.set_status(format!(
                        "{} ({}) is warming up its servers. Check back soon!",
                        game.title, game.price
                    ));
                }
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.filter.clear();
                self.state.mode = Mode::Browse;
            }
            KeyCode::Enter => self.state.mode = Mode::Browse,
            KeyCode::Backspace => {
                self.state.filter.pop();
            }
            KeyCode::Char(ch) => self.state.filter.push(ch),
            _ => {}
        }
        self.state.game_cursor = 0;
        let total = Catalog::games_matching(&self.state.filter).len();
        self.state
            .set_status(format!("Filter: {} ({total} games)", self.state.filter));
    }

    fn selected_game(&self) -> Option<&'static Game> {
        Catalog::games_matching(&self.state.filter)
            .get(self.state.game_cursor)
            .copied()
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.view.toggle_chat(),
            KeyCode::Enter => self.send_chat(),
            KeyCode::Left => self.chat_input.move_cursor(-1),
            KeyCode::Right => self.chat_input.move_cursor(1),
            KeyCode::Home => self.chat_input.move_home(),
            KeyCode::End => self.chat_input.move_end(),
            KeyCode::Backspace => self.chat_input.backspace(),
            KeyCode::Delete => self.chat_input.delete(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.chat_input.insert(ch);
                }
            }
            _ => {}
        }
    }

    fn send_chat(&mut self) {
        match self.chat.submit(self.chat_input.value()) {
            Ok(request) => {
                self.chat_input.clear();
                self.state.set_status("Cyber-Santa is typing...".to_string());
                self.dispatch_chat(request);
            }
            Err(SubmitRejected::Busy) => {
                self.state.set_status(SubmitRejected::Busy.to_string());
            }
            Err(SubmitRejected::Empty) => {}
        }
    }

    fn dispatch_chat(&mut self, request: arcade_core::chat::ChatRequest) {
        let Some(sender) = self.event_tx.clone() else {
            self.chat.resolve(Err(ResponderError::Aborted(
                "event loop is not running".to_string(),
            )));
            return;
        };
        let responder = Arc::clone(&self.responder);
        tokio::spawn(async move {
            let outcome = respond_guarded(responder, request).await;
            if sender.send(AppEvent::ChatReply(outcome)).await.is_err() {
                debug!("Dropping chat reply; UI has shut down");
            }
        });
    }

    fn handle_leaderboard_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.view.close_leaderboard();
                return Ok(());
            }
            KeyCode::Tab => {
                self.modal.focus = self.modal.focus.next();
                return Ok(());
            }
            KeyCode::BackTab => {
                self.modal.focus = self.modal.focus.previous();
                return Ok(());
            }
            _ => {}
        }

        if self.modal.focus == ModalFocus::Rows {
            let rows = self.leaderboard.len();
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.modal.selected = self.modal.selected.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.modal.selected =
                        cmp::min(self.modal.selected + 1, rows.saturating_sub(1));
                }
                KeyCode::Delete | KeyCode::Char('d') | KeyCode::Char('x') => {
                    self.remove_selected_entry()?;
                }
                _ => {}
            }
            return Ok(());
        }

        if key.code == KeyCode::Enter {
            return self.add_leaderboard_entry();
        }

        let score_focused = self.modal.focus == ModalFocus::Score;
        if let Some(input) = self.modal.focused_input() {
            match key.code {
                KeyCode::Left => input.move_cursor(-1),
                KeyCode::Right => input.move_cursor(1),
                KeyCode::Home => input.move_home(),
                KeyCode::End => input.move_end(),
                KeyCode::Backspace => input.backspace(),
                KeyCode::Delete => input.delete(),
                KeyCode::Char(ch) => {
                    let modifiers_ok =
                        key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT;
                    let allowed = !score_focused || ch.is_ascii_digit() || ch == ',';
                    if modifiers_ok && allowed {
                        input.insert(ch);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn add_leaderboard_entry(&mut self) -> Result<()> {
        if self.modal.name.is_blank() {
            return Ok(());
        }
        let name = self.modal.name.take();
        let score = self.modal.score.take();
        self.modal.focus = ModalFocus::Name;

        let name = name.trim().to_string();
        let entries = self.leaderboard.add(&name, &score)?;
        if let Some((rank, entry)) = entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.name == name)
        {
            self.modal.selected = rank;
            self.state.set_status(format!(
                "{} posted {} (rank {})",
                entry.name,
                format_score(entry.score),
                rank + 1
            ));
        }
        Ok(())
    }

    fn remove_selected_entry(&mut self) -> Result<()> {
        let index = self.modal.selected;
        let name = self
            .leaderboard
            .entries()
            .get(index)
            .map(|entry| entry.name.clone());
        let remaining = self.leaderboard.remove(index)?.len();
        self.modal.selected = cmp::min(self.modal.selected, remaining.saturating_sub(1));
        if let Some(name) = name {
            self.state.set_status(format!("Removed {name}"));
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        self.state.compact = area.width < COMPACT_WIDTH;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        match self.view.current_view() {
            View::Home => self.render_home(frame, chunks[1]),
            View::Games => self.render_games(frame, chunks[1]),
        }
        self.render_status(frame, chunks[2]);

        if self.state.compact && self.view.mobile_menu_open() {
            self.render_mobile_menu(frame, chunks[0]);
        }
        if self.view.chat_open() {
            self.render_chat(frame, chunks[1]);
        } else {
            self.render_chat_launcher(frame, chunks[1]);
        }
        if self.view.leaderboard_open() {
            self.render_leaderboard(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(self.theme.muted));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(40)])
            .split(inner);

        let brand = Paragraph::new(vec![
            Line::from(vec![
                Span::styled("🎮 ", Style::default().fg(self.theme.neon_red)),
                Span::styled(
                    "EXCEL CHERRY FORTE",
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                "   Coding",
                Style::default().fg(self.theme.neon_green),
            )),
        ]);
        frame.render_widget(brand, columns[0]);

        if self.state.compact {
            let icon = if self.view.mobile_menu_open() { "✕" } else { "☰" };
            let toggle = Paragraph::new(Line::from(vec![
                Span::styled("m ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(icon),
            ]))
            .alignment(Alignment::Right);
            frame.render_widget(toggle, columns[1]);
        } else {
            let selected = match self.view.current_view() {
                View::Home => 0,
                View::Games => 1,
            };
            let tabs = Tabs::new(MENU_ITEMS.iter().map(|(label, _)| *label))
                .select(selected)
                .style(Style::default().fg(self.theme.silver))
                .highlight_style(
                    Style::default()
                        .fg(self.theme.neon_red)
                        .bg(self.theme.selection_bg)
                        .add_modifier(Modifier::BOLD),
                )
                .divider(" ");
            frame.render_widget(tabs, columns[1]);
        }
    }

    fn render_mobile_menu(&self, frame: &mut Frame, header: Rect) {
        let frame_area = frame.size();
        let width = 22.min(frame_area.width);
        let height = (MENU_ITEMS.len() as u16 + 2).min(frame_area.height.saturating_sub(header.bottom()));
        let area = Rect::new(
            frame_area.right().saturating_sub(width),
            header.bottom(),
            width,
            height,
        );
        frame.render_widget(Clear, area);

        let items: Vec<ListItem> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(idx, (label, _))| {
                if idx == self.state.menu_cursor {
                    ListItem::new(Line::from(Span::styled(
                        format!("▶ {label}"),
                        Style::default()
                            .fg(self.theme.neon_red)
                            .add_modifier(Modifier::BOLD),
                    )))
                } else {
                    ListItem::new(Line::from(format!("  {label}")))
                }
            })
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Menu"));
        frame.render_widget(list, area);
    }

    fn render_home(&self, frame: &mut Frame, area: Rect) {
        let width = 84.min(area.width);
        let height = 17.min(area.height);
        let hero = centered_rect(width, height, area);

        let glow = if (self.state.tick / 10) % 2 == 0 {
            Modifier::BOLD
        } else {
            Modifier::BOLD | Modifier::REVERSED
        };

        let buttons: Vec<Span> = HERO_BUTTONS
            .iter()
            .enumerate()
            .flat_map(|(idx, label)| {
                let style = if idx == self.state.hero_cursor {
                    let bg = if idx == 0 {
                        self.theme.neon_red
                    } else {
                        self.theme.neon_green
                    };
                    Style::default()
                        .fg(self.theme.on_accent)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD)
                } else if idx == 0 {
                    Style::default().fg(self.theme.neon_red)
                } else {
                    Style::default().fg(self.theme.neon_green)
                };
                [Span::styled(format!("  {label}  "), style), Span::raw("   ")]
            })
            .collect();

        let stats: Vec<Span> = STATS
            .iter()
            .enumerate()
            .flat_map(|(idx, (value, label))| {
                let mut spans = Vec::new();
                if idx > 0 {
                    spans.push(Span::styled("  │  ", Style::default().fg(self.theme.muted)));
                }
                spans.push(Span::styled(
                    value.to_string(),
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(
                    format!(" {}", label.to_uppercase()),
                    Style::default().fg(self.theme.muted),
                ));
                spans
            })
            .collect();

        let now = Instant::now();
        let caret = if self.headline.is_complete_at(now) && (self.state.tick / 5) % 2 == 1 {
            " "
        } else {
            "▌"
        };
        let lines = vec![
            Line::from(vec![
                Span::styled(
                    self.headline.visible_at(now),
                    Style::default()
                        .fg(self.theme.neon_green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(caret, Style::default().fg(self.theme.neon_green)),
            ]),
            Line::from(""),
            Line::from(Span::styled("WITH", Style::default().fg(self.theme.primary_fg))),
            Line::from(""),
            Line::from(Span::styled(
                SCHOOL,
                Style::default().fg(self.theme.neon_red).add_modifier(glow),
            )),
            Line::from(""),
            Line::from(Span::styled(WELCOME, Style::default().fg(self.theme.silver))),
            Line::from(""),
            Line::from(buttons),
            Line::from(""),
            Line::from(stats),
        ];

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.muted)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, hero);
    }

    fn render_games(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(CARD_HEIGHT)])
            .split(area);

        let mut heading = vec![
            Span::styled("❄ ", Style::default().fg(self.theme.neon_green)),
            Span::styled(
                "Excel Cherry Forte Arcade",
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if self.state.mode == Mode::Filter || !self.state.filter.is_empty() {
            heading.push(Span::styled(
                format!("   / {}", self.state.filter),
                Style::default().fg(self.theme.neon_red),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(heading)), chunks[0]);

        let games = Catalog::games_matching(&self.state.filter);
        let grid = chunks[1];
        if games.is_empty() {
            let empty = Paragraph::new(format!("No games match \"{}\"", self.state.filter))
                .style(Style::default().fg(self.theme.muted))
                .alignment(Alignment::Center);
            frame.render_widget(empty, grid);
            return;
        }

        let columns = grid_columns_for(grid.width);
        self.state.grid_columns = columns;
        self.state.game_cursor = self.state.game_cursor.min(games.len() - 1);

        let visible_rows = cmp::max(grid.height / CARD_HEIGHT, 1) as usize;
        let cursor_row = self.state.game_cursor / columns;
        let first_row = (cursor_row + 1).saturating_sub(visible_rows);

        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
            .split(grid);
        for (slot, row_area) in row_areas.iter().enumerate() {
            let row = first_row + slot;
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
                .split(*row_area);
            for (col, cell) in cells.iter().enumerate() {
                let index = row * columns + col;
                if let Some(game) = games.get(index) {
                    self.render_game_card(frame, *cell, game, index == self.state.game_cursor);
                }
            }
        }
    }

    fn render_game_card(&self, frame: &mut Frame, area: Rect, game: &Game, selected: bool) {
        let border = if selected {
            Style::default().fg(self.theme.neon_red)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let play_style = if selected {
            Style::default()
                .fg(self.theme.primary_fg)
                .bg(self.theme.neon_red)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.primary_fg).bg(self.theme.selection_bg)
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(
                    format!(" {} ", game.genre),
                    Style::default()
                        .fg(self.theme.on_accent)
                        .bg(self.theme.neon_green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(game.rating_label(), Style::default().fg(self.theme.gold)),
            ]),
            Line::from(Span::styled(
                game.description.clone(),
                Style::default().fg(self.theme.silver),
            )),
            Line::from(vec![
                Span::styled(
                    game.price.clone(),
                    Style::default()
                        .fg(self.theme.neon_green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("   "),
                Span::styled(" 🎮 Play ", play_style),
            ]),
        ];

        let card = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(Span::styled(
                        game.title.clone(),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    )),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(card, area);
    }

    fn chat_area(area: Rect) -> Rect {
        let width = 50.min(area.width);
        let height = 22.min(area.height);
        Rect::new(
            area.right().saturating_sub(width),
            area.bottom().saturating_sub(height),
            width,
            height,
        )
    }

    fn render_chat_launcher(&self, frame: &mut Frame, area: Rect) {
        let width = 22.min(area.width);
        let height = 3.min(area.height);
        let launcher = Rect::new(
            area.right().saturating_sub(width),
            area.bottom().saturating_sub(height),
            width,
            height,
        );
        frame.render_widget(Clear, launcher);
        let badge = Paragraph::new(Line::from(vec![
            Span::styled("c ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                "🤖 Cyber Santa",
                Style::default().fg(self.theme.primary_fg),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.neon_red)),
        );
        frame.render_widget(badge, launcher);
    }

    fn render_chat(&self, frame: &mut Frame, area: Rect) {
        let panel = Self::chat_area(area);
        frame.render_widget(Clear, panel);

        let title = Line::from(vec![
            Span::styled(
                " Cyber Santa AI ",
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("● Online ", Style::default().fg(self.theme.neon_green)),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.neon_red))
            .title(title);
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(inner);

        let bubble_width = cmp::max(chunks[0].width as usize * 4 / 5, 8);
        let mut lines: Vec<Line> = Vec::new();
        for message in self.chat.messages() {
            let (style, alignment) = match message.role {
                Role::User => (
                    Style::default().fg(self.theme.primary_fg).bg(self.theme.neon_red),
                    Alignment::Right,
                ),
                Role::Model => (
                    Style::default().fg(self.theme.silver).bg(self.theme.selection_bg),
                    Alignment::Left,
                ),
            };
            for wrapped in wrap_text(&message.text, bubble_width) {
                lines.push(Line::from(Span::styled(wrapped, style)).alignment(alignment));
            }
            lines.push(Line::from(""));
        }
        if self.chat.is_awaiting() {
            let dots = "● ".repeat((self.state.tick % 3) as usize + 1);
            lines.push(Line::from(Span::styled(
                dots,
                Style::default().fg(self.theme.neon_green),
            )));
        }

        let visible = chunks[0].height as usize;
        let skip = lines.len().saturating_sub(visible);
        let transcript = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>());
        frame.render_widget(transcript, chunks[0]);

        let input_line = if self.chat_input.value().is_empty() {
            Line::from(Span::styled(
                "Ask for game tips...",
                Style::default().fg(self.theme.muted),
            ))
        } else {
            Line::from(self.chat_input.value().to_string())
        };
        let send_style = if self.chat.is_awaiting() {
            Style::default().fg(self.theme.muted)
        } else {
            Style::default().fg(self.theme.neon_red)
        };
        let input = Paragraph::new(input_line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted))
                .title(Span::styled("Enter ➤ send  Esc ✕ close", send_style)),
        );
        frame.render_widget(input, chunks[1]);

        if !self.view.leaderboard_open() {
            let cursor_x = (chunks[1].x + 1 + self.chat_input.cursor() as u16)
                .min(chunks[1].right().saturating_sub(2));
            frame.set_cursor(cursor_x, chunks[1].y + 1);
        }
    }

    fn render_leaderboard(&self, frame: &mut Frame, area: Rect) {
        let width = 64.min(area.width.saturating_sub(2)).max(24.min(area.width));
        let height = 26.min(area.height.saturating_sub(2)).max(12.min(area.height));
        let modal = centered_rect(width, height, area);
        frame.render_widget(Clear, modal);

        let title = Line::from(vec![
            Span::styled(" 🏆 ", Style::default().fg(self.theme.gold)),
            Span::styled(
                "LEADERBOARD",
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" · TOP CYBER ELVES ", Style::default().fg(self.theme.neon_green)),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.neon_green))
            .title(title);
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(inner);

        self.render_leaderboard_rows(frame, chunks[0]);

        let inputs = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        let fields = [
            (&self.modal.name, ModalFocus::Name, "👤 Name / Alias", inputs[0]),
            (&self.modal.score, ModalFocus::Score, "# Score (Opt)", inputs[1]),
        ];
        for (input, focus, label, field_area) in fields {
            let focused = self.modal.focus == focus;
            let border = if focused {
                Style::default().fg(self.theme.neon_green)
            } else {
                Style::default().fg(self.theme.muted)
            };
            let paragraph = Paragraph::new(input.value().to_string()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(label),
            );
            frame.render_widget(paragraph, field_area);
            if focused {
                let cursor_x = (field_area.x + 1 + input.cursor() as u16)
                    .min(field_area.right().saturating_sub(2));
                frame.set_cursor(cursor_x, field_area.y + 1);
            }
        }

        let hint = Paragraph::new(vec![
            Line::from(Span::styled(
                "Leave score empty to auto-generate based on skill level.",
                Style::default().fg(self.theme.muted),
            )),
            Line::from(vec![
                Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" add  "),
                Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" focus  "),
                Span::styled("d", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" delete  "),
                Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" close"),
            ]),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(hint, chunks[2]);
    }

    fn render_leaderboard_rows(&self, frame: &mut Frame, area: Rect) {
        let rows_focused = self.modal.focus == ModalFocus::Rows;
        let border = if rows_focused {
            Style::default().fg(self.theme.neon_green)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let block = Block::default().borders(Borders::ALL).border_style(border);

        if self.leaderboard.is_empty() {
            let empty = Paragraph::new("No scores yet. Be the first!")
                .style(Style::default().fg(self.theme.muted))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let name_width = (area.width as usize).saturating_sub(20).max(4);
        let items: Vec<ListItem> = self
            .leaderboard
            .entries()
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let name: String = entry.name.chars().take(name_width).collect();
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>3}  ", idx + 1),
                        Style::default()
                            .fg(self.theme.rank_color(rank_tier(idx)))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{name:<name_width$}"),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" {:>10}", format_score(entry.score)),
                        Style::default().fg(self.theme.neon_green),
                    ),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(
            self.modal.selected.min(self.leaderboard.len().saturating_sub(1)),
        ));
        let highlight = if rows_focused {
            Style::default().bg(self.theme.selection_bg)
        } else {
            Style::default()
        };
        let list = List::new(items).block(block).highlight_style(highlight);
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.muted))
            .title("Status");
        let keys = if self.state.compact {
            "m menu · c chat · q quit"
        } else {
            "h home · g games · l leaderboards · c chat · / filter · q quit"
        };
        let paragraph = Paragraph::new(vec![
            Line::from(self.state.status.clone()),
            Line::from(Span::styled(keys, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    status: String,
    should_quit: bool,
    compact: bool,
    tick: u64,
    menu_cursor: usize,
    hero_cursor: usize,
    game_cursor: usize,
    grid_columns: usize,
    filter: String,
    mode: Mode,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: "Welcome to the Excel Cherry Forte arcade".to_string(),
            should_quit: false,
            compact: false,
            tick: 0,
            menu_cursor: 0,
            hero_cursor: 0,
            game_cursor: 0,
            grid_columns: 1,
            filter: String::new(),
            mode: Mode::Browse,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_game_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.game_cursor = 0;
            return;
        }
        let next = self.game_cursor as isize + delta;
        if (0..total as isize).contains(&next) {
            self.game_cursor = next as usize;
        }
    }
}

fn grid_columns_for(width: u16) -> usize {
    match width {
        w if w >= 120 => 3,
        w if w >= 70 => 2,
        _ => 1,
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::{config::AppConfig, storage::LocalStore};
    use crossterm::event::KeyEventState;
    use tempfile::{tempdir, TempDir};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn test_app() -> Result<(TempDir, ArcadeApp)> {
        let dir = tempdir()?;
        let leaderboard = Leaderboard::load(LocalStore::new(dir.path()));
        let config = AppConfig {
            api_key: None,
            ..AppConfig::default()
        };
        Ok((dir, ArcadeApp::new(leaderboard, GeminiResponder::new(&config))))
    }

    fn press(app: &mut ArcadeApp, codes: &[KeyCode]) {
        for code in codes {
            app.process_app_event(Some(AppEvent::Input(key(*code))));
        }
    }

    fn type_text(app: &mut ArcadeApp, text: &str) {
        for ch in text.chars() {
            press(app, &[KeyCode::Char(ch)]);
        }
    }

    #[test]
    fn header_shortcuts_switch_views() -> Result<()> {
        let (_dir, mut app) = test_app()?;
        press(&mut app, &[KeyCode::Char('g')]);
        assert_eq!(app.view.current_view(), View::Games);
        press(&mut app, &[KeyCode::Char('h')]);
        assert_eq!(app.view.current_view(), View::Home);
        press(&mut app, &[KeyCode::Char('l')]);
        assert!(app.view.leaderboard_open());
        press(&mut app, &[KeyCode::Esc]);
        assert!(!app.view.leaderboard_open());
        Ok(())
    }

    #[test]
    fn play_now_opens_games() -> Result<()> {
        let (_dir, mut app) = test_app()?;
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.view.current_view(), View::Games);
        Ok(())
    }

    #[test]
    fn compact_menu_navigates_and_closes() -> Result<()> {
        let (_dir, mut app) = test_app()?;
        app.state.compact = true;
        press(&mut app, &[KeyCode::Char('m')]);
        assert!(app.view.mobile_menu_open());
        press(&mut app, &[KeyCode::Down, KeyCode::Enter]);
        assert_eq!(app.view.current_view(), View::Games);
        assert!(!app.view.mobile_menu_open());
        Ok(())
    }

    #[test]
    fn modal_adds_and_removes_rows() -> Result<()> {
        let (_dir, mut app) = test_app()?;
        press(&mut app, &[KeyCode::Char('l')]);
        type_text(&mut app, "Comet");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "9x0,000");
        press(&mut app, &[KeyCode::Enter]);

        assert_eq!(app.leaderboard.len(), 6);
        assert_eq!(app.leaderboard.entries()[1].name, "Comet");
        assert_eq!(app.leaderboard.entries()[1].score, 90_000);
        assert_eq!(app.modal.selected, 1);
        assert!(app.modal.name.value().is_empty());

        press(&mut app, &[KeyCode::Tab, KeyCode::Tab, KeyCode::Char('d')]);
        assert_eq!(app.leaderboard.len(), 5);
        assert!(app.leaderboard.entries().iter().all(|entry| entry.name != "Comet"));
        Ok(())
    }

    #[test]
    fn modal_ignores_blank_name() -> Result<()> {
        let (_dir, mut app) = test_app()?;
        press(&mut app, &[KeyCode::Char('l'), KeyCode::Char(' '), KeyCode::Enter]);
        assert_eq!(app.leaderboard.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn chat_reply_is_appended_and_gate_reopens() -> Result<()> {
        let (_dir, mut app) = test_app()?;
        let (tx, mut rx) = mpsc::channel(4);
        app.event_tx = Some(tx);

        press(&mut app, &[KeyCode::Char('c')]);
        assert!(app.view.chat_open());
        type_text(&mut app, "hi");
        press(&mut app, &[KeyCode::Enter]);
        assert!(app.chat.is_awaiting());
        assert_eq!(app.chat.messages().len(), 2);

        type_text(&mut app, "again");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.chat.messages().len(), 2);

        let reply = rx.recv().await;
        assert!(app.process_app_event(reply));
        assert!(!app.chat.is_awaiting());
        assert_eq!(app.chat.messages().len(), 3);
        assert_eq!(
            app.chat.messages()[2].text,
            arcade_core::chat::FALLBACK_REPLY
        );
        Ok(())
    }

    #[test]
    fn grid_columns_follow_width() {
        assert_eq!(grid_columns_for(60), 1);
        assert_eq!(grid_columns_for(100), 2);
        assert_eq!(grid_columns_for(150), 3);
    }

    #[test]
    fn game_cursor_stays_in_bounds() {
        let mut state = UiState::default();
        state.move_game_cursor(-1, 6);
        assert_eq!(state.game_cursor, 0);
        state.move_game_cursor(5, 6);
        assert_eq!(state.game_cursor, 5);
        state.move_game_cursor(3, 6);
        assert_eq!(state.game_cursor, 5);
    }
}
