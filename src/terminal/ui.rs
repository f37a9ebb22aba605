use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::terminal::state::AppState;

pub fn render(f: &mut Frame, state: &AppState) {
    let [main, footer] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(f.area());
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .margin(1)
            .areas(main);

    // LEFT: records
    let list_block = Block::default()
        .title(format!(" {} ({}) ", state.title, state.records.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let items: Vec<ListItem> = state
        .records
        .iter()
        .map(|r| {
            let subj = Span::styled(
                r.subject.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            );
            let from = Span::styled(r.from.clone(), Style::default().fg(Color::Gray));
            ListItem::new(Text::from(vec![Line::from(subj), Line::from(from)]))
        })
        .collect();

    let list = List::new(items)
        .block(list_block)
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));

    f.render_stateful_widget(list, left, &mut state.list_state.clone());

    // RIGHT: what will be spoken
    let preview = Paragraph::new(state.preview())
        .block(
            Block::default()
                .title(" Speech ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(preview, right);

    let mut hint = vec![
        Span::styled("j/k", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" move  "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" speak  "),
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ];
    if let Some(status) = &state.status {
        hint.push(Span::raw("   "));
        hint.push(Span::styled(status.clone(), Style::default().fg(Color::Cyan)));
    }
    f.render_widget(Paragraph::new(Line::from(hint)), footer);
}
