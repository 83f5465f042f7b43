use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::{App, InputField};

const HORIZONTAL_MARGIN: u16 = 4;
const VERTICAL_MARGIN: u16 = 1;

// Left column width before the rate column starts, and the width the rate
// values are right-aligned into. Widths are measured, not byte-counted,
// since the currency suffixes are multi-byte.
const INPUT_COLUMN: usize = 36;
const RATE_COLUMN: usize = 12;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let label_style = Style::default().fg(Color::Gray);
        let rate_style = Style::default().patch(bold_style).fg(Color::Cyan);
        let ticker_style = Style::default().patch(bold_style).fg(Color::Green);
        let pulse_style = Style::default().patch(bold_style).fg(Color::Yellow);
        let notice_style = Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::ITALIC);
        let hint_style = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1),
                Constraint::Length(1), // salary input + hourly rate
                Constraint::Length(1), // hours input + secondly rate
                Constraint::Length(1),
                Constraint::Length(1), // elapsed
                Constraint::Length(1), // earned
                Constraint::Length(1), // notice
                Constraint::Min(0),    // coin rain
                Constraint::Length(1), // hints
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("kaching", bold_style.fg(Color::Yellow)),
            Span::styled("  every second counts", dim_style),
        ]));
        title.render(chunks[0], buf);

        input_row(
            "monthly salary",
            &self.salary_text,
            self.focus == InputField::Salary,
            "hourly",
            &self.readout.hourly,
            label_style,
            bold_style,
            rate_style,
        )
        .render(chunks[2], buf);

        input_row(
            "daily hours",
            &self.hours_text,
            self.focus == InputField::Hours,
            "per sec",
            &self.readout.secondly,
            label_style,
            bold_style,
            rate_style,
        )
        .render(chunks[3], buf);

        let elapsed = Paragraph::new(Span::styled(self.readout.elapsed.clone(), ticker_style))
            .alignment(Alignment::Center);
        elapsed.render(chunks[5], buf);

        let earned_style = if self.session.pulse_active(self.last_now) {
            pulse_style
        } else {
            bold_style
        };
        let earned = Paragraph::new(Line::from(vec![
            Span::styled("earned ", label_style),
            Span::styled(self.readout.earned.clone(), earned_style),
        ]))
        .alignment(Alignment::Center);
        earned.render(chunks[6], buf);

        if let Some(notice) = &self.readout.notice {
            Paragraph::new(Span::styled(notice.clone(), notice_style))
                .alignment(Alignment::Center)
                .render(chunks[7], buf);
        }

        render_coins(self, chunks[8], buf);

        let hints = if self.readout.stop_enabled {
            let since = self
                .clocked_in_at
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default();
            format!("on the clock since {} · (enter/x) clock out · (esc) quit", since)
        } else {
            "(tab) switch field · (enter/s) clock in · (esc) quit".to_string()
        };
        Paragraph::new(Span::styled(hints, hint_style))
            .alignment(Alignment::Center)
            .render(chunks[9], buf);
    }
}

#[allow(clippy::too_many_arguments)]
fn input_row<'a>(
    label: &'a str,
    value: &'a str,
    focused: bool,
    rate_label: &'a str,
    rate_value: &'a str,
    label_style: Style,
    value_style: Style,
    rate_style: Style,
) -> Paragraph<'a> {
    let marker = if focused { "▸ " } else { "  " };
    let caret = if focused { "▏" } else { "" };

    let left = format!("{}{:<16}{}{}", marker, label, value, caret);
    let gap = " ".repeat(INPUT_COLUMN.saturating_sub(left.width()));
    let rate_pad = " ".repeat(RATE_COLUMN.saturating_sub(rate_value.width()));

    Paragraph::new(Line::from(vec![
        Span::styled(format!("{}{:<16}", marker, label), label_style),
        Span::styled(format!("{}{}", value, caret), value_style),
        Span::raw(gap),
        Span::styled(format!("{:<8}", rate_label), label_style),
        Span::raw(rate_pad),
        Span::styled(rate_value, rate_style),
    ]))
}

fn render_coins(app: &App, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let coin_style = Style::default().fg(Color::Yellow);
    let big_coin_style = coin_style.add_modifier(Modifier::BOLD);

    for coin in &app.coins.coins {
        let col = area.x + (coin.x.round() as u16).min(area.width.saturating_sub(1));
        let drop = coin.age_fraction(app.last_now) * f64::from(area.height.saturating_sub(1));
        let row = area.y + drop.round() as u16;

        if let Some(cell) = buf.cell_mut((col, row)) {
            cell.set_char(coin.face());
            // size drives weight; bigger coins land heavier
            cell.set_style(if coin.size >= 30.0 {
                big_coin_style
            } else {
                coin_style
            });
        }
    }
}
