use plotchat_core::{build_rows, Avatar, ChartDirective, ChartKind, MessageRow, RenderRow};
use ratatui::{
    buffer::Buffer,
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, BorderType, Borders, Chart, Dataset, GraphType,
        Paragraph, Widget, Wrap,
    },
};
use crate::app::{App, InputMode};
use crate::theme::theme;

/// Rows given to an inline chart, borders included
const CHART_HEIGHT: u16 = 12;
const TYPING_ROW_HEIGHT: u16 = 3;
const MIN_BUBBLE_WIDTH: u16 = 24;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if close == 0 {
            // "****" is not bold text
            spans.push(Span::raw(rest[..open + 4].to_string()));
            rest = &after_open[2..];
            continue;
        }

        if open > 0 {
            spans.push(Span::raw(rest[..open].to_string()));
        }
        spans.push(Span::styled(
            after_open[..close].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

fn message_text(row: &MessageRow) -> Text<'static> {
    match row.avatar {
        Avatar::User => Text::from(row.text.clone()),
        Avatar::Bot => Text::from(row.text.lines().map(parse_markdown_line).collect::<Vec<_>>()),
    }
}

fn bubble_width(area_width: u16) -> u16 {
    (area_width.saturating_mul(3) / 4)
        .max(MIN_BUBBLE_WIDTH)
        .min(area_width)
}

fn row_height(row: &RenderRow, area_width: u16) -> u16 {
    match row {
        RenderRow::Typing => TYPING_ROW_HEIGHT,
        RenderRow::Message(message) => {
            let inner_width = bubble_width(area_width).saturating_sub(2).max(1);
            let text_lines = Paragraph::new(message_text(message))
                .wrap(Wrap { trim: false })
                .line_count(inner_width);
            let text_lines = u16::try_from(text_lines).unwrap_or(u16::MAX).max(1);
            let chart_lines = if message.chart.is_some() { CHART_HEIGHT } else { 0 };
            text_lines.saturating_add(chart_lines).saturating_add(2)
        }
    }
}

/// The part of a row that falls inside the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowSlice {
    index: usize,
    /// Lines of the row above the viewport
    skip: u16,
    lines: u16,
}

fn total_lines(heights: &[u16]) -> usize {
    heights.iter().map(|&h| h as usize).sum()
}

/// Furthest the view can scroll back, in lines
fn max_scroll(heights: &[u16], height: u16) -> usize {
    total_lines(heights).saturating_sub(height as usize)
}

/// Rows overlapping a `height`-line viewport whose bottom sits `scroll_back`
/// lines above the end of the conversation.
fn visible_slices(heights: &[u16], scroll_back: usize, height: u16) -> Vec<RowSlice> {
    let bottom = total_lines(heights) - scroll_back.min(max_scroll(heights, height));
    let top = bottom.saturating_sub(height as usize);

    let mut slices = Vec::new();
    let mut start = 0usize;
    for (index, &h) in heights.iter().enumerate() {
        let end = start + h as usize;
        if end > top && start < bottom {
            slices.push(RowSlice {
                index,
                skip: (top.saturating_sub(start)) as u16,
                lines: (end.min(bottom) - start.max(top)) as u16,
            });
        }
        if end >= bottom {
            break;
        }
        start = end;
    }

    slices
}

/// Draw something `full_height` lines tall off-screen, then copy the
/// `area.height` lines starting at `skip` into `area`.
fn render_clipped(
    frame: &mut Frame,
    area: Rect,
    full_height: u16,
    skip: u16,
    draw: impl FnOnce(Rect, &mut Buffer),
) {
    let full = Rect::new(0, 0, area.width, full_height);
    let mut scratch = Buffer::empty(full);
    draw(full, &mut scratch);

    let target = frame.buffer_mut();
    let lines = area.height.min(full_height.saturating_sub(skip));
    for dy in 0..lines {
        for dx in 0..area.width {
            let Some(src) = scratch.cell((dx, skip + dy)) else {
                continue;
            };
            if let Some(dst) = target.cell_mut((area.x + dx, area.y + dy)) {
                *dst = src.clone();
            }
        }
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, conversation, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_conversation(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let t = theme();
    let lines = vec![
        Line::from(vec![
            Span::styled(" ◆ AI Assistant ", t.header_title),
            Span::styled(format!("v{}", env!("CARGO_PKG_VERSION")), t.header_subtitle),
        ]),
        Line::from(Span::styled(
            format!("   Always here to help · {}", app.endpoint()),
            t.header_subtitle,
        )),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_conversation(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing
    app.chat_area = Some(area);

    // Only the top border: rows get the full width and all but one line
    let rows = build_rows(app.session.messages(), app.session.is_pending());
    let heights: Vec<u16> = rows.iter().map(|r| row_height(r, area.width)).collect();

    // Keep the scroll position in range for the current size
    app.max_scroll = max_scroll(&heights, area.height.saturating_sub(1));
    app.scroll_back = app.scroll_back.min(app.max_scroll);

    let title = if app.scroll_back > 0 {
        format!(" Conversation (↓ {} lines newer) ", app.scroll_back)
    } else {
        " Conversation ".to_string()
    };
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme().chart_border)
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let mut y = inner.y;
    for slice in visible_slices(&heights, app.scroll_back, inner.height) {
        let row_area = Rect::new(inner.x, y, inner.width, slice.lines);
        let full_height = heights[slice.index];

        match &rows[slice.index] {
            RenderRow::Message(message) => {
                render_message_row(frame, row_area, message, slice.skip, full_height)
            }
            RenderRow::Typing => {
                let frame_no = app.animation_frame;
                render_clipped(frame, row_area, full_height, slice.skip, |rect, buf| {
                    render_typing_row(frame_no, buf, rect)
                });
            }
        }
        y += slice.lines;
    }
}

/// Place a bubble on the left for the assistant and on the right for the user
fn bubble_rect(area: Rect, avatar: Avatar) -> Rect {
    let width = bubble_width(area.width);
    let x = match avatar {
        Avatar::User => area.x + area.width - width,
        Avatar::Bot => area.x,
    };
    Rect::new(x, area.y, width, area.height)
}

fn avatar_title(avatar: Avatar) -> (Style, Line<'static>) {
    let t = theme();
    match avatar {
        Avatar::User => (
            t.user_border,
            Line::from(Span::styled(format!(" ● {} ", avatar.label()), t.user_label)),
        ),
        Avatar::Bot => (
            t.bot_border,
            Line::from(Span::styled(format!(" ◆ {} ", avatar.label()), t.bot_label)),
        ),
    }
}

/// Draw the visible part of a message bubble.
///
/// Bubble lines are: top border, wrapped text, chart, bottom border. Lines
/// scrolled out of view are dropped from the top (`skip`) or the bottom.
fn render_message_row(frame: &mut Frame, area: Rect, row: &MessageRow, skip: u16, full_height: u16) {
    let bubble = bubble_rect(area, row.avatar);
    let (border_style, title) = avatar_title(row.avatar);
    let shows_top = skip == 0;
    let shows_bottom = skip.saturating_add(area.height) >= full_height;

    let mut borders = Borders::LEFT | Borders::RIGHT;
    let mut block = Block::new()
        .border_type(BorderType::Rounded)
        .border_style(border_style);
    if shows_top {
        borders |= Borders::TOP;
        block = block.title(title);
    }
    if shows_bottom {
        borders |= Borders::BOTTOM;
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {} ", row.time), theme().timestamp))
                .alignment(Alignment::Right),
        );
    }
    let block = block.borders(borders);
    let inner = block.inner(bubble);
    frame.render_widget(block, bubble);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let chart_lines = if row.chart.is_some() { CHART_HEIGHT } else { 0 };
    let text_lines = full_height.saturating_sub(chart_lines.saturating_add(2));
    // Bubble line shown on the first inner row
    let first = skip.max(1);

    let text_rows = if first <= text_lines {
        (text_lines - first + 1).min(inner.height)
    } else {
        0
    };
    if text_rows > 0 {
        let text = Paragraph::new(message_text(row))
            .wrap(Wrap { trim: false })
            .scroll((first - 1, 0));
        frame.render_widget(text, Rect::new(inner.x, inner.y, inner.width, text_rows));
    }

    let chart_rows = inner.height - text_rows;
    if let Some(chart) = row.chart.as_ref().filter(|_| chart_rows > 0) {
        let chart_area = Rect::new(inner.x, inner.y + text_rows, inner.width, chart_rows);
        let chart_skip = first.saturating_sub(text_lines + 1);
        render_clipped(frame, chart_area, CHART_HEIGHT, chart_skip, |rect, buf| {
            render_chart(buf, rect, chart)
        });
    }
}

fn render_typing_row(animation_frame: u8, buf: &mut Buffer, area: Rect) {
    let t = theme();
    let bubble = Rect::new(area.x, area.y, area.width.min(16), area.height);
    let (border_style, title) = avatar_title(Avatar::Bot);

    let dots: Vec<Span> = (0..3u8)
        .map(|i| {
            let style = if i == animation_frame { t.typing_dot_on } else { t.typing_dot_off };
            Span::styled(" ● ", style)
        })
        .collect();

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(title);

    Paragraph::new(Line::from(dots)).block(block).render(bubble, buf);
}

fn render_chart(buf: &mut Buffer, area: Rect, chart: &ChartDirective) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let block = Block::bordered()
        .border_style(theme().chart_border)
        .title(format!(" {} ", chart.kind.display_name()));

    // Nothing to plot: just the frame
    if chart.is_empty() {
        block.render(area, buf);
        return;
    }

    match chart.kind {
        ChartKind::Line => render_line_chart(buf, area, block, chart),
        ChartKind::Bar => render_bar_chart(buf, area, block, chart),
        ChartKind::Scatter => render_scatter_chart(buf, area, block, chart),
    }
}

fn render_line_chart(buf: &mut Buffer, area: Rect, block: Block, chart: &ChartDirective) {
    let data = chart.xy_series();
    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme().line_series)
        .data(&data);
    render_xy_chart(buf, area, block, chart, dataset);
}

fn render_scatter_chart(buf: &mut Buffer, area: Rect, block: Block, chart: &ChartDirective) {
    let data = chart.xy_series();
    let dataset = Dataset::default()
        .marker(Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(theme().scatter_series)
        .data(&data);
    render_xy_chart(buf, area, block, chart, dataset);
}

fn render_xy_chart(
    buf: &mut Buffer,
    area: Rect,
    block: Block,
    chart: &ChartDirective,
    dataset: Dataset,
) {
    let x_bounds = chart.x_bounds();
    let y_bounds = chart.y_bounds();
    let axis_style = theme().axis;

    let widget = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );

    widget.render(area, buf);
}

fn render_bar_chart(buf: &mut Buffer, area: Rect, block: Block, chart: &ChartDirective) {
    let t = theme();
    let bars: Vec<Bar> = chart
        .bar_series()
        .into_iter()
        .map(|(name, value)| {
            Bar::default()
                .value(bar_height(value))
                .text_value(format_number(value))
                .label(Line::from(name.to_string()))
        })
        .collect();

    // Spread bars across the inner width, one column gap between them
    let count = bars.len() as u16;
    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width.saturating_sub(count.saturating_sub(1)) / count.max(1)).clamp(1, 9);

    let widget = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(t.bar)
        .value_style(t.bar_value)
        .label_style(t.axis);

    widget.render(area, buf);
}

/// Bar heights are unsigned; negative values draw as empty bars
fn bar_height(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let [min, max] = bounds;
    vec![
        Span::raw(format_number(min)),
        Span::raw(format_number((min + max) / 2.0)),
        Span::raw(format_number(max)),
    ]
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let t = theme();
    let waiting = app.is_waiting();
    let editing = app.input_mode == InputMode::Editing;

    let (border_style, title) = if waiting {
        (t.input_disabled, " Waiting for reply… ")
    } else if editing {
        (t.input_active, " Message (Enter to send) ")
    } else {
        (t.input_idle, " Message (i to type) ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(title);

    let draft = app.session.draft();

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if draft.is_empty() {
        Paragraph::new(Span::styled("Type your message…", t.placeholder))
    } else {
        let visible_text: String = draft.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(t.user_label.remove_modifier(Modifier::BOLD))
    };

    frame.render_widget(input.block(block), area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let t = theme();

    let (mode_style, mode_text) = match app.input_mode {
        InputMode::Normal => (t.mode_normal, " NORMAL "),
        InputMode::Editing => (t.mode_editing, " INSERT "),
    };

    let keys: &[(&str, &str)] = match app.input_mode {
        InputMode::Normal => &[
            ("i", "type"),
            ("j/k", "scroll"),
            ("g/G", "top/bottom"),
            ("q", "quit"),
        ],
        InputMode::Editing => &[
            ("Enter", "send"),
            ("Esc", "stop typing"),
            ("PgUp/PgDn", "scroll"),
            ("Ctrl+C", "quit"),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in keys {
        spans.push(Span::styled(format!(" {} ", key), t.key));
        spans.push(Span::styled(format!(" {} ", label), t.key_label));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
