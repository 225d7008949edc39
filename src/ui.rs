use crate::app::App;
use crate::map::{BrailleCanvas, MapLayers};
use crate::report::{BarChartSpec, FreqTable, LineChartSpec, TableView};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, Widget,
    },
    Frame,
};

/// Line colors cycled across chart series.
const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::LightRed,
    Color::Blue,
];

/// Column widths of the raw-data table, one per projected column plus the
/// derived news date.
const TABLE_WIDTHS: [Constraint; 14] = [
    Constraint::Length(10), // EVENT_DATE
    Constraint::Length(4),  // YEAR
    Constraint::Length(18), // EVENT_TYPE
    Constraint::Length(18), // SUB_EVENT_TYPE
    Constraint::Length(22), // ACTOR1
    Constraint::Length(5),  // INTERACTION
    Constraint::Length(10), // REGION
    Constraint::Length(12), // COUNTRY
    Constraint::Length(14), // LOCATION
    Constraint::Length(8),  // LATITUDE
    Constraint::Length(9),  // LONGITUDE
    Constraint::Length(6),  // FATALITIES
    Constraint::Length(10), // TIMESTAMP
    Constraint::Length(26), // NEWS_DATE
];

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let header_height = 3 + app.model.header.warnings.len() as u16;

    let mut constraints = vec![Constraint::Length(header_height)];
    if app.model.table.is_some() {
        constraints.push(Constraint::Length(10));
    }
    constraints.push(Constraint::Min(12)); // Chart grid
    constraints.push(Constraint::Length(14)); // Map and filters
    constraints.push(Constraint::Length(1)); // Status bar

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut at = 0;
    render_header(frame, app, chunks[at]);
    at += 1;
    if let Some(table) = &app.model.table {
        render_table(frame, table, app.table_scroll, chunks[at]);
        at += 1;
    }
    render_charts(frame, app, chunks[at]);
    render_geo_section(frame, app, chunks[at + 1]);
    render_status_bar(frame, app, chunks[at + 2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = &app.model.header;

    let mut lines = vec![Line::from(vec![
        Span::styled(
            header.title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} events", header.events),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    for warning in &header.warnings {
        lines.push(Line::from(Span::styled(
            format!("warning: {warning}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_charts(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(columns[0]);
    render_line_chart(frame, &app.model.yearly, left[0]);
    render_line_chart(frame, &app.model.watchlist, left[1]);
    render_line_chart(frame, &app.model.type_by_year, left[2]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[1]);
    render_bar_chart(frame, &app.model.country_bars, Color::LightRed, right[0]);
    render_bar_chart(frame, &app.model.type_frequency, Color::Blue, right[1]);
}

fn render_geo_section(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_map(frame, app, columns[0]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(4)])
        .split(columns[1]);
    render_selectors(frame, app, sidebar[0]);

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(sidebar[1]);
    render_freq_table(frame, &app.model.event_types, tables[0]);
    render_freq_table(frame, &app.model.activists, tables[1]);
}

fn render_line_chart(frame: &mut Frame, spec: &LineChartSpec, area: Rect) {
    let datasets: Vec<Dataset> = spec
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            Dataset::default()
                .name(series.name.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(&series.points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(panel_block(spec.title))
        .x_axis(
            Axis::default()
                .title(spec.x_label)
                .style(Style::default().fg(Color::DarkGray))
                .bounds([spec.x_bounds.0, spec.x_bounds.1])
                .labels(axis_labels(spec.x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title(spec.y_label)
                .style(Style::default().fg(Color::DarkGray))
                .bounds([spec.y_bounds.0, spec.y_bounds.1])
                .labels(axis_labels(spec.y_bounds)),
        );
    frame.render_widget(chart, area);
}

fn axis_labels((low, high): (f64, f64)) -> Vec<Span<'static>> {
    let mid = (low + high) / 2.0;
    [low, mid, high]
        .iter()
        .map(|value| {
            Span::styled(format!("{value:.0}"), Style::default().fg(Color::Gray))
        })
        .collect()
}

fn render_bar_chart(frame: &mut Frame, spec: &BarChartSpec, color: Color, area: Rect) {
    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.clone()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let block = panel_block(spec.title)
        .title_bottom(
            Line::from(Span::styled(
                format!(" {} ", spec.x_label),
                Style::default().fg(Color::DarkGray),
            ))
            .left_aligned(),
        )
        .title_bottom(
            Line::from(Span::styled(
                format!(" {} ", spec.y_label),
                Style::default().fg(Color::DarkGray),
            ))
            .right_aligned(),
        );

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn render_freq_table(frame: &mut Frame, table: &FreqTable, area: Rect) {
    let block = panel_block(table.title);

    if table.rows.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "no data for this selection",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows = table.rows.iter().map(|(label, count)| {
        Row::new(vec![
            Cell::from(label.as_str()),
            Cell::from(count.to_string()).style(Style::default().fg(Color::Yellow)),
        ])
    });
    let widths = [Constraint::Min(10), Constraint::Length(6)];
    frame.render_widget(Table::new(rows, widths).block(block), area);
}

fn render_table(frame: &mut Frame, table: &TableView, scroll: usize, area: Rect) {
    let total = table.rows.len();
    let visible = area.height.saturating_sub(3) as usize;
    let last = (scroll + visible).min(total);

    let block = panel_block("Dataframe").title_bottom(
        Line::from(Span::styled(
            format!(" rows {}-{} of {} ", (scroll + 1).min(total), last, total),
            Style::default().fg(Color::DarkGray),
        ))
        .right_aligned(),
    );

    let header = Row::new(table.header.iter().map(|&name| {
        Cell::from(name).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let rows = table
        .rows
        .iter()
        .skip(scroll)
        .take(visible)
        .map(|cells| Row::new(cells.iter().map(|cell| Cell::from(cell.as_str()))));

    frame.render_widget(
        Table::new(rows, TABLE_WIDTHS).header(header).block(block),
        area,
    );
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let map = &app.model.map;

    let subtitle = match (&map.country, map.year) {
        (Some(country), Some(year)) => {
            format!(" {country}, {year}: {} events ", map.points.len())
        }
        _ => " no events ".to_string(),
    };
    let block = panel_block(map.title).title_bottom(Line::from(Span::styled(
        subtitle,
        Style::default().fg(Color::DarkGray),
    )));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app.base_map.render(
        inner.width as usize,
        inner.height as usize,
        &viewport,
        &map.points,
    );
    frame.render_widget(MapWidget { layers }, inner);
}

/// Custom widget that renders the braille map layers in color
struct MapWidget {
    layers: MapLayers,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: coastlines, then event markers on top.
        Self::render_layer(&self.layers.coastlines, Color::Cyan, area, buf);
        Self::render_layer(&self.layers.events, Color::Red, area, buf);
    }
}

fn render_selectors(frame: &mut Frame, app: &App, area: Rect) {
    let map = &app.model.map;

    let year_value = map.year.map_or_else(|| "(none)".to_string(), |y| y.to_string());
    let lines = vec![
        selector_line(
            "Select Country",
            map.country.as_deref().unwrap_or("(none)"),
            position_of(&map.countries, map.country.as_ref()),
            map.countries.len(),
        ),
        selector_line(
            "Select Year   ",
            &year_value,
            position_of(&map.years, map.year.as_ref()),
            map.years.len(),
        ),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn selector_line(label: &str, value: &str, at: Option<usize>, total: usize) -> Line<'static> {
    let position = match at {
        Some(index) => format!("  {}/{}", index + 1, total),
        None => String::new(),
    };
    Line::from(vec![
        Span::styled(format!("{label} "), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("< {value} >"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(position, Style::default().fg(Color::DarkGray)),
    ])
}

fn position_of<T: PartialEq>(options: &[T], value: Option<&T>) -> Option<usize> {
    value.and_then(|v| options.iter().position(|option| option == v))
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(
            " | t:dataframe ←/→:country ↑/↓:year PgUp/PgDn:scroll hjkl:pan +/-:zoom 0:refit q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}

fn panel_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
}
