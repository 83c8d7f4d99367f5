use crate::app::{App, DataState, MapView};
use crate::braille::BrailleCanvas;
use crate::config::Projection;
use crate::features::{style_for, FeatureCategory};
use crate::map::{render_layers, MapLayers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);

    let view = app.active_view();
    render_layer_control(frame, view, chunks[0]);
    render_scale_bar(frame, view, chunks[0]);
    if view.config.projection == Projection::Geographic {
        render_crs_badge(frame, chunks[0]);
    }
    render_notices(frame, app, chunks[0]);
    if let Some(popup) = &view.popup {
        render_popup(frame, view, popup, chunks[0]);
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.active_view();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", view.config.title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = view.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = render_layers(&view.layers, &viewport);
    let projection = view.config.projection;

    frame.render_widget(
        MapWidget {
            layers,
            boundary_color: style_for(FeatureCategory::SubDistrictBoundary, projection).color,
            school_color: style_for(FeatureCategory::SchoolLocation, projection).color,
            base_color: style_for(FeatureCategory::Unclassified, projection).color,
        },
        inner,
    );
}

/// Widget painting the per-layer braille canvases back to front
struct MapWidget {
    layers: MapLayers,
    boundary_color: Color,
    school_color: Color,
    base_color: Color,
}

impl MapWidget {
    fn render_canvas(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (cx, cy, ch) in canvas.cells() {
            if cx >= area.width || cy >= area.height {
                continue;
            }
            buf[(area.x + cx, area.y + cy)].set_char(ch).set_fg(color);
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_canvas(&self.layers.graticule, Color::DarkGray, area, buf);
        Self::render_canvas(&self.layers.base, self.base_color, area, buf);
        Self::render_canvas(&self.layers.boundaries, self.boundary_color, area, buf);
        Self::render_canvas(&self.layers.schools, self.school_color, area, buf);
    }
}

/// Always-expanded layer toggle control, top-left
fn render_layer_control(frame: &mut Frame, view: &MapView, map_area: Rect) {
    let groups = [
        ("1", &view.layers.schools),
        ("2", &view.layers.boundaries),
    ];

    let mut lines = Vec::new();
    for (key, group) in groups {
        let (mark, color) = if group.visible {
            ("■", Color::Green)
        } else {
            ("□", Color::DarkGray)
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {mark} "), Style::default().fg(color)),
            Span::styled(
                format!("[{key}] {} ({})", group.name, group.len()),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }

    let width = 30.min(map_area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(map_area.height.saturating_sub(2));
    let rect = Rect::new(map_area.x + 2, map_area.y + 1, width, height);

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Lapisan "),
        ),
        rect,
    );
}

/// Metric scale bar, bottom-left
fn render_scale_bar(frame: &mut Frame, view: &MapView, map_area: Rect) {
    // 10 characters = 20 braille pixels of ground distance
    let meters = view.viewport.meters_per_pixel() * 20.0;
    let label = if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{:.0} m", meters)
    };

    let text = format!("├────────┤ {label}");
    let width = (text.chars().count() as u16).min(map_area.width.saturating_sub(4));
    let rect = Rect::new(
        map_area.x + 2,
        map_area.y + map_area.height.saturating_sub(2),
        width,
        1,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::Gray))),
        rect,
    );
}

/// Static projection badge, bottom-right (geographic view only)
fn render_crs_badge(frame: &mut Frame, map_area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "CRS: EPSG:4326",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Geographic Coordinate System",
            Style::default().fg(Color::Gray),
        )),
    ];
    let width = 30.min(map_area.width.saturating_sub(4));
    let rect = Rect::new(
        map_area.x + map_area.width.saturating_sub(width + 2),
        map_area.y + map_area.height.saturating_sub(3),
        width,
        2,
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(Color::Blue)),
        rect,
    );
}

/// Transient error notices, stacked top-right
fn render_notices(frame: &mut Frame, app: &App, map_area: Rect) {
    let width = 36.min(map_area.width.saturating_sub(4));
    let mut y = map_area.y + 1;

    for notice in app.notices.iter() {
        let height = 3;
        if y + height > map_area.y + map_area.height {
            break;
        }
        let rect = Rect::new(
            map_area.x + map_area.width.saturating_sub(width + 2),
            y,
            width,
            height,
        );
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(notice.message.as_str())
                .wrap(ratatui::widgets::Wrap { trim: true })
                .style(Style::default().fg(Color::White).bg(Color::Red))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Kesalahan "),
                ),
            rect,
        );
        y += height;
    }
}

/// Feature popup, centered on the map area; Esc closes
fn render_popup(
    frame: &mut Frame,
    view: &MapView,
    popup: &crate::features::Popup,
    map_area: Rect,
) {
    let heading_color = match popup.heading.as_str() {
        "Batas Kecamatan" => {
            style_for(FeatureCategory::SubDistrictBoundary, view.config.projection).color
        }
        _ => style_for(FeatureCategory::SchoolLocation, view.config.projection).color,
    };

    let mut lines = vec![
        Line::from(Span::styled(
            popup.heading.clone(),
            Style::default().fg(heading_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(popup.body.clone()),
    ];
    if let Some(footnote) = &popup.footnote {
        lines.push(Line::from(Span::styled(
            footnote.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let width = 38.min(map_area.width.saturating_sub(4));
    let height = lines.len() as u16 + 2;
    let rect = Rect::new(
        map_area.x + (map_area.width.saturating_sub(width)) / 2,
        map_area.y + (map_area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Info (Esc tutup) "),
        ),
        rect,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.active_view();

    let data_span = match view.data {
        DataState::Idle => Span::styled("siaga", Style::default().fg(Color::DarkGray)),
        DataState::Loading => Span::styled("memuat data…", Style::default().fg(Color::Yellow)),
        DataState::Ready { features } => Span::styled(
            format!("{features} fitur"),
            Style::default().fg(Color::Green),
        ),
        DataState::Failed => Span::styled("gagal memuat", Style::default().fg(Color::Red)),
    };

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", view.config.projection.label()),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled("| Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        data_span,
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.config.attribution, Style::default().fg(Color::DarkGray)),
        Span::styled(
            " | Tab:ganti peta hjkl:geser +/-:zoom 1/2:lapisan q:keluar",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
