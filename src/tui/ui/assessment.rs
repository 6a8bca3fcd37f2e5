//! Assessment view: loading gauge, result card and failure panel.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::application::{Advisory, AssessmentState};
use crate::domain::{PresentableResult, RiskLevel};
use crate::tui::styles::MedicalTheme;
use crate::tui::ui::ServiceStatus;

/// Render the assessment screen for the machine's current state.
///
/// `progress` only matters while submitting; it drives the cosmetic gauge.
pub fn render_assessment(
    f: &mut Frame,
    area: Rect,
    state: &AssessmentState,
    progress: f64,
    status: &ServiceStatus,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    super::render_header(f, chunks[0], "Risk Assessment", status);

    match state {
        AssessmentState::Idle => render_idle(f, chunks[1]),
        AssessmentState::Submitting { .. } => render_loading(f, chunks[1], progress),
        AssessmentState::Resolved { result, advisory } => {
            render_result(f, chunks[1], result, advisory.as_ref())
        }
        AssessmentState::Failed { error, advisory } => {
            render_failure(f, chunks[1], error, advisory.as_ref())
        }
    }

    render_footer(f, chunks[2], state);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No assessment in progress",
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_loading(f: &mut Frame, area: Rect, progress: f64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .margin(2)
        .split(area);

    let stage = Paragraph::new(Line::from(vec![Span::styled(
        "Analyzing your health data...",
        MedicalTheme::focused(),
    )]))
    .alignment(Alignment::Center);
    f.render_widget(stage, chunks[0]);

    let ratio = progress.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::info())
        .ratio(ratio)
        .label(format!("{:.0}%", ratio * 100.0));
    f.render_widget(gauge, chunks[1]);

    let desc = Paragraph::new(Line::from(Span::styled(
        "Waiting for the prediction service",
        MedicalTheme::text_muted(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(desc, chunks[2]);
}

fn render_advisory(f: &mut Frame, area: Rect, advisory: &Advisory) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("! ", MedicalTheme::warning()),
        Span::styled(advisory.message.as_str(), MedicalTheme::warning()),
    ]))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::warning()),
    );
    f.render_widget(banner, area);
}

fn render_result(
    f: &mut Frame,
    area: Rect,
    result: &PresentableResult,
    advisory: Option<&Advisory>,
) {
    let banner_height = if advisory.is_some() { 3 } else { 0 };
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(banner_height), Constraint::Min(0)])
        .split(area);

    if let Some(advisory) = advisory {
        render_advisory(f, outer[0], advisory);
    }

    let source = if result.is_offline() {
        " Assessment Result (offline) "
    } else {
        " Assessment Result "
    };
    let block = Block::default()
        .title(Span::styled(source, MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(outer[1]);
    f.render_widget(block, outer[1]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Risk level
            Constraint::Length(3), // Score gauge
            Constraint::Length(1), // BMI
            Constraint::Length(3), // Message
            Constraint::Min(0),    // Factors / recommendations
        ])
        .margin(1)
        .split(inner);

    let risk_style = MedicalTheme::risk_level(result.risk_level);
    let risk_icon = match result.risk_level {
        RiskLevel::Low => "OK",
        RiskLevel::Moderate | RiskLevel::High => "!",
    };

    let risk_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} {} RISK", risk_icon, result.risk_level),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            result.risk_level.description(),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(risk_display, chunks[0]);

    let score_gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Risk Score ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(risk_style)
        .percent(u16::from(result.risk_score))
        .label(format!("{}%", result.risk_score));
    f.render_widget(score_gauge, chunks[1]);

    let bmi = Paragraph::new(Line::from(vec![
        Span::styled("BMI: ", MedicalTheme::text_secondary()),
        Span::styled(format!("{:.1}", result.bmi), MedicalTheme::text()),
        Span::styled(
            format!("   Assessed {}", result.assessed_at.format("%Y-%m-%d %H:%M UTC")),
            MedicalTheme::text_muted(),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(bmi, chunks[2]);

    let message = Paragraph::new(Span::styled(result.display_message(), MedicalTheme::text()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(message, chunks[3]);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[4]);

    let factors: Vec<ListItem> = if result.risk_factors.is_empty() {
        vec![ListItem::new(Span::styled(
            "No significant risk factors identified",
            MedicalTheme::success(),
        ))]
    } else {
        result
            .risk_factors
            .iter()
            .map(|factor| ListItem::new(Span::styled(format!("• {factor}"), MedicalTheme::warning())))
            .collect()
    };
    f.render_widget(
        List::new(factors).block(
            Block::default()
                .title(Span::styled(" Risk Factors ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        ),
        lists[0],
    );

    let recommendations: Vec<ListItem> = result
        .recommendations
        .iter()
        .map(|rec| ListItem::new(Span::styled(format!("✓ {rec}"), MedicalTheme::text())))
        .collect();
    f.render_widget(
        List::new(recommendations).block(
            Block::default()
                .title(Span::styled(" Recommendations ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        ),
        lists[1],
    );
}

fn render_failure(f: &mut Frame, area: Rect, error: &str, advisory: Option<&Advisory>) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("! Assessment failed", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(error, MedicalTheme::text())),
    ];
    if let Some(advisory) = advisory {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            advisory.message.as_str(),
            MedicalTheme::warning(),
        )));
    }

    let content = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::danger()),
        );

    f.render_widget(content, area);
}

fn render_footer(f: &mut Frame, area: Rect, state: &AssessmentState) {
    let content = match state {
        AssessmentState::Submitting { .. } => Line::from(vec![
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Cancel", MedicalTheme::key_desc()),
        ]),
        _ => Line::from(vec![
            Span::styled("[Enter/N] ", MedicalTheme::key_hint()),
            Span::styled("New Assessment ", MedicalTheme::key_desc()),
            Span::styled("[Ctrl-Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
