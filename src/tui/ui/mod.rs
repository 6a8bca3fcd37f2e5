//! UI module: View components for the TUI.

pub mod assessment;
pub mod questionnaire;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::ServiceHealth;
use crate::ports::PredictorError;
use crate::tui::styles::{MedicalTheme, LOGO_SMALL};

/// Header indicator for the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceStatus {
    #[default]
    Checking,
    Online {
        version: String,
    },
    /// Reachable, but reports the model is not ready
    Degraded {
        status: String,
    },
    /// Unreachable; assessments will use the offline scorer
    Offline,
}

impl From<Result<ServiceHealth, PredictorError>> for ServiceStatus {
    fn from(result: Result<ServiceHealth, PredictorError>) -> Self {
        match result {
            Ok(health) if health.is_ready() => Self::Online {
                version: health.version,
            },
            Ok(health) if !health.model_loaded => Self::Degraded {
                status: "not loaded".to_string(),
            },
            Ok(health) => Self::Degraded {
                status: health.status,
            },
            Err(_) => Self::Offline,
        }
    }
}

/// Render the screen title bar with the service indicator.
pub fn render_header(f: &mut Frame, area: Rect, title: &str, status: &ServiceStatus) {
    let indicator = match status {
        ServiceStatus::Checking => Span::styled("◌ checking service", MedicalTheme::text_muted()),
        ServiceStatus::Online { version } => {
            Span::styled(format!("● model online v{version}"), MedicalTheme::success())
        }
        ServiceStatus::Degraded { status } => {
            Span::styled(format!("◐ model {status}"), MedicalTheme::warning())
        }
        ServiceStatus::Offline => Span::styled("○ offline mode", MedicalTheme::danger()),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(LOGO_SMALL, MedicalTheme::subtitle()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled(title.to_string(), MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        indicator,
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: This tool provides indicative estimates and does not replace professional medical evaluation.",
            MedicalTheme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "Offline results come from a simplified rule set, not the trained model.",
            MedicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
