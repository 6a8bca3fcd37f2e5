//! Health questionnaire input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{
    Gender, Level, Metrics, AGE_RANGE, DIASTOLIC_RANGE, HEIGHT_RANGE, SYSTOLIC_RANGE,
    WEIGHT_RANGE,
};
use crate::tui::styles::MedicalTheme;
use crate::tui::ui::ServiceStatus;
use zeroize::Zeroize;

const GENDER_OPTIONS: &[&str] = &[Gender::Female.label(), Gender::Male.label()];
const LEVEL_OPTIONS: &[&str] = &[
    Level::Normal.label(),
    Level::AboveNormal.label(),
    Level::WellAboveNormal.label(),
];
const YES_NO: &[&str] = &["No", "Yes"];

/// How a field takes input.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    /// Free-text numeric entry
    Number {
        value: String,
        min: f64,
        max: f64,
        integer: bool,
    },
    /// Cycled with ←/→ or Space
    Choice {
        options: &'static [&'static str],
        selected: usize,
    },
}

/// Form field definition
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub input: FieldInput,
}

impl FormField {
    fn number(
        label: &'static str,
        hint: &'static str,
        value: String,
        range: (f64, f64),
        integer: bool,
    ) -> Self {
        Self {
            label,
            hint,
            input: FieldInput::Number {
                value,
                min: range.0,
                max: range.1,
                integer,
            },
        }
    }

    fn choice(
        label: &'static str,
        hint: &'static str,
        options: &'static [&'static str],
        selected: usize,
    ) -> Self {
        Self {
            label,
            hint,
            input: FieldInput::Choice { options, selected },
        }
    }

    fn parse_number(&self) -> Result<f64, String> {
        let FieldInput::Number {
            value,
            min,
            max,
            integer,
        } = &self.input
        else {
            return Err(format!("{}: not a numeric field", self.label));
        };

        let parsed: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("{}: Invalid number", self.label))?;

        if !parsed.is_finite() || parsed < *min || parsed > *max {
            return Err(format!(
                "{}: Value must be between {} and {}",
                self.label, min, max
            ));
        }
        if *integer && parsed.fract() != 0.0 {
            return Err(format!("{}: Must be a whole number", self.label));
        }

        Ok(parsed)
    }

    fn selected(&self) -> usize {
        match self.input {
            FieldInput::Choice { selected, .. } => selected,
            FieldInput::Number { .. } => 0,
        }
    }
}

// Field order; `to_metrics` reads by these indices.
const AGE: usize = 0;
const GENDER: usize = 1;
const HEIGHT: usize = 2;
const WEIGHT: usize = 3;
const SYSTOLIC: usize = 4;
const DIASTOLIC: usize = 5;
const CHOLESTEROL: usize = 6;
const GLUCOSE: usize = 7;
const SMOKER: usize = 8;
const ALCOHOL: usize = 9;
const ACTIVE: usize = 10;

/// Questionnaire form state
pub struct QuestionnaireState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for QuestionnaireState {
    fn default() -> Self {
        Self::from_metrics(&Metrics::default())
    }
}

fn range_of(range: (u32, u32)) -> (f64, f64) {
    (f64::from(range.0), f64::from(range.1))
}

fn level_index(level: Level) -> usize {
    usize::from(level.code().saturating_sub(1))
}

impl QuestionnaireState {
    /// Build a form pre-filled with `metrics`.
    #[must_use]
    pub fn from_metrics(m: &Metrics) -> Self {
        Self {
            fields: vec![
                FormField::number(
                    "Age",
                    "years (18-100)",
                    m.age.to_string(),
                    range_of(AGE_RANGE),
                    true,
                ),
                FormField::choice(
                    "Gender",
                    "←/→ to change",
                    GENDER_OPTIONS,
                    usize::from(m.gender == Gender::Male),
                ),
                FormField::number(
                    "Height",
                    "cm (100-250)",
                    m.height_cm.to_string(),
                    HEIGHT_RANGE,
                    true,
                ),
                FormField::number(
                    "Weight",
                    "kg (30-200)",
                    m.weight_kg.to_string(),
                    WEIGHT_RANGE,
                    false,
                ),
                FormField::number(
                    "Systolic BP",
                    "mmHg (80-200)",
                    m.systolic_bp.to_string(),
                    range_of(SYSTOLIC_RANGE),
                    true,
                ),
                FormField::number(
                    "Diastolic BP",
                    "mmHg (50-150)",
                    m.diastolic_bp.to_string(),
                    range_of(DIASTOLIC_RANGE),
                    true,
                ),
                FormField::choice(
                    "Cholesterol",
                    "←/→ to change",
                    LEVEL_OPTIONS,
                    level_index(m.cholesterol),
                ),
                FormField::choice(
                    "Glucose",
                    "←/→ to change",
                    LEVEL_OPTIONS,
                    level_index(m.glucose),
                ),
                FormField::choice("Smoker", "Space to toggle", YES_NO, usize::from(m.smoker)),
                FormField::choice(
                    "Alcohol",
                    "Space to toggle",
                    YES_NO,
                    usize::from(m.drinks_alcohol),
                ),
                FormField::choice(
                    "Physically Active",
                    "Space to toggle",
                    YES_NO,
                    usize::from(m.physically_active),
                ),
            ],
            selected_field: 0,
            error_message: None,
        }
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add a character to the current field. Space cycles choice fields.
    pub fn input_char(&mut self, c: char) {
        match &mut self.fields[self.selected_field].input {
            FieldInput::Number { value, .. } => {
                if c.is_ascii_digit() || c == '.' {
                    value.push(c);
                    self.error_message = None;
                }
            }
            FieldInput::Choice { .. } => {
                if c == ' ' {
                    self.cycle(true);
                }
            }
        }
    }

    /// Step the current choice field forward or back.
    pub fn cycle(&mut self, forward: bool) {
        if let FieldInput::Choice { options, selected } =
            &mut self.fields[self.selected_field].input
        {
            let n = options.len();
            *selected = if forward {
                (*selected + 1) % n
            } else {
                (*selected + n - 1) % n
            };
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let FieldInput::Number { value, .. } = &mut self.fields[self.selected_field].input {
            value.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        if let FieldInput::Number { value, .. } = &mut self.fields[self.selected_field].input {
            value.clear();
        }
    }

    /// Wipe all field buffers from memory.
    ///
    /// Called right after a submission is accepted so typed vitals do not
    /// linger in UI state while the request is in flight.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            match &mut field.input {
                FieldInput::Number { value, .. } => value.zeroize(),
                FieldInput::Choice { selected, .. } => *selected = 0,
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Validate and convert to `Metrics`
    pub fn to_metrics(&self) -> Result<Metrics, String> {
        let whole = |i: usize| -> Result<u32, String> {
            // Range-checked and integral, so the cast is exact.
            self.fields[i].parse_number().map(|v| v as u32)
        };
        let level = |i: usize| -> Level {
            u8::try_from(self.fields[i].selected() + 1)
                .ok()
                .and_then(Level::from_code)
                .unwrap_or_default()
        };
        let yes = |i: usize| self.fields[i].selected() == 1;
        let gender = u8::try_from(self.fields[GENDER].selected() + 1)
            .ok()
            .and_then(Gender::from_code)
            .unwrap_or_default();

        let metrics = Metrics {
            age: whole(AGE)?,
            gender,
            height_cm: self.fields[HEIGHT].parse_number()?,
            weight_kg: self.fields[WEIGHT].parse_number()?,
            systolic_bp: whole(SYSTOLIC)?,
            diastolic_bp: whole(DIASTOLIC)?,
            cholesterol: level(CHOLESTEROL),
            glucose: level(GLUCOSE),
            smoker: yes(SMOKER),
            drinks_alcohol: yes(ALCOHOL),
            physically_active: yes(ACTIVE),
        };

        metrics.validate().map_err(|errors| errors.join(", "))?;
        Ok(metrics)
    }

    /// Load sample data (older smoker with elevated labs)
    pub fn load_sample_data(&mut self) {
        let sample = Metrics {
            age: 58,
            gender: Gender::Male,
            height_cm: 172.0,
            weight_kg: 88.0,
            systolic_bp: 145,
            diastolic_bp: 92,
            cholesterol: Level::AboveNormal,
            glucose: Level::Normal,
            smoker: true,
            drinks_alcohol: false,
            physically_active: false,
        };
        let selected = self.selected_field;
        *self = Self::from_metrics(&sample);
        self.selected_field = selected;
    }
}

/// Render the questionnaire
pub fn render_questionnaire(
    f: &mut Frame,
    area: Rect,
    state: &QuestionnaireState,
    status: &ServiceStatus,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    super::render_header(f, chunks[0], "Health Questionnaire", status);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &QuestionnaireState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        match &field.input {
            FieldInput::Number { value, .. } if value.is_empty() => {
                spans.push(Span::styled(field.hint, MedicalTheme::text_muted()));
            }
            FieldInput::Number { value, .. } => {
                spans.push(Span::styled(value.as_str(), MedicalTheme::text()));
                if is_selected {
                    spans.push(Span::styled("▌", MedicalTheme::cursor()));
                }
            }
            FieldInput::Choice { options, selected } => {
                let current = options.get(*selected).copied().unwrap_or_default();
                if is_selected {
                    spans.push(Span::styled("◂ ", MedicalTheme::key_hint()));
                    spans.push(Span::styled(current, MedicalTheme::text()));
                    spans.push(Span::styled(" ▸", MedicalTheme::key_hint()));
                } else {
                    spans.push(Span::styled(current, MedicalTheme::text()));
                }
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &QuestionnaireState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Change ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Assess ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Defaults ", MedicalTheme::key_desc()),
            Span::styled("[F5] ", MedicalTheme::key_hint()),
            Span::styled("Recheck Service", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
