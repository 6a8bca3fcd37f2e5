//! Main TUI application.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Driving the assessment state machine
//! - Non-blocking prediction and health calls via background workers

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::application::{AssessmentMachine, AssessmentState, Completion};
use crate::ports::RiskPredictor;

use super::ui::{
    assessment::render_assessment,
    questionnaire::{render_questionnaire, QuestionnaireState},
    render_disclaimer, ServiceStatus,
};
use super::worker::{HealthCheckHandle, PredictionProgress, PredictionWorker, PredictionWorkerHandle};

/// Loading gauge never reaches 100% on its own; completion replaces it.
const PROGRESS_CEILING: f64 = 0.95;
const PROGRESS_FLOOR: f64 = 0.02;
/// Time constant of the gauge's approach to the ceiling, in seconds.
const PROGRESS_TAU: f64 = 2.5;

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Questionnaire,
    Assessment,
}

/// Main application state
pub struct App {
    screen: Screen,

    should_quit: bool,

    predictor: Arc<dyn RiskPredictor>,

    machine: AssessmentMachine,

    form: QuestionnaireState,

    /// In-flight `/predict` call, if any
    pending_worker: Option<PredictionWorkerHandle>,

    /// In-flight `/health` check, if any
    health_check: Option<HealthCheckHandle>,

    service_status: ServiceStatus,

    /// Cosmetic gauge value while submitting
    progress: f64,

    progress_started_at: Option<Instant>,
}

impl App {
    /// Create an application bound to `predictor` and start a health check.
    #[must_use]
    pub fn new(predictor: Arc<dyn RiskPredictor>) -> Self {
        let health_check = Some(HealthCheckHandle::spawn(predictor.clone()));

        Self {
            screen: Screen::Questionnaire,
            should_quit: false,
            predictor,
            machine: AssessmentMachine::new(),
            form: QuestionnaireState::default(),
            pending_worker: None,
            health_check,
            service_status: ServiceStatus::Checking,
            progress: 0.0,
            progress_started_at: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_health();
            self.poll_worker();
            self.tick_progress();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::Questionnaire => {
                        render_questionnaire(f, chunks[0], &self.form, &self.service_status)
                    }
                    Screen::Assessment => render_assessment(
                        f,
                        chunks[0],
                        self.machine.state(),
                        self.progress,
                        &self.service_status,
                    ),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            // Short poll to keep the gauge animating
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn poll_health(&mut self) {
        let Some(result) = self.health_check.as_ref().and_then(HealthCheckHandle::try_recv) else {
            return;
        };

        match &result {
            Ok(health) => tracing::info!(
                status = %health.status,
                model_loaded = health.model_loaded,
                version = %health.version,
                "Prediction service health"
            ),
            Err(e) => tracing::warn!(error = %e, "Prediction service health check failed"),
        }

        self.service_status = ServiceStatus::from(result);
        self.health_check = None;
    }

    fn recheck_health(&mut self) {
        self.service_status = ServiceStatus::Checking;
        self.health_check = Some(HealthCheckHandle::spawn(self.predictor.clone()));
    }

    /// Drain the prediction worker and feed its outcome to the machine.
    fn poll_worker(&mut self) {
        while let Some(progress) = self
            .pending_worker
            .as_ref()
            .and_then(PredictionWorkerHandle::try_recv)
        {
            match progress {
                PredictionProgress::Sending => {
                    if self.progress_started_at.is_none() {
                        self.progress_started_at = Some(Instant::now());
                    }
                }
                PredictionProgress::Complete { epoch, outcome } => {
                    let unreachable = matches!(&outcome, Err(e) if e.is_network());

                    match self.machine.complete(epoch, outcome) {
                        Completion::Stale => {}
                        Completion::Fallback if unreachable => {
                            self.service_status = ServiceStatus::Offline;
                        }
                        _ => {}
                    }

                    self.pending_worker = None;
                    self.progress_started_at = None;
                    break;
                }
            }
        }
    }

    fn tick_progress(&mut self) {
        if self.pending_worker.is_none() {
            return;
        }
        let Some(started_at) = self.progress_started_at else {
            return;
        };

        let elapsed = Instant::now()
            .saturating_duration_since(started_at)
            .as_secs_f64();

        // Smooth, monotonic fake progress approaching the ceiling.
        let k = 1.0 - (-elapsed / PROGRESS_TAU).exp();
        let desired = PROGRESS_FLOOR + (PROGRESS_CEILING - PROGRESS_FLOOR) * k;
        self.progress = desired.max(self.progress).min(PROGRESS_CEILING);
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Questionnaire => self.handle_questionnaire_key(key),
            Screen::Assessment => self.handle_assessment_key(key),
        }
    }

    fn handle_questionnaire_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::BackTab => self.form.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form.next_field(),
            KeyCode::Left => self.form.cycle(false),
            KeyCode::Right => self.form.cycle(true),
            KeyCode::Char('s') | KeyCode::Char('S') => self.form.load_sample_data(),
            KeyCode::Char(c) => self.form.input_char(c),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::Delete => self.form.clear_field(),
            KeyCode::Esc => self.form = QuestionnaireState::default(),
            KeyCode::F(5) => self.recheck_health(),
            KeyCode::Enter => self.submit_questionnaire(),
            _ => {}
        }
    }

    fn handle_assessment_key(&mut self, key: KeyCode) {
        if self.machine.is_submitting() {
            if key == KeyCode::Esc {
                self.cancel_submission();
            }
            return;
        }

        match key {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.start_over();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn submit_questionnaire(&mut self) {
        let metrics = match self.form.to_metrics() {
            Ok(metrics) => metrics,
            Err(e) => {
                self.form.error_message = Some(e);
                return;
            }
        };

        let Some(submission) = self.machine.submit(metrics) else {
            return;
        };

        self.screen = Screen::Assessment;
        self.progress = 0.0;
        self.progress_started_at = Some(Instant::now());
        self.pending_worker = Some(PredictionWorker::spawn(self.predictor.clone(), submission));

        // Clear plaintext buffers from the UI immediately.
        self.form.clear_sensitive();
    }

    /// Abandon the in-flight request and return to the questionnaire with
    /// the submitted answers restored.
    fn cancel_submission(&mut self) {
        if let AssessmentState::Submitting { metrics, .. } = self.machine.state() {
            self.form = QuestionnaireState::from_metrics(metrics);
        }
        self.machine.reset();
        self.pending_worker = None;
        self.progress_started_at = None;
        self.screen = Screen::Questionnaire;
    }

    /// Discard the result and start a fresh questionnaire.
    fn start_over(&mut self) {
        self.machine.reset();
        self.form = QuestionnaireState::default();
        self.screen = Screen::Questionnaire;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metrics, PredictionRequest, RemotePrediction, ServiceHealth, Source};
    use crate::ports::PredictorError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers `/predict` after `delay`, counting calls.
    struct SlowPredictor {
        delay: Duration,
        outcome: Result<RemotePrediction, PredictorError>,
        calls: AtomicUsize,
    }

    impl SlowPredictor {
        fn new(delay: Duration, outcome: Result<RemotePrediction, PredictorError>) -> Arc<Self> {
            Arc::new(Self {
                delay,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl RiskPredictor for SlowPredictor {
        fn predict(&self, _: &PredictionRequest) -> Result<RemotePrediction, PredictorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.outcome.clone()
        }

        fn health(&self) -> Result<ServiceHealth, PredictorError> {
            Err(PredictorError::Network("refused".to_string()))
        }
    }

    fn remote(score: f64) -> RemotePrediction {
        RemotePrediction {
            risk_score: score,
            risk_level: None,
            prediction: None,
            risk_factors: None,
            recommendations: None,
            bmi: None,
            message: None,
        }
    }

    fn wait_for_worker(app: &mut App) {
        for _ in 0..500 {
            app.poll_worker();
            if app.pending_worker.is_none() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("worker did not finish");
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_submit_resolves_through_worker() {
        let predictor = SlowPredictor::new(Duration::ZERO, Ok(remote(40.0)));
        let mut app = App::new(predictor.clone());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Assessment);
        assert!(app.machine.is_submitting());

        wait_for_worker(&mut app);
        let result = app.machine.result().expect("resolved");
        assert_eq!(result.source, Source::Remote);
        assert_eq!(result.risk_score, 40);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unreachable_service_falls_back_and_marks_offline() {
        let predictor = SlowPredictor::new(
            Duration::ZERO,
            Err(PredictorError::Network("connection refused".to_string())),
        );
        let mut app = App::new(predictor);

        press(&mut app, KeyCode::Enter);
        wait_for_worker(&mut app);

        assert_eq!(app.machine.result().map(|r| r.source), Some(Source::Fallback));
        assert!(app.machine.advisory().is_some());
        assert_eq!(app.service_status, ServiceStatus::Offline);
    }

    #[test]
    fn test_invalid_form_does_not_submit() {
        let predictor = SlowPredictor::new(Duration::ZERO, Ok(remote(40.0)));
        let mut app = App::new(predictor.clone());

        // Age is the first field
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Questionnaire);
        assert!(app.form.error_message.is_some());
        assert!(app.pending_worker.is_none());
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_enter_while_loading_does_not_resubmit() {
        let predictor = SlowPredictor::new(Duration::from_millis(100), Ok(remote(40.0)));
        let mut app = App::new(predictor.clone());

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('n'));
        assert!(app.machine.is_submitting());

        wait_for_worker(&mut app);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_restores_answers_and_ignores_late_reply() {
        let predictor = SlowPredictor::new(Duration::from_millis(200), Ok(remote(80.0)));
        let mut app = App::new(predictor);

        app.form.load_sample_data();
        let submitted = app.form.to_metrics().unwrap();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.screen, Screen::Questionnaire);
        assert_eq!(app.machine.state(), &AssessmentState::Idle);
        assert!(app.pending_worker.is_none());
        assert_eq!(app.form.to_metrics().unwrap(), submitted);

        std::thread::sleep(Duration::from_millis(300));
        app.poll_worker();
        assert_eq!(app.machine.state(), &AssessmentState::Idle);
    }

    #[test]
    fn test_new_assessment_resets_to_defaults() {
        let predictor = SlowPredictor::new(Duration::ZERO, Ok(remote(40.0)));
        let mut app = App::new(predictor);

        app.form.load_sample_data();
        press(&mut app, KeyCode::Enter);
        wait_for_worker(&mut app);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::Questionnaire);
        assert!(app.machine.result().is_none());
        assert_eq!(app.form.to_metrics().unwrap(), Metrics::default());
    }

    #[test]
    fn test_progress_is_capped() {
        let predictor = SlowPredictor::new(Duration::from_millis(200), Ok(remote(40.0)));
        let mut app = App::new(predictor);

        press(&mut app, KeyCode::Enter);
        app.progress_started_at = Instant::now().checked_sub(Duration::from_secs(60));
        app.tick_progress();

        assert!(app.progress > 0.9);
        assert!(app.progress <= PROGRESS_CEILING);
    }

    #[test]
    fn test_ctrl_q_quits() {
        let predictor = SlowPredictor::new(Duration::ZERO, Ok(remote(40.0)));
        let mut app = App::new(predictor);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_health_check_sets_status() {
        let predictor = SlowPredictor::new(Duration::ZERO, Ok(remote(40.0)));
        let mut app = App::new(predictor);
        for _ in 0..500 {
            app.poll_health();
            if app.health_check.is_none() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(app.service_status, ServiceStatus::Offline);
    }
}
