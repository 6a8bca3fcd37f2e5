//! HTTP adapter: reqwest-based client for the remote prediction service.
//!
//! Speaks the service's JSON contract:
//! - `POST {base}/predict` with a [`PredictionRequest`] body
//! - `GET {base}/health` for the status indicator
//!
//! Every call is a single exchange bounded by the configured timeout.
//! Transport failures become `PredictorError::Network`; anything the service
//! answers that is not a usable payload becomes `PredictorError::Service`.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use crate::domain::{PredictionRequest, RemotePrediction, ServiceHealth};
use crate::ports::{PredictorError, RiskPredictor};
use crate::CardioError;

/// Longest error body echoed into a `PredictorError::Service` detail.
const MAX_DETAIL_CHARS: usize = 200;

/// Blocking HTTP client for the prediction service.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: Client,
    base_url: String,
    timeout: Duration,
}

/// FastAPI-style error body: `{"detail": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

impl HttpPredictor {
    /// Create a client for the service rooted at `base_url`.
    ///
    /// # Errors
    /// Returns `CardioError::Config` if the URL is not plain `http://` (the
    /// client is built without a TLS backend) or the underlying client cannot
    /// be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> crate::Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.starts_with("https://") {
            return Err(CardioError::Config(format!(
                "TLS is not supported; use an http:// prediction service URL, got {base_url:?}"
            )));
        }
        if !base_url.starts_with("http://") {
            return Err(CardioError::Config(format!(
                "prediction service URL must start with http://, got {base_url:?}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| CardioError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Map a transport-level reqwest error onto the port's taxonomy.
    fn classify(&self, err: &reqwest::Error) -> PredictorError {
        if err.is_timeout() {
            PredictorError::Network(format!("timed out after {:?}", self.timeout))
        } else if err.is_decode() {
            PredictorError::Service {
                status: None,
                detail: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            PredictorError::Service {
                status: Some(status.as_u16()),
                detail: err.to_string(),
            }
        } else {
            PredictorError::Network(err.to_string())
        }
    }

    /// Turn a non-2xx response into `PredictorError::Service`.
    fn ensure_success(response: Response) -> Result<Response, PredictorError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.detail,
            Err(_) => body.chars().take(MAX_DETAIL_CHARS).collect(),
        };

        Err(PredictorError::Service {
            status: Some(status.as_u16()),
            detail,
        })
    }

    fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, PredictorError> {
        let body = response.text().map_err(|e| PredictorError::Service {
            status: None,
            detail: format!("failed to read response body: {e}"),
        })?;
        serde_json::from_str(&body).map_err(|e| PredictorError::Service {
            status: None,
            detail: format!("malformed response: {e}"),
        })
    }
}

impl RiskPredictor for HttpPredictor {
    fn predict(&self, request: &PredictionRequest) -> Result<RemotePrediction, PredictorError> {
        let url = self.endpoint("predict");
        tracing::debug!(%url, "Submitting prediction request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| self.classify(&e))?;
        let response = Self::ensure_success(response)?;

        let prediction: RemotePrediction = Self::decode(response)?;
        prediction
            .check()
            .map_err(|detail| PredictorError::Service {
                status: None,
                detail,
            })?;

        tracing::debug!(
            risk_score = prediction.risk_score,
            prediction = ?prediction.prediction,
            "Prediction received"
        );
        Ok(prediction)
    }

    fn health(&self) -> Result<ServiceHealth, PredictorError> {
        let url = self.endpoint("health");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.classify(&e))?;
        let response = Self::ensure_success(response)?;
        Self::decode(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metrics, RiskLevel};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// One-shot loopback server: answers the first request with `status` and
    /// `body`, and reports the raw request it received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let request = read_request(&mut stream);
            let _ = tx.send(request);
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        });

        (format!("http://{addr}"), rx)
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn client(base: &str) -> HttpPredictor {
        HttpPredictor::new(base, Duration::from_secs(5)).expect("client builds")
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            HttpPredictor::new("localhost:8000", Duration::from_secs(1)),
            Err(CardioError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_https_url_without_tls_backend() {
        match HttpPredictor::new("https://cardio.example.org", Duration::from_secs(1)) {
            Err(CardioError::Config(msg)) => assert!(msg.contains("TLS")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let predictor = client("http://localhost:8000/");
        assert_eq!(predictor.base_url(), "http://localhost:8000");
        assert_eq!(predictor.endpoint("predict"), "http://localhost:8000/predict");
    }

    #[test]
    fn test_predict_success() {
        let (base, requests) = serve_once(
            "200 OK",
            r#"{"success":true,"risk_score":67.4,"risk_level":"high","prediction":1,"risk_factors":["Smoking"],"recommendations":["Consider smoking cessation programs"],"bmi":24.2,"message":"See a doctor"}"#,
        );
        let request = PredictionRequest::build(&Metrics::default());

        let prediction = client(&base).predict(&request).expect("should predict");
        assert!((prediction.risk_score - 67.4).abs() < f64::EPSILON);
        assert_eq!(prediction.risk_level, Some(RiskLevel::High));
        assert_eq!(prediction.risk_factors, Some(vec!["Smoking".to_string()]));

        let raw = requests.recv().expect("request captured");
        assert!(raw.starts_with("POST /predict "));
        assert!(raw.contains("\"ap_hi\":120"));
        assert!(raw.contains("\"active\":1"));
    }

    #[test]
    fn test_non_success_status_is_service_error() {
        let (base, _requests) = serve_once(
            "503 Service Unavailable",
            r#"{"detail":"Model not loaded. Please try again later."}"#,
        );
        let err = client(&base)
            .predict(&PredictionRequest::build(&Metrics::default()))
            .expect_err("should fail");
        assert_eq!(
            err,
            PredictorError::Service {
                status: Some(503),
                detail: "Model not loaded. Please try again later.".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_payload_is_service_error() {
        let (base, _requests) = serve_once("200 OK", r#"{"risk_level":"low"}"#);
        let err = client(&base)
            .predict(&PredictionRequest::build(&Metrics::default()))
            .expect_err("should fail");
        assert!(matches!(err, PredictorError::Service { status: None, .. }));
    }

    #[test]
    fn test_out_of_range_score_is_service_error() {
        let (base, _requests) = serve_once("200 OK", r#"{"risk_score":250.0}"#);
        let err = client(&base)
            .predict(&PredictionRequest::build(&Metrics::default()))
            .expect_err("should fail");
        assert!(matches!(err, PredictorError::Service { status: None, .. }));
    }

    #[test]
    fn test_unreachable_is_network_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let predictor =
            HttpPredictor::new(&format!("http://127.0.0.1:{port}"), Duration::from_secs(2))
                .expect("client builds");
        let err = predictor
            .predict(&PredictionRequest::build(&Metrics::default()))
            .expect_err("nothing listens on the port");
        assert!(err.is_network());
    }

    #[test]
    fn test_timeout_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let hold = thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_millis(1500));
                drop(stream);
            }
        });

        let predictor = HttpPredictor::new(&format!("http://{addr}"), Duration::from_millis(300))
            .expect("client builds");
        let err = predictor
            .predict(&PredictionRequest::build(&Metrics::default()))
            .expect_err("server never answers");
        assert!(err.is_network());
        let _ = hold.join();
    }

    #[test]
    fn test_health() {
        let (base, requests) = serve_once(
            "200 OK",
            r#"{"status":"healthy","model_loaded":true,"scaler_loaded":true,"version":"1.0.0"}"#,
        );
        let health = client(&base).health().expect("healthy");
        assert!(health.is_ready());
        assert_eq!(health.version, "1.0.0");
        assert!(requests.recv().expect("captured").starts_with("GET /health "));
    }
}
