use crate::domain::{DeliveryOutcome, EmailRequest, RelayIdentity, classify_relay_response};
use crate::infra::Outbox;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("email relay is not configured (missing {0})")]
    NotConfigured(String),

    #[error("failed to reach email relay: {0}")]
    Transport(String),

    #[error("failed to read email relay response: {0}")]
    ReadBody(String),
}

pub trait EmailRelay: Send + Sync {
    fn send(&self, request: &EmailRequest) -> Result<RelayResponse, RelayError>;
}

/// Blocking HTTP client for the relay's send endpoint.
#[derive(Debug)]
pub struct UreqRelay {
    endpoint: String,
    agent: ureq::Agent,
}

impl UreqRelay {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: make_agent(timeout),
        }
    }
}

impl EmailRelay for UreqRelay {
    fn send(&self, request: &EmailRequest) -> Result<RelayResponse, RelayError> {
        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .send_json(request)
            .map_err(|error| RelayError::Transport(error.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|error| RelayError::ReadBody(error.to_string()))?;
        Ok(RelayResponse { status, body })
    }
}

// Non-2xx statuses must come back as responses: the mailbox error is only
// recognisable from the status plus body text.
fn make_agent(timeout: Option<Duration>) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(timeout)
        .http_status_as_error(false)
        .build();
    config.into()
}

/// Sends one request and folds every failure into a `DeliveryOutcome`.
///
/// Mailbox failures are written to `outbox` so the message can be handled by
/// hand; a failing outbox only gets logged.
pub fn deliver(
    relay: &dyn EmailRelay,
    outbox: Option<&Outbox>,
    request: &EmailRequest,
) -> DeliveryOutcome {
    let identity = RelayIdentity {
        service_id: request.service_id.clone(),
        template_id: request.template_id.clone(),
        public_key: request.user_id.clone(),
    };
    let missing = identity.missing_fields();
    if !missing.is_empty() {
        let error = RelayError::NotConfigured(missing.join(", "));
        tracing::warn!(%error, "skipping email relay call");
        return DeliveryOutcome::Failed {
            reason: error.to_string(),
        };
    }

    tracing::info!(
        template_id = %request.template_id,
        reply_to = %request.template_params.reply_to,
        "sending contact message"
    );

    let response = match relay.send(request) {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(%error, "email relay call failed");
            return DeliveryOutcome::Failed {
                reason: error.to_string(),
            };
        }
    };

    let outcome = classify_relay_response(response.status, &response.body);
    match &outcome {
        DeliveryOutcome::Sent => tracing::info!("contact message delivered"),
        DeliveryOutcome::MailboxUnavailable => {
            tracing::warn!(status = response.status, body = %response.body, "relay mailbox unavailable");
            if let Some(outbox) = outbox {
                match outbox.save(request, response.status, response.body.trim()) {
                    Ok(record) => tracing::info!(id = %record.id, path = %outbox.path().display(), "saved message to outbox"),
                    Err(error) => tracing::error!(%error, "failed to save message to outbox"),
                }
            }
        }
        DeliveryOutcome::Failed { reason } => tracing::warn!(%reason, "relay rejected contact message"),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TemplateParams;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Mutex;
    use std::thread::{self, JoinHandle};

    fn request() -> EmailRequest {
        EmailRequest {
            service_id: "service_test".to_string(),
            template_id: "template_test".to_string(),
            user_id: "pk_test".to_string(),
            template_params: TemplateParams {
                from_name: "Jane Doe".to_string(),
                reply_to: "jane@example.com".to_string(),
                message: "Hello, I would like a quote.".to_string(),
                to_name: "Orbit-Ops Team".to_string(),
            },
        }
    }

    struct CannedRelay {
        reply: Result<RelayResponse, String>,
        calls: Mutex<Vec<EmailRequest>>,
    }

    impl CannedRelay {
        fn status(status: u16, body: &str) -> Self {
            Self {
                reply: Ok(RelayResponse {
                    status,
                    body: body.to_string(),
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                reply: Err("connection refused".to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
        }
    }

    impl EmailRelay for CannedRelay {
        fn send(&self, request: &EmailRequest) -> Result<RelayResponse, RelayError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(request.clone());
            }
            self.reply.clone().map_err(RelayError::Transport)
        }
    }

    #[test]
    fn deliver_reports_sent_on_200() {
        let relay = CannedRelay::status(200, "OK");
        assert_eq!(deliver(&relay, None, &request()), DeliveryOutcome::Sent);
        assert_eq!(relay.call_count(), 1);
    }

    #[test]
    fn deliver_folds_transport_errors_into_failure() {
        let relay = CannedRelay::unreachable();
        let outcome = deliver(&relay, None, &request());
        assert!(matches!(outcome, DeliveryOutcome::Failed { reason } if reason.contains("connection refused")));
    }

    #[test]
    fn deliver_skips_the_call_without_identifiers() {
        let relay = CannedRelay::status(200, "OK");
        let mut incomplete = request();
        incomplete.user_id.clear();

        let outcome = deliver(&relay, None, &incomplete);
        assert!(matches!(outcome, DeliveryOutcome::Failed { reason } if reason.contains("public_key")));
        assert_eq!(relay.call_count(), 0);
    }

    #[test]
    fn mailbox_error_lands_in_outbox() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outbox = Outbox::in_state_dir(dir.path());
        let relay = CannedRelay::status(412, "Gmail_API: Invalid grant. Please reconnect your Gmail account");

        let outcome = deliver(&relay, Some(&outbox), &request());
        assert_eq!(outcome, DeliveryOutcome::MailboxUnavailable);

        let listing = outbox.load().expect("load");
        assert_eq!(listing.records.len(), 1);
        assert_eq!(listing.records[0].message, "Hello, I would like a quote.");
        assert_eq!(listing.records[0].status, 412);
    }

    #[test]
    fn plain_failures_do_not_touch_outbox() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outbox = Outbox::in_state_dir(dir.path());
        let relay = CannedRelay::status(500, "Internal Server Error");

        let outcome = deliver(&relay, Some(&outbox), &request());
        assert!(matches!(outcome, DeliveryOutcome::Failed { .. }));
        assert!(!outbox.path().exists());
    }

    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let raw = read_http_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).expect("write response");
            stream.flush().expect("flush");
            raw
        });
        (format!("http://{addr}/api/v1.0/email/send"), handle)
    }

    fn read_http_request(stream: &mut TcpStream) -> String {
        let mut buffer: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = stream.read(&mut chunk).expect("read request");
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&buffer).into_owned();
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let head = text[..header_end].to_ascii_lowercase();
            let body_len = text.len() - header_end - 4;
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok());
            match content_length {
                Some(expected) if body_len >= expected => break,
                Some(_) => continue,
                None if text.ends_with("0\r\n\r\n") => break,
                None => continue,
            }
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    #[test]
    fn ureq_relay_posts_json_and_returns_error_statuses() {
        let (endpoint, server) = serve_once("500 Internal Server Error", "oops");
        let relay = UreqRelay::new(&endpoint, Some(Duration::from_secs(5)));

        let response = relay.send(&request()).expect("response");
        assert_eq!(response.status, 500);
        assert_eq!(response.body, "oops");

        let raw = server.join().expect("server thread");
        assert!(raw.starts_with("POST /api/v1.0/email/send"));
        let (head, body) = raw.split_once("\r\n\r\n").expect("header terminator");
        assert!(head.to_ascii_lowercase().contains("content-type: application/json"));

        let sent: serde_json::Value = serde_json::from_str(body).expect("json body");
        let expected = serde_json::to_value(request()).expect("encode request");
        assert_eq!(sent, expected);
        assert_eq!(sent["template_params"]["from_name"], "Jane Doe");
    }

    #[test]
    fn ureq_relay_reports_success_status() {
        let (endpoint, server) = serve_once("200 OK", "OK");
        let relay = UreqRelay::new(&endpoint, Some(Duration::from_secs(5)));

        let outcome = deliver(&relay, None, &request());
        assert_eq!(outcome, DeliveryOutcome::Sent);
        server.join().expect("server thread");
    }

    #[test]
    fn ureq_relay_maps_refused_connection_to_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let relay = UreqRelay::new(&format!("http://{addr}/send"), Some(Duration::from_secs(2)));
        let error = relay.send(&request()).expect_err("transport error");
        assert!(matches!(error, RelayError::Transport(_)));
    }
}
