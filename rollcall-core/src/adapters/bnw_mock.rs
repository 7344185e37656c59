//! Mock BnW API server for testing
//!
//! Simulates the two commands the client uses:
//! - POST /userlist (form `page`) returns { ok: true, users: [...] }
//! - POST /post (form `text`, `login`) returns { ok: true, id: "..." }
//!
//! Posted messages are recorded so tests can assert on them.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde::Serialize;

use crate::domain::{IdentityKey, UserRecord};

/// Mock BnW server for testing
pub struct MockBnwServer {
    port: u16,
    running: Arc<AtomicBool>,
    posts: Arc<Mutex<Vec<RecordedPost>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// A message received by the mock `post` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPost {
    pub text: String,
    pub login: String,
}

/// Configuration for the mock server
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Users served by `userlist`, in page order
    pub users: Vec<UserRecord>,
    /// Users per page
    pub page_size: usize,
    /// Only this login may post
    pub valid_login: String,
    /// Respond to every request with this status
    pub fail_status: Option<u16>,
    /// Fixed 200 body for `userlist`, replacing the paged user list
    pub userlist_body: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            users: generate_mock_users(5),
            page_size: 2,
            valid_login: "test_token".to_string(),
            fail_status: None,
            userlist_body: None,
        }
    }
}

#[derive(Serialize)]
struct UserListResponse<'a> {
    ok: bool,
    users: &'a [UserRecord],
}

#[derive(Serialize)]
struct PostResponse {
    ok: bool,
    id: String,
}

impl MockBnwServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let posts = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking accept so stop() can end the loop
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let posts_clone = posts.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        handle_connection(stream, &config, &posts_clone);
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            posts,
            thread_handle: Some(thread_handle),
        })
    }

    /// Base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api/", self.port)
    }

    /// Messages received so far
    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBnwServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read the request line, headers and a Content-Length body
fn read_request(stream: &mut TcpStream) -> std::io::Result<(String, String, String)> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body)?;

    Ok((method, path, String::from_utf8_lossy(&body).into_owned()))
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, posts: &Mutex<Vec<RecordedPost>>) {
    // Accepted sockets may inherit non-blocking mode on some platforms
    let _ = stream.set_nonblocking(false);

    let Ok((method, path, body)) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"ok": false}"#);
        return;
    };

    if let Some(status) = config.fail_status {
        send_response(&mut stream, status, "Error", r#"{"ok": false, "desc": "mock failure"}"#);
        return;
    }

    if method != "POST" {
        send_response(&mut stream, 405, "Method Not Allowed", r#"{"ok": false}"#);
        return;
    }

    let form: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect();
    let field = |name: &str| {
        form.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };

    match path.split('?').next().unwrap_or("") {
        "/api/userlist" => {
            if let Some(body) = &config.userlist_body {
                send_response(&mut stream, 200, "OK", body);
                return;
            }
            let page: usize = field("page").and_then(|p| p.parse().ok()).unwrap_or(0);
            let start = (page * config.page_size).min(config.users.len());
            let end = (start + config.page_size).min(config.users.len());
            let response = UserListResponse {
                ok: true,
                users: &config.users[start..end],
            };
            let json = serde_json::to_string(&response).unwrap_or_default();
            send_response(&mut stream, 200, "OK", &json);
        }
        "/api/post" => {
            let login = field("login").unwrap_or_default();
            if login != config.valid_login {
                send_response(&mut stream, 403, "Forbidden", r#"{"ok": false, "desc": "bad login"}"#);
                return;
            }
            let text = field("text").unwrap_or_default();
            let id = {
                let mut recorded = match posts.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                recorded.push(RecordedPost { text, login });
                format!("MSG{}", recorded.len())
            };
            let json = serde_json::to_string(&PostResponse { ok: true, id }).unwrap_or_default();
            send_response(&mut stream, 200, "OK", &json);
        }
        _ => {
            send_response(&mut stream, 404, "Not Found", r#"{"ok": false, "desc": "no such command"}"#);
        }
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Deterministic users with alternating integer and fractional keys
pub fn generate_mock_users(count: usize) -> Vec<UserRecord> {
    (0..count)
        .map(|i| {
            let base = 1_300_000_000 + (i as i64) * 86_400;
            let key = if i % 2 == 0 {
                IdentityKey::Int(base)
            } else {
                IdentityKey::Float(base as f64 + 0.5)
            };
            UserRecord {
                username: format!("user{:02}", i + 1),
                identity_key: key,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::bnw::BnwClient;
    use crate::domain::result::Error;
    use crate::ports::ForumApi;
    use crate::services::RosterFetcher;

    #[test]
    fn test_fetch_single_page() {
        let server = MockBnwServer::start(MockConfig::default()).unwrap();
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        let page = client.fetch_user_page(0).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].username, "user01");
        assert!(matches!(page[1].identity_key, IdentityKey::Float(_)));
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let server = MockBnwServer::start(MockConfig::default()).unwrap();
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        assert!(client.fetch_user_page(10).unwrap().is_empty());
    }

    #[test]
    fn test_fetcher_walks_all_pages() {
        let server = MockBnwServer::start(MockConfig {
            users: generate_mock_users(7),
            page_size: 3,
            ..Default::default()
        })
        .unwrap();
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        let roster = RosterFetcher::new(&client).fetch_all_users().unwrap();
        assert_eq!(roster.len(), 7);
        assert!(roster.contains("user07"));
    }

    #[test]
    fn test_publish_message_records_post() {
        let server = MockBnwServer::start(MockConfig::default()).unwrap();
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        let receipt = client
            .publish_message("Нас покинул @alice", "test_token")
            .unwrap();
        assert!(receipt.contains("MSG1"));

        assert_eq!(
            server.posts(),
            vec![RecordedPost {
                text: "Нас покинул @alice".to_string(),
                login: "test_token".to_string(),
            }]
        );
    }

    #[test]
    fn test_publish_with_bad_login() {
        let server = MockBnwServer::start(MockConfig::default()).unwrap();
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        let result = client.publish_message("hello", "wrong");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Authentication failed"));
        assert!(server.posts().is_empty());
    }

    #[test]
    fn test_server_error_is_fatal() {
        let server = MockBnwServer::start(MockConfig {
            fail_status: Some(500),
            ..Default::default()
        })
        .unwrap();
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        let result = RosterFetcher::new(&client).fetch_all_users();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HTTP 500"));
    }

    fn canned_userlist(body: &str) -> MockBnwServer {
        MockBnwServer::start(MockConfig {
            userlist_body: Some(body.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejected_userlist_is_api_error() {
        let server = canned_userlist(r#"{"ok": false, "desc": "bad page"}"#);
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        let err = client.fetch_user_page(0).unwrap_err();
        assert!(matches!(err, Error::Api(_)));
        assert!(err.to_string().contains("bad page"));
    }

    #[test]
    fn test_missing_users_field_is_api_error() {
        let server = canned_userlist(r#"{"ok": true}"#);
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        let err = client.fetch_user_page(0).unwrap_err();
        assert!(matches!(err, Error::Api(_)));
        assert!(err.to_string().contains("'users'"));
    }

    #[test]
    fn test_null_users_ends_pagination() {
        let server = canned_userlist(r#"{"ok": true, "users": null}"#);
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        assert!(client.fetch_user_page(0).unwrap().is_empty());
        let roster = RosterFetcher::new(&client).fetch_all_users().unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_rate_limit_message() {
        let server = MockBnwServer::start(MockConfig {
            fail_status: Some(429),
            ..Default::default()
        })
        .unwrap();
        let client = BnwClient::new_with_base_url(&server.base_url()).unwrap();

        let err = client.publish_message("hi", "test_token").unwrap_err();
        assert!(err.to_string().to_lowercase().contains("rate limit"));
    }
}
