//! HTTP client for the user directory API.
//!
//! Blocking on purpose: callers run it on `spawn_blocking` and publish the
//! outcome from the UI task.

use crate::error::UsersError;
use crate::types::User;
use log::{debug, info};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where pages get users from.
pub trait UserSource: Send + Sync {
    /// Fetch at most `limit` users, in API order.
    fn list_users(&self, limit: usize) -> Result<Vec<User>, UsersError>;

    /// Fetch a single user by id.
    fn get_user(&self, id: u64) -> Result<User, UsersError>;

    /// Forget any cached data so the next call goes to the source.
    fn invalidate(&self) {}
}

struct CachedList {
    fetched_at: Instant,
    users: Vec<User>,
}

/// JSONPlaceholder-style REST client with a list cache.
pub struct UsersClient {
    base_url: String,
    agent: ureq::Agent,
    cache_ttl: Duration,
    cache: Mutex<Option<CachedList>>,
}

impl UsersClient {
    pub fn new(base_url: impl Into<String>, cache_ttl: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            base_url: base_url.into(),
            agent,
            cache_ttl,
            cache: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, UsersError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.agent.get(&url).call()?;
        Ok(serde_json::from_reader(response.into_reader())?)
    }

    fn cached_users(&self) -> Option<Vec<User>> {
        let cache = self.cache.lock();
        cache
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.cache_ttl)
            .map(|c| c.users.clone())
    }
}

impl UserSource for UsersClient {
    fn list_users(&self, limit: usize) -> Result<Vec<User>, UsersError> {
        let users = match self.cached_users() {
            Some(users) => {
                debug!("Serving {} user(s) from cache", users.len());
                users
            }
            None => {
                let users: Vec<User> = self.get_json("users")?;
                info!("Fetched {} user(s) from {}", users.len(), self.base_url);
                *self.cache.lock() = Some(CachedList {
                    fetched_at: Instant::now(),
                    users: users.clone(),
                });
                users
            }
        };
        Ok(users.into_iter().take(limit).collect())
    }

    fn get_user(&self, id: u64) -> Result<User, UsersError> {
        if let Some(user) = self
            .cached_users()
            .and_then(|users| users.into_iter().find(|u| u.id == id))
        {
            return Ok(user);
        }

        match self.get_json::<User>(&format!("users/{id}")) {
            Ok(user) => Ok(user),
            Err(UsersError::Status(404)) => Err(UsersError::NotFound(id)),
            Err(e) => Err(e),
        }
    }

    fn invalidate(&self) {
        if self.cache.lock().take().is_some() {
            debug!("User cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const USERS_JSON: &str = r#"[
        {"id": 1, "name": "Leanne Graham", "username": "Bret", "email": "Sincere@april.biz"},
        {"id": 2, "name": "Ervin Howell", "username": "Antonette", "email": "Shanna@melissa.tv"},
        {"id": 3, "name": "Clementine Bauch", "username": "Samantha", "email": "Nathan@yesenia.net"}
    ]"#;

    /// Serve canned responses on loopback; returns the base URL and a hit counter.
    fn serve(max_requests: usize) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        thread::spawn(move || {
            for stream in listener.incoming().take(max_requests) {
                let mut stream = stream.unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);

                let path = request_line.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = match path {
                    "/users" => ("200 OK", USERS_JSON.to_string()),
                    "/users/2" => (
                        "200 OK",
                        r#"{"id": 2, "name": "Ervin Howell"}"#.to_string(),
                    ),
                    "/broken" => ("500 Internal Server Error", String::new()),
                    _ => ("404 Not Found", "{}".to_string()),
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        (format!("http://{addr}"), hits)
    }

    #[test]
    fn test_url_joining() {
        let client = UsersClient::new("https://example.org/", Duration::ZERO);
        assert_eq!(client.url("/users"), "https://example.org/users");
        assert_eq!(client.url("users/3"), "https://example.org/users/3");
    }

    #[test]
    fn test_list_users_limits_and_caches() {
        let (base, hits) = serve(4);
        let client = UsersClient::new(base, Duration::from_secs(60));

        let first = client.list_users(2).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].username, "Bret");

        let second = client.list_users(50).unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Served from the cached list, no request.
        assert_eq!(client.get_user(3).unwrap().name, "Clementine Bauch");
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        client.invalidate();
        client.list_users(50).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let (base, hits) = serve(4);
        let client = UsersClient::new(base, Duration::ZERO);
        client.list_users(10).unwrap();
        client.list_users(10).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_get_user_and_not_found() {
        let (base, _) = serve(4);
        let client = UsersClient::new(base, Duration::from_secs(60));

        assert_eq!(client.get_user(2).unwrap().name, "Ervin Howell");
        match client.get_user(99) {
            Err(UsersError::NotFound(99)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_status_error_message() {
        let (base, _) = serve(1);
        let client = UsersClient::new(base, Duration::ZERO);
        let err = client.get_json::<Vec<User>>("broken").unwrap_err();
        assert!(matches!(err, UsersError::Status(500)));
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }
}
