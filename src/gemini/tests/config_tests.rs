use super::*;
use serial_test::serial;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::JoinHandle;
use tempfile::TempDir;

fn params(cwd: &Path) -> ConfigParams {
    ConfigParams {
        session_id: "test-session".to_string(),
        target_dir: cwd.to_path_buf(),
        cwd: cwd.to_path_buf(),
        model: crate::gemini::DEFAULT_GEMINI_MODEL.to_string(),
        debug_mode: true,
    }
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Points every Gemini path at `home`, with no system settings file.
fn isolate(home: &TempDir) {
    std::env::set_var("GEMINI_DIR", home.path());
    std::env::set_var(
        "GEMINI_CLI_SYSTEM_SETTINGS_PATH",
        home.path().join("system-settings.json"),
    );
    std::env::remove_var("GOOGLE_CLOUD_PROJECT");
    std::env::remove_var("CODE_ASSIST_ENDPOINT");
}

fn restore() {
    std::env::remove_var("GEMINI_DIR");
    std::env::remove_var("GEMINI_CLI_SYSTEM_SETTINGS_PATH");
    std::env::remove_var("CODE_ASSIST_ENDPOINT");
    std::env::remove_var("GEMINI_API_KEY");
}

/// Answers `bodies.len()` sequential requests, one connection each.
fn serve_sequence(bodies: Vec<&'static str>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = std::thread::spawn(move || {
        let mut requests = Vec::new();
        for body in bodies {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_lowercase();
                if let Some((headers, _)) = text.split_once("\r\n\r\n") {
                    let content_length = headers
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= headers.len() + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            requests.push(String::from_utf8_lossy(&buf).into_owned());
        }
        requests
    });
    (format!("http://{}", addr), handle)
}

#[test]
#[serial]
fn test_settings_workspace_overrides_user() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    isolate(&home);
    write(
        &home.path().join("settings.json"),
        r#"{"security":{"auth":{"selectedType":"oauth-personal"}}}"#,
    );
    write(
        &project.path().join(".gemini").join("settings.json"),
        r#"{"security":{"auth":{"selectedType":"gemini-api-key"}}}"#,
    );

    let config = GeminiConfig::new(params(project.path()));
    let settings = config.settings();
    restore();

    assert_eq!(
        settings.unwrap().selected_auth_type(),
        Some("gemini-api-key")
    );
}

#[test]
#[serial]
fn test_settings_system_overrides_workspace() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    isolate(&home);
    write(
        &project.path().join(".gemini").join("settings.json"),
        r#"{"selectedAuthType":"gemini-api-key"}"#,
    );
    write(
        &home.path().join("system-settings.json"),
        r#"{"security":{"auth":{"selectedType":"vertex-ai"}}}"#,
    );

    let config = GeminiConfig::new(params(project.path()));
    let settings = config.settings();
    restore();

    assert_eq!(settings.unwrap().selected_auth_type(), Some("vertex-ai"));
}

#[test]
#[serial]
fn test_settings_without_files_has_no_auth_type() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    isolate(&home);

    let config = GeminiConfig::new(params(project.path()));
    let settings = config.settings();
    restore();

    assert_eq!(settings.unwrap().selected_auth_type(), None);
}

#[test]
#[serial]
fn test_malformed_user_settings_is_error() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    isolate(&home);
    write(&home.path().join("settings.json"), "{ broken");

    let config = GeminiConfig::new(params(project.path()));
    let settings = config.settings();
    restore();

    assert!(settings.is_err());
}

#[tokio::test]
#[serial]
async fn test_api_key_auth_has_no_server_or_quota() {
    let home = TempDir::new().unwrap();
    isolate(&home);
    std::env::set_var("GEMINI_API_KEY", "AIza-test");

    let mut config = GeminiConfig::new(params(home.path()));
    let auth = config.refresh_auth("gemini-api-key").await;
    let server = config.code_assist_server();
    let quota = config.refresh_user_quota().await;
    restore();

    auth.unwrap();
    assert_eq!(server, None);
    assert_eq!(quota.unwrap(), None);
}

#[tokio::test]
#[serial]
async fn test_oauth_without_cached_credentials_fails() {
    let home = TempDir::new().unwrap();
    isolate(&home);

    let mut config = GeminiConfig::new(params(home.path()));
    let auth = config.refresh_auth("oauth-personal").await;
    restore();

    let err = auth.unwrap_err();
    assert!(err.to_string().contains("No cached Google credentials"));
    assert_eq!(config.code_assist_server(), None);
}

#[tokio::test]
#[serial]
async fn test_oauth_loads_server_and_quota() {
    let home = TempDir::new().unwrap();
    isolate(&home);
    write(
        &home.path().join("oauth_creds.json"),
        r#"{"access_token":"ya29.config"}"#,
    );
    let (base_url, server) = serve_sequence(vec![
        r#"{"currentTier":{"id":"free-tier","name":"Gemini Code Assist for individuals"},"cloudaicompanionProject":"proj-9"}"#,
        r#"{"buckets":[{"modelId":"gemini-2.5-pro","remainingFraction":0.4},{"modelId":"gemini-2.5-flash","remainingFraction":0.9}]}"#,
    ]);
    std::env::set_var("CODE_ASSIST_ENDPOINT", &base_url);

    let mut config = GeminiConfig::new(params(home.path()));
    let auth = config.refresh_auth("oauth-personal").await;
    let info = config.code_assist_server();
    let quota = config.refresh_user_quota().await;
    restore();
    let requests = server.join().unwrap();

    auth.unwrap();
    assert_eq!(
        info,
        Some(ServerInfo {
            project_id: Some("proj-9".to_string()),
            user_tier: Some("free-tier".to_string()),
            user_tier_name: Some("Gemini Code Assist for individuals".to_string()),
        })
    );
    let buckets = quota.unwrap().unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].model_id, "gemini-2.5-pro");
    assert_eq!(buckets[1].model_id, "gemini-2.5-flash");

    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("POST /v1internal:loadCodeAssist"));
    assert!(requests[1].starts_with("POST /v1internal:retrieveUserQuota"));
    assert!(requests[1].contains(r#"{"project":"proj-9"}"#));
}

#[tokio::test]
#[serial]
async fn test_oauth_without_project_skips_quota() {
    let home = TempDir::new().unwrap();
    isolate(&home);
    write(
        &home.path().join("oauth_creds.json"),
        r#"{"access_token":"ya29.config"}"#,
    );
    let (base_url, server) = serve_sequence(vec!["{}"]);
    std::env::set_var("CODE_ASSIST_ENDPOINT", &base_url);

    let mut config = GeminiConfig::new(params(home.path()));
    let auth = config.refresh_auth("oauth-personal").await;
    let quota = config.refresh_user_quota().await;
    restore();
    server.join().unwrap();

    auth.unwrap();
    assert_eq!(config.code_assist_server(), Some(ServerInfo::default()));
    assert_eq!(quota.unwrap(), None);
}
