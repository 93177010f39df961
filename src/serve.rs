//! Plain static file server for the generated tree.
//!
//! Serves files as-is with ordinary file/directory semantics: no routing, no
//! rewriting. Directories serve their `index.html` when present and an HTML
//! listing otherwise. One request is handled at a time.
//!
//! Request paths are percent-decoded and confined to the served root; any
//! `..` component is answered with 404.

use crate::report::Reporter;
use maud::{DOCTYPE, Markup, html};
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Cannot listen on {0}: {1}")]
    Bind(String, String),
    #[error("Served directory not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServeOptions {
    /// `host:port` to listen on.
    pub address: String,
    /// Extensionless files with this name are served as JSON.
    pub info_file_name: String,
}

/// How a request path maps onto the served root.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    File(PathBuf),
    Listing(PathBuf),
    /// Directory requested without a trailing slash.
    Redirect(String),
    NotFound,
}

/// Serve `root` until the process is interrupted.
pub fn serve(
    root: &Path,
    options: &ServeOptions,
    reporter: &dyn Reporter,
) -> Result<(), ServeError> {
    if !root.is_dir() {
        return Err(ServeError::NotFound(root.to_path_buf()));
    }
    let server = Server::http(options.address.as_str())
        .map_err(|e| ServeError::Bind(options.address.clone(), e.to_string()))?;
    reporter.info(&format!(
        "Serving {} at http://{}",
        root.display(),
        options.address
    ));

    for request in server.incoming_requests() {
        let line = format!("{} {}", request.method(), request.url());
        match handle(request, root, options) {
            Ok(status) => reporter.report(tracing::Level::DEBUG, &format!("{line} {status}")),
            Err(e) => reporter.warn(&format!("{line} failed: {e}")),
        }
    }
    Ok(())
}

fn handle(request: Request, root: &Path, options: &ServeOptions) -> std::io::Result<u16> {
    if !matches!(request.method(), Method::Get | Method::Head) {
        request.respond(Response::empty(StatusCode(405)))?;
        return Ok(405);
    }

    let url = request.url().to_string();
    match resolve(root, &url) {
        Resolved::File(path) => {
            let file = File::open(&path)?;
            let content_type = content_type(&path, &options.info_file_name);
            let response = Response::from_file(file).with_header(header("Content-Type", content_type)?);
            request.respond(response)?;
            Ok(200)
        }
        Resolved::Listing(dir) => {
            let url_path = url.split('?').next().unwrap_or("/").to_string();
            let entries = list_dir(&dir)?;
            let title = urlencoding::decode(&url_path)
                .map(|p| p.into_owned())
                .unwrap_or(url_path);
            let page = render_listing(&title, &entries);
            request.respond(
                Response::from_string(page.into_string())
                    .with_header(header("Content-Type", "text/html; charset=utf-8")?),
            )?;
            Ok(200)
        }
        Resolved::Redirect(location) => {
            request.respond(
                Response::empty(StatusCode(301)).with_header(header("Location", &location)?),
            )?;
            Ok(301)
        }
        Resolved::NotFound => {
            request.respond(Response::from_string("Not Found").with_status_code(StatusCode(404)))?;
            Ok(404)
        }
    }
}

fn header(name: &str, value: &str) -> std::io::Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| std::io::Error::other(format!("invalid {name} header: {value}")))
}

/// Map a request URL onto `root`.
pub fn resolve(root: &Path, url: &str) -> Resolved {
    let path_part = url.split(['?', '#']).next().unwrap_or("/");
    // Names that do not decode to UTF-8 cannot be served
    let Ok(decoded) = urlencoding::decode(path_part) else {
        return Resolved::NotFound;
    };

    let mut target = root.to_path_buf();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => target.push(part),
            Component::CurDir => {}
            _ => return Resolved::NotFound,
        }
    }

    if target.is_dir() {
        if !path_part.ends_with('/') {
            return Resolved::Redirect(format!("{path_part}/"));
        }
        let index = target.join("index.html");
        if index.is_file() {
            return Resolved::File(index);
        }
        return Resolved::Listing(target);
    }
    if target.is_file() {
        return Resolved::File(target);
    }
    Resolved::NotFound
}

/// Content type by extension; extensionless info files are JSON.
pub fn content_type(path: &Path, info_file_name: &str) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => "application/json",
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "text/javascript",
        "txt" | "md" => "text/plain; charset=utf-8",
        "yaml" | "yml" => "application/yaml",
        "csv" => "text/csv",
        "" if path.file_name().is_some_and(|n| n == info_file_name) => "application/json",
        _ => "application/octet-stream",
    }
}

/// Directory entries as `(name, is_dir)`, directories first, then by name.
fn list_dir(dir: &Path) -> std::io::Result<Vec<(String, bool)>> {
    let mut entries: Vec<(String, bool)> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| (e.file_name().to_string_lossy().to_string(), e.path().is_dir()))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(entries)
}

/// HTML listing for a directory, in the style of a plain file server.
pub fn render_listing(url_path: &str, entries: &[(String, bool)]) -> Markup {
    let title = format!("Directory listing for {url_path}");
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
            }
            body {
                h1 { (title) }
                hr;
                ul {
                    @for (name, is_dir) in entries {
                        @let suffix = if *is_dir { "/" } else { "" };
                        li { a href={ (urlencoding::encode(name)) (suffix) } { (name) (suffix) } }
                    }
                }
                hr;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_file;
    use tempfile::TempDir;

    fn served_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "ns1/info", "{}");
        write_file(tmp.path(), "ns1/projA/samples/frog 1.json", "{}");
        write_file(tmp.path(), "site/index.html", "<p>hi</p>");
        tmp
    }

    #[test]
    fn resolves_files() {
        let tmp = served_tree();
        assert_eq!(
            resolve(tmp.path(), "/ns1/info"),
            Resolved::File(tmp.path().join("ns1/info"))
        );
    }

    #[test]
    fn decodes_percent_escapes() {
        let tmp = served_tree();
        assert_eq!(
            resolve(tmp.path(), "/ns1/projA/samples/frog%201.json"),
            Resolved::File(tmp.path().join("ns1/projA/samples/frog 1.json"))
        );
    }

    #[test]
    fn ignores_query_string() {
        let tmp = served_tree();
        assert_eq!(
            resolve(tmp.path(), "/ns1/info?v=2"),
            Resolved::File(tmp.path().join("ns1/info"))
        );
    }

    #[test]
    fn directory_without_slash_redirects() {
        let tmp = served_tree();
        assert_eq!(
            resolve(tmp.path(), "/ns1"),
            Resolved::Redirect("/ns1/".to_string())
        );
    }

    #[test]
    fn directory_lists_or_serves_index() {
        let tmp = served_tree();
        assert_eq!(
            resolve(tmp.path(), "/ns1/"),
            Resolved::Listing(tmp.path().join("ns1"))
        );
        assert_eq!(
            resolve(tmp.path(), "/site/"),
            Resolved::File(tmp.path().join("site/index.html"))
        );
        assert_eq!(resolve(tmp.path(), "/"), Resolved::Listing(tmp.path().to_path_buf()));
    }

    #[test]
    fn parent_components_rejected() {
        let tmp = served_tree();
        assert_eq!(resolve(tmp.path(), "/../etc/passwd"), Resolved::NotFound);
        assert_eq!(resolve(tmp.path(), "/ns1/%2e%2e/%2e%2e/etc"), Resolved::NotFound);
    }

    #[test]
    fn missing_path_not_found() {
        let tmp = served_tree();
        assert_eq!(resolve(tmp.path(), "/nope"), Resolved::NotFound);
    }

    #[test]
    fn info_files_are_json() {
        assert_eq!(content_type(Path::new("ns1/info"), "info"), "application/json");
        assert_eq!(content_type(Path::new("s/S1.json"), "info"), "application/json");
        assert_eq!(
            content_type(Path::new("s/S1"), "info"),
            "application/octet-stream"
        );
    }

    #[test]
    fn listing_links_entries() {
        let entries = vec![
            ("projA".to_string(), true),
            ("info".to_string(), false),
            ("frog 1.json".to_string(), false),
        ];
        let page = render_listing("/ns1/", &entries).into_string();

        assert!(page.contains("Directory listing for /ns1/"));
        assert!(page.contains(r#"href="projA/""#));
        assert!(page.contains(r#"href="info""#));
        assert!(page.contains(r#"href="frog%201.json""#));
    }

    #[test]
    fn listing_escapes_names() {
        let entries = vec![("<script>".to_string(), false)];
        let page = render_listing("/", &entries).into_string();
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn list_dir_puts_directories_first() {
        let tmp = served_tree();
        let entries = list_dir(&tmp.path().join("ns1")).unwrap();
        assert_eq!(
            entries,
            vec![("projA".to_string(), true), ("info".to_string(), false)]
        );
    }

    #[test]
    fn undecodable_path_not_found() {
        let tmp = served_tree();
        assert_eq!(resolve(tmp.path(), "/ns1/%FF%FE"), Resolved::NotFound);
    }

    #[test]
    fn listing_encodes_reserved_characters() {
        let entries = vec![("a#b?c".to_string(), false), ("sub dir".to_string(), true)];
        let page = render_listing("/", &entries).into_string();

        assert!(page.contains(r#"href="a%23b%3Fc""#));
        assert!(page.contains(r#"href="sub%20dir/""#));
    }

    // =========================================================================
    // Request handling over loopback
    // =========================================================================

    /// Answer `count` requests for `root` on an ephemeral port.
    fn spawn_server(root: &Path, count: usize) -> (String, std::thread::JoinHandle<()>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap().to_string();
        let root = root.to_path_buf();
        let options = ServeOptions {
            address: addr.clone(),
            info_file_name: "info".to_string(),
        };
        let worker = std::thread::spawn(move || {
            for _ in 0..count {
                let request = server.recv().unwrap();
                handle(request, &root, &options).unwrap();
            }
        });
        (addr, worker)
    }

    /// Send one request and return the raw response, lowercased.
    fn send(addr: &str, method: &str, path: &str) -> String {
        use std::io::{Read, Write};
        let mut stream = std::net::TcpStream::connect(addr).unwrap();
        write!(
            stream,
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response.to_lowercase()
    }

    #[test]
    fn serves_info_file_as_json() {
        let tmp = served_tree();
        let (addr, worker) = spawn_server(tmp.path(), 1);

        let response = send(&addr, "GET", "/ns1/info");
        worker.join().unwrap();

        assert!(response.starts_with("http/1.1 200"), "{response}");
        assert!(response.contains("content-type: application/json"));
        assert!(response.ends_with("{}"));
    }

    #[test]
    fn rejects_other_methods() {
        let tmp = served_tree();
        let (addr, worker) = spawn_server(tmp.path(), 1);

        let response = send(&addr, "DELETE", "/ns1/info");
        worker.join().unwrap();

        assert!(response.starts_with("http/1.1 405"), "{response}");
        assert!(tmp.path().join("ns1/info").is_file());
    }

    #[test]
    fn redirects_directory_without_slash() {
        let tmp = served_tree();
        let (addr, worker) = spawn_server(tmp.path(), 1);

        let response = send(&addr, "GET", "/ns1");
        worker.join().unwrap();

        assert!(response.starts_with("http/1.1 301"), "{response}");
        assert!(response.contains("location: /ns1/"));
    }

    #[test]
    fn lists_directory_and_404s_escapes() {
        let tmp = served_tree();
        let (addr, worker) = spawn_server(tmp.path(), 2);

        let listing = send(&addr, "GET", "/ns1/");
        let escape = send(&addr, "GET", "/../etc/passwd");
        worker.join().unwrap();

        assert!(listing.starts_with("http/1.1 200"), "{listing}");
        assert!(listing.contains("content-type: text/html"));
        assert!(listing.contains("directory listing for /ns1/"));
        assert!(escape.starts_with("http/1.1 404"), "{escape}");
    }
}
