#![allow(dead_code)]

use std::io::Write as _;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};

pub static PIXEL_PNG: &[u8] = &[
    137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13, 73, 72, 68, 82, 0, 0, 0, 1, 0, 0, 0, 1, 8, 4, 0,
    0, 0, 181, 28, 12, 2, 0, 0, 0, 11, 73, 68, 65, 84, 120, 218, 99, 252, 255, 23, 0, 2, 3, 1, 128,
    110, 220, 25, 0, 0, 0, 0, 73, 69, 78, 68, 174, 66, 96, 130,
];

pub const ARTICLE_HTML: &str = r#"<!doctype html>
<html>
  <head>
    <title>  Stub Article  </title>
    <link rel="stylesheet" href="/assets/site.css">
    <script src="/assets/app.js"></script>
  </head>
  <body>
    <header>Site header</header>
    <nav><a href="/">Home</a></nav>
    <main>
      <h1>Stub   Article</h1>
      <p>First paragraph.</p>
      <img src="images/figure.png" alt="figure">
      <script>track("view")</script>
    </main>
    <iframe src="/ads"></iframe>
    <footer>Copyright</footer>
  </body>
</html>
"#;

pub const META_HTML: &str = r#"<!doctype html>
<html lang="de">
  <head>
    <title>Meta Page</title>
    <meta name="description" content="A described page">
    <meta property="og:image" content="/cover.jpg">
    <link rel="icon" href="/fav.ico">
  </head>
  <body><p>meta</p></body>
</html>
"#;

pub const COMPRESSED_HTML: &str =
    "<html><head><title>Packed</title></head><body><main>decoded body text</main></body></html>";

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_millis(1500);

struct Reply {
    status: i32,
    body: Vec<u8>,
    content_type: Option<&'static str>,
    content_encoding: Option<&'static str>,
    location: Option<&'static str>,
}

impl Reply {
    fn ok(body: impl Into<Vec<u8>>, content_type: &'static str) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_type: Some(content_type),
            content_encoding: None,
            location: None,
        }
    }

    fn redirect(location: &'static str) -> Self {
        Self {
            status: 302,
            body: Vec::new(),
            content_type: None,
            content_encoding: None,
            location: Some(location),
        }
    }
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip stub body");
    encoder.finish().expect("finish gzip stub body")
}

/// HTTP `deflate` is zlib-wrapped.
fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("deflate stub body");
    encoder.finish().expect("finish deflate stub body")
}

pub struct UpstreamStub {
    pub base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl UpstreamStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start upstream stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request
                    .url()
                    .split('?')
                    .next()
                    .unwrap_or_default()
                    .to_owned();

                let reply = match path.as_str() {
                    "/article" => Reply::ok(ARTICLE_HTML, "text/html; charset=utf-8"),
                    "/shouting" => Reply::ok(
                        "<html><body><p>loud</p></body></html>",
                        "Text/HTML; Charset=UTF-8",
                    ),
                    "/plain" => Reply::ok("<html><body><div>X</div></body></html>", "text/html"),
                    "/long" => Reply::ok(
                        format!("<html><body><main>{}</main></body></html>", "x".repeat(6000)),
                        "text/html",
                    ),
                    "/meta" => Reply::ok(META_HTML, "text/html"),
                    "/image.png" => Reply::ok(PIXEL_PNG, "image/png"),
                    "/gzipped" => Reply {
                        content_encoding: Some("gzip"),
                        ..Reply::ok(gzip(COMPRESSED_HTML.as_bytes()), "text/html")
                    },
                    "/deflated" => Reply {
                        content_encoding: Some("deflate"),
                        ..Reply::ok(zlib(COMPRESSED_HTML.as_bytes()), "text/html")
                    },
                    "/headers" => {
                        let mut listing = String::new();
                        for header in request.headers() {
                            listing.push_str(&format!("{}: {}\n", header.field, header.value));
                        }
                        Reply::ok(
                            format!("<html><body><pre>{listing}</pre></body></html>"),
                            "text/html",
                        )
                    }
                    "/moved" => Reply::redirect("/article"),
                    "/loop" => Reply::redirect("/loop"),
                    "/slow" => {
                        thread::sleep(SLOW_DELAY);
                        Reply::ok("<html></html>", "text/html")
                    }
                    "/broken" => Reply {
                        status: 503,
                        ..Reply::ok("maintenance", "text/plain")
                    },
                    _ => Reply {
                        status: 404,
                        ..Reply::ok("not found", "text/plain")
                    },
                };

                let mut response =
                    tiny_http::Response::from_data(reply.body).with_status_code(reply.status);
                for (name, value) in [
                    ("Content-Type", reply.content_type),
                    ("Content-Encoding", reply.content_encoding),
                    ("Location", reply.location),
                ] {
                    if let Some(value) = value {
                        let header =
                            tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes())
                                .expect("build stub header");
                        response.add_header(header);
                    }
                }
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for UpstreamStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// An address nothing listens on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway listener addr");
    drop(listener);
    format!("http://{addr}/")
}
