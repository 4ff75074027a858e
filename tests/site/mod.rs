use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

/// What the catalog serves after its last listed page.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum CatalogEnd {
    NotFound,
    EmptyListing,
    ServerError,
}

#[derive(Debug, Clone)]
pub struct BookSiteConfig {
    /// Book slugs per catalog page, page 1 first.
    pub pages: Vec<Vec<&'static str>>,
    /// Slugs listed in the catalog whose detail page has no product markup.
    pub broken: Vec<&'static str>,
    /// Raw hrefs appended to page 1's listing as-is.
    pub extra_hrefs: Vec<&'static str>,
    pub end: CatalogEnd,
}

impl BookSiteConfig {
    pub fn new(pages: Vec<Vec<&'static str>>, end: CatalogEnd) -> Self {
        Self {
            pages,
            broken: Vec::new(),
            extra_hrefs: Vec::new(),
            end,
        }
    }
}

/// Local copy of the catalogue layout served by tiny_http.
pub struct BookSite {
    pub catalogue_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl BookSite {
    pub fn spawn(config: BookSiteConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start book site server");
        let addr = server.server_addr();
        let catalogue_url = format!("http://{addr}/catalogue/");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let request_log = Arc::clone(&requests);
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

                let path = request.url().to_string();
                request_log.lock().expect("request log").push(path.clone());

                let (status, body) = route(&config, &path);
                let mut response = tiny_http::Response::from_string(body).with_status_code(status);
                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"text/html; charset=utf-8"[..],
                )
                .expect("build header");
                response = response.with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            catalogue_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    #[allow(dead_code)]
    pub fn was_requested(&self, path: &str) -> bool {
        self.requests
            .lock()
            .expect("request log")
            .iter()
            .any(|requested| requested == path)
    }
}

impl Drop for BookSite {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn route(config: &BookSiteConfig, path: &str) -> (u16, String) {
    let Some(rest) = path.strip_prefix("/catalogue/") else {
        return (404, "not found".to_owned());
    };

    if let Some(page) = catalog_page_number(rest) {
        return catalog_page(config, page);
    }

    let Some(slug) = rest.strip_suffix("/index.html") else {
        return (404, "not found".to_owned());
    };
    if config.broken.iter().any(|broken| *broken == slug) {
        return (200, "<html><body><p>This book has moved.</p></body></html>".to_owned());
    }
    if config.pages.iter().flatten().any(|listed| *listed == slug) {
        return (200, book_page(slug));
    }
    (404, "not found".to_owned())
}

fn catalog_page_number(rest: &str) -> Option<usize> {
    if rest == "index.html" {
        return Some(1);
    }
    rest.strip_prefix("page-")?
        .strip_suffix(".html")?
        .parse()
        .ok()
        .filter(|page| *page >= 2)
}

fn catalog_page(config: &BookSiteConfig, page: usize) -> (u16, String) {
    if let Some(slugs) = config.pages.get(page - 1) {
        let mut hrefs: Vec<String> = slugs
            .iter()
            .map(|slug| {
                if page == 1 {
                    format!("../../../{slug}/index.html")
                } else {
                    format!("{slug}/index.html")
                }
            })
            .collect();
        if page == 1 {
            hrefs.extend(config.extra_hrefs.iter().map(|href| (*href).to_owned()));
        }
        return (200, listing(&hrefs));
    }

    if page == config.pages.len() + 1 {
        match config.end {
            CatalogEnd::NotFound => {}
            CatalogEnd::EmptyListing => return (200, listing(&[])),
            CatalogEnd::ServerError => return (500, "internal error".to_owned()),
        }
    }
    (404, "not found".to_owned())
}

fn listing(hrefs: &[String]) -> String {
    let items = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<li><article class="product_pod"><h3><a href="{href}" title="{href}">{href}</a></h3><p class="price_color">£10.00</p></article></li>"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!doctype html>
<html>
  <body>
    <section><ol class="row">
{items}
    </ol></section>
  </body>
</html>
"#
    )
}

/// Detail page for `slug`: rating Three, 22 in stock, one review.
fn book_page(slug: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <body>
    <div class="col-sm-6 product_main">
      <h1>{slug}</h1>
      <p class="price_color">£51.77</p>
      <p class="instock availability">In stock (22 available)</p>
      <p class="star-rating Three"></p>
    </div>
    <div id="product_description" class="sub-header"><h2>Product Description</h2></div>
    <p>About {slug}.</p>
    <table class="table table-striped">
      <tr><th>UPC</th><td>upc-{slug}</td></tr>
      <tr><th>Product Type</th><td>Books</td></tr>
      <tr><th>Price (excl. tax)</th><td>£51.77</td></tr>
      <tr><th>Price (incl. tax)</th><td>£51.77</td></tr>
      <tr><th>Tax</th><td>£0.00</td></tr>
      <tr><th>Availability</th><td>In stock (22 available)</td></tr>
      <tr><th>Number of reviews</th><td>1</td></tr>
    </table>
  </body>
</html>
"#
    )
}
