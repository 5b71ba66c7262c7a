//! Shared fixtures: an in-process HTTP server and a scripted presentation service
#![allow(dead_code)]

use slides_export::slides::{
    NotesPage, PageElement, Presentation, PresentationService, Shape, Slide, SlideProperties,
    TextContent, TextElement, TextRun, Thumbnail,
};
use slides_export::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[derive(Clone)]
struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

/// HTTP/1.1 server answering from a route table. Unknown paths get a 404.
pub struct TestServer {
    base_url: String,
    routes: Arc<Mutex<HashMap<String, CannedResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let routes: Arc<Mutex<HashMap<String, CannedResponse>>> = Arc::default();
        let requests: Arc<Mutex<Vec<String>>> = Arc::default();

        let (routes_task, requests_task) = (routes.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = routes_task.clone();
                let requests = requests_task.clone();
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&head).to_string();
                    let target = head.split_whitespace().nth(1).unwrap_or("/");
                    let path = target.split('?').next().unwrap_or("/").to_string();

                    let response = routes.lock().unwrap().get(&path).cloned();
                    requests.lock().unwrap().push(head.clone());

                    let response = response.unwrap_or(CannedResponse {
                        status: 404,
                        content_type: "application/json",
                        body: br#"{"error": {"code": 404, "message": "Requested entity was not found."}}"#
                            .to_vec(),
                    });
                    let status_line = match response.status {
                        200 => "200 OK",
                        404 => "404 Not Found",
                        _ => "500 Internal Server Error",
                    };
                    let reply = format!(
                        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status_line,
                        response.content_type,
                        response.body.len()
                    );
                    let _ = socket.write_all(reply.as_bytes()).await;
                    let _ = socket.write_all(&response.body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url,
            routes,
            requests,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn route(&self, path: &str, status: u16, content_type: &'static str, body: Vec<u8>) {
        self.routes.lock().unwrap().insert(
            path.to_string(),
            CannedResponse {
                status,
                content_type,
                body,
            },
        );
    }

    pub fn json(&self, path: &str, value: serde_json::Value) {
        self.route(path, 200, "application/json", value.to_string().into_bytes());
    }

    pub fn png(&self, path: &str, width: u32, height: u32) {
        self.route(path, 200, "image/png", png_bytes(width, height));
    }

    /// Raw request heads received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// HTTP client that never goes through a proxy
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 144, 255]));
    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

/// Slide whose notes page holds one text box with `runs`
pub fn slide(object_id: &str, runs: &[&str]) -> Slide {
    let text_elements = runs
        .iter()
        .map(|content| TextElement {
            text_run: Some(TextRun {
                content: content.to_string(),
            }),
        })
        .collect();

    Slide {
        object_id: object_id.to_string(),
        slide_properties: Some(SlideProperties {
            notes_page: Some(NotesPage {
                page_elements: vec![PageElement {
                    object_id: None,
                    shape: Some(Shape {
                        text: Some(TextContent { text_elements }),
                    }),
                }],
            }),
        }),
    }
}

/// Presentation service answering from memory
pub struct FakeService {
    pub presentation: Option<Presentation>,
    /// slide id -> thumbnail content URL
    pub thumbnails: HashMap<String, String>,
}

impl FakeService {
    pub fn new(slides: Vec<Slide>, thumbnails: &[(&str, String)]) -> Self {
        Self {
            presentation: Some(Presentation {
                presentation_id: "deck".to_string(),
                title: None,
                slides,
            }),
            thumbnails: thumbnails
                .iter()
                .map(|(id, url)| (id.to_string(), url.clone()))
                .collect(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            presentation: None,
            thumbnails: HashMap::new(),
        }
    }
}

impl PresentationService for FakeService {
    async fn get_presentation(&self, _presentation_id: &str) -> Result<Presentation> {
        self.presentation.clone().ok_or(Error::Api {
            status: 404,
            reason: "Requested entity was not found.".to_string(),
        })
    }

    async fn get_slide_thumbnail(&self, _presentation_id: &str, slide_id: &str) -> Result<Thumbnail> {
        let content_url = self.thumbnails.get(slide_id).cloned().ok_or(Error::Api {
            status: 400,
            reason: format!("Invalid page id: {}", slide_id),
        })?;
        Ok(Thumbnail {
            content_url,
            width: None,
            height: None,
        })
    }
}
