//! REST client for the site.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{PublishError, Result};
use crate::image::Image;
use crate::post::RemotePost;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct MediaDetails {
    #[serde(default)]
    file: String,
}

#[derive(Debug, Deserialize)]
struct Media {
    media_details: MediaDetails,
}

/// Authenticated client for one site.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
}

impl Client {
    pub fn new(
        base_url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: user.into(),
            password: password.into(),
        })
    }

    fn collection_url(&self, rest_base: &str) -> String {
        format!("{}/wp-json/wp/v2/{rest_base}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .basic_auth(&self.user, Some(&self.password))
            .header(ACCEPT, "application/json")
    }

    /// Every post matching `query`, fetched page by page until one is empty.
    pub async fn list_posts(&self, rest_base: &str, query: &str) -> Result<Vec<RemotePost>> {
        let endpoint = self.collection_url(rest_base);
        let mut posts = Vec::new();

        for page in 1.. {
            let url = format!("{endpoint}?{query}&page={page}");
            let response = self.authed(self.http.get(&url)).send().await?;
            let batch: Vec<RemotePost> = expect_json("GET", &url, StatusCode::OK, response).await?;
            if batch.is_empty() {
                break;
            }
            for post in &batch {
                debug!(slug = %post.slug, id = post.id, "Loaded document");
            }
            posts.extend(batch);
        }

        Ok(posts)
    }

    /// Create a post; the site must keep the slug we asked for.
    pub async fn create_post(&self, rest_base: &str, body: &Value) -> Result<RemotePost> {
        let url = self.collection_url(rest_base);
        let response = self.authed(self.http.post(&url)).json(body).send().await?;
        let created: RemotePost = expect_json("POST", &url, StatusCode::CREATED, response).await?;

        let requested = body.get("slug").and_then(Value::as_str).unwrap_or_default();
        if created.slug != requested {
            return Err(PublishError::DuplicateSlug {
                requested: requested.to_string(),
                response: created.slug,
            });
        }
        Ok(created)
    }

    pub async fn update_post(&self, rest_base: &str, id: u64, body: &Value) -> Result<RemotePost> {
        let url = format!("{}/{id}", self.collection_url(rest_base));
        let response = self.authed(self.http.put(&url)).json(body).send().await?;
        expect_json("PUT", &url, StatusCode::OK, response).await
    }

    /// Delete permanently, bypassing the trash.
    pub async fn delete_post(&self, rest_base: &str, id: u64) -> Result<()> {
        let url = format!("{}/{id}?force=true", self.collection_url(rest_base));
        let response = self.authed(self.http.delete(&url)).send().await?;
        expect_status("DELETE", &url, StatusCode::OK, response).await?;
        Ok(())
    }

    /// Whether an upload with this image's name is already served.
    pub async fn media_exists(&self, image: &Image) -> Result<bool> {
        let url = format!("{}{}", self.base_url, image.upload_path());
        let response = self.http.head(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(PublishError::Status {
                method: "HEAD",
                url,
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    /// Upload an image under its content-addressed name.
    pub async fn upload_media(&self, image: &Image) -> Result<()> {
        let url = format!("{}/wp-json/wp/v2/media", self.base_url);
        let file_name = image.file_name();
        let response = self
            .authed(self.http.post(&url))
            .header(CONTENT_TYPE, &image.mime_type)
            .header(
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            )
            .body(image.content.clone())
            .send()
            .await?;
        let media: Media = expect_json("POST", &url, StatusCode::CREATED, response).await?;

        if media.media_details.file != file_name {
            return Err(PublishError::DuplicateAttachment {
                requested: file_name,
                response: media.media_details.file,
            });
        }
        Ok(())
    }
}

async fn expect_status(
    method: &'static str,
    url: &str,
    expected: StatusCode,
    response: Response,
) -> Result<Response> {
    if response.status() == expected {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(PublishError::Status {
        method,
        url: url.to_string(),
        status,
        body,
    })
}

async fn expect_json<T: DeserializeOwned>(
    method: &'static str,
    url: &str,
    expected: StatusCode,
    response: Response,
) -> Result<T> {
    let response = expect_status(method, url, expected, response).await?;
    Ok(response.json().await?)
}
