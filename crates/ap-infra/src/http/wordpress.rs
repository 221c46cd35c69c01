use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use ap_core::ports::{Category, PublishError, PublishRequest, PublishedPost, PublisherPort};
use ap_core::security::SecretString;

const GENERATED_BY: &str = "autopress";

#[derive(Serialize)]
struct CreatePostBody<'a> {
    title: &'a str,
    content: &'a str,
    slug: &'a str,
    categories: [u64; 1],
    status: &'a str,
    meta: PostMeta,
}

#[derive(Serialize)]
struct PostMeta {
    generated_by: &'static str,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: u64,
    link: String,
}

#[derive(Deserialize)]
struct CategoryRow {
    id: u64,
    name: String,
}

/// WordPress REST API (`/wp-json/wp/v2`) with application-password basic auth.
pub struct WordPressPublisher {
    client: reqwest::Client,
    site_url: String,
    username: String,
    app_password: SecretString,
}

impl WordPressPublisher {
    pub fn new(
        client: reqwest::Client,
        site_url: &str,
        username: &str,
        app_password: SecretString,
    ) -> Self {
        Self {
            client,
            site_url: site_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            app_password,
        }
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/wp-json/wp/v2/{}", self.site_url, resource)
    }

    fn get(&self, resource: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.endpoint(resource))
            .basic_auth(&self.username, Some(self.app_password.expose()))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PublishError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PublishError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

fn transport_error(err: reqwest::Error) -> PublishError {
    if err.is_timeout() {
        PublishError::Transport("request timeout".to_string())
    } else if err.is_connect() {
        PublishError::Transport(format!("connection error: {err}"))
    } else {
        PublishError::Transport(err.to_string())
    }
}

#[async_trait]
impl PublisherPort for WordPressPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishedPost, PublishError> {
        let body = CreatePostBody {
            title: &request.title,
            content: &request.body,
            slug: &request.slug,
            categories: [request.category_id],
            status: request.status.as_str(),
            meta: PostMeta {
                generated_by: GENERATED_BY,
            },
        };

        info!(title = %request.title, slug = %request.slug, "Creating post");
        let response = self
            .client
            .post(self.endpoint("posts"))
            .basic_auth(&self.username, Some(self.app_password.expose()))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::check_status(response).await.map_err(|err| {
            error!(error = %err, "Failed to create post");
            err
        })?;

        let created: CreatedPost = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;

        info!(post_id = created.id, "Post created");
        Ok(PublishedPost {
            post_id: created.id,
            post_url: created.link,
        })
    }

    async fn test_connection(&self) -> Result<(), PublishError> {
        let response = self
            .get("posts")
            .query(&[("per_page", "1")])
            .send()
            .await
            .map_err(transport_error)?;
        Self::check_status(response).await.map(|_| ())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, PublishError> {
        let response = self
            .get("categories")
            .query(&[("per_page", "100")])
            .send()
            .await
            .map_err(transport_error)?;
        let rows: Vec<CategoryRow> = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: row.id,
                name: row.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::project::PostStatus;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn publisher(site: String) -> WordPressPublisher {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        WordPressPublisher::new(client, &site, "editor", SecretString::new("abcd efgh"))
    }

    fn request() -> PublishRequest {
        PublishRequest {
            title: "Best Coffee".into(),
            body: "<p>Body</p>".into(),
            slug: "best-coffee".into(),
            category_id: 7,
            status: PostStatus::Publish,
        }
    }

    #[tokio::test]
    async fn publish_sends_post_and_returns_id_and_link() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/wp-json/wp/v2/posts")
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "title": "Best Coffee",
                "slug": "best-coffee",
                "categories": [7],
                "status": "publish"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 42, "link": "https://site.test/best-coffee/", "slug": "best-coffee"}"#)
            .create_async()
            .await;

        let post = publisher(server.url()).publish(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(post.post_id, 42);
        assert_eq!(post.post_url, "https://site.test/best-coffee/");
    }

    #[tokio::test]
    async fn any_2xx_is_success() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/wp-json/wp/v2/posts")
            .with_status(200)
            .with_body(r#"{"id": 1, "link": "https://site.test/?p=1"}"#)
            .create_async()
            .await;

        let post = publisher(server.url()).publish(&request()).await.unwrap();
        assert_eq!(post.post_id, 1);
    }

    #[tokio::test]
    async fn non_2xx_is_upstream_failure_with_status_and_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/wp-json/wp/v2/posts")
            .with_status(401)
            .with_body(r#"{"code":"rest_cannot_create"}"#)
            .create_async()
            .await;

        let err = publisher(server.url()).publish(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), r#"HTTP 401: {"code":"rest_cannot_create"}"#);
        assert!(matches!(err, PublishError::Upstream { status: 401, .. }));
    }

    #[tokio::test]
    async fn unreachable_site_is_transport_failure() {
        // Nothing listens on port 9 locally.
        let err = publisher("http://127.0.0.1:9".into())
            .publish(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Transport(_)));
    }

    #[tokio::test]
    async fn test_connection_requests_a_single_post() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/wp-json/wp/v2/posts")
            .match_query(Matcher::UrlEncoded("per_page".into(), "1".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        publisher(server.url()).test_connection().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_categories_maps_id_and_name() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/wp-json/wp/v2/categories")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"id": 1, "name": "Uncategorized", "count": 3}, {"id": 7, "name": "Coffee"}]"#)
            .create_async()
            .await;

        let categories = publisher(server.url()).list_categories().await.unwrap();
        assert_eq!(
            categories,
            vec![
                Category { id: 1, name: "Uncategorized".into() },
                Category { id: 7, name: "Coffee".into() },
            ]
        );
    }
}
