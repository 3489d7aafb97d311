use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{header, Client, Url};
use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::error::{Result, ScheduleError};
use crate::lesson::RawScheduleFeed;
use crate::page::StudentPage;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:146.0) Gecko/20100101 Firefox/146.0";

/// Fetches the student page and the lesson feed. Cookies persist for the
/// lifetime of the client, which is what the schedule endpoint's cookie
/// challenge relies on.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
    jar: Arc<Jar>,
    config: FeedConfig,
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("ru-RU,ru;q=0.9"),
        );

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            jar,
            config: config.clone(),
        })
    }

    pub async fn fetch_student_page(&self) -> Result<StudentPage> {
        debug!("Fetching student page {}", self.config.student_url);

        let response = self.client.get(&self.config.student_url).send().await?;
        if !response.status().is_success() {
            return Err(ScheduleError::Feed(format!(
                "Student page request failed: {}",
                response.status()
            )));
        }

        StudentPage::parse(&response.text().await?)
    }

    /// Lesson feed of `group`. The endpoint may first answer with a script
    /// setting a `wl` cookie; the request is then repeated once with it.
    pub async fn fetch_schedule(&self, group: &str) -> Result<RawScheduleFeed> {
        let body = self.post_group(group).await?;

        let body = match extract_wl_cookie(&body) {
            Some(value) => {
                info!("Schedule endpoint asked for a cookie, retrying");
                let url = Url::parse(&self.config.schedule_url)
                    .map_err(|e| ScheduleError::Config(format!("Bad schedule URL: {}", e)))?;
                self.jar.add_cookie_str(&format!("wl={}; Path=/", value), &url);
                self.post_group(group).await?
            }
            None => body,
        };

        serde_json::from_str(&body).map_err(|e| {
            ScheduleError::Feed(format!("Schedule for {} is not valid JSON: {}", group, e))
        })
    }

    async fn post_group(&self, group: &str) -> Result<String> {
        debug!("Requesting schedule of {} from {}", group, self.config.schedule_url);

        let response = self
            .client
            .post(&self.config.schedule_url)
            .header(header::ACCEPT, "application/json, text/plain, */*")
            .form(&[("group", group)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScheduleError::Feed(format!(
                "Schedule request failed: {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

/// Value of `wl=<value>;path=/` in a cookie challenge body
pub fn extract_wl_cookie(body: &str) -> Option<&str> {
    let start = body.find("wl=")? + "wl=".len();
    let len = body[start..].find(";path=/")?;
    Some(&body[start..start + len]).filter(|v| !v.is_empty())
}
