//! InfluxDB 1.x HTTP 클라이언트
//!
//! - `GET /ping`: 연결 확인 (2xx 성공)
//! - `POST /write?db=<db>&precision=ns`: line protocol 본문 기록
//!
//! 사용자명이 설정되어 있으면 HTTP basic auth를 사용합니다.
//! 내부 `reqwest::Client`는 커넥션 풀을 공유하므로 여러 task에서 동시에 써도 됩니다.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Url};
use tracing::debug;

use loginmon_core::config;
use loginmon_core::error::WriteError;
use loginmon_core::sink::{PointBatch, PointWriter};

use crate::error::InfluxError;
use crate::line_protocol::encode_batch;

/// 클라이언트 설정
#[derive(Debug, Clone)]
pub struct InfluxClientConfig {
    /// HTTP 엔드포인트 (예: `http://localhost:8086`)
    pub url: String,
    /// 사용자명 (비어 있으면 인증 없음)
    pub username: String,
    pub password: String,
    /// ping 요청 타임아웃
    pub ping_timeout: Duration,
    /// write 요청 타임아웃
    pub request_timeout: Duration,
    /// User-Agent 헤더
    pub user_agent: String,
}

impl Default for InfluxClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_owned(),
            username: String::new(),
            password: String::new(),
            ping_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("loginmon/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl InfluxClientConfig {
    /// 데몬 설정의 `[influxdb]` 섹션에서 생성합니다.
    pub fn from_config(cfg: &config::InfluxConfig) -> Self {
        Self {
            url: cfg.url.clone(),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            ping_timeout: Duration::from_secs(cfg.ping_timeout_secs),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
            ..Self::default()
        }
    }
}

/// InfluxDB 클라이언트
pub struct InfluxClient {
    http: Client,
    base: Url,
    credentials: Option<(String, String)>,
    ping_timeout: Duration,
}

impl InfluxClient {
    /// 클라이언트를 생성합니다. 네트워크 연결은 하지 않습니다.
    ///
    /// # Errors
    /// URL이 잘못되었거나 HTTP 클라이언트를 만들 수 없으면 에러.
    pub fn new(config: InfluxClientConfig) -> Result<Self, InfluxError> {
        let base = parse_base_url(&config.url)?;

        let http = ClientBuilder::new()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(InfluxError::ClientBuild)?;

        let credentials = if config.username.is_empty() {
            None
        } else {
            Some((config.username, config.password))
        };

        Ok(Self {
            http,
            base,
            credentials,
            ping_timeout: config.ping_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /ping`으로 연결을 확인합니다.
    pub async fn ping_server(&self) -> Result<(), InfluxError> {
        let url = self.endpoint("ping")?;
        let response = self
            .authorize(self.http.get(url))
            .timeout(self.ping_timeout)
            .send()
            .await?;
        check_status(response).await?;
        debug!(url = %self.base, "influxdb ping ok");
        Ok(())
    }

    /// 배치를 line protocol로 인코딩하여 기록합니다. 빈 배치는 요청하지 않습니다.
    pub async fn write_batch(&self, batch: &PointBatch) -> Result<(), InfluxError> {
        if batch.is_empty() {
            return Ok(());
        }

        let body = encode_batch(batch.points())?;
        let mut url = self.endpoint("write")?;
        url.query_pairs_mut()
            .append_pair("db", batch.database())
            .append_pair("precision", "ns");

        let response = self
            .authorize(self.http.post(url))
            .body(body)
            .send()
            .await?;
        check_status(response).await?;

        debug!(database = batch.database(), points = batch.len(), "batch written");
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, InfluxError> {
        self.base.join(path).map_err(|e| InfluxError::InvalidUrl {
            url: self.base.to_string(),
            reason: e.to_string(),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }
}

impl PointWriter for InfluxClient {
    async fn write(&self, batch: PointBatch) -> Result<(), WriteError> {
        self.write_batch(&batch).await.map_err(WriteError::from)
    }

    async fn ping(&self) -> Result<(), WriteError> {
        self.ping_server().await.map_err(WriteError::from)
    }
}

/// 경로 결합이 마지막 세그먼트를 대체하지 않도록 끝에 `/`를 붙입니다.
fn parse_base_url(raw: &str) -> Result<Url, InfluxError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| InfluxError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(InfluxError::InvalidUrl {
            url: raw.to_owned(),
            reason: "scheme must be http or https".to_owned(),
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn check_status(response: reqwest::Response) -> Result<(), InfluxError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(InfluxError::Rejected {
        status: status.as_u16(),
        body: body.trim().to_owned(),
    })
}
