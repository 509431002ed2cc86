//! 설정 관리: loginmon.toml 파싱 및 런타임 설정
//!
//! [`LoginmonConfig`]는 데몬 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선, `loginmon-daemon`에서 적용)
//! 2. 환경변수 (`LOGINMON_IDENTITY_DATABASE=events` 형식)
//! 3. 설정 파일 (`loginmon.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), loginmon_core::error::LoginmonError> {
//! use loginmon_core::config::LoginmonConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LoginmonConfig::load("loginmon.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LoginmonConfig::parse("[identity]\ndatabase = \"events\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LoginmonError};

/// 비밀번호 출력 시 대체 문자열
const REDACTED: &str = "********";

/// loginmon 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginmonConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 프로세스 식별 정보
    #[serde(default)]
    pub identity: IdentityConfig,
    /// InfluxDB 접속 설정
    #[serde(default)]
    pub influxdb: InfluxConfig,
    /// auth 로그 감시 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// Docker 이벤트 감시 설정
    #[serde(default)]
    pub docker: DockerConfig,
    /// Prometheus 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LoginmonConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LoginmonError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LoginmonError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoginmonError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LoginmonError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LoginmonError> {
        toml::from_str(toml_str).map_err(|e| {
            LoginmonError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGINMON_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGINMON_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGINMON_GENERAL_LOG_FORMAT");

        // Identity
        override_string(&mut self.identity.hostname, "LOGINMON_IDENTITY_HOSTNAME");
        override_string(
            &mut self.identity.measurement,
            "LOGINMON_IDENTITY_MEASUREMENT",
        );
        override_string(&mut self.identity.database, "LOGINMON_IDENTITY_DATABASE");

        // InfluxDB
        override_string(&mut self.influxdb.url, "LOGINMON_INFLUXDB_URL");
        override_string(&mut self.influxdb.username, "LOGINMON_INFLUXDB_USERNAME");
        override_string(&mut self.influxdb.password, "LOGINMON_INFLUXDB_PASSWORD");
        override_u64(
            &mut self.influxdb.ping_timeout_secs,
            "LOGINMON_INFLUXDB_PING_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.influxdb.startup_timeout_secs,
            "LOGINMON_INFLUXDB_STARTUP_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.influxdb.request_timeout_secs,
            "LOGINMON_INFLUXDB_REQUEST_TIMEOUT_SECS",
        );

        // Auth
        override_string(&mut self.auth.log_path, "LOGINMON_AUTH_LOG_PATH");
        override_u64(
            &mut self.auth.poll_interval_ms,
            "LOGINMON_AUTH_POLL_INTERVAL_MS",
        );
        override_string(
            &mut self.auth.login_fingerprint,
            "LOGINMON_AUTH_LOGIN_FINGERPRINT",
        );
        override_string(
            &mut self.auth.logout_fingerprint,
            "LOGINMON_AUTH_LOGOUT_FINGERPRINT",
        );

        // Docker
        override_string(&mut self.docker.socket, "LOGINMON_DOCKER_SOCKET");

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGINMON_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "LOGINMON_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "LOGINMON_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LoginmonError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.identity.measurement.trim().is_empty() {
            return Err(invalid("identity.measurement", "must not be empty"));
        }

        if self.identity.database.trim().is_empty() {
            return Err(invalid("identity.database", "must not be empty"));
        }

        let url = self.influxdb.url.trim();
        if url.is_empty() {
            return Err(invalid("influxdb.url", "must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid("influxdb.url", "must start with http:// or https://"));
        }

        for (field, value) in [
            ("influxdb.ping_timeout_secs", self.influxdb.ping_timeout_secs),
            (
                "influxdb.startup_timeout_secs",
                self.influxdb.startup_timeout_secs,
            ),
            (
                "influxdb.request_timeout_secs",
                self.influxdb.request_timeout_secs,
            ),
            ("auth.poll_interval_ms", self.auth.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero"));
            }
        }

        if self.auth.log_path.trim().is_empty() {
            return Err(invalid("auth.log_path", "must not be empty"));
        }

        if self.auth.login_fingerprint.trim().is_empty() {
            return Err(invalid("auth.login_fingerprint", "must not be empty"));
        }

        if self.auth.logout_fingerprint.trim().is_empty() {
            return Err(invalid("auth.logout_fingerprint", "must not be empty"));
        }

        Ok(())
    }

    /// 비밀번호를 가린 사본을 반환합니다 (설정 출력용).
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.influxdb.password.is_empty() {
            copy.influxdb.password = REDACTED.to_owned();
        }
        copy
    }

    /// TOML 문자열로 직렬화합니다.
    pub fn to_toml_string(&self) -> Result<String, LoginmonError> {
        toml::to_string_pretty(self).map_err(|e| {
            LoginmonError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> LoginmonError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 프로세스 식별 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// `hostname` 태그 값. 비어 있으면 시스템 호스트명을 사용
    pub hostname: String,
    /// measurement 이름 기반 (provider 접두어 + title case)
    pub measurement: String,
    /// 기록할 데이터베이스
    pub database: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            measurement: "events".to_owned(),
            database: "loginmon".to_owned(),
        }
    }
}

/// InfluxDB 접속 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    /// HTTP 엔드포인트
    pub url: String,
    /// 사용자명 (비어 있으면 인증 없음)
    pub username: String,
    /// 비밀번호
    pub password: String,
    /// ping 요청 1회의 타임아웃 (초)
    pub ping_timeout_secs: u64,
    /// 시작 시 연결 확인 전체 제한 시간 (초)
    pub startup_timeout_secs: u64,
    /// write 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_owned(),
            username: String::new(),
            password: String::new(),
            ping_timeout_secs: 1,
            startup_timeout_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

/// auth 로그 감시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 감시할 PAM 인증 로그 경로
    pub log_path: String,
    /// 파일 상태 체크 주기 (밀리초)
    pub poll_interval_ms: u64,
    /// 로그인 라인 식별 문자열
    pub login_fingerprint: String,
    /// 로그아웃 라인 식별 문자열
    pub logout_fingerprint: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            log_path: "/var/log/auth.log".to_owned(),
            poll_interval_ms: 250,
            login_fingerprint: "session opened for user".to_owned(),
            logout_fingerprint: "session closed for user".to_owned(),
        }
    }
}

/// Docker 이벤트 감시 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Docker 소켓 경로. 비어 있으면 로컬 기본값(`DOCKER_HOST` 포함)
    pub socket: String,
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 리스너 주소
    pub listen_addr: String,
    /// 리스너 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9108,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
