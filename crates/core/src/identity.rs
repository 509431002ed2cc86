//! 프로세스 식별 정보: 시작 시 한 번 결정되고 이후 읽기 전용
//!
//! 모든 정규화 호출이 같은 [`ProcessIdentity`]를 참조합니다.
//! 변경되지 않으므로 `Arc`로 공유할 때 잠금이 필요 없습니다.

use crate::config::IdentityConfig;
use crate::error::ConfigError;

/// 호스트명, measurement 기반 이름, 데이터베이스 이름
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    hostname: String,
    measurement_base: String,
    database: String,
}

impl ProcessIdentity {
    /// 값을 직접 지정하여 생성합니다.
    pub fn new(
        hostname: impl Into<String>,
        measurement_base: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            measurement_base: measurement_base.into(),
            database: database.into(),
        }
    }

    /// 설정에서 식별 정보를 결정합니다.
    ///
    /// `hostname`이 비어 있으면 시스템 호스트명을 사용합니다.
    pub fn resolve(config: &IdentityConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(config, system_hostname)
    }

    /// 호스트명 조회 함수를 주입하여 식별 정보를 결정합니다.
    ///
    /// 조회 함수는 설정의 `hostname`이 비어 있을 때만 호출됩니다.
    pub fn resolve_with<F>(config: &IdentityConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: FnOnce() -> std::io::Result<String>,
    {
        let hostname = if config.hostname.trim().is_empty() {
            let name = lookup().map_err(|e| ConfigError::HostnameUnavailable {
                reason: e.to_string(),
            })?;
            if name.trim().is_empty() {
                return Err(ConfigError::HostnameUnavailable {
                    reason: "system hostname is empty".to_owned(),
                });
            }
            name
        } else {
            config.hostname.clone()
        };

        Ok(Self::new(
            hostname,
            config.measurement.clone(),
            config.database.clone(),
        ))
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn measurement_base(&self) -> &str {
        &self.measurement_base
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

/// 시스템 호스트명을 조회합니다.
#[cfg(unix)]
pub fn system_hostname() -> std::io::Result<String> {
    let mut buf = [0u8; 256];
    // SAFETY: buf는 유효한 쓰기 가능 버퍼이고 길이를 함께 전달합니다.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8(buf[..len].to_vec())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// 시스템 호스트명을 조회합니다.
#[cfg(not(unix))]
pub fn system_hostname() -> std::io::Result<String> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "hostname lookup is only supported on unix",
    ))
}
