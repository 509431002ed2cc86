//! PAM 세션 로그 라인 파서
//!
//! `... pam_unix(sshd:session): session opened for user alice by (uid=0)` 형식의
//! 라인에서 이벤트 종류(login/logout)와 사용자명을 추출합니다.
//!
//! # 추출 규칙
//!
//! 1. 로그인 fingerprint를 먼저 찾고, 없을 때만 로그아웃 fingerprint를 찾습니다.
//!    한 라인에 둘 다 있으면 항상 로그인으로 처리합니다.
//! 2. fingerprint 시작 위치부터 라인 끝까지를 공백으로 나눕니다.
//! 3. 인덱스 4 토큰(0부터)을 사용자명으로 사용합니다.
//!    (`session`, `opened`, `for`, `user`, **`alice`**)
//! 4. 토큰이 5개 미만이면 경고 로그를 남기고 이벤트를 만들지 않습니다.
//!
//! 위치 기반 추출이므로 fingerprint를 바꾸더라도 사용자명은 fingerprint 시작에서
//! 다섯 번째 토큰이어야 합니다.

use metrics::counter;
use tracing::warn;

use loginmon_core::event::RawLine;
use loginmon_core::metrics as m;

/// 기본 로그인 fingerprint
pub const DEFAULT_LOGIN_FINGERPRINT: &str = "session opened for user";

/// 기본 로그아웃 fingerprint
pub const DEFAULT_LOGOUT_FINGERPRINT: &str = "session closed for user";

/// fingerprint 시작 기준 사용자명 토큰 위치
pub const USER_TOKEN_INDEX: usize = 4;

/// 라인 종류를 식별하는 문자열 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprints {
    pub login: String,
    pub logout: String,
}

impl Fingerprints {
    pub fn new(login: impl Into<String>, logout: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            logout: logout.into(),
        }
    }
}

impl Default for Fingerprints {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_FINGERPRINT, DEFAULT_LOGOUT_FINGERPRINT)
    }
}

/// 인증 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Login,
    Logout,
}

impl AuthKind {
    /// `event` 태그 값
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
        }
    }

    /// 설명 문구에 쓰이는 동사구
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Login => "logged in",
            Self::Logout => "logged out",
        }
    }
}

/// 파싱 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthMatch {
    pub kind: AuthKind,
    pub user: String,
}

/// 로그 라인에서 로그인/로그아웃 이벤트를 추출합니다.
///
/// fingerprint가 없으면 조용히 `None`, fingerprint는 있지만 토큰이 부족하면
/// 경고를 남기고 `None`을 반환합니다. 에러를 반환하지 않습니다.
pub fn parse_line(line: &RawLine, fingerprints: &Fingerprints) -> Option<AuthMatch> {
    parse_text(&line.text, fingerprints)
}

/// [`parse_line`]의 문자열 버전
pub fn parse_text(text: &str, fingerprints: &Fingerprints) -> Option<AuthMatch> {
    let (kind, start) = locate(text, fingerprints)?;

    let tail = &text[start..];
    match tail.split_whitespace().nth(USER_TOKEN_INDEX) {
        Some(user) => Some(AuthMatch {
            kind,
            user: user.to_owned(),
        }),
        None => {
            warn!(
                kind = kind.as_str(),
                line = text,
                "unexpected number of tokens after fingerprint, skipping line"
            );
            counter!(m::AUTH_PARSE_MISSES_TOTAL).increment(1);
            None
        }
    }
}

/// 로그인 우선으로 fingerprint 위치를 찾습니다.
fn locate(text: &str, fingerprints: &Fingerprints) -> Option<(AuthKind, usize)> {
    [
        (AuthKind::Login, fingerprints.login.as_str()),
        (AuthKind::Logout, fingerprints.logout.as_str()),
    ]
    .into_iter()
    .filter(|(_, fp)| !fp.is_empty())
    .find_map(|(kind, fp)| text.find(fp).map(|idx| (kind, idx)))
}
