//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수로 `metrics::counter!()`를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `loginmon_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(loginmon_core::metrics::AUTH_LINES_READ_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 이벤트 출처 레이블 키 (auth, docker)
pub const LABEL_PROVIDER: &str = "provider";

/// 드롭 사유 레이블 키
pub const LABEL_REASON: &str = "reason";

/// 드롭 사유: 예약 태그 충돌
pub const REASON_TAG_CONFLICT: &str = "tag_conflict";

/// 드롭 사유: 저장소 쓰기 실패
pub const REASON_WRITE_FAILED: &str = "write_failed";

// ─── Auth Watcher 메트릭 ───────────────────────────────────────────

/// Auth: 읽은 로그 라인 수 (counter)
pub const AUTH_LINES_READ_TOTAL: &str = "loginmon_auth_lines_read_total";

/// Auth: fingerprint는 맞지만 토큰이 부족한 라인 수 (counter)
pub const AUTH_PARSE_MISSES_TOTAL: &str = "loginmon_auth_parse_misses_total";

// ─── Docker Watcher 메트릭 ─────────────────────────────────────────

/// Docker: 범주/액션이 맞지 않아 건너뛴 이벤트 수 (counter)
pub const DOCKER_EVENTS_SKIPPED_TOTAL: &str = "loginmon_docker_events_skipped_total";

// ─── 전달 경로 메트릭 ──────────────────────────────────────────────

/// 기록에 성공한 이벤트 수 (counter, label: provider)
pub const EVENTS_EMITTED_TOTAL: &str = "loginmon_events_emitted_total";

/// 버려진 이벤트 수 (counter, label: reason)
pub const EVENTS_DROPPED_TOTAL: &str = "loginmon_events_dropped_total";

/// 저장소에 기록된 포인트 수 (counter)
pub const POINTS_WRITTEN_TOTAL: &str = "loginmon_points_written_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        AUTH_LINES_READ_TOTAL,
        "Total number of lines read from the auth log"
    );
    describe_counter!(
        AUTH_PARSE_MISSES_TOTAL,
        "Auth log lines matching a fingerprint but too short to extract a user"
    );
    describe_counter!(
        DOCKER_EVENTS_SKIPPED_TOTAL,
        "Docker events skipped because of category or action"
    );
    describe_counter!(
        EVENTS_EMITTED_TOTAL,
        "Events normalized and written to the store, per provider"
    );
    describe_counter!(
        EVENTS_DROPPED_TOTAL,
        "Events dropped before or during write, per reason"
    );
    describe_counter!(
        POINTS_WRITTEN_TOTAL,
        "Total number of points accepted by the store"
    );
}
