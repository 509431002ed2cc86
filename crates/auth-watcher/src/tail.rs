//! 로테이션을 따라가는 로그 파일 tailer
//!
//! `tail -F`와 유사하게 동작합니다.
//!
//! - 시작 시 파일 끝으로 이동하여 이후 추가된 라인만 읽습니다.
//! - `poll_interval`마다 새 데이터와 파일 상태를 확인합니다.
//!
//! # 로테이션 감지
//! - inode 변경 (logrotate 등): 이전 핸들을 끝까지 읽은 뒤 새 파일을 처음부터 엽니다.
//! - 파일 크기 축소 (truncation, copytruncate): 오프셋 0부터 다시 읽습니다.
//! - 경로가 잠시 사라진 경우: 새 파일이 생길 때까지 기다립니다.
//!
//! 알려진 한계: 크기 축소는 poll 시점의 길이로만 판단합니다. 두 poll 사이에
//! copytruncate 후 이전 오프셋보다 많은 데이터가 다시 쓰이면 축소를 감지하지
//! 못하고, 새 파일의 앞부분(이전 오프셋까지)을 건너뜁니다.
//!
//! # 라인 처리
//! - `\n` 기준으로 나누고 끝의 `\r`은 제거합니다.
//! - 줄바꿈이 아직 오지 않은 부분 라인은 보관했다가 완성되면 내보냅니다.
//! - `max_line_length`를 넘는 라인은 잘라내고 경고를 남깁니다.

use std::collections::VecDeque;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use bytes::BytesMut;
use futures_util::Stream;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info, warn};

use loginmon_core::event::RawLine;

use crate::error::AuthWatcherError;

/// 한 번의 read 호출에 사용하는 버퍼 크기
const READ_CHUNK: usize = 8 * 1024;

/// tailer 설정
#[derive(Debug, Clone)]
pub struct TailConfig {
    /// 감시할 파일 경로
    pub path: PathBuf,
    /// 파일 상태 체크 주기
    pub poll_interval: Duration,
    /// 최대 라인 길이 (바이트)
    pub max_line_length: usize,
}

impl TailConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/log/auth.log"),
            poll_interval: Duration::from_millis(250),
            max_line_length: 64 * 1024, // 64KB
        }
    }
}

/// 로그 파일 tailer
pub struct FileTailer {
    config: TailConfig,
    file: File,
    /// 현재 핸들의 읽기 위치 (바이트 오프셋)
    offset: u64,
    /// 현재 핸들의 inode (Unix 전용)
    identity: Option<u64>,
    /// 줄바꿈을 기다리는 부분 라인
    pending: BytesMut,
    /// 현재 부분 라인이 잘렸는지 여부
    truncated: bool,
    /// 완성되어 내보낼 라인
    ready: VecDeque<RawLine>,
}

impl FileTailer {
    /// 파일을 열고 끝으로 이동합니다.
    ///
    /// # Errors
    /// 파일이 없거나 읽을 수 없으면 [`AuthWatcherError::Open`].
    pub async fn open(config: TailConfig) -> Result<Self, AuthWatcherError> {
        let open_err = |e: std::io::Error| AuthWatcherError::Open {
            path: config.path.display().to_string(),
            reason: e.to_string(),
        };

        let mut file = File::open(&config.path).await.map_err(open_err)?;
        let metadata = file.metadata().await.map_err(open_err)?;
        let offset = file.seek(SeekFrom::End(0)).await.map_err(open_err)?;

        info!(path = %config.path.display(), offset, "tailing file");

        Ok(Self {
            identity: file_identity(&metadata),
            config,
            file,
            offset,
            pending: BytesMut::new(),
            truncated: false,
            ready: VecDeque::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// 다음 완성된 라인을 기다려 반환합니다.
    ///
    /// # Errors
    /// 읽기 또는 재오픈 중 I/O 에러. 에러 이후 tailer는 더 이상 사용하지 않아야 합니다.
    pub async fn next_line(&mut self) -> Result<RawLine, AuthWatcherError> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Ok(line);
            }

            self.poll().await?;

            if self.ready.is_empty() {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
    }

    /// 라인 스트림으로 변환합니다.
    ///
    /// 에러가 발생하면 그 에러를 마지막 항목으로 내보내고 스트림이 끝납니다.
    pub fn into_stream(self) -> impl Stream<Item = Result<RawLine, AuthWatcherError>> + Send {
        futures_util::stream::unfold(Some(self), |state| async move {
            let mut tailer = state?;
            match tailer.next_line().await {
                Ok(line) => Some((Ok(line), Some(tailer))),
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// 새 데이터를 읽고 로테이션/truncation을 확인합니다.
    async fn poll(&mut self) -> Result<(), AuthWatcherError> {
        self.read_available().await?;

        let metadata = match tokio::fs::metadata(&self.config.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // 로테이션 도중: 새 파일이 생길 때까지 이전 핸들을 유지
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let identity = file_identity(&metadata);
        if identity.is_some() && identity != self.identity {
            self.reopen().await?;
        } else if metadata.len() < self.offset {
            warn!(
                path = %self.config.path.display(),
                offset = self.offset,
                size = metadata.len(),
                "file truncated, reading from start"
            );
            self.file.seek(SeekFrom::Start(0)).await?;
            self.offset = 0;
            self.pending.clear();
            self.truncated = false;
            self.read_available().await?;
        }

        Ok(())
    }

    /// 로테이션된 새 파일을 처음부터 엽니다.
    async fn reopen(&mut self) -> Result<(), AuthWatcherError> {
        self.read_available().await?;
        // 이전 파일에 남은 부분 라인은 완성된 라인으로 취급
        if !self.pending.is_empty() {
            self.finish_line(SystemTime::now());
        }

        let reopen_err = |e: std::io::Error| AuthWatcherError::Reopen {
            path: self.config.path.display().to_string(),
            reason: e.to_string(),
        };
        let file = File::open(&self.config.path).await.map_err(reopen_err)?;
        let metadata = file.metadata().await.map_err(reopen_err)?;

        info!(path = %self.config.path.display(), "file rotated, reopened from start");

        self.file = file;
        self.identity = file_identity(&metadata);
        self.offset = 0;
        self.read_available().await
    }

    /// 현재 핸들에서 EOF까지 읽습니다.
    async fn read_available(&mut self) -> Result<(), AuthWatcherError> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let n = self.file.read(&mut buf).await?;
            if n == 0 {
                return Ok(());
            }
            self.offset += n as u64;
            self.consume(&buf[..n], SystemTime::now());
        }
    }

    fn consume(&mut self, mut data: &[u8], observed_at: SystemTime) {
        while let Some(pos) = data.iter().position(|&b| b == b'\n') {
            self.push_partial(&data[..pos]);
            self.finish_line(observed_at);
            data = &data[pos + 1..];
        }
        self.push_partial(data);
    }

    fn push_partial(&mut self, bytes: &[u8]) {
        let room = self
            .config
            .max_line_length
            .saturating_sub(self.pending.len());
        if bytes.len() > room {
            self.pending.extend_from_slice(&bytes[..room]);
            self.truncated = true;
        } else {
            self.pending.extend_from_slice(bytes);
        }
    }

    fn finish_line(&mut self, observed_at: SystemTime) {
        let mut line = self.pending.split();
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }

        if self.truncated {
            warn!(
                path = %self.config.path.display(),
                max_line_length = self.config.max_line_length,
                "line exceeds maximum length, truncated"
            );
            self.truncated = false;
        }

        let text = String::from_utf8_lossy(&line).into_owned();
        debug!(len = text.len(), "line read");
        self.ready.push_back(RawLine::with_time(text, observed_at));
    }
}

#[cfg(unix)]
fn file_identity(metadata: &std::fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.ino())
}

#[cfg(not(unix))]
fn file_identity(_metadata: &std::fs::Metadata) -> Option<u64> {
    None
}
