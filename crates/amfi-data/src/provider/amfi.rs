//! AMFI 포털 리포트 다운로더.
//!
//! 리포트 URL 패턴: `https://<host>/spages/am<mon><yyyy>repo.xls`
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use amfi_data::provider::AmfiReportFetcher;
//!
//! let fetcher = AmfiReportFetcher::new(&config.fetch)?;
//! let path = fetcher.fetch_latest(chrono::Local::now().date_naive()).await?;
//! ```

use amfi_core::{FetchConfig, ReportMonth};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{StatusCode, Url};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use super::ReportSource;
use crate::error::{DataError, Result};

/// URL 경로에 파일 이름이 없을 때 사용하는 이름.
const FALLBACK_FILE_NAME: &str = "report.xls";

/// `today` 기준 직전 달 리포트의 URL을 계산합니다.
pub fn resolve_report_url(base: &Url, today: NaiveDate) -> Result<Url> {
    let month = ReportMonth::preceding(today);
    let path = format!("spages/am{}repo.xls", month.slug());
    base.join(&path)
        .map_err(|e| DataError::Config(format!("리포트 URL 생성 실패 ({} + {}): {}", base, path, e)))
}

/// URL의 마지막 경로 세그먼트 (비어 있으면 기본 이름).
pub fn report_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string()
}

/// AMFI 리포트 다운로더.
pub struct AmfiReportFetcher {
    client: reqwest::Client,
    base_url: Url,
    download_dir: PathBuf,
}

impl AmfiReportFetcher {
    /// 설정에서 다운로더를 생성합니다.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| DataError::Config(format!("잘못된 base_url {:?}: {}", config.base_url, e)))?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DataError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            download_dir: config.download_dir.clone(),
        })
    }

    /// 다운로드 디렉토리
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// `today` 기준 리포트 URL
    pub fn report_url(&self, today: NaiveDate) -> Result<Url> {
        resolve_report_url(&self.base_url, today)
    }

    /// `url`을 내려받아 `dest_dir/<파일명>`에 그대로 저장합니다.
    ///
    /// 상태 코드가 정확히 200이 아니면 실패합니다. 재시도와 부분 파일 정리는 하지 않습니다.
    #[instrument(skip(self, url, dest_dir), fields(url = %url))]
    pub async fn download(&self, url: &Url, dest_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir).await.map_err(|e| {
            DataError::Io(format!("디렉토리 생성 실패 {}: {}", dest_dir.display(), e))
        })?;

        let dest = dest_dir.join(report_file_name(url));

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DataError::Download(format!("GET {} 실패: {}", url, e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DataError::Download(format!(
                "HTTP status code {} for {}",
                status.as_u16(),
                url
            )));
        }

        let mut file = fs::File::create(&dest)
            .await
            .map_err(|e| DataError::Io(format!("파일 생성 실패 {}: {}", dest.display(), e)))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DataError::Download(format!("응답 읽기 실패 {}: {}", url, e)))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(bytes = written, "응답 본문 저장 완료");
        info!(path = %dest.display(), bytes = written, "리포트 다운로드 완료");

        Ok(dest)
    }
}

#[async_trait]
impl ReportSource for AmfiReportFetcher {
    async fn fetch_latest(&self, today: NaiveDate) -> Result<PathBuf> {
        let url = self.report_url(today)?;
        info!(url = %url, month = %ReportMonth::preceding(today), "리포트 다운로드 시작");
        self.download(&url, &self.download_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fetch_config(base_url: &str, dir: &Path) -> FetchConfig {
        FetchConfig {
            base_url: base_url.to_string(),
            download_dir: dir.to_path_buf(),
            timeout_secs: Some(10),
            user_agent: "amfi-collector-test".to_string(),
        }
    }

    /// 레거시 xls(OLE2) 시그니처로 시작하는 바이너리 본문
    fn xls_bytes() -> Vec<u8> {
        let mut body = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        body.extend((0u8..=255).cycle().take(20_000));
        body
    }

    #[test]
    fn test_resolve_report_url() {
        let base = Url::parse("https://portal.amfiindia.com").unwrap();

        let url = resolve_report_url(&base, date(2024, 2, 10)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://portal.amfiindia.com/spages/amjan2024repo.xls"
        );

        let url = resolve_report_url(&base, date(2024, 1, 15)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://portal.amfiindia.com/spages/amdec2023repo.xls"
        );
    }

    #[test]
    fn test_report_file_name() {
        let url = Url::parse("https://portal.amfiindia.com/spages/amjan2024repo.xls").unwrap();
        assert_eq!(report_file_name(&url), "amjan2024repo.xls");

        let root = Url::parse("https://portal.amfiindia.com/").unwrap();
        assert_eq!(report_file_name(&root), FALLBACK_FILE_NAME);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let result = AmfiReportFetcher::new(&fetch_config("not a url", dir.path()));
        assert!(matches!(result, Err(DataError::Config(_))));
    }

    #[tokio::test]
    async fn test_download_writes_body_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let body = xls_bytes();
        let mock = server
            .mock("GET", "/spages/amjan2024repo.xls")
            .with_status(200)
            .with_header("content-type", "application/vnd.ms-excel")
            .with_body(&body)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        // 존재하지 않는 하위 디렉토리도 생성되어야 함
        let dest_dir = dir.path().join("nested").join("reports");
        let fetcher = AmfiReportFetcher::new(&fetch_config(&server.url(), &dest_dir)).unwrap();

        let path = fetcher.fetch_latest(date(2024, 2, 10)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(path, dest_dir.join("amjan2024repo.xls"));
        assert_eq!(std::fs::read(&path).unwrap(), body);
    }

    #[tokio::test]
    async fn test_download_non_200_is_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/spages/amdec2023repo.xls")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = AmfiReportFetcher::new(&fetch_config(&server.url(), dir.path())).unwrap();

        let err = fetcher.fetch_latest(date(2024, 1, 15)).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, DataError::Download(ref m) if m.contains("404")));
        assert!(!dir.path().join("amdec2023repo.xls").exists());
    }

    #[tokio::test]
    async fn test_download_other_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/spages/amjan2024repo.xls")
            .with_status(204)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = AmfiReportFetcher::new(&fetch_config(&server.url(), dir.path())).unwrap();

        let err = fetcher.fetch_latest(date(2024, 2, 1)).await.unwrap_err();
        assert_eq!(err.kind(), "download");
    }

    #[tokio::test]
    async fn test_download_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        // 포트 1은 열려 있지 않음
        let fetcher =
            AmfiReportFetcher::new(&fetch_config("http://127.0.0.1:1", dir.path())).unwrap();

        let err = fetcher.fetch_latest(date(2024, 2, 1)).await.unwrap_err();
        assert!(matches!(err, DataError::Download(_)));
    }
}
