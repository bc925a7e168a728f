//! AMFI 월간 리포트 적재 CLI.

use amfi_collector::modules::{self, OutputFormat, PipelineOutcome};
use amfi_collector::Result;
use amfi_core::{init_logging, AppConfig, LogConfig};
use amfi_data::{AmfiReportFetcher, ReportStore, WorkbookParser};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "amfi-collector")]
#[command(about = "AMFI Monthly Report Loader", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 설정 파일 경로 (기본: config/amfi.toml, 없으면 무시)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error). 설정 파일보다 우선
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 파이프라인 실행 (기본값)
    Run,

    /// DB 연결만 확인
    CheckDb,

    /// DB 연결 확인 후 테이블 생성
    InitDb,

    /// 직전 달 리포트 다운로드만 실행
    Fetch {
        /// 저장 디렉토리 (기본: fetch.download_dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// 로컬 리포트 파일을 정규화해 출력 (DB 접근 없음)
    Inspect {
        /// 리포트 파일 경로
        file: PathBuf,

        /// 출력 형식 (table, json)
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 설정 로드
    let config = AppConfig::load(cli.config.as_deref()).context("설정을 로드할 수 없습니다")?;

    // 로깅 초기화
    let mut log_config =
        LogConfig::try_from(&config.logging).context("로깅 설정이 올바르지 않습니다")?;
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("tokio 런타임 생성 실패")?;

    let command = cli.command.unwrap_or(Commands::Run);
    runtime.block_on(execute(command, config))?;

    Ok(())
}

/// 명령 실행. 단계 실패는 로그만 남기고 정상 종료합니다.
async fn execute(command: Commands, config: AppConfig) -> Result<()> {
    tracing::info!("AMFI Report Loader 시작");

    match command {
        Commands::Run => {
            let fetcher = AmfiReportFetcher::new(&config.fetch)?;
            let store = ReportStore::new(&config.database)?;
            let today = chrono::Local::now().date_naive();

            tracing::info!("=== 월간 리포트 적재 시작 ===");
            let outcome = modules::run_pipeline(&fetcher, &WorkbookParser, &store, today).await;
            outcome.stats().log_summary("월간 리포트 적재");

            match outcome {
                PipelineOutcome::Completed(stats) => {
                    tracing::info!(inserted = stats.inserted, "=== 월간 리포트 적재 완료 ===");
                }
                PipelineOutcome::Halted { stage, error, .. } => {
                    tracing::error!(stage = %stage, "=== 월간 리포트 적재 중단: {} ===", error);
                }
            }
        }
        Commands::CheckDb => {
            let store = ReportStore::new(&config.database)?;
            if store.check_connectivity().await {
                tracing::info!(
                    host = %config.database.host,
                    database = %config.database.database,
                    "데이터베이스 연결 성공"
                );
            } else {
                tracing::error!("데이터베이스 연결 실패");
            }
        }
        Commands::InitDb => {
            let store = ReportStore::new(&config.database)?;
            if !store.check_connectivity().await {
                tracing::error!("데이터베이스 연결 실패, 테이블 생성을 건너뜁니다");
            } else {
                match store.ensure_schema().await {
                    Ok(()) => tracing::info!(table = store.table(), "테이블 준비 완료"),
                    Err(e) => tracing::error!("테이블 생성 실패: {}", e),
                }
            }
        }
        Commands::Fetch { dir } => {
            let fetcher = AmfiReportFetcher::new(&config.fetch)?;
            let today = chrono::Local::now().date_naive();
            let dest = dir.unwrap_or_else(|| fetcher.download_dir().to_path_buf());

            let url = fetcher.report_url(today)?;
            match fetcher.download(&url, &dest).await {
                Ok(path) => println!("{}", path.display()),
                Err(e) => tracing::error!(url = %url, "리포트 다운로드 실패: {}", e),
            }
        }
        Commands::Inspect { file, format } => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            match modules::inspect_report(&WorkbookParser, &file, format, &mut out) {
                Ok(report) => tracing::info!(
                    path = %file.display(),
                    records = report.stats.records,
                    "리포트 점검 완료"
                ),
                Err(e) => tracing::error!(path = %file.display(), "리포트 점검 실패: {}", e),
            }
        }
    }

    tracing::info!("AMFI Report Loader 종료");
    Ok(())
}
