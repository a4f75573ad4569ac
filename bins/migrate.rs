use dotenvy::dotenv;
use migration::MigratorTrait;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging(cfg: &configs::AppConfig) {
    common::utils::logging::init_logging(cfg.logging.format);
    info!(service = "migrate", event = "logger_init", "tracing subscriber initialized");
}

async fn run(cfg: configs::AppConfig) -> anyhow::Result<()> {
    let mut database = cfg.database;
    database.normalize_from_env();
    database.validate()?;
    let db = models::db::connect_with_config(&database).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(())
}

fn main() -> std::process::ExitCode {
    // 提前加载 .env，使得 RUST_LOG / DATABASE_URL 等环境变量生效
    dotenv().ok();

    // 优先 config.toml，文件不存在时退回环境变量；解析失败直接退出
    let (cfg, source) = match configs::AppConfig::load_or_env() {
        Ok(loaded) => loaded,
        Err(e) => {
            common::utils::logging::init_logging(configs::LogFormat::default());
            error!(service = "migrate", event = "config_load_failed", error = %format!("{:#}", e), "invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };
    init_logging(&cfg);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "migrate", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "migrate", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(service = "migrate", event = "start", %service_id, pid, version, source = ?source, "applying migrations");

    rt.block_on(async move {
        match run(cfg).await {
            Ok(()) => {
                info!(service = "migrate", event = "done", %service_id, "migrations applied");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "migrate", event = "failed", error = %e, "migration failed");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
