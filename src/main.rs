// ==========================================
// 赌台荷官轮换系统 - 命令行入口
// ==========================================
// 子命令: 建库 / 排班 / 推送 / 定时推送 / 审计查询 / 配置
// ==========================================

use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use table_rotation::app::{get_default_db_path, AppState};
use table_rotation::repository::db_utils;
use table_rotation::{logging, APP_NAME, VERSION};

/// 操作人（命令行默认）
const CLI_ACTOR: &str = "cli";

#[derive(Parser)]
#[command(name = "table-rotation")]
#[command(version)]
#[command(about = "赌台荷官轮换排班工具", long_about = None)]
struct Cli {
    /// 数据库文件路径（默认: 用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 操作人员工号（写入审计日志）
    #[arg(long, global = true, default_value = CLI_ACTOR)]
    actor: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 建表（幂等）
    InitDb,

    /// 生成全场排班建议
    Schedule {
        /// 开始时间 "YYYY-MM-DD HH:MM"，UTC（默认: 当前时间）
        #[arg(short, long)]
        start: Option<String>,

        /// 预估推送轮数
        #[arg(short, long, default_value_t = 4)]
        pushes: u32,

        /// 生成后直接落库
        #[arg(long)]
        apply: bool,
    },

    /// 对单张赌台执行推送
    Push {
        /// 赌台ID
        table_id: String,
    },

    /// 执行所有到期推送
    DuePushes,

    /// 常驻模式：按固定间隔执行到期推送
    Watch {
        /// 扫描间隔（秒）
        #[arg(short, long, default_value_t = 60)]
        interval_secs: u64,
    },

    /// 查看最近审计日志
    Audit {
        #[arg(short, long, default_value_t = 20)]
        limit: i32,
    },

    /// 查看当前轮换参数
    ShowConfig,

    /// 更新单个配置项
    SetConfig { key: String, value: String },
}

fn now() -> NaiveDateTime {
    db_utils::utc_now()
}

fn parse_start(raw: Option<&str>) -> anyhow::Result<NaiveDateTime> {
    match raw {
        Some(s) => NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M")
            .with_context(|| format!("无法解析开始时间: {}", s)),
        None => Ok(now()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Watch { .. } => logging::init_json(),
        _ => logging::init(),
    }

    tracing::info!(version = VERSION, "{}", APP_NAME);

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    let actor = cli.actor.as_str();

    match cli.command {
        Commands::InitDb => {
            println!("数据库已就绪: {}", state.db_path);
        }
        Commands::Schedule { start, pushes, apply } => {
            let start_time = parse_start(start.as_deref())?;
            let result = state.rotation_api.generate_schedule(actor, start_time, pushes)?;
            println!("{}", result.message);

            if let Some(schedule) = &result.payload {
                println!("{}", serde_json::to_string_pretty(schedule)?);

                if apply && result.success {
                    let applied = state
                        .rotation_api
                        .apply_schedule(actor, &schedule.assignments, now())?;
                    println!("{}", applied.message);
                    if let Some(report) = applied.payload {
                        for (table_id, reason) in report.failures {
                            println!("  {}: {}", table_id, reason);
                        }
                    }
                }
            }
        }
        Commands::Push { table_id } => {
            let result = state.rotation_api.execute_push(actor, &table_id, now())?;
            println!("{}", result.message);
        }
        Commands::DuePushes => {
            let result = state.rotation_api.execute_due_pushes(actor, now())?;
            println!("{}", result.message);
        }
        Commands::Watch { interval_secs } => {
            run_watch(&state, actor, interval_secs).await?;
        }
        Commands::Audit { limit } => {
            for log in state.audit_log_repo.find_recent(limit)? {
                println!(
                    "{} [{}] {} {}",
                    log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    log.action_type,
                    log.actor_id,
                    log.description
                );
            }
        }
        Commands::ShowConfig => {
            let config = state.config_api.get_rotation_config()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::SetConfig { key, value } => {
            let result = state.config_api.update_config(actor, &key, &value)?;
            println!("{}", result.message);
        }
    }

    Ok(())
}

/// 定时扫描到期推送，Ctrl-C 退出
async fn run_watch(state: &AppState, actor: &str, interval_secs: u64) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    tracing::info!(interval_secs, "进入定时推送模式");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let api = state.rotation_api.clone();
                let actor = actor.to_string();
                let result = tokio::task::spawn_blocking(move || api.execute_due_pushes(&actor, now())).await?;

                match result {
                    Ok(outcome) => tracing::info!(message = %outcome.message, "定时推送完成"),
                    Err(e) => tracing::error!(error = %e, "定时推送失败"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("收到退出信号，停止定时推送");
                break;
            }
        }
    }

    Ok(())
}
