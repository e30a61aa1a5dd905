mod command;
mod config;
mod logger;
mod storage;
mod tree;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use command::{handle_command, CommandRegistry};
use config::AppConfig;
use storage::{MemoryGateway, PostgresGateway, StorageGateway};
use tree::AccountNode;

// 应用状态
pub struct AppState {
    command_registry: CommandRegistry,
    account: AccountNode,
    resources_dir: PathBuf,
}

async fn build_gateway(config: &AppConfig) -> io::Result<Arc<dyn StorageGateway>> {
    let db_url = match &config.database_url {
        Some(url) => url,
        None => {
            info!("未配置 DATABASE_URL，使用内存存储模拟器");
            return Ok(Arc::new(MemoryGateway::new()));
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("数据库连接错误: {}", e)))?;

    let gateway = PostgresGateway::new(pool);
    gateway
        .init()
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("数据库初始化错误: {}", e)))?;
    info!("使用 PostgreSQL 存储模拟器");
    Ok(Arc::new(gateway))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 加载 .env
    dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("配置错误: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    logger::Logger::init(&config.log_dir, config.log_level);
    info!(
        "存储控制台启动，账户: {}{}",
        config.account.account.name,
        if config.account.account.attached {
            " (挂载)"
        } else {
            ""
        }
    );

    let gateway = build_gateway(&config).await.map_err(|e| {
        error!("{}", e);
        e
    })?;

    let app_state = web::Data::new(AppState {
        command_registry: CommandRegistry::new(),
        account: AccountNode::new(config.account.clone(), gateway),
        resources_dir: config.resources_dir.clone(),
    });

    println!("服务器启动在 http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/api/command", web::post().to(handle_command))
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
