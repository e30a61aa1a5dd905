use actix_web::{web, HttpResponse, Responder};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::storage::{OperationError, RemoteErrorKind};

mod cmd_create;
mod cmd_help;
mod cmd_ls;
mod cmd_rm;
pub mod console_path;
pub mod request_ui;

pub use console_path::ResolveError;
pub use request_ui::RequestUi;

// 命令处理器的trait
#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// `args` 是命令名之后的原始文本，路径里可以有空格
    async fn handle(
        &self,
        args: &str,
        data: &web::Data<crate::AppState>,
        request: &CommandRequest,
    ) -> HttpResponse;
}

// 命令注册器
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = CommandRegistry {
            commands: BTreeMap::new(),
        };

        registry.register(Box::new(cmd_help::HelpCommand::new()));
        registry.register(Box::new(cmd_ls::LsCommand::new()));
        registry.register(Box::new(cmd_create::CreateCommand::new()));
        registry.register(Box::new(cmd_rm::RmCommand::new()));

        info!("命令注册器初始化完成");
        registry
    }

    pub fn register(&mut self, handler: Box<dyn CommandHandler>) {
        let name = handler.name().to_string();
        self.commands.insert(name.clone(), handler);
        debug!("注册命令: {}", name);
    }

    pub fn get_handler(&self, command_name: &str) -> Option<&dyn CommandHandler> {
        self.commands.get(command_name).map(|h| h.as_ref())
    }

    pub fn descriptions(&self) -> Vec<(&str, &'static str)> {
        self.commands
            .iter()
            .map(|(name, h)| (name.as_str(), h.description()))
            .collect()
    }
}

/// 前端发来的命令；`input` 回答名称输入框（缺省表示取消），`confirm` 回答确认框
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

// 命令响应结构体
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<Value>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> HttpResponse {
        HttpResponse::Ok().json(CommandResponse {
            success: true,
            message: message.into(),
            data,
        })
    }

    pub fn bad_request(message: impl Into<String>) -> HttpResponse {
        HttpResponse::BadRequest().json(CommandResponse {
            success: false,
            message: message.into(),
            data: None,
        })
    }
}

/// 把一次操作的失败转换成响应；取消不算错误
pub fn operation_failure(err: &OperationError, ui: &RequestUi) -> HttpResponse {
    match err {
        OperationError::UserCancelled => {
            info!("操作已被用户取消");
            HttpResponse::Ok().json(CommandResponse {
                success: false,
                message: err.to_string(),
                data: Some(json!({
                    "cancelled": true,
                    "prompts": ui.prompts(),
                    "events": ui.events(),
                })),
            })
        }
        OperationError::Validation(e) => {
            warn!("名称校验失败: {}", e);
            CommandResponse::bad_request(e.to_string())
        }
        OperationError::Remote(e) => {
            error!("远端操作失败: {}", e);
            let body = CommandResponse {
                success: false,
                message: e.to_string(),
                data: Some(json!({ "kind": e.kind, "events": ui.events() })),
            };
            match e.kind {
                RemoteErrorKind::NotFound => HttpResponse::NotFound().json(body),
                RemoteErrorKind::Conflict => HttpResponse::Conflict().json(body),
                RemoteErrorKind::Forbidden => HttpResponse::Forbidden().json(body),
                RemoteErrorKind::Network | RemoteErrorKind::Other => {
                    HttpResponse::BadGateway().json(body)
                }
            }
        }
    }
}

/// 路径解析失败时的响应
pub fn resolve_failure(err: ResolveError) -> HttpResponse {
    match err {
        ResolveError::InvalidPath(_) => CommandResponse::bad_request(err.to_string()),
        ResolveError::NotFound(_) => HttpResponse::NotFound().json(CommandResponse {
            success: false,
            message: err.to_string(),
            data: None,
        }),
        ResolveError::Operation(e) => operation_failure(&e, &RequestUi::new(None, false)),
    }
}

/// 拆出命令名，其余部分去掉前导空白后原样保留
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (line, ""),
    }
}

// 处理命令的主函数
pub async fn handle_command(
    request: web::Json<CommandRequest>,
    data: web::Data<crate::AppState>,
) -> impl Responder {
    info!("收到命令请求: {}", request.command);

    let (name, args) = split_command(&request.command);
    if name.is_empty() {
        warn!("空命令");
        return CommandResponse::bad_request("命令不能为空");
    }

    match data.command_registry.get_handler(name) {
        Some(handler) => {
            debug!("执行命令: {}", name);
            handler.handle(args, &data, &request).await
        }
        None => {
            warn!("未知命令: {}", name);
            CommandResponse::bad_request(format!("未知命令: {}", name))
        }
    }
}
