use super::CommandHandler;
use crate::storage::ResourceKind;
use actix_web::{web, HttpResponse};
use async_trait::async_trait;

pub struct HelpCommand;

impl HelpCommand {
    pub fn new() -> Self {
        HelpCommand
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "显示所有可用命令的帮助信息"
    }

    async fn handle(
        &self,
        _args: &str,
        data: &web::Data<crate::AppState>,
        _request: &super::CommandRequest,
    ) -> HttpResponse {
        // 注册表按名称有序
        let commands_info: Vec<String> = data
            .command_registry
            .descriptions()
            .into_iter()
            .map(|(name, description)| format!("- {}: {}", name, description))
            .collect();

        let kinds: Vec<&str> = ResourceKind::ALL.iter().map(|k| k.short_name()).collect();
        let help_text = format!(
            "可用命令:\n{}\n资源类型: {}\n路径: shares/<共享>/<目录>...、queues/<队列>、containers/<容器>/<blob>",
            commands_info.join("\n"),
            kinds.join(", ")
        );

        super::CommandResponse::ok(help_text, None)
    }
}
