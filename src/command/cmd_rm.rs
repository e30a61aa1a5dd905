use super::console_path::{display_path, resolve, ConsolePath};
use super::{CommandHandler, CommandResponse, RequestUi};
use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use log::info;
use serde_json::json;

pub struct RmCommand;

impl RmCommand {
    pub fn new() -> Self {
        RmCommand
    }
}

#[async_trait]
impl CommandHandler for RmCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn description(&self) -> &'static str {
        "删除资源及其全部内容，需要确认，用法：rm <路径>"
    }

    async fn handle(
        &self,
        args: &str,
        data: &web::Data<crate::AppState>,
        request: &super::CommandRequest,
    ) -> HttpResponse {
        info!("开始处理 rm 命令");

        let path = match ConsolePath::parse(args) {
            Ok(path @ ConsolePath::Resource { .. }) => path,
            Ok(ConsolePath::Account) => return CommandResponse::bad_request("用法：rm <路径>"),
            Err(e) => return CommandResponse::bad_request(e.to_string()),
        };

        let mut node = match resolve(&data.account, &path).await {
            Ok(node) => node,
            Err(e) => return super::resolve_failure(e),
        };

        let ui = RequestUi::new(None, request.confirm);
        match node.delete_self(&ui).await {
            Ok(()) => {
                let shown = display_path(&node);
                info!("成功删除: {}", shown);
                CommandResponse::ok(
                    format!("{} '{}' 已删除", node.kind().noun(), node.label()),
                    Some(json!({ "path": shown, "events": ui.events() })),
                )
            }
            Err(e) => super::operation_failure(&e, &ui),
        }
    }
}
