use super::cmd_ls::node_json;
use super::console_path::{display_path, resolve, ConsolePath};
use super::{CommandHandler, CommandResponse, RequestUi};
use crate::storage::ResourceKind;
use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use log::{debug, info};

const USAGE: &str = "用法：create <share|dir|file|queue|container|blob> [父路径]";

pub struct CreateCommand;

impl CreateCommand {
    pub fn new() -> Self {
        CreateCommand
    }
}

#[async_trait]
impl CommandHandler for CreateCommand {
    fn name(&self) -> &'static str {
        "create"
    }

    fn description(&self) -> &'static str {
        "在父路径下创建资源，名称由输入框提供，用法：create <类型> [父路径]"
    }

    async fn handle(
        &self,
        args: &str,
        data: &web::Data<crate::AppState>,
        request: &super::CommandRequest,
    ) -> HttpResponse {
        info!("开始处理 create 命令");

        // 类型之后的部分整体作为父路径
        let (kind_raw, parent_raw) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
        let kind = match ResourceKind::parse(kind_raw) {
            Some(kind) => kind,
            None => return CommandResponse::bad_request(USAGE),
        };
        let parent = match ConsolePath::parse(parent_raw.trim_start()) {
            Ok(parent) => parent,
            Err(e) => return CommandResponse::bad_request(e.to_string()),
        };
        debug!("创建 {}，父路径: {:?}", kind.noun(), parent);

        let ui = RequestUi::new(request.input.clone(), request.confirm);
        let created = match &parent {
            ConsolePath::Account => {
                if !kind.is_top_level() {
                    return CommandResponse::bad_request(format!(
                        "账户下不能直接创建 {}",
                        kind.noun()
                    ));
                }
                data.account.create_child(kind, &ui).await
            }
            resource => {
                let node = match resolve(&data.account, resource).await {
                    Ok(node) => node,
                    Err(e) => return super::resolve_failure(e),
                };
                let container = match node.as_container() {
                    Some(container) if container.accepts(kind) => container,
                    _ => {
                        return CommandResponse::bad_request(format!(
                            "'{}' 下不能创建 {}",
                            display_path(&node),
                            kind.noun()
                        ))
                    }
                };
                container.create_child(kind, &ui).await
            }
        };

        match created {
            Ok(node) => {
                info!("成功创建 {}: {}", kind.noun(), display_path(&node));
                let mut payload = node_json(&node, &data.resources_dir);
                payload["events"] = serde_json::json!(ui.events());
                CommandResponse::ok(
                    format!("{} '{}' 创建成功", kind.noun(), node.label()),
                    Some(payload),
                )
            }
            Err(e) => super::operation_failure(&e, &ui),
        }
    }
}
