use super::console_path::{display_path, resolve, ConsolePath};
use super::CommandHandler;
use crate::tree::{AccountNode, TreeNode};
use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use log::{debug, error, info};
use serde_json::{json, Value};
use std::path::Path;

pub struct LsCommand;

impl LsCommand {
    pub fn new() -> Self {
        LsCommand
    }
}

/// 节点的只读显示属性
pub(super) fn node_json(node: &TreeNode, resources_dir: &Path) -> Value {
    let icon = node.icon_reference();
    json!({
        "label": node.label(),
        "kind": node.kind(),
        "path": display_path(node),
        "context_tag": node.context_tag(),
        "is_container": node.as_container().is_some(),
        "icon": {
            "light": resources_dir.join(&icon.light),
            "dark": resources_dir.join(&icon.dark),
        },
    })
}

/// 账户根节点自身的显示属性
fn account_json(account: &AccountNode, resources_dir: &Path) -> Value {
    let icon = account.icon_reference();
    json!({
        "label": account.label(),
        "context_tag": account.context_tag(),
        "icon": {
            "light": resources_dir.join(&icon.light),
            "dark": resources_dir.join(&icon.dark),
        },
    })
}

#[async_trait]
impl CommandHandler for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn description(&self) -> &'static str {
        "列出子资源，用法：ls [路径]"
    }

    async fn handle(
        &self,
        args: &str,
        data: &web::Data<crate::AppState>,
        _request: &super::CommandRequest,
    ) -> HttpResponse {
        info!("开始处理 ls 命令，路径: {:?}", args);

        let path = match ConsolePath::parse(args) {
            Ok(path) => path,
            Err(e) => return super::CommandResponse::bad_request(e.to_string()),
        };

        let (label, children, account) = match &path {
            ConsolePath::Account => (
                data.account.label().to_string(),
                data.account.get_children().await,
                Some(account_json(&data.account, &data.resources_dir)),
            ),
            resource => match resolve(&data.account, resource).await {
                Ok(node) => (display_path(&node), node.get_children().await, None),
                Err(e) => return super::resolve_failure(e),
            },
        };

        match children {
            Ok(children) => {
                debug!("{} 下共有 {} 个子资源", label, children.len());
                let items: Vec<Value> = children
                    .iter()
                    .map(|n| node_json(n, &data.resources_dir))
                    .collect();
                let mut payload = json!({ "children": items });
                if let Some(account) = account {
                    payload["account"] = account;
                }
                super::CommandResponse::ok(label, Some(payload))
            }
            Err(e) => {
                error!("列出 {} 失败: {}", label, e);
                super::operation_failure(&e, &super::RequestUi::new(None, false))
            }
        }
    }
}
