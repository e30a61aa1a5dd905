use crate::storage::{
    model::{ResourcePath, ServiceKind},
    OperationError, ResourceKind,
};
use crate::tree::{AccountNode, TreeNode};
use log::debug;
use thiserror::Error;

/// 控制台路径：`shares/<共享>/<目录>...`、`queues/<队列>`、`containers/<容器>/<blob>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsolePath {
    Account,
    /// `path` 不含分组前缀，第一段是顶层资源名
    Resource {
        top_kind: ResourceKind,
        path: ResourcePath,
    },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("无效路径: {0}")]
    InvalidPath(String),

    #[error("路径不存在: {0}")]
    NotFound(String),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// 资源分组在控制台路径里的前缀
pub fn group_prefix(kind: ResourceKind) -> &'static str {
    match kind.service() {
        ServiceKind::File => "shares",
        ServiceKind::Queue => "queues",
        ServiceKind::Blob => "containers",
    }
}

/// 节点在控制台里显示的路径
pub fn display_path(node: &TreeNode) -> String {
    format!("{}/{}", group_prefix(node.kind()), node.path())
}

impl ConsolePath {
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let parsed = ResourcePath::parse(raw);
        let (group, rest) = match parsed.segments().split_first() {
            None => return Ok(ConsolePath::Account),
            Some(split) => split,
        };

        let top_kind = match group.as_str() {
            "shares" => ResourceKind::FileShare,
            "queues" => ResourceKind::Queue,
            "containers" => ResourceKind::BlobContainer,
            other => return Err(ResolveError::InvalidPath(format!("未知分组 '{}'", other))),
        };

        if rest.is_empty() {
            return Err(ResolveError::InvalidPath(format!(
                "'{}' 后需要资源名",
                group
            )));
        }
        // 校验器保证没有资源叫 `..`
        if rest.iter().any(|s| s == "..") {
            return Err(ResolveError::InvalidPath("不支持 '..'".to_string()));
        }
        let path = rest
            .iter()
            .fold(ResourcePath::root(), |path, segment| path.join(segment));
        Ok(ConsolePath::Resource { top_kind, path })
    }
}

/// 从账户根节点一路列出子节点，找到路径对应的节点
pub async fn resolve(account: &AccountNode, path: &ConsolePath) -> Result<TreeNode, ResolveError> {
    let (top_kind, segments) = match path {
        ConsolePath::Account => {
            return Err(ResolveError::InvalidPath("账户根节点不是资源".to_string()))
        }
        ConsolePath::Resource { top_kind, path } => (*top_kind, path.segments()),
    };

    let mut current = account
        .get_children()
        .await?
        .into_iter()
        .find(|n| n.kind() == top_kind && n.label() == segments[0])
        .ok_or_else(|| ResolveError::NotFound(segments[0].clone()))?;

    let mut rest = &segments[1..];
    while !rest.is_empty() {
        // blob 名字本身可以带 `/`，容器下剩余部分整体作为名字
        let (wanted, remaining) = if current.kind() == ResourceKind::BlobContainer {
            (rest.join("/"), &rest[rest.len()..])
        } else {
            (rest[0].clone(), &rest[1..])
        };

        let children = current.get_children().await?;
        current = children
            .into_iter()
            .find(|n| n.label() == wanted)
            .ok_or_else(|| ResolveError::NotFound(format!("{}/{}", current.path(), wanted)))?;
        debug!("解析到节点: {}", current.path());
        rest = remaining;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryGateway, RemoteHandle};
    use crate::tree::controller::test_support::ScriptedUi;
    use std::sync::Arc;

    #[test]
    fn parse_groups() {
        assert_eq!(ConsolePath::parse("").unwrap(), ConsolePath::Account);
        assert_eq!(ConsolePath::parse("/").unwrap(), ConsolePath::Account);
        assert_eq!(
            ConsolePath::parse("shares/docs/a/").unwrap(),
            ConsolePath::Resource {
                top_kind: ResourceKind::FileShare,
                path: ResourcePath::parse("docs/a"),
            }
        );
        assert_eq!(
            ConsolePath::parse("shares/docs/my dir").unwrap(),
            ConsolePath::Resource {
                top_kind: ResourceKind::FileShare,
                path: ResourcePath::root().join("docs").join("my dir"),
            }
        );
        assert!(matches!(
            ConsolePath::parse("tables/t1"),
            Err(ResolveError::InvalidPath(_))
        ));
        assert!(matches!(
            ConsolePath::parse("queues"),
            Err(ResolveError::InvalidPath(_))
        ));
        assert!(matches!(
            ConsolePath::parse("shares/docs/../x"),
            Err(ResolveError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn resolves_nested_directories_and_blobs() {
        let account = AccountNode::new(
            RemoteHandle::with_key("devstore", "key"),
            Arc::new(MemoryGateway::new()),
        );
        let share = account
            .create_child(ResourceKind::FileShare, &ScriptedUi::typing(&["docs"]))
            .await
            .unwrap();
        share
            .as_container()
            .unwrap()
            .create_child(ResourceKind::Directory, &ScriptedUi::typing(&["a"]))
            .await
            .unwrap();
        let container = account
            .create_child(ResourceKind::BlobContainer, &ScriptedUi::typing(&["images"]))
            .await
            .unwrap();
        container
            .as_container()
            .unwrap()
            .create_child(ResourceKind::Blob, &ScriptedUi::typing(&["2024/cat.png"]))
            .await
            .unwrap();

        let dir = resolve(&account, &ConsolePath::parse("shares/docs/a").unwrap())
            .await
            .unwrap();
        assert_eq!(dir.kind(), ResourceKind::Directory);
        assert_eq!(display_path(&dir), "shares/docs/a");

        let blob = resolve(
            &account,
            &ConsolePath::parse("containers/images/2024/cat.png").unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(blob.label(), "2024/cat.png");

        let missing = resolve(&account, &ConsolePath::parse("queues/orders").unwrap()).await;
        assert!(matches!(missing, Err(ResolveError::NotFound(_))));
    }
}
