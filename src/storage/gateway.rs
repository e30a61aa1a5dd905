use crate::storage::model::{
    DescriptorShape, RemoteErrorKind, RemoteHandle, RemoteOperationError,
    RemoteResourceDescriptor, ResourceKind, ResourcePath,
};
use async_trait::async_trait;

/// 存储服务的无状态适配层，每次调用都从节点的 [`RemoteHandle`] 重新构造连接
///
/// 所有调用都是一次远端往返，不做重试。返回的名字形态：
/// - `create_child` 创建目录时返回共享内的相对路径（`a/b/sub`），其他类型返回裸名
/// - `list_children` 总是返回裸名
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// 在 `parent` 下创建 `kind` 类型的资源
    async fn create_child(
        &self,
        parent: &ResourcePath,
        name: &str,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<RemoteResourceDescriptor, RemoteOperationError>;

    /// 删除资源及其全部内容
    async fn delete_resource(
        &self,
        path: &ResourcePath,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<(), RemoteOperationError>;

    /// 列出 `parent` 下 `kind` 类型的子资源
    async fn list_children(
        &self,
        parent: &ResourcePath,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<Vec<RemoteResourceDescriptor>, RemoteOperationError>;
}

/// 创建接口按类型返回的名字
pub fn created_name(path: &ResourcePath, kind: ResourceKind) -> String {
    match kind.created_shape() {
        DescriptorShape::ShareRelativePath => path.share_relative(),
        DescriptorShape::Bare => path.basename().unwrap_or_default().to_string(),
    }
}

/// 把创建接口返回的名字还原成裸名，和列表接口保持一致
pub fn normalize_label(descriptor: &RemoteResourceDescriptor) -> String {
    match descriptor.kind.created_shape() {
        DescriptorShape::ShareRelativePath => descriptor
            .name
            .rsplit('/')
            .next()
            .unwrap_or(&descriptor.name)
            .to_string(),
        // blob 名字里的 `/` 是名字本身的一部分
        DescriptorShape::Bare => descriptor.name.clone(),
    }
}

/// 模拟服务端的凭据检查
pub(crate) fn check_credential(handle: &RemoteHandle) -> Result<(), RemoteOperationError> {
    if handle.account.name.is_empty() || handle.credential.secret().trim().is_empty() {
        return Err(RemoteOperationError::new(
            RemoteErrorKind::Forbidden,
            "账户凭据无效",
        ));
    }
    Ok(())
}

/// 模拟服务端对资源位置的检查，`parent_kind` 为 None 表示账户根
pub(crate) fn check_placement(
    parent: &ResourcePath,
    parent_kind: Option<ResourceKind>,
    kind: ResourceKind,
) -> Result<(), RemoteOperationError> {
    let allowed = match parent_kind {
        None => kind.is_top_level(),
        Some(parent_kind) => parent_kind.child_kinds().contains(&kind),
    };
    if allowed {
        Ok(())
    } else {
        Err(RemoteOperationError::new(
            RemoteErrorKind::Other,
            format!("不能在 '{}' 下创建 {}", parent, kind.noun()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn descriptor(name: &str, kind: ResourceKind) -> RemoteResourceDescriptor {
        RemoteResourceDescriptor {
            name: name.to_string(),
            kind,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn directory_descriptor_is_share_relative() {
        let path = ResourcePath::parse("share/a/b/sub");
        assert_eq!(created_name(&path, ResourceKind::Directory), "a/b/sub");
        assert_eq!(created_name(&path, ResourceKind::File), "sub");
    }

    #[test]
    fn normalize_strips_parent_prefix_for_directories() {
        assert_eq!(
            normalize_label(&descriptor("a/b/sub", ResourceKind::Directory)),
            "sub"
        );
        assert_eq!(normalize_label(&descriptor("sub", ResourceKind::Directory)), "sub");
    }

    #[test]
    fn normalize_keeps_blob_names_intact() {
        assert_eq!(
            normalize_label(&descriptor("logs/app.log", ResourceKind::Blob)),
            "logs/app.log"
        );
    }

    #[test]
    fn placement_follows_kind_table() {
        let root = ResourcePath::root();
        assert!(check_placement(&root, None, ResourceKind::Queue).is_ok());
        assert!(check_placement(&root, None, ResourceKind::Directory).is_err());
        let share = ResourcePath::parse("docs");
        assert!(check_placement(&share, Some(ResourceKind::FileShare), ResourceKind::Directory).is_ok());
        assert!(check_placement(&share, Some(ResourceKind::FileShare), ResourceKind::Blob).is_err());
    }

    #[test]
    fn empty_secret_is_forbidden() {
        let err = check_credential(&RemoteHandle::with_key("acct", " ")).unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::Forbidden);
        assert!(check_credential(&RemoteHandle::with_key("acct", "key")).is_ok());
    }
}
