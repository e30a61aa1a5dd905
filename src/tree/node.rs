use crate::storage::{
    model::{OperationError, RemoteHandle, RemoteResourceDescriptor, ResourceKind, ResourcePath},
    StorageGateway,
};
use crate::tree::controller::{OperationController, OperationUi};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// 挂载账户的节点在上下文标签后追加的后缀
pub const ATTACHED_SUFFIX: &str = "Attached";

/// 节点的生命周期
///
/// 未物化的阶段只存在于创建流程内部：远端返回描述之前没有节点值，
/// `TreeNode::from_descriptor` 构造出来的节点即为 `Materialized`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeState {
    Materialized,
    /// 终态，之后任何操作都是调用方的错误
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconReference {
    pub light: String,
    pub dark: String,
}

impl IconReference {
    fn for_file(file: &str) -> Self {
        Self {
            light: format!("light/{}", file),
            dark: format!("dark/{}", file),
        }
    }
}

fn context_tag(base: &str, handle: &RemoteHandle) -> String {
    if handle.account.attached {
        format!("{}{}", base, ATTACHED_SUFFIX)
    } else {
        base.to_string()
    }
}

/// 在 `parent_path` 下跑一次创建流程并构造对应的子节点
async fn create_under(
    parent_path: &ResourcePath,
    kind: ResourceKind,
    handle: &RemoteHandle,
    gateway: &Arc<dyn StorageGateway>,
    ui: &dyn OperationUi,
) -> Result<TreeNode, OperationError> {
    let descriptor = OperationController::new(gateway.as_ref(), ui)
        .create_flow(parent_path, kind, handle)
        .await?;
    Ok(TreeNode::from_descriptor(
        parent_path.clone(),
        descriptor,
        handle.clone(),
        Arc::clone(gateway),
    ))
}

/// 依次列出每种子类型，同一操作内不并发调用远端
async fn list_under(
    parent_path: &ResourcePath,
    kinds: &[ResourceKind],
    handle: &RemoteHandle,
    gateway: &Arc<dyn StorageGateway>,
) -> Result<Vec<TreeNode>, OperationError> {
    let mut children = Vec::new();
    for kind in kinds {
        let descriptors = gateway.list_children(parent_path, *kind, handle).await?;
        debug!("'{}' 下有 {} 个 {}", parent_path, descriptors.len(), kind.noun());
        children.extend(descriptors.into_iter().map(|d| {
            TreeNode::from_descriptor(parent_path.clone(), d, handle.clone(), Arc::clone(gateway))
        }));
    }
    Ok(children)
}

/// 节点的公共部分，`handle` 和 `parent_path + label` 始终对应同一个远端资源
#[derive(Clone)]
struct NodeCore {
    label: String,
    kind: ResourceKind,
    parent_path: ResourcePath,
    handle: RemoteHandle,
    gateway: Arc<dyn StorageGateway>,
    state: NodeState,
}

impl fmt::Debug for NodeCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCore")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("parent_path", &self.parent_path)
            .field("handle", &self.handle)
            .field("state", &self.state)
            .finish()
    }
}

impl NodeCore {
    fn ensure_live(&self, op: &str) {
        assert!(
            self.state == NodeState::Materialized,
            "{} 在已删除的节点 '{}' 上调用",
            op,
            self.path()
        );
    }

    fn path(&self) -> ResourcePath {
        self.parent_path.join(&self.label)
    }

    async fn delete_self(&mut self, ui: &dyn OperationUi) -> Result<(), OperationError> {
        self.ensure_live("delete_self");
        let path = self.path();
        OperationController::new(self.gateway.as_ref(), ui)
            .delete_flow(&path, self.kind, &self.label, &self.handle)
            .await?;
        self.state = NodeState::Deleted;
        Ok(())
    }
}

/// 可以包含子节点的资源：文件共享、目录、blob 容器
#[derive(Debug, Clone)]
pub struct ContainerNode {
    core: NodeCore,
}

impl ContainerNode {
    pub fn accepts(&self, kind: ResourceKind) -> bool {
        self.core.kind.child_kinds().contains(&kind)
    }

    pub async fn get_children(&self) -> Result<Vec<TreeNode>, OperationError> {
        self.core.ensure_live("get_children");
        let core = &self.core;
        list_under(&core.path(), core.kind.child_kinds(), &core.handle, &core.gateway).await
    }

    /// 成功后返回新节点，由调用方插入显示树
    pub async fn create_child(
        &self,
        kind: ResourceKind,
        ui: &dyn OperationUi,
    ) -> Result<TreeNode, OperationError> {
        self.core.ensure_live("create_child");
        assert!(
            self.accepts(kind),
            "{} 下不能创建 {}",
            self.core.kind.noun(),
            kind.noun()
        );
        let core = &self.core;
        create_under(&core.path(), kind, &core.handle, &core.gateway, ui).await
    }
}

/// 叶子资源：文件、队列、blob
#[derive(Debug, Clone)]
pub struct LeafNode {
    core: NodeCore,
}

#[derive(Debug, Clone)]
pub enum TreeNode {
    Container(ContainerNode),
    Leaf(LeafNode),
}

impl TreeNode {
    /// 从远端描述构造节点，描述里的名字必须已经是裸名
    pub fn from_descriptor(
        parent_path: ResourcePath,
        descriptor: RemoteResourceDescriptor,
        handle: RemoteHandle,
        gateway: Arc<dyn StorageGateway>,
    ) -> Self {
        let core = NodeCore {
            label: descriptor.name,
            kind: descriptor.kind,
            parent_path,
            handle,
            gateway,
            state: NodeState::Materialized,
        };
        if core.kind.is_container() {
            TreeNode::Container(ContainerNode { core })
        } else {
            TreeNode::Leaf(LeafNode { core })
        }
    }

    fn core(&self) -> &NodeCore {
        match self {
            TreeNode::Container(node) => &node.core,
            TreeNode::Leaf(node) => &node.core,
        }
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        match self {
            TreeNode::Container(node) => &mut node.core,
            TreeNode::Leaf(node) => &mut node.core,
        }
    }

    pub fn label(&self) -> &str {
        &self.core().label
    }

    pub fn kind(&self) -> ResourceKind {
        self.core().kind
    }

    pub fn state(&self) -> NodeState {
        self.core().state
    }

    pub fn parent_path(&self) -> &ResourcePath {
        &self.core().parent_path
    }

    pub fn path(&self) -> ResourcePath {
        self.core().path()
    }

    pub fn context_tag(&self) -> String {
        let core = self.core();
        context_tag(core.kind.base_context_tag(), &core.handle)
    }

    pub fn icon_reference(&self) -> IconReference {
        IconReference::for_file(self.kind().icon_file())
    }

    pub fn as_container(&self) -> Option<&ContainerNode> {
        match self {
            TreeNode::Container(node) => Some(node),
            TreeNode::Leaf(_) => None,
        }
    }

    /// 叶子节点没有子节点
    pub async fn get_children(&self) -> Result<Vec<TreeNode>, OperationError> {
        match self {
            TreeNode::Container(node) => node.get_children().await,
            TreeNode::Leaf(node) => {
                node.core.ensure_live("get_children");
                Ok(Vec::new())
            }
        }
    }

    /// 成功返回时远端资源已不存在；从显示树中移除节点由调用方负责
    pub async fn delete_self(&mut self, ui: &dyn OperationUi) -> Result<(), OperationError> {
        self.core_mut().delete_self(ui).await
    }
}

/// 账户根节点，持有顶层的文件共享、队列和 blob 容器
#[derive(Clone)]
pub struct AccountNode {
    handle: RemoteHandle,
    gateway: Arc<dyn StorageGateway>,
}

impl AccountNode {
    pub fn new(handle: RemoteHandle, gateway: Arc<dyn StorageGateway>) -> Self {
        Self { handle, gateway }
    }

    pub fn label(&self) -> &str {
        &self.handle.account.name
    }

    pub fn context_tag(&self) -> String {
        context_tag("storageAccount", &self.handle)
    }

    pub fn icon_reference(&self) -> IconReference {
        IconReference::for_file("AzureStorageAccount.svg")
    }

    pub async fn get_children(&self) -> Result<Vec<TreeNode>, OperationError> {
        list_under(
            &ResourcePath::root(),
            &ResourceKind::TOP_LEVEL,
            &self.handle,
            &self.gateway,
        )
        .await
    }

    pub async fn create_child(
        &self,
        kind: ResourceKind,
        ui: &dyn OperationUi,
    ) -> Result<TreeNode, OperationError> {
        assert!(kind.is_top_level(), "账户下不能直接创建 {}", kind.noun());
        create_under(&ResourcePath::root(), kind, &self.handle, &self.gateway, ui).await
    }
}
