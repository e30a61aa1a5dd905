use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 存储服务中的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    FileShare,
    Directory,
    File,
    Queue,
    BlobContainer,
    Blob,
}

/// 资源所属的服务，不同服务之间名字互不冲突
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKind {
    File,
    Queue,
    Blob,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::File => "file",
            ServiceKind::Queue => "queue",
            ServiceKind::Blob => "blob",
        }
    }
}

/// 创建接口返回的名字形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorShape {
    /// 只有资源自身的名字
    Bare,
    /// 共享内的相对路径，例如 `a/b/sub`
    ShareRelativePath,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::FileShare,
        ResourceKind::Directory,
        ResourceKind::File,
        ResourceKind::Queue,
        ResourceKind::BlobContainer,
        ResourceKind::Blob,
    ];

    /// 账户根节点下可以直接创建的类型
    pub const TOP_LEVEL: [ResourceKind; 3] = [
        ResourceKind::FileShare,
        ResourceKind::Queue,
        ResourceKind::BlobContainer,
    ];

    pub fn is_container(&self) -> bool {
        !self.child_kinds().is_empty()
    }

    pub fn is_top_level(&self) -> bool {
        Self::TOP_LEVEL.contains(self)
    }

    pub fn child_kinds(&self) -> &'static [ResourceKind] {
        match self {
            ResourceKind::FileShare | ResourceKind::Directory => {
                &[ResourceKind::Directory, ResourceKind::File]
            }
            ResourceKind::BlobContainer => &[ResourceKind::Blob],
            ResourceKind::File | ResourceKind::Queue | ResourceKind::Blob => &[],
        }
    }

    pub fn service(&self) -> ServiceKind {
        match self {
            ResourceKind::FileShare | ResourceKind::Directory | ResourceKind::File => {
                ServiceKind::File
            }
            ResourceKind::Queue => ServiceKind::Queue,
            ResourceKind::BlobContainer | ResourceKind::Blob => ServiceKind::Blob,
        }
    }

    pub fn created_shape(&self) -> DescriptorShape {
        match self {
            ResourceKind::Directory => DescriptorShape::ShareRelativePath,
            _ => DescriptorShape::Bare,
        }
    }

    /// 给用户看的名词
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceKind::FileShare => "file share",
            ResourceKind::Directory => "directory",
            ResourceKind::File => "file",
            ResourceKind::Queue => "queue",
            ResourceKind::BlobContainer => "blob container",
            ResourceKind::Blob => "blob",
        }
    }

    pub fn base_context_tag(&self) -> &'static str {
        match self {
            ResourceKind::FileShare => "storageFileShare",
            ResourceKind::Directory => "storageDirectory",
            ResourceKind::File => "storageFile",
            ResourceKind::Queue => "storageQueue",
            ResourceKind::BlobContainer => "storageBlobContainer",
            ResourceKind::Blob => "storageBlob",
        }
    }

    pub fn icon_file(&self) -> &'static str {
        match self {
            ResourceKind::FileShare => "AzureFileShare.svg",
            ResourceKind::Directory => "Folder.svg",
            ResourceKind::File => "Document.svg",
            ResourceKind::Queue => "AzureQueue.svg",
            ResourceKind::BlobContainer => "AzureBlobContainer.svg",
            ResourceKind::Blob => "Document.svg",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::FileShare => "file_share",
            ResourceKind::Directory => "directory",
            ResourceKind::File => "file",
            ResourceKind::Queue => "queue",
            ResourceKind::BlobContainer => "blob_container",
            ResourceKind::Blob => "blob",
        }
    }

    /// 控制台里用的简称
    pub fn short_name(&self) -> &'static str {
        match self {
            ResourceKind::FileShare => "share",
            ResourceKind::Directory => "dir",
            ResourceKind::BlobContainer => "container",
            other => other.as_str(),
        }
    }

    /// 接受 `as_str` 的写法和控制台简称
    pub fn parse(raw: &str) -> Option<ResourceKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw || kind.short_name() == raw)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// 资源路径，第一段是共享 / 队列 / 容器名
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// 解析 `/` 或 `\` 分隔的路径，丢弃空段和 `.`；`..` 由调用方拒绝
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split(|c| c == '/' || c == '\\')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(|s| s.to_string())
            .collect();
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// 追加一段，名字必须已经过校验
    pub fn join(&self, segment: &str) -> Self {
        assert!(!segment.is_empty(), "路径段不能为空");
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn basename(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    /// 去掉第一段（共享名）后的相对路径
    pub fn share_relative(&self) -> String {
        self.segments
            .iter()
            .skip(1)
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn to_wire(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

/// 远端返回的资源描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResourceDescriptor {
    /// 名字形态见 [`ResourceKind::created_shape`]，列表接口总是裸名
    pub name: String,
    pub kind: ResourceKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountIdentity {
    pub name: String,
    /// 通过连接字符串本地挂载，而不是订阅下的账户
    pub attached: bool,
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    AccountKey(String),
    ConnectionString(String),
}

impl Credential {
    pub fn secret(&self) -> &str {
        match self {
            Credential::AccountKey(key) => key,
            Credential::ConnectionString(conn) => conn,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::AccountKey(_) => f.write_str("AccountKey(***)"),
            Credential::ConnectionString(_) => f.write_str("ConnectionString(***)"),
        }
    }
}

/// 重新调用网关所需的全部信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHandle {
    pub account: AccountIdentity,
    pub credential: Credential,
}

impl RemoteHandle {
    pub fn with_key(account: &str, key: &str) -> Self {
        Self {
            account: AccountIdentity {
                name: account.to_string(),
                attached: false,
            },
            credential: Credential::AccountKey(key.to_string()),
        }
    }

    /// 从 `AccountName=...;AccountKey=...` 形式的连接字符串构造挂载账户
    pub fn from_connection_string(conn: &str) -> Option<Self> {
        let name = conn
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("AccountName"))
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())?;

        Some(Self {
            account: AccountIdentity {
                name,
                attached: true,
            },
            credential: Credential::ConnectionString(conn.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{noun} 名称不能为空")]
    EmptyName { noun: &'static str },

    #[error("{noun} 名称长度必须在 {min} 到 {max} 个字符之间")]
    LengthError {
        noun: &'static str,
        min: usize,
        max: usize,
    },

    #[error("{noun} 名称包含非法字符 '{found}'，{rule}")]
    IllegalCharacter {
        noun: &'static str,
        found: char,
        rule: String,
    },

    #[error("{noun} {rule}")]
    ReservedName { noun: &'static str, rule: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemoteErrorKind {
    Network,
    Conflict,
    NotFound,
    Forbidden,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("远端操作失败 ({kind:?}): {message}")]
pub struct RemoteOperationError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteOperationError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// 一次用户操作的失败结果
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("操作已取消")]
    UserCancelled,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteOperationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drops_empty_and_dot_segments() {
        let path = ResourcePath::parse("/share//a/./b/c\\d/");
        assert_eq!(path.segments(), &["share", "a", "b", "c", "d"]);
        assert_eq!(path.to_wire(), "share/a/b/c/d");
        assert_eq!(path.share_relative(), "a/b/c/d");
        assert!(ResourcePath::parse("/./").is_root());
    }

    #[test]
    fn join_and_basename() {
        let path = ResourcePath::parse("a/b").join("sub");
        assert_eq!(path.to_wire(), "a/b/sub");
        assert_eq!(path.basename(), Some("sub"));
        assert_eq!(ResourcePath::root().basename(), None);
    }

    #[test]
    #[should_panic]
    fn join_rejects_empty_segment() {
        ResourcePath::root().join("");
    }

    #[test]
    fn connection_string_yields_attached_handle() {
        let handle = RemoteHandle::from_connection_string(
            "DefaultEndpointsProtocol=https;AccountName=devstore;AccountKey=abc==;EndpointSuffix=core.windows.net",
        )
        .unwrap();
        assert_eq!(handle.account.name, "devstore");
        assert!(handle.account.attached);

        assert!(RemoteHandle::from_connection_string("AccountKey=abc").is_none());
        assert!(RemoteHandle::from_connection_string("AccountName=;AccountKey=abc").is_none());
    }

    #[test]
    fn credential_debug_hides_secret() {
        let handle = RemoteHandle::with_key("acct", "super-secret");
        assert!(!format!("{:?}", handle).contains("super-secret"));
    }

    #[test]
    fn kind_table_is_consistent() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::parse(kind.as_str()), Some(kind));
            assert_eq!(ResourceKind::parse(kind.short_name()), Some(kind));
            for child in kind.child_kinds() {
                assert_eq!(child.service(), kind.service());
                assert!(!child.is_top_level());
            }
        }
        assert_eq!(ResourceKind::parse("table"), None);
        assert!(ResourceKind::Directory.is_container());
        assert!(!ResourceKind::Queue.is_container());
        assert_eq!(
            ResourceKind::Directory.created_shape(),
            DescriptorShape::ShareRelativePath
        );
    }
}
