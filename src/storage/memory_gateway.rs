use crate::storage::{
    gateway::{check_credential, check_placement, created_name, StorageGateway},
    model::{
        RemoteErrorKind, RemoteHandle, RemoteOperationError, RemoteResourceDescriptor,
        ResourceKind, ResourcePath, ServiceKind,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::BTreeMap;
use std::sync::Mutex;

type EntryKey = (String, ServiceKind, String);

#[derive(Debug, Clone)]
struct Entry {
    kind: ResourceKind,
    // blob 名字可以包含 `/`，父路径不能从完整路径反推
    parent: String,
    name: String,
    created_at: DateTime<Utc>,
}

/// 进程内的存储服务模拟，没有配置数据库时使用
pub struct MemoryGateway {
    entries: Mutex<BTreeMap<EntryKey, Entry>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    fn key(handle: &RemoteHandle, service: ServiceKind, path: &ResourcePath) -> EntryKey {
        (handle.account.name.clone(), service, path.to_wire())
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<EntryKey, Entry>>, RemoteOperationError> {
        self.entries
            .lock()
            .map_err(|_| RemoteOperationError::new(RemoteErrorKind::Other, "存储模拟器状态损坏"))
    }

    fn is_descendant(key: &EntryKey, root: &EntryKey) -> bool {
        key.0 == root.0
            && key.1 == root.1
            && (key.2 == root.2 || key.2.starts_with(&format!("{}/", root.2)))
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn create_child(
        &self,
        parent: &ResourcePath,
        name: &str,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<RemoteResourceDescriptor, RemoteOperationError> {
        check_credential(handle)?;
        let service = kind.service();
        let mut entries = self.lock()?;

        let parent_kind = if parent.is_root() {
            None
        } else {
            let entry = entries
                .get(&Self::key(handle, service, parent))
                .ok_or_else(|| {
                    RemoteOperationError::new(
                        RemoteErrorKind::NotFound,
                        format!("父资源 '{}' 不存在", parent),
                    )
                })?;
            Some(entry.kind)
        };
        check_placement(parent, parent_kind, kind)?;

        let path = parent.join(name);
        let key = Self::key(handle, service, &path);
        if entries.contains_key(&key) {
            return Err(RemoteOperationError::new(
                RemoteErrorKind::Conflict,
                format!("资源 '{}' 已存在", path),
            ));
        }

        let created_at = Utc::now();
        entries.insert(
            key,
            Entry {
                kind,
                parent: parent.to_wire(),
                name: name.to_string(),
                created_at,
            },
        );
        debug!("模拟器创建资源: {} ({})", path, kind);

        Ok(RemoteResourceDescriptor {
            name: created_name(&path, kind),
            kind,
            created_at,
        })
    }

    async fn delete_resource(
        &self,
        path: &ResourcePath,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<(), RemoteOperationError> {
        check_credential(handle)?;
        let root = Self::key(handle, kind.service(), path);
        let mut entries = self.lock()?;

        match entries.get(&root) {
            Some(entry) if entry.kind == kind => {}
            _ => {
                return Err(RemoteOperationError::new(
                    RemoteErrorKind::NotFound,
                    format!("{} '{}' 不存在", kind.noun(), path),
                ))
            }
        }

        let before = entries.len();
        if kind.is_container() {
            entries.retain(|key, _| !Self::is_descendant(key, &root));
        } else {
            entries.remove(&root);
        }
        debug!("模拟器删除资源: {}，共移除 {} 项", path, before - entries.len());
        Ok(())
    }

    async fn list_children(
        &self,
        parent: &ResourcePath,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<Vec<RemoteResourceDescriptor>, RemoteOperationError> {
        check_credential(handle)?;
        let service = kind.service();
        let entries = self.lock()?;

        if !parent.is_root() && !entries.contains_key(&Self::key(handle, service, parent)) {
            return Err(RemoteOperationError::new(
                RemoteErrorKind::NotFound,
                format!("父资源 '{}' 不存在", parent),
            ));
        }

        let parent_wire = parent.to_wire();
        let children = entries
            .iter()
            .filter(|((account, svc, _), entry)| {
                *account == handle.account.name
                    && *svc == service
                    && entry.kind == kind
                    && entry.parent == parent_wire
            })
            .map(|(_, entry)| RemoteResourceDescriptor {
                name: entry.name.clone(),
                kind: entry.kind,
                created_at: entry.created_at,
            })
            .collect();

        Ok(children)
    }
}
