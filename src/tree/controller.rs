use crate::storage::{
    gateway::normalize_label,
    model::{OperationError, RemoteHandle, RemoteResourceDescriptor, ResourceKind, ResourcePath},
    validator::{validate, NameValidator},
    StorageGateway,
};
use async_trait::async_trait;
use log::{debug, error, info, warn};

/// 模态框的回答
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalResponse {
    Affirmative,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionConfirmation {
    Confirmed,
    Cancelled,
}

impl From<ModalResponse> for DeletionConfirmation {
    fn from(response: ModalResponse) -> Self {
        match response {
            ModalResponse::Affirmative => DeletionConfirmation::Confirmed,
            ModalResponse::Negative => DeletionConfirmation::Cancelled,
        }
    }
}

/// 宿主界面提供的交互能力：输入框、确认框、占位节点和进度提示
#[async_trait]
pub trait OperationUi: Send + Sync {
    /// 弹出输入框，`validator` 在每次输入时调用，不合法时阻止提交；返回 None 表示用户取消
    async fn prompt_for_name(&self, placeholder: &str, validator: &NameValidator)
        -> Option<String>;

    async fn confirm_modal(
        &self,
        message: &str,
        affirmative: &str,
        negative: &str,
    ) -> ModalResponse;

    /// 远端调用前先显示一个 "正在创建" 的占位节点
    fn show_creating(&self, label: &str);

    /// 不确定进度的长时间操作提示
    fn report_progress(&self, message: &str);
}

/// 一次创建请求，只在单次操作内存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    pub parent_path: ResourcePath,
    pub proposed_name: String,
    pub kind: ResourceKind,
}

/// 驱动一次用户发起的操作：提示 -> 校验 -> 确认 -> 远端调用
pub struct OperationController<'a> {
    gateway: &'a dyn StorageGateway,
    ui: &'a dyn OperationUi,
}

impl<'a> OperationController<'a> {
    pub fn new(gateway: &'a dyn StorageGateway, ui: &'a dyn OperationUi) -> Self {
        Self { gateway, ui }
    }

    /// 创建流程，返回的描述里名字已经还原为裸名
    pub async fn create_flow(
        &self,
        parent_path: &ResourcePath,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<RemoteResourceDescriptor, OperationError> {
        let validator = NameValidator::new(kind);
        let placeholder = format!("输入新 {} 的名称", kind.noun());

        let request = match self.ui.prompt_for_name(&placeholder, &validator).await {
            Some(name) => CreationRequest {
                parent_path: parent_path.clone(),
                proposed_name: name,
                kind,
            },
            None => {
                debug!("用户取消了 {} 名称输入", kind.noun());
                return Err(OperationError::UserCancelled);
            }
        };

        // 界面不能再次提示时（例如一次性请求），无效名称在这里拦下
        if let Err(e) = validate(&request.proposed_name, kind) {
            warn!("名称校验失败: {:?} - {}", request.proposed_name, e);
            return Err(e.into());
        }

        let target = request.parent_path.join(&request.proposed_name);
        self.ui.show_creating(&request.proposed_name);
        self.ui
            .report_progress(&format!("Storage: 正在创建 {} '{}'", kind.noun(), target));
        info!("创建 {}: {}, 账户: {}", kind.noun(), target, handle.account.name);

        let mut descriptor = self
            .gateway
            .create_child(&request.parent_path, &request.proposed_name, kind, handle)
            .await
            .map_err(|e| {
                error!("创建 {} '{}' 失败: {}", kind.noun(), target, e);
                e
            })?;

        descriptor.name = normalize_label(&descriptor);
        info!("成功创建 {}: {}", kind.noun(), target);
        Ok(descriptor)
    }

    /// 删除流程，只有用户确认后才会调用远端
    pub async fn delete_flow(
        &self,
        path: &ResourcePath,
        kind: ResourceKind,
        label: &str,
        handle: &RemoteHandle,
    ) -> Result<(), OperationError> {
        let message = format!(
            "确定要删除 {} '{}' 及其全部内容吗？此操作不可恢复。",
            kind.noun(),
            label
        );
        let confirmation: DeletionConfirmation =
            self.ui.confirm_modal(&message, "删除", "取消").await.into();

        if confirmation == DeletionConfirmation::Cancelled {
            debug!("用户取消了删除 {} '{}'", kind.noun(), path);
            return Err(OperationError::UserCancelled);
        }

        self.ui
            .report_progress(&format!("Storage: 正在删除 {} '{}'", kind.noun(), path));
        info!("删除 {}: {}, 账户: {}", kind.noun(), path, handle.account.name);

        self.gateway
            .delete_resource(path, kind, handle)
            .await
            .map_err(|e| {
                error!("删除 {} '{}' 失败: {}", kind.noun(), path, e);
                e
            })?;

        info!("成功删除 {}: {}", kind.noun(), path);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// 按脚本回答提示的界面：依次尝试输入，跳过校验不通过的，全部失败视为取消
    pub struct ScriptedUi {
        attempts: Vec<String>,
        bypass_validation: bool,
        confirm: ModalResponse,
        pub events: Mutex<Vec<String>>,
    }

    impl ScriptedUi {
        pub fn typing(attempts: &[&str]) -> Self {
            Self {
                attempts: attempts.iter().map(|s| s.to_string()).collect(),
                bypass_validation: false,
                confirm: ModalResponse::Negative,
                events: Mutex::new(Vec::new()),
            }
        }

        pub fn cancelling() -> Self {
            Self::typing(&[])
        }

        /// 直接提交第一个输入，不经过行内校验
        pub fn submitting_raw(name: &str) -> Self {
            Self {
                bypass_validation: true,
                ..Self::typing(&[name])
            }
        }

        pub fn answering(confirm: ModalResponse) -> Self {
            Self {
                confirm,
                ..Self::cancelling()
            }
        }

        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OperationUi for ScriptedUi {
        async fn prompt_for_name(
            &self,
            _placeholder: &str,
            validator: &NameValidator,
        ) -> Option<String> {
            for attempt in &self.attempts {
                if self.bypass_validation {
                    return Some(attempt.clone());
                }
                match validator.check(attempt) {
                    Ok(()) => return Some(attempt.clone()),
                    Err(e) => self.events.lock().unwrap().push(format!("rejected: {}", e)),
                }
            }
            None
        }

        async fn confirm_modal(&self, message: &str, _yes: &str, _no: &str) -> ModalResponse {
            self.events.lock().unwrap().push(format!("confirm: {}", message));
            self.confirm
        }

        fn show_creating(&self, label: &str) {
            self.events.lock().unwrap().push(format!("creating: {}", label));
        }

        fn report_progress(&self, message: &str) {
            self.events.lock().unwrap().push(format!("progress: {}", message));
        }
    }
}
