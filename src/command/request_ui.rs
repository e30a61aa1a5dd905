use crate::storage::NameValidator;
use crate::tree::{ModalResponse, OperationUi};
use async_trait::async_trait;
use log::debug;
use std::sync::Mutex;

/// 用一次请求里携带的回答驱动交互流程
///
/// 前端已经弹出过输入框和确认框，请求里带着用户的回答；这里不能再次提示，
/// 所以不合法的名称原样交回，由控制器拦截。
pub struct RequestUi {
    input: Option<String>,
    confirm: bool,
    prompts: Mutex<Vec<String>>,
    events: Mutex<Vec<String>>,
}

impl RequestUi {
    pub fn new(input: Option<String>, confirm: bool) -> Self {
        Self {
            input,
            confirm,
            prompts: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    /// 展示过的提示文字
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// 占位节点与进度提示
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(list: &Mutex<Vec<String>>, entry: String) {
        if let Ok(mut list) = list.lock() {
            list.push(entry);
        }
    }
}

#[async_trait]
impl OperationUi for RequestUi {
    async fn prompt_for_name(
        &self,
        placeholder: &str,
        validator: &NameValidator,
    ) -> Option<String> {
        Self::push(&self.prompts, placeholder.to_string());
        if let Some(Err(e)) = self.input.as_deref().map(|name| validator.check(name)) {
            debug!("请求中的名称未通过行内校验: {}", e);
        }
        self.input.clone()
    }

    async fn confirm_modal(&self, message: &str, affirmative: &str, negative: &str) -> ModalResponse {
        Self::push(
            &self.prompts,
            format!("{} [{}/{}]", message, affirmative, negative),
        );
        if self.confirm {
            ModalResponse::Affirmative
        } else {
            ModalResponse::Negative
        }
    }

    fn show_creating(&self, label: &str) {
        Self::push(&self.events, format!("creating: {}", label));
    }

    fn report_progress(&self, message: &str) {
        Self::push(&self.events, format!("progress: {}", message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ResourceKind;
    use tokio_test::block_on;

    #[test]
    fn answers_come_from_the_request() {
        let ui = RequestUi::new(Some("orders".to_string()), false);
        let validator = NameValidator::new(ResourceKind::Queue);
        assert_eq!(
            block_on(ui.prompt_for_name("name?", &validator)),
            Some("orders".to_string())
        );
        assert_eq!(
            block_on(ui.confirm_modal("sure?", "删除", "取消")),
            ModalResponse::Negative
        );
        assert_eq!(ui.prompts(), vec!["name?", "sure? [删除/取消]"]);
    }

    #[test]
    fn events_are_recorded_in_order() {
        let ui = RequestUi::new(None, true);
        ui.show_creating("docs");
        ui.report_progress("working");
        assert_eq!(ui.events(), vec!["creating: docs", "progress: working"]);
        assert_eq!(
            block_on(ui.confirm_modal("sure?", "删除", "取消")),
            ModalResponse::Affirmative
        );
    }
}
