//! 请求上下文

use uuid::Uuid;

/// 每次调用显式传入的上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub principal: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            principal: None,
        }
    }

    /// 生成新的请求 ID
    pub fn generate() -> Self {
        Self::new(inv_common::utils::new_id())
    }

    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// 日志中使用的调用方标识
    pub fn principal_or_anonymous(&self) -> &str {
        self.principal.as_deref().unwrap_or("anonymous")
    }
}

/// 后台任务（启动、管理操作）使用的系统上下文
impl Default for RequestContext {
    fn default() -> Self {
        Self::generate().with_principal("system")
    }
}
