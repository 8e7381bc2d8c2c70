//! 状态仓储接口

use inv_ports::PageableRepository;

use super::{Status, StatusId};

/// 状态只保存在主库，没有搜索索引
pub trait StatusRepository: PageableRepository<Status, StatusId> {}

impl<T> StatusRepository for T where T: PageableRepository<Status, StatusId> {}
