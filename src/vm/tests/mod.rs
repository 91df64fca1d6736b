//! VM 模块测试
//!
//! 按子模块拆分，执行器相关的端到端用例放在 executor 中

pub mod errors;
