//! Middle 模块测试
