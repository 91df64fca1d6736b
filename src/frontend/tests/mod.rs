//! Frontend 模块测试
