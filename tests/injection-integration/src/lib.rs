//! 集中集成测试工程；测试代码见 tests/ 目录
