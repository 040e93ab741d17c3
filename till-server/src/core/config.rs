//! 服务器配置 - 所有配置项
//!
//! # 环境变量
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | DATABASE_PATH | dhaba.db | SQLite 数据库路径 |
//! | ENVIRONMENT | development | 运行环境 |
//! | RECEIPT_WIDTH | 32 | 小票宽度 (字符) |
//! | KITCHEN_PRINTER_ADDR | (未设置) | 厨房打印机地址 host:port |
//! | COUNTER_PRINTER_ADDR | (未设置) | 前台打印机地址 host:port |
//! | LOG_DIR | (未设置) | 日志目录 |
//!
//! # 示例
//!
//! ```ignore
//! DATABASE_PATH=/data/dhaba.db HTTP_PORT=8080 cargo run
//! ```

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库路径
    pub database_path: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 小票宽度 (字符数)
    pub receipt_width: usize,
    /// 厨房打印机地址 (host:port)，未配置时小票缓存在内存中
    pub kitchen_printer_addr: Option<String>,
    /// 前台打印机地址 (host:port)
    pub counter_printer_addr: Option<String>,
    /// 日志目录 (可选，按天滚动)
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "dhaba.db".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            receipt_width: std::env::var("RECEIPT_WIDTH")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or(32),
            kitchen_printer_addr: std::env::var("KITCHEN_PRINTER_ADDR").ok(),
            counter_printer_addr: std::env::var("COUNTER_PRINTER_ADDR").ok(),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
