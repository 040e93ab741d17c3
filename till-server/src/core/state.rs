//! 服务器状态 - 持有所有服务的单例引用
//!
//! ServerState 是整个服务的核心数据结构，使用 Arc 实现浅拷贝，
//! 所有权成本极低。
//!
//! # 服务组件
//!
//! | 字段 | 类型 | 说明 |
//! |------|------|------|
//! | config | Config | 配置项 (不可变) |
//! | db | DbService | 菜单目录数据库 |
//! | store | Arc<dyn OrderStore> | 订单存储 |
//! | tracker | CompletionTracker | 已完成订单集合 |
//! | lifecycle | Arc<LifecycleController> | 订单生命周期控制器 |
//! | jwt | Arc<JwtService> | 令牌服务 |
//! | shutdown | CancellationToken | 后台任务停机信号 |

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::{CompletionTracker, LifecycleController, MemoryOrderStore, OrderStore};
use crate::printing::ReceiptService;
use shared::AppResult;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 菜单目录数据库
    pub db: DbService,
    /// 订单存储
    pub store: Arc<dyn OrderStore>,
    /// 已完成订单跟踪
    pub tracker: CompletionTracker,
    /// 订单生命周期控制器
    pub lifecycle: Arc<LifecycleController>,
    /// 令牌服务
    pub jwt: Arc<JwtService>,
    /// 停机信号
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：数据库 → 订单存储 → 打印服务 → 生命周期控制器
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_path).await?;

        let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
        let tracker = CompletionTracker::new();
        let receipts = ReceiptService::from_config(config)?;
        let lifecycle = Arc::new(LifecycleController::new(
            store.clone(),
            tracker.clone(),
            receipts,
        ));
        let jwt = Arc::new(JwtService::default());

        Ok(Self {
            config: config.clone(),
            db,
            store,
            tracker,
            lifecycle,
            jwt,
            shutdown: CancellationToken::new(),
        })
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    pub fn start_background_tasks(&self) {
        self.tracker.spawn(self.store.clone(), self.shutdown.clone());
    }
}
