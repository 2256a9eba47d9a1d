//! 专题存储服务 - 业务能力层
//!
//! 负责专题列表的增删改查，以及与键值存储的整块同步

use crate::error::AppResult;
use crate::infrastructure::BlobStore;
use crate::models::Topic;
use tracing::{debug, error, info, warn};

/// 加载结果
///
/// 键不存在、内容不是合法 JSON、结构不对，都视为 `Empty`
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    Topics(Vec<Topic>),
    Empty,
}

impl LoadResult {
    pub fn into_topics(self) -> Vec<Topic> {
        match self {
            LoadResult::Topics(topics) => topics,
            LoadResult::Empty => Vec::new(),
        }
    }
}

/// 专题存储
///
/// 职责：
/// - 持有当前专题列表（其他组件看到的就是这份）
/// - 每次修改都整体写回存储
/// - 写入失败时内存中的列表保持修改前的状态
pub struct TopicStore<S: BlobStore> {
    blob_store: S,
    key: String,
    topics: Vec<Topic>,
}

impl<S: BlobStore> TopicStore<S> {
    pub fn new(blob_store: S, key: impl Into<String>) -> Self {
        Self {
            blob_store,
            key: key.into(),
            topics: Vec::new(),
        }
    }

    /// 当前专题列表
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// 按名称精确查找（区分大小写）
    pub fn find(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name == name)
    }

    /// 从存储读取专题列表并替换内存中的列表
    ///
    /// 任何失败都静默降级为空列表
    pub fn load(&mut self) -> LoadResult {
        let result = self.read_blob();
        self.topics = match &result {
            LoadResult::Topics(topics) => topics.clone(),
            LoadResult::Empty => Vec::new(),
        };
        result
    }

    fn read_blob(&self) -> LoadResult {
        let blob = match self.blob_store.get(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("存储中没有专题，从空列表开始");
                return LoadResult::Empty;
            }
            Err(e) => {
                warn!("读取专题失败，从空列表开始: {}", e);
                return LoadResult::Empty;
            }
        };

        match serde_json::from_str::<Vec<Topic>>(&blob) {
            Ok(topics) if topics.is_empty() => LoadResult::Empty,
            Ok(topics) => {
                info!("✓ 已加载 {} 个专题", topics.len());
                LoadResult::Topics(topics)
            }
            Err(e) => {
                warn!("专题数据无法解析，从空列表开始: {}", e);
                LoadResult::Empty
            }
        }
    }

    /// 整体写回专题列表
    ///
    /// 只有写入成功后才更新内存中的列表
    pub fn save_all(&mut self, topics: Vec<Topic>) -> AppResult<()> {
        let blob = serde_json::to_string(&topics)?;

        if let Err(e) = self.blob_store.set(&self.key, &blob) {
            error!("保存专题失败: {}", e);
            return Err(e);
        }

        debug!("已保存 {} 个专题", topics.len());
        self.topics = topics;
        Ok(())
    }

    /// 新增或替换专题
    ///
    /// 先按 `original_name` 或新名称查找，找到则原位替换，否则追加到末尾
    pub fn upsert(&mut self, topic: Topic, original_name: Option<&str>) -> AppResult<()> {
        let mut updated = self.topics.clone();

        let existing_index = updated
            .iter()
            .position(|t| Some(t.name.as_str()) == original_name || t.name == topic.name);

        let name = topic.name.clone();
        match existing_index {
            Some(index) => updated[index] = topic,
            None => updated.push(topic),
        }

        self.save_all(updated)?;

        match existing_index {
            Some(index) => info!("✓ 专题已更新: {} (位置 {})", name, index),
            None => info!("✓ 专题已新建: {}", name),
        }
        Ok(())
    }

    /// 删除指定名称的专题，返回是否真的删掉了
    pub fn remove(&mut self, name: &str) -> AppResult<bool> {
        let before = self.topics.len();
        let updated: Vec<Topic> = self
            .topics
            .iter()
            .filter(|t| t.name != name)
            .cloned()
            .collect();
        let removed = updated.len() != before;

        self.save_all(updated)?;

        if removed {
            info!("🗑️ 专题已删除: {}", name);
        }
        Ok(removed)
    }
}
