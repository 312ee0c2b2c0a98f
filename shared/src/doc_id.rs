//! 文档 ID 映射
//!
//! 后端文档可能带 `_id`、`id` 或两者同时出现（虚拟字段）。
//! 用法：`#[serde(flatten, with = "crate::doc_id")] pub id: String`。

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
struct Keys {
    #[serde(rename = "_id", default)]
    mongo: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

impl Keys {
    fn merged(self) -> Option<String> {
        self.mongo.or(self.id)
    }
}

/// `_id` 优先，缺失时回退到 `id`；两者都缺失时报错。
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Keys::deserialize(deserializer)?
        .merged()
        .ok_or_else(|| D::Error::missing_field("_id"))
}

/// 同上，但两者都缺失时返回空串。
pub fn deserialize_or_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(Keys::deserialize(deserializer)?.merged().unwrap_or_default())
}

pub fn serialize<S: Serializer>(id: &str, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry("_id", id)?;
    map.end()
}
