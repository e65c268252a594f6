// ==========================================
// 飞行员竞标优化系统 - 工件导出存储
// ==========================================
// 职责: 竞标层工件的内容寻址原子落盘
// 红线: 路径段先清洗再拼接,落盘前必须重算 export_hash
// ==========================================

use crate::domain::artifact::BidLayerArtifact;
use crate::error::{PipelineError, PipelineResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const UNKNOWN_AIRLINE: &str = "UNK";
const UNKNOWN_MONTH: &str = "0000-00";

// ==========================================
// ExportStore - 导出存储
// ==========================================
pub struct ExportStore {
    // 无状态引擎,目录由调用方注入
}

impl ExportStore {
    pub fn new() -> Self {
        Self {}
    }

    /// 原子写入工件,返回最终路径
    ///
    /// # 规则
    /// 1. 路径段清洗: 航司非 2-3 位字母数字 → UNK;月份非 YYYY-MM → 0000-00
    /// 2. 落盘副本的 export_hash 一律按内容重算(陈旧哈希不落盘)
    /// 3. 路径: base_dir/AIRLINE/YYYY-MM/HASH.json
    /// 4. 同目录临时文件 + rename,避免半写文件可见
    pub fn write(
        &self,
        artifact: &BidLayerArtifact,
        base_dir: &Path,
    ) -> PipelineResult<PathBuf> {
        let airline_seg = sanitize_airline(&artifact.airline);
        let month_seg = sanitize_month(&artifact.month);
        if airline_seg != artifact.airline {
            warn!(raw = %artifact.airline, sanitized = %airline_seg, "航司路径段清洗");
        }
        if month_seg != artifact.month {
            warn!(raw = %artifact.month, sanitized = %month_seg, "月份路径段清洗");
        }

        let mut stored = artifact.clone();
        stored.export_hash = stored.compute_hash();

        let dir = base_dir.join(&airline_seg).join(&month_seg);
        fs::create_dir_all(&dir).map_err(|source| PipelineError::ExportIo {
            path: dir.clone(),
            source,
        })?;
        let target = dir.join(format!("{}.json", stored.export_hash));

        let payload = serde_json::to_vec_pretty(&stored)
            .map_err(|e| PipelineError::Config(format!("工件序列化失败: {}", e)))?;

        // 同目录临时文件保证 rename 不跨文件系统
        let io_err = |source: std::io::Error| PipelineError::ExportIo {
            path: target.clone(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(&payload).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&target)
            .map_err(|e| PipelineError::ExportIo {
                path: target.clone(),
                source: e.error,
            })?;

        info!(
            path = %target.display(),
            export_hash = %stored.export_hash,
            layer_count = stored.layers.len(),
            "竞标层工件导出完成"
        );
        Ok(target)
    }
}

impl Default for ExportStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 航司路径段清洗: 大写后须为 2-3 位 ASCII 字母数字
fn sanitize_airline(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let valid = (2..=3).contains(&upper.len())
        && upper.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        upper
    } else {
        UNKNOWN_AIRLINE.to_string()
    }
}

/// 月份路径段清洗: 须严格匹配 YYYY-MM
fn sanitize_month(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let valid = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(|b| b.is_ascii_digit())
        && bytes[5..].iter().all(|b| b.is_ascii_digit());
    if valid {
        raw.to_string()
    } else {
        UNKNOWN_MONTH.to_string()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::artifact::{Filter, Layer, ARTIFACT_FORMAT};
    use crate::domain::types::{FilterOp, PreferDirection};

    fn artifact(airline: &str, month: &str) -> BidLayerArtifact {
        let mut a = BidLayerArtifact {
            airline: airline.to_string(),
            format: ARTIFACT_FORMAT.to_string(),
            month: month.to_string(),
            layers: vec![Layer {
                priority: 1,
                filters: vec![Filter {
                    field: "pairing_id".to_string(),
                    op: FilterOp::In,
                    values: vec!["P1".to_string()],
                }],
                prefer: PreferDirection::Yes,
            }],
            lint: None,
            export_hash: String::new(),
        };
        a.export_hash = a.compute_hash();
        a
    }

    // ==========================================
    // 测试 1: 路径段清洗
    // ==========================================

    #[test]
    fn test_sanitize_airline() {
        assert_eq!(sanitize_airline("ual"), "UAL");
        assert_eq!(sanitize_airline("DL"), "DL");
        assert_eq!(sanitize_airline("ual!!"), "UNK");
        assert_eq!(sanitize_airline(""), "UNK");
        assert_eq!(sanitize_airline("UNITED"), "UNK");
        assert_eq!(sanitize_airline("../x"), "UNK");
    }

    #[test]
    fn test_sanitize_month() {
        assert_eq!(sanitize_month("2025-09"), "2025-09");
        assert_eq!(sanitize_month("2025-9"), "0000-00");
        assert_eq!(sanitize_month("202509"), "0000-00");
        assert_eq!(sanitize_month("2025/09"), "0000-00");
        assert_eq!(sanitize_month(""), "0000-00");
    }

    // ==========================================
    // 测试 2: 写入路径与内容
    // ==========================================

    #[test]
    fn test_write_builds_content_addressed_path() {
        let store = ExportStore::new();
        let dir = tempfile::tempdir().unwrap();
        let a = artifact("UAL", "2025-09");

        let path = store.write(&a, dir.path()).unwrap();
        assert_eq!(
            path,
            dir.path()
                .join("UAL")
                .join("2025-09")
                .join(format!("{}.json", a.export_hash))
        );

        let stored: BidLayerArtifact =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(stored.export_hash, a.export_hash);
        assert!(stored.hash_is_current());
    }

    // ==========================================
    // 测试 3: 陈旧哈希在落盘前被重算
    // ==========================================

    #[test]
    fn test_stale_hash_recomputed_before_write() {
        let store = ExportStore::new();
        let dir = tempfile::tempdir().unwrap();
        let good = artifact("UAL", "2025-09");
        let mut stale = good.clone();
        stale.export_hash = "deadbeef".to_string();

        let p1 = store.write(&good, dir.path()).unwrap();
        let p2 = store.write(&stale, dir.path()).unwrap();

        // 内容相同 → 相同路径、相同字节
        assert_eq!(p1, p2);
        assert_eq!(fs::read(&p1).unwrap(), fs::read(&p2).unwrap());
    }

    // ==========================================
    // 测试 4: 非法路径段回退占位目录
    // ==========================================

    #[test]
    fn test_invalid_segments_fall_back() {
        let store = ExportStore::new();
        let dir = tempfile::tempdir().unwrap();
        let a = artifact("ual!!", "2025-9");

        let path = store.write(&a, dir.path()).unwrap();
        assert!(path.starts_with(dir.path().join("UNK").join("0000-00")));
    }
}
