// ==========================================
// 工件导出存储集成测试
// ==========================================
// 职责: 验证内容寻址路径/路径段清洗/幂等重写
// ==========================================

use pilot_bid_optimizer::domain::artifact::{
    BidLayerArtifact, Filter, Layer, ARTIFACT_FORMAT,
};
use pilot_bid_optimizer::domain::types::{FilterOp, PreferDirection};
use pilot_bid_optimizer::logging;
use pilot_bid_optimizer::ExportStore;
use std::fs;

// ==========================================
// 测试辅助函数
// ==========================================

/// 创建测试用工件
fn create_test_artifact(airline: &str, month: &str, pairings: &[&str]) -> BidLayerArtifact {
    let layers = pairings
        .iter()
        .enumerate()
        .map(|(i, p)| Layer {
            priority: (i + 1) as u32,
            filters: vec![Filter {
                field: "pairing_id".to_string(),
                op: FilterOp::In,
                values: vec![p.to_string()],
            }],
            prefer: PreferDirection::Yes,
        })
        .collect();

    let mut artifact = BidLayerArtifact {
        airline: airline.to_string(),
        format: ARTIFACT_FORMAT.to_string(),
        month: month.to_string(),
        layers,
        lint: None,
        export_hash: String::new(),
    };
    artifact.export_hash = artifact.compute_hash();
    artifact
}

// ==========================================
// 测试 1: 场景 - 内容寻址路径结构
// ==========================================

#[test]
fn test_export_path_structure() {
    logging::init_test();
    let store = ExportStore::new();
    let dir = tempfile::tempdir().unwrap();
    let artifact = create_test_artifact("UAL", "2025-09", &["P1", "P2"]);

    let path = store.write(&artifact, dir.path()).unwrap();

    assert_eq!(
        path,
        dir.path()
            .join("UAL")
            .join("2025-09")
            .join(format!("{}.json", artifact.export_hash))
    );
    assert!(path.exists());
}

// ==========================================
// 测试 2: 场景 - 非法航司回退 UNK
// ==========================================

#[test]
fn test_invalid_airline_falls_back_to_unk() {
    logging::init_test();
    let store = ExportStore::new();
    let dir = tempfile::tempdir().unwrap();
    let artifact = create_test_artifact("ual!!", "2025-09", &["P1"]);

    let path = store.write(&artifact, dir.path()).unwrap();

    assert!(path.starts_with(dir.path().join("UNK").join("2025-09")));
    // 清洗只影响路径段,工件内容原样保留
    let stored: BidLayerArtifact = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(stored.airline, "ual!!");
}

// ==========================================
// 测试 3: 场景 - 陈旧哈希幂等重写
// ==========================================

#[test]
fn test_stale_hash_rewrite_is_idempotent() {
    logging::init_test();
    let store = ExportStore::new();
    let dir = tempfile::tempdir().unwrap();

    let artifact = create_test_artifact("UAL", "2025-09", &["P1"]);
    let mut stale = artifact.clone();
    stale.export_hash = "0000000000000000".to_string();

    let p1 = store.write(&artifact, dir.path()).unwrap();
    let p2 = store.write(&stale, dir.path()).unwrap();

    // 内容相同 → 相同路径,相同字节
    assert_eq!(p1, p2);
    assert_eq!(fs::read(&p1).unwrap(), fs::read(&p2).unwrap());

    // 目录内只有一个文件
    let count = fs::read_dir(p1.parent().unwrap()).unwrap().count();
    assert_eq!(count, 1);
}

// ==========================================
// 测试 4: 内容不同产生不同文件
// ==========================================

#[test]
fn test_different_content_different_file() {
    logging::init_test();
    let store = ExportStore::new();
    let dir = tempfile::tempdir().unwrap();

    let a = create_test_artifact("UAL", "2025-09", &["P1"]);
    let b = create_test_artifact("UAL", "2025-09", &["P2"]);

    let pa = store.write(&a, dir.path()).unwrap();
    let pb = store.write(&b, dir.path()).unwrap();

    assert_ne!(pa, pb);
    assert_eq!(pa.parent(), pb.parent());
}

// ==========================================
// 测试 5: 落盘工件哈希自洽
// ==========================================

#[test]
fn test_stored_artifact_hash_is_current() {
    logging::init_test();
    let store = ExportStore::new();
    let dir = tempfile::tempdir().unwrap();
    let artifact = create_test_artifact("DAL", "2026-01", &["P9"]);

    let path = store.write(&artifact, dir.path()).unwrap();
    let stored: BidLayerArtifact = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert!(stored.hash_is_current());
}
