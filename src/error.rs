// ==========================================
// 飞行员竞标优化系统 - 管线错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 合规相关失败降级到安全默认,单配对/单规则错误不中断批次
// ==========================================

use thiserror::Error;

/// 竞标管线错误类型
#[derive(Error, Debug)]
pub enum PipelineError {
    // ===== 配置错误 =====
    // 规则包缺失/畸形在加载器内部降级为保守默认包,
    // 此变体仅用于无法局部恢复的配置问题(如画像配置解析失败)
    #[error("配置错误: {0}")]
    Config(String),

    // ===== 输入校验错误 =====
    #[error("输入校验失败 (field={field}): {message}")]
    ValidationInput { field: String, message: String },

    // ===== 导出错误 =====
    #[error("导出写入失败: path={}", path.display())]
    ExportIo {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type PipelineResult<T> = Result<T, PipelineError>;
