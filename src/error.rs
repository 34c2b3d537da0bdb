use thiserror::Error;

/// 比对引擎的错误类型
#[derive(Debug, Error)]
pub enum AlignError {
    /// 打分方案中没有该符号对的分数
    #[error("no substitution score for pair ({a}, {b})")]
    InvalidScoringPair { a: char, b: char },

    #[error("progressive alignment needs at least one sequence")]
    EmptyInput,

    /// 求共识时遇到全为间隙的列
    #[error("column {column} contains only gaps")]
    GapOnlyColumn { column: usize },

    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRows { expected: usize, found: usize, row: usize },

    /// 替换矩阵的分数个数与字母表不符（应为 alphabet.len()²）
    #[error("substitution table needs {expected} scores, got {found}")]
    MalformedTable { expected: usize, found: usize },

    /// 回溯时传入的序列长度与矩阵尺寸不一致
    #[error("matrix is {rows}x{cols}, sequences need {expected_rows}x{expected_cols}")]
    MatrixShape { rows: usize, cols: usize, expected_rows: usize, expected_cols: usize },

    #[error("invalid dot plot window {window} with stringency {stringency}")]
    InvalidWindow { window: usize, stringency: usize },

    #[error("cannot pick a scoring scheme: {0}")]
    UnknownAlphabet(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, AlignError>;
